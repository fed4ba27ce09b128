// Growth Forecast - actuals vs projections over salesData

use crate::state::{AppState, DataMetric};

/// Summary of the sales series
///
/// Points carrying a `forecast` are projections; everything else is an actual.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastSummary {
    pub actuals: usize,
    pub projections: usize,
    pub last_actual: Option<(String, f64)>,
    pub peak_forecast: Option<(String, f64)>,
}

impl ForecastSummary {
    pub fn from_state(state: &AppState) -> Self {
        Self::from_series(&state.sales_data)
    }

    pub fn from_series(series: &[DataMetric]) -> Self {
        let (projected, actual): (Vec<&DataMetric>, Vec<&DataMetric>) =
            series.iter().partition(|m| m.forecast.is_some());

        let last_actual = actual.last().map(|m| (m.name.clone(), m.value));
        let peak_forecast = projected
            .iter()
            .filter_map(|m| m.forecast.map(|f| (m.name.clone(), f)))
            .fold(None, |best: Option<(String, f64)>, point| match best {
                Some(b) if b.1 >= point.1 => Some(b),
                _ => Some(point),
            });

        Self {
            actuals: actual.len(),
            projections: projected.len(),
            last_actual,
            peak_forecast,
        }
    }

    /// Projected growth of the peak forecast over the last actual, in percent
    pub fn projected_growth(&self) -> Option<f64> {
        match (&self.last_actual, &self.peak_forecast) {
            (Some((_, actual)), Some((_, peak))) if *actual > 0.0 => {
                Some((peak - actual) / actual * 100.0)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::initial_state;

    #[test]
    fn test_default_series() {
        let summary = ForecastSummary::from_state(&initial_state());
        assert_eq!(summary.actuals, 6);
        assert_eq!(summary.projections, 2);
        assert_eq!(summary.last_actual, Some(("Jun '24".to_string(), 310000.0)));
        assert_eq!(
            summary.peak_forecast,
            Some(("Aug '24 (Est)".to_string(), 398000.0))
        );

        let growth = summary.projected_growth().unwrap();
        assert!((growth - 28.387).abs() < 0.01);
    }

    #[test]
    fn test_empty_series() {
        let summary = ForecastSummary::from_series(&[]);
        assert_eq!(summary.actuals, 0);
        assert!(summary.last_actual.is_none());
        assert!(summary.projected_growth().is_none());
    }
}
