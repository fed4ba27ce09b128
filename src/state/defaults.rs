// Built-in initial state and the demo dataset injected into empty sessions

use super::{AppState, DataMetric, Insight, Trend};

/// Sample transaction dataset shipped with the initial state
const SAMPLE_CSV: &str = "ID,Date,Region,Segment,Product,Channel,Cost,Revenue,Leads,Status,ChurnRisk
TX9001,2024-06-01,North,Enterprise,CloudSync v2,Direct,5000,45000,88,Closed,0.01
TX9002,2024-06-02,West,SMB,NetBoost Pro,PPC,1200,3100,22,At Risk,0.88
TX9003,2024-06-05,South,Mid-Market,SecureFlow,Organic,0,12000,54,Stable,0.04
TX9004,2024-06-08,East,Enterprise,CloudSync v2,Direct,4500,52000,102,Closed,0.01
TX9005,2024-06-10,West,SMB,DataGuard Lite,Social,2500,1800,215,Critical,0.99
TX9006,2024-06-12,North,Enterprise,SecureFlow,Direct,3100,28500,67,Closed,0.02
TX9007,2024-06-15,Central,SMB,NetBoost Pro,PPC,1800,1900,14,Churn Warning,0.94
TX9008,2024-06-18,East,Mid-Market,CloudSync v2,Organic,0,14800,41,Stable,0.08
TX9009,2024-06-20,West,Enterprise,DataGuard Lite,Direct,8500,75000,184,Closed,0.01
TX9010,2024-06-22,South,SMB,SecureFlow,Social,3200,2400,190,Critical,0.96
TX9011,2024-06-25,North,Mid-Market,NetBoost Pro,Direct,2100,9800,38,Closed,0.11
TX9012,2024-06-28,East,SMB,DataGuard Lite,PPC,900,1200,9,Churn Warning,0.98";

/// Dataset injected when a session starts with an empty rawCsv
pub const DEMO_CSV: &str = "Product,Revenue,Forecast,Growth,Status
CloudSync,120000,150000,+25%,trending
DataPulse,90000,70000,-8%,declining
AdIntel,60000,90000,+18%,stable";

fn insight(id: &str, title: &str, value: &str, trend: Trend, percentage: &str) -> Insight {
    Insight {
        id: id.to_string(),
        title: title.to_string(),
        value: value.to_string(),
        trend,
        percentage: percentage.to_string(),
    }
}

fn metric(name: &str, value: f64, prev_value: f64, forecast: Option<f64>) -> DataMetric {
    DataMetric {
        name: name.to_string(),
        value,
        prev_value,
        forecast,
    }
}

/// Built-in state used when no snapshot can be restored
///
/// Mutable collections start empty; `product_analysis` in particular is
/// always empty here.
pub fn initial_state() -> AppState {
    AppState {
        insights: vec![
            insight("1", "Net Revenue (ARR)", "$4.18M", Trend::Up, "+24.2%"),
            insight("2", "Avg. CAC", "$310", Trend::Down, "-14.5%"),
            insight("3", "ROAS (Blended)", "5.2x", Trend::Up, "+1.2x"),
            insight("4", "LTV:CAC Ratio", "4.1:1", Trend::Up, "+0.9"),
        ],
        sales_data: vec![
            metric("Jan '24", 210000.0, 189000.0, None),
            metric("Feb '24", 178000.0, 210000.0, None),
            metric("Mar '24", 195000.0, 178000.0, None),
            metric("Apr '24", 202000.0, 195000.0, None),
            metric("May '24", 225000.0, 202000.0, None),
            metric("Jun '24", 310000.0, 225000.0, None),
            metric("Jul '24 (Est)", 0.0, 310000.0, Some(345000.0)),
            metric("Aug '24 (Est)", 0.0, 310000.0, Some(398000.0)),
        ],
        raw_csv: SAMPLE_CSV.to_string(),
        risk_alerts: Vec::new(),
        campaigns: Vec::new(),
        segments: Vec::new(),
        product_analysis: Vec::new(),
    }
}

/// Give the state a non-empty dataset, injecting DEMO_CSV if rawCsv is blank
pub fn ensure_non_empty_csv(mut state: AppState) -> AppState {
    if state.raw_csv.trim().is_empty() {
        state.raw_csv = DEMO_CSV.to_string();
    }
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::validate;

    #[test]
    fn test_builtin_datasets_validate() {
        assert!(validate(SAMPLE_CSV).is_ok());
        assert!(validate(DEMO_CSV).is_ok());
    }

    #[test]
    fn test_initial_state_collections_empty() {
        let state = initial_state();
        assert_eq!(state.insights.len(), 4);
        assert_eq!(state.sales_data.len(), 8);
        assert!(state.risk_alerts.is_empty());
        assert!(state.campaigns.is_empty());
        assert!(state.segments.is_empty());
        assert!(state.product_analysis.is_empty());
    }

    #[test]
    fn test_ensure_non_empty_csv() {
        let mut state = initial_state();
        state.raw_csv = "  \n\t".to_string();
        assert_eq!(ensure_non_empty_csv(state).raw_csv, DEMO_CSV);

        let untouched = ensure_non_empty_csv(initial_state());
        assert_eq!(untouched.raw_csv, SAMPLE_CSV);
    }
}
