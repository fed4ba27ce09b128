// Intelligence dashboard - KPI cards plus a live market pulse

use super::{settle, PanelStatus};
use crate::insight::{InsightService, MarketBrief};
use crate::state::{Insight, Trend};
use crate::store::Store;

const PULSE_EMPTY: &str = "Market pulse unavailable.";
const PULSE_FAILED: &str = "Unable to fetch market pulse.";

#[derive(Debug, Default)]
pub struct Dashboard {
    pub pulse: Option<MarketBrief>,
    pub status: PanelStatus,
}

impl Dashboard {
    /// Fetch the topic-less market pulse
    pub async fn refresh_pulse(&mut self, service: &dyn InsightService) -> &MarketBrief {
        let brief = match settle(
            &mut self.status,
            "dashboard",
            service.market_intelligence(None),
        )
        .await
        {
            Ok(brief) if brief.text.trim().is_empty() => MarketBrief {
                text: PULSE_EMPTY.to_string(),
                sources: brief.sources,
            },
            Ok(brief) => brief,
            Err(_) => MarketBrief {
                text: PULSE_FAILED.to_string(),
                sources: Vec::new(),
            },
        };
        self.pulse.insert(brief)
    }

    /// KPI cards in display order
    pub fn kpis(store: &Store) -> &[Insight] {
        &store.state().insights
    }

    /// Number of KPIs currently trending up
    pub fn rising(store: &Store) -> usize {
        Self::kpis(store)
            .iter()
            .filter(|kpi| kpi.trend == Trend::Up)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insight::{ChatMessage, InsightError, MockInsightService};
    use crate::panels::testing::FailingService;
    use crate::state::{CampaignMaterial, ProductPerformance, RiskAlert, Segment};
    use crate::storage::MemoryStorage;
    use async_trait::async_trait;

    /// Answers market requests with blank text
    struct SilentMarket;

    #[async_trait]
    impl InsightService for SilentMarket {
        fn name(&self) -> &'static str {
            "silent"
        }
        async fn segment_audience(&self, _: &str) -> Result<Vec<Segment>, InsightError> {
            Ok(Vec::new())
        }
        async fn generate_campaigns(
            &self,
            _: &str,
            _: &str,
        ) -> Result<Vec<CampaignMaterial>, InsightError> {
            Ok(Vec::new())
        }
        async fn fetch_risk_alerts(&self, _: Option<&str>) -> Result<Vec<RiskAlert>, InsightError> {
            Ok(Vec::new())
        }
        async fn market_intelligence(&self, _: Option<&str>) -> Result<MarketBrief, InsightError> {
            Ok(MarketBrief {
                text: "  ".to_string(),
                sources: Vec::new(),
            })
        }
        async fn chat(&self, _: &[ChatMessage], _: &str) -> Result<String, InsightError> {
            Ok(String::new())
        }
        async fn what_if(&self, _: &str, _: f64, _: f64) -> Result<String, InsightError> {
            Ok(String::new())
        }
        async fn explain(&self, _: &str, _: &str, _: &str) -> Result<String, InsightError> {
            Ok(String::new())
        }
        async fn clean(&self, csv: &str) -> Result<String, InsightError> {
            Ok(csv.to_string())
        }
        async fn analyze_products(
            &self,
            _: &str,
        ) -> Result<Vec<ProductPerformance>, InsightError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_pulse_from_service() {
        let mut dashboard = Dashboard::default();
        let pulse = dashboard
            .refresh_pulse(&MockInsightService::instant())
            .await;
        assert!(pulse.text.starts_with("AI-native SaaS"));
        assert_eq!(dashboard.status, PanelStatus::Ready);
    }

    #[tokio::test]
    async fn test_blank_pulse_shows_unavailable() {
        let mut dashboard = Dashboard::default();
        let pulse = dashboard.refresh_pulse(&SilentMarket).await;
        assert_eq!(pulse.text, PULSE_EMPTY);
    }

    #[tokio::test]
    async fn test_failed_pulse() {
        let mut dashboard = Dashboard::default();
        dashboard.refresh_pulse(&FailingService::network()).await;
        assert_eq!(dashboard.pulse.as_ref().unwrap().text, PULSE_FAILED);
        assert!(dashboard.status.fallback_reason().is_some());
    }

    #[test]
    fn test_kpis_follow_state() {
        let store = Store::open(MemoryStorage::new());
        assert_eq!(Dashboard::kpis(&store).len(), 4);
        assert_eq!(Dashboard::rising(&store), 3);
    }
}
