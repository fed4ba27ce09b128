// Campaign Factory - generates channel copy for a marketing goal

use super::{settle, PanelStatus};
use crate::insight::InsightService;
use crate::state::StatePatch;
use crate::store::Store;

pub const DEFAULT_GOAL: &str = "Re-engage at-risk customers with a 20% discount offer";

#[derive(Debug)]
pub struct CampaignFactory {
    pub goal: String,
    pub status: PanelStatus,
}

impl Default for CampaignFactory {
    fn default() -> Self {
        Self {
            goal: DEFAULT_GOAL.to_string(),
            status: PanelStatus::Idle,
        }
    }
}

impl CampaignFactory {
    pub fn with_goal(goal: impl Into<String>) -> Self {
        Self {
            goal: goal.into(),
            ..Self::default()
        }
    }

    /// Generate assets for the current goal; failures clear the campaign list
    pub async fn generate(&mut self, store: &mut Store, service: &dyn InsightService) {
        let snapshot = store.snapshot();
        let assets = settle(
            &mut self.status,
            "campaigns",
            service.generate_campaigns(&snapshot.raw_csv, &self.goal),
        )
        .await
        .unwrap_or_default();

        store.update(StatePatch::default().with_campaigns(assets));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insight::MockInsightService;
    use crate::panels::testing::FailingService;
    use crate::storage::MemoryStorage;

    #[tokio::test]
    async fn test_generate_uses_goal() {
        let mut store = Store::open(MemoryStorage::new());
        let mut factory = CampaignFactory::with_goal("Launch AdIntel in EMEA");

        factory
            .generate(&mut store, &MockInsightService::instant())
            .await;

        let campaigns = &store.state().campaigns;
        assert_eq!(campaigns.len(), 3);
        assert!(campaigns[0].copy.contains("Launch AdIntel in EMEA"));
    }

    #[tokio::test]
    async fn test_failure_clears_campaigns() {
        let mut store = Store::open(MemoryStorage::new());
        let mut factory = CampaignFactory::default();
        assert_eq!(factory.goal, DEFAULT_GOAL);

        factory.generate(&mut store, &FailingService::no_key()).await;

        assert!(store.state().campaigns.is_empty());
        assert!(factory.status.fallback_reason().is_some());
    }
}
