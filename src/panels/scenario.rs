// Scenario Engine - what-if simulation over price and budget changes

use super::{settle, PanelStatus};
use crate::insight::InsightService;
use crate::store::Store;

const MODELING_FAILED: &str = "Strategic modeling failed. Check neural link.";
const KEY_REQUIRED: &str = "API Key selection required for complex modelling.";

#[derive(Debug, Default)]
pub struct ScenarioEngine {
    pub result: Option<String>,
    pub error: Option<String>,
    pub status: PanelStatus,
}

impl ScenarioEngine {
    /// Simulate percent changes to price and marketing budget
    pub async fn simulate(
        &mut self,
        price_delta: f64,
        budget_delta: f64,
        store: &Store,
        service: &dyn InsightService,
    ) {
        self.error = None;
        let snapshot = store.snapshot();
        match settle(
            &mut self.status,
            "simulator",
            service.what_if(&snapshot.raw_csv, price_delta, budget_delta),
        )
        .await
        {
            Ok(text) => self.result = Some(text),
            Err(e) => {
                self.result = None;
                let message = if e.is_missing_credentials() {
                    KEY_REQUIRED
                } else {
                    MODELING_FAILED
                };
                self.error = Some(message.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insight::MockInsightService;
    use crate::panels::testing::FailingService;
    use crate::storage::MemoryStorage;

    #[tokio::test]
    async fn test_simulate() {
        let store = Store::open(MemoryStorage::new());
        let mut engine = ScenarioEngine::default();
        engine
            .simulate(-5.0, 10.0, &store, &MockInsightService::instant())
            .await;
        assert_eq!(
            engine.result.as_deref(),
            Some("Projected revenue impact ≈ 1.50%.")
        );
        assert!(engine.error.is_none());
    }

    #[tokio::test]
    async fn test_error_messages() {
        let store = Store::open(MemoryStorage::new());
        let mut engine = ScenarioEngine::default();

        engine
            .simulate(1.0, 1.0, &store, &FailingService::no_key())
            .await;
        assert_eq!(engine.error.as_deref(), Some(KEY_REQUIRED));

        engine
            .simulate(1.0, 1.0, &store, &FailingService::network())
            .await;
        assert_eq!(engine.error.as_deref(), Some(MODELING_FAILED));
        assert!(engine.result.is_none());
    }
}
