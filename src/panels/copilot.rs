// Copilot (Decision Hub) - chat grounded in the current dataset
//
// The conversation is panel-local; only rawCsv is read from the Store.

use super::{settle, PanelStatus};
use crate::insight::{ChatMessage, InsightService, Role};
use crate::store::Store;
use crate::util::one_line_preview;

const GREETING: &str = "Synexia Core operational. I have processed the current sales records. \
What mission-critical intelligence do you require?";

/// Reply shown when the service call fails
pub const SYNC_FAILURE: &str = "ALERT: Neural synchronization failure. Please verify connection.";

#[derive(Debug)]
pub struct Copilot {
    pub history: Vec<ChatMessage>,
    pub status: PanelStatus,
}

impl Default for Copilot {
    fn default() -> Self {
        Self {
            history: vec![ChatMessage::new(Role::Assistant, GREETING)],
            status: PanelStatus::Idle,
        }
    }
}

impl Copilot {
    /// Send `message` and append the reply
    ///
    /// Blank messages are ignored and return `None`. A failed call appends
    /// the fixed failure reply instead.
    pub async fn send(
        &mut self,
        message: &str,
        store: &Store,
        service: &dyn InsightService,
    ) -> Option<&ChatMessage> {
        let message = message.trim();
        if message.is_empty() {
            return None;
        }

        tracing::debug!("copilot: asking {:?}", one_line_preview(message, 60));
        self.history.push(ChatMessage::new(Role::User, message));

        let snapshot = store.snapshot();
        let reply = settle(
            &mut self.status,
            "copilot",
            service.chat(&self.history, &snapshot.raw_csv),
        )
        .await
        .unwrap_or_else(|_| SYNC_FAILURE.to_string());

        self.history.push(ChatMessage::new(Role::Assistant, reply));
        self.history.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insight::MockInsightService;
    use crate::panels::testing::FailingService;
    use crate::storage::MemoryStorage;

    #[tokio::test]
    async fn test_send_appends_exchange() {
        let store = Store::open(MemoryStorage::new());
        let mut copilot = Copilot::default();

        let reply = copilot
            .send("Which is our best product?", &store, &MockInsightService::instant())
            .await
            .unwrap();
        assert!(reply.content.starts_with("ROI Intelligence Report"));
        assert_eq!(reply.role, Role::Assistant);

        let roles: Vec<_> = copilot.history.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::Assistant, Role::User, Role::Assistant]);
    }

    #[tokio::test]
    async fn test_blank_message_ignored() {
        let store = Store::open(MemoryStorage::new());
        let mut copilot = Copilot::default();
        assert!(copilot
            .send("   ", &store, &MockInsightService::instant())
            .await
            .is_none());
        assert_eq!(copilot.history.len(), 1);
        assert_eq!(copilot.status, PanelStatus::Idle);
    }

    #[tokio::test]
    async fn test_failure_appends_fixed_reply() {
        let store = Store::open(MemoryStorage::new());
        let mut copilot = Copilot::default();

        let reply = copilot
            .send("churn?", &store, &FailingService::network())
            .await
            .unwrap();
        assert_eq!(reply.content, SYNC_FAILURE);
        assert!(copilot.status.fallback_reason().is_some());
    }
}
