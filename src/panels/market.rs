// Market Intelligence - topic research

use super::{settle, PanelStatus};
use crate::insight::{InsightService, MarketBrief};

pub const UNAVAILABLE: &str = "Market intelligence unavailable. Please retry shortly.";

#[derive(Debug, Default)]
pub struct MarketIntel {
    pub result: Option<MarketBrief>,
    pub status: PanelStatus,
}

impl MarketIntel {
    /// Research `topic`; blank topics are ignored
    pub async fn search(
        &mut self,
        topic: &str,
        service: &dyn InsightService,
    ) -> Option<&MarketBrief> {
        let topic = topic.trim();
        if topic.is_empty() {
            return None;
        }

        let brief = settle(
            &mut self.status,
            "market",
            service.market_intelligence(Some(topic)),
        )
        .await
        .unwrap_or_else(|_| MarketBrief {
            text: UNAVAILABLE.to_string(),
            sources: Vec::new(),
        });
        Some(self.result.insert(brief))
    }
}
