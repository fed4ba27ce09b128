//! Panels - per-tab workflows on top of the Store
//!
//! A panel reads a slice of the current snapshot, calls the Insight Service,
//! and applies the outcome with [`Store::update`](crate::store::Store::update).
//! Every call goes `Loading` → `Ready` or `Fallback`; a failed call never
//! leaves a panel loading and never leaves its slice half-written.
//!
//! Panel-local data (chat history, simulation text, draft CSV) lives on the
//! panel struct, not in AppState.

use crate::insight::InsightError;
use std::future::Future;

pub mod audience;
pub mod campaigns;
pub mod copilot;
pub mod dashboard;
pub mod explainer;
pub mod forecast;
pub mod market;
pub mod products;
pub mod risk;
pub mod scenario;

pub use audience::AudienceMatrix;
pub use campaigns::CampaignFactory;
pub use copilot::Copilot;
pub use dashboard::Dashboard;
pub use explainer::DataNarrator;
pub use forecast::ForecastSummary;
pub use market::MarketIntel;
pub use products::ProductLab;
pub use risk::RiskRadar;
pub use scenario::ScenarioEngine;

/// Lifecycle of a panel's most recent request
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PanelStatus {
    /// Nothing requested yet
    #[default]
    Idle,
    /// Waiting on the Insight Service
    Loading,
    /// Last request succeeded
    Ready,
    /// Last request failed and a fallback was applied
    Fallback { reason: String },
}

impl PanelStatus {
    /// Why the last request fell back, if it did
    pub fn fallback_reason(&self) -> Option<&str> {
        match self {
            Self::Fallback { reason } => Some(reason),
            _ => None,
        }
    }
}

/// Await `call` with `status` bracketing it
///
/// Sets `Loading` before awaiting and always leaves a terminal status. The
/// error is logged here and handed back so the panel can pick its fallback.
pub(crate) async fn settle<T, F>(
    status: &mut PanelStatus,
    panel: &'static str,
    call: F,
) -> Result<T, InsightError>
where
    F: Future<Output = Result<T, InsightError>>,
{
    *status = PanelStatus::Loading;
    tracing::debug!("{}: request started", panel);

    let result = call.await;
    match &result {
        Ok(_) => {
            tracing::debug!("{}: request settled", panel);
            *status = PanelStatus::Ready;
        }
        Err(e) => {
            tracing::warn!("{}: request failed, using fallback: {}", panel, e);
            *status = PanelStatus::Fallback {
                reason: e.to_string(),
            };
        }
    }
    result
}


#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_settle_success_is_ready() {
        let mut status = PanelStatus::Idle;
        let value = settle(&mut status, "test", async { Ok::<_, InsightError>(3) }).await;
        assert_eq!(value, Ok(3));
        assert_eq!(status, PanelStatus::Ready);
    }

    #[tokio::test]
    async fn test_settle_failure_is_fallback() {
        let mut status = PanelStatus::Ready;
        let value: Result<u8, _> = settle(&mut status, "test", async {
            Err(InsightError::Internal("boom".to_string()))
        })
        .await;
        assert!(value.is_err());
        assert_eq!(status.fallback_reason(), Some("Internal error: boom"));
    }
}
