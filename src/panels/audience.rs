// Audience Matrix - segments the customer base

use super::{settle, PanelStatus};
use crate::insight::InsightService;
use crate::state::StatePatch;
use crate::store::Store;

#[derive(Debug, Default)]
pub struct AudienceMatrix {
    pub status: PanelStatus,
}

impl AudienceMatrix {
    /// Segment the current dataset; failures clear the segment list
    pub async fn segment(&mut self, store: &mut Store, service: &dyn InsightService) {
        let snapshot = store.snapshot();
        let segments = settle(
            &mut self.status,
            "segments",
            service.segment_audience(&snapshot.raw_csv),
        )
        .await
        .unwrap_or_default();

        store.update(StatePatch::default().with_segments(segments));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insight::MockInsightService;
    use crate::panels::testing::FailingService;
    use crate::state::SegmentRisk;
    use crate::storage::MemoryStorage;

    #[tokio::test]
    async fn test_segment_populates_state() {
        let mut store = Store::open(MemoryStorage::new());
        let mut panel = AudienceMatrix::default();

        panel.segment(&mut store, &MockInsightService::instant()).await;

        let segments = &store.state().segments;
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[2].risk, SegmentRisk::High);
        assert_eq!(panel.status, PanelStatus::Ready);
    }

    #[tokio::test]
    async fn test_failure_leaves_empty_segments() {
        let mut store = Store::open(MemoryStorage::new());
        let mut panel = AudienceMatrix::default();
        panel.segment(&mut store, &MockInsightService::instant()).await;

        panel.segment(&mut store, &FailingService::network()).await;

        assert!(store.state().segments.is_empty());
        assert!(panel.status.fallback_reason().is_some());
    }
}
