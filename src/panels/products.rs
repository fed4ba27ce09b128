// Product Lab - ranks products and recommends where to invest

use super::{settle, PanelStatus};
use crate::insight::InsightService;
use crate::state::{ProductPerformance, StatePatch};
use crate::store::Store;

#[derive(Debug, Default)]
pub struct ProductLab {
    pub status: PanelStatus,
}

impl ProductLab {
    /// Analyze the current dataset into productAnalysis, ordered by rank
    ///
    /// Unranked products sort after ranked ones. Failures clear the analysis.
    pub async fn analyze(&mut self, store: &mut Store, service: &dyn InsightService) {
        let snapshot = store.snapshot();
        let mut products = settle(
            &mut self.status,
            "products",
            service.analyze_products(&snapshot.raw_csv),
        )
        .await
        .unwrap_or_default();

        products.sort_by_key(|p| p.rank.unwrap_or(u32::MAX));
        store.update(StatePatch::default().with_product_analysis(products));
    }

    /// Best-ranked product, if any analysis exists
    pub fn top_pick(store: &Store) -> Option<&ProductPerformance> {
        store.state().product_analysis.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insight::MockInsightService;
    use crate::panels::testing::FailingService;
    use crate::state::Recommendation;
    use crate::storage::MemoryStorage;

    #[tokio::test]
    async fn test_analysis_sorted_by_rank() {
        let mut store = Store::open(MemoryStorage::new());
        let mut lab = ProductLab::default();

        lab.analyze(&mut store, &MockInsightService::instant()).await;

        let ranks: Vec<_> = store
            .state()
            .product_analysis
            .iter()
            .map(|p| p.rank)
            .collect();
        assert_eq!(ranks, vec![Some(1), Some(2), Some(3)]);

        let top = ProductLab::top_pick(&store).unwrap();
        assert_eq!(top.name, "CloudSync");
        assert_eq!(top.recommendation, Some(Recommendation::Invest));
    }

    #[tokio::test]
    async fn test_failure_clears_analysis() {
        let mut store = Store::open(MemoryStorage::new());
        let mut lab = ProductLab::default();
        lab.analyze(&mut store, &MockInsightService::instant()).await;

        lab.analyze(&mut store, &FailingService::network()).await;

        assert!(store.state().product_analysis.is_empty());
        assert!(ProductLab::top_pick(&store).is_none());
    }
}
