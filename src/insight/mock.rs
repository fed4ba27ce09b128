// Mock Insight Service: canned results after a simulated delay
//
// Stands in for a real backend in demos and tests. Results ignore the dataset
// except where a caller-provided value (goal, topic, persona, deltas) is
// echoed back.

use super::{ChatMessage, GroundingSource, InsightError, InsightService, MarketBrief};
use crate::state::{
    AlertCategory, CampaignMaterial, ProductPerformance, ProductStatus, Recommendation, RiskAlert,
    Segment, SegmentRisk, Severity,
};
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::sleep;

/// Canned Insight Service
#[derive(Debug, Clone)]
pub struct MockInsightService {
    latency: Duration,
}

impl MockInsightService {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }

    /// No simulated delay
    #[cfg(test)]
    pub fn instant() -> Self {
        Self::new(Duration::ZERO)
    }

    async fn delay(&self) {
        if !self.latency.is_zero() {
            sleep(self.latency).await;
        }
    }
}

impl Default for MockInsightService {
    fn default() -> Self {
        Self::new(Duration::from_millis(800))
    }
}

fn segment(name: &str, size: &str, risk: SegmentRisk, strategy: &str) -> Segment {
    Segment {
        name: name.to_string(),
        size: size.to_string(),
        risk,
        strategy: strategy.to_string(),
    }
}

fn campaign(channel: &str, copy: String, strategy: &str) -> CampaignMaterial {
    CampaignMaterial {
        channel: channel.to_string(),
        copy,
        strategy: strategy.to_string(),
    }
}

#[async_trait]
impl InsightService for MockInsightService {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn segment_audience(&self, _csv: &str) -> Result<Vec<Segment>, InsightError> {
        self.delay().await;
        Ok(vec![
            segment(
                "Enterprise Titans",
                "24 Accounts",
                SegmentRisk::Low,
                "Upsell premium integrations.",
            ),
            segment(
                "SMB Growth Seekers",
                "83 Accounts",
                SegmentRisk::Med,
                "Offer loyalty incentives.",
            ),
            segment(
                "At-Risk Customers",
                "41 Accounts",
                SegmentRisk::High,
                "Deploy urgent retention campaign.",
            ),
        ])
    }

    async fn generate_campaigns(
        &self,
        _csv: &str,
        goal: &str,
    ) -> Result<Vec<CampaignMaterial>, InsightError> {
        self.delay().await;
        Ok(vec![
            campaign(
                "Email",
                format!(
                    "Subject: Limited Offer\n\n{}\nClaim your 20% discount before it expires.",
                    goal
                ),
                "Urgency-driven retention funnel.",
            ),
            campaign(
                "LinkedIn",
                format!(
                    "We're helping modern SaaS companies scale smarter. {}",
                    goal
                ),
                "Authority positioning + thought leadership.",
            ),
            campaign(
                "Google Ads",
                format!("Scale Faster with CloudSync - {}", goal),
                "High-intent keyword targeting campaign.",
            ),
        ])
    }

    async fn fetch_risk_alerts(&self, _csv: Option<&str>) -> Result<Vec<RiskAlert>, InsightError> {
        self.delay().await;
        Ok(vec![
            RiskAlert {
                id: "R1".to_string(),
                severity: Severity::Critical,
                title: "Churn Spike".to_string(),
                description: "SMB churn rising in West region.".to_string(),
                category: AlertCategory::Churn,
                recommendation: "Launch immediate retention campaign.".to_string(),
            },
            RiskAlert {
                id: "R2".to_string(),
                severity: Severity::Medium,
                title: "Ad Spend Inefficiency".to_string(),
                description: "Paid acquisition CAC rising 12%.".to_string(),
                category: AlertCategory::Sales,
                recommendation: "Reallocate budget to high-intent segments.".to_string(),
            },
        ])
    }

    async fn market_intelligence(&self, topic: Option<&str>) -> Result<MarketBrief, InsightError> {
        self.delay().await;
        let text = match topic.map(str::trim).filter(|t| !t.is_empty()) {
            None => "AI-native SaaS demand accelerating in enterprise markets. \
                     Cloud infrastructure spend up 18% YoY. \
                     Retention strategies outperform acquisition in Q3."
                .to_string(),
            Some(topic) => format!(
                "Market Intelligence Report on \"{}\":\n\n\
                 - Competitive activity increasing.\n\
                 - Pricing shifting toward usage-based models.\n\
                 - Enterprise demand rising faster than SMB.\n\
                 - Retention > acquisition efficiency in current cycle.\n\n\
                 Strategic Signal:\nFocus on capital efficiency and lifecycle expansion.",
                topic
            ),
        };
        Ok(MarketBrief {
            text,
            sources: Vec::<GroundingSource>::new(),
        })
    }

    async fn chat(&self, history: &[ChatMessage], _csv: &str) -> Result<String, InsightError> {
        self.delay().await;
        let last = history
            .last()
            .map(|m| m.content.to_lowercase())
            .unwrap_or_default();

        let reply = if last.contains("roi") || last.contains("best product") {
            "ROI Intelligence Report:\n\n\
             CloudSync currently delivers the highest ROI.\n\n\
             - Revenue: $120,000\n- Forecast: $160,000\n- Growth: +33%\n\n\
             Recommendation:\nIncrease capital allocation and expand enterprise partnerships."
        } else if last.contains("churn") {
            "Churn Risk Assessment:\n\n\
             High-risk cluster identified:\n-> At-Risk Customers\n\n\
             Strategic Action:\nDeploy 14-day retention campaign with targeted incentives."
        } else if last.contains("correlation") {
            "Marketing vs Revenue Correlation:\n\n\
             Strong positive correlation detected.\n\
             Revenue increases approximately 30 days after marketing scale.\n\n\
             Recommendation:\nScale only high-performing channels."
        } else {
            "Strategic Overview:\n\n\
             - Strongest product: CloudSync\n- Primary risk: SMB churn\n\
             - Fastest growing segment: Enterprise\n- Key opportunity: Retention optimization"
        };
        Ok(reply.to_string())
    }

    async fn what_if(
        &self,
        _csv: &str,
        price_delta: f64,
        budget_delta: f64,
    ) -> Result<String, InsightError> {
        self.delay().await;
        let impact = price_delta * 0.7 + budget_delta * 0.5;
        Ok(format!("Projected revenue impact ≈ {:.2}%.", impact))
    }

    async fn explain(
        &self,
        _csv: &str,
        _query: &str,
        persona: &str,
    ) -> Result<String, InsightError> {
        self.delay().await;
        Ok(format!(
            "[{}] Insight: Funnel inefficiency detected in mid-market segment. \
             Optimize mid-funnel messaging to unlock hidden revenue.",
            persona
        ))
    }

    async fn clean(&self, csv: &str) -> Result<String, InsightError> {
        self.delay().await;
        Ok(csv.to_string())
    }

    async fn analyze_products(&self, _csv: &str) -> Result<Vec<ProductPerformance>, InsightError> {
        self.delay().await;
        Ok(vec![
            ProductPerformance {
                name: "CloudSync".to_string(),
                revenue: 120000.0,
                forecast: 160000.0,
                growth: "+33%".to_string(),
                status: ProductStatus::Trending,
                recommendation: Some(Recommendation::Invest),
                reasoning: Some("Enterprise ARR expanding rapidly with low churn.".to_string()),
                rank: Some(1),
            },
            ProductPerformance {
                name: "AdIntel".to_string(),
                revenue: 70000.0,
                forecast: 92000.0,
                growth: "+18%".to_string(),
                status: ProductStatus::Stable,
                recommendation: Some(Recommendation::Scale),
                reasoning: Some("Healthy mid-market demand with growth potential.".to_string()),
                rank: Some(2),
            },
            ProductPerformance {
                name: "DataPulse".to_string(),
                revenue: 90000.0,
                forecast: 85000.0,
                growth: "-6%".to_string(),
                status: ProductStatus::Declining,
                recommendation: Some(Recommendation::Discontinue),
                reasoning: Some("Declining engagement and rising CAC.".to_string()),
                rank: Some(3),
            },
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insight::Role;

    #[tokio::test]
    async fn test_what_if_formula() {
        let service = MockInsightService::instant();
        let result = service.what_if("", 10.0, 20.0).await.unwrap();
        assert_eq!(result, "Projected revenue impact ≈ 17.00%.");
    }

    #[tokio::test]
    async fn test_chat_routes_on_keywords() {
        let service = MockInsightService::instant();
        let history = vec![ChatMessage::new(Role::User, "What is our CHURN outlook?")];
        let reply = service.chat(&history, "").await.unwrap();
        assert!(reply.starts_with("Churn Risk Assessment"));

        let reply = service.chat(&[], "").await.unwrap();
        assert!(reply.starts_with("Strategic Overview"));
    }

    #[tokio::test]
    async fn test_campaigns_echo_goal() {
        let service = MockInsightService::instant();
        let assets = service
            .generate_campaigns("", "Win back lapsed SMB accounts")
            .await
            .unwrap();
        assert_eq!(assets.len(), 3);
        assert!(assets
            .iter()
            .all(|a| a.copy.contains("Win back lapsed SMB accounts")));
    }

    #[tokio::test]
    async fn test_market_pulse_vs_topic() {
        let service = MockInsightService::instant();
        let pulse = service.market_intelligence(None).await.unwrap();
        assert!(pulse.text.starts_with("AI-native SaaS"));

        let blank = service.market_intelligence(Some("  ")).await.unwrap();
        assert_eq!(blank, pulse);

        let report = service.market_intelligence(Some("CDP")).await.unwrap();
        assert!(report.text.contains("\"CDP\""));
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_is_simulated() {
        let service = MockInsightService::new(Duration::from_millis(700));
        let started = tokio::time::Instant::now();
        service.fetch_risk_alerts(None).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(700));
    }
}
