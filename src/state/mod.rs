// Application state - the single aggregate every panel reads from
//
// AppState is owned by the Store and only changes through a Patch. The
// serialized form uses camelCase keys so snapshots stay compatible with the
// documents written by the browser build of the dashboard.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

mod defaults;

pub use defaults::{ensure_non_empty_csv, initial_state};

#[cfg(test)]
pub use defaults::DEMO_CSV;

// ─────────────────────────────────────────────────────────────────────────────
// Domain records
// ─────────────────────────────────────────────────────────────────────────────

/// Direction of a KPI compared to the previous period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Neutral,
}

/// Summary KPI shown on the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub id: String,
    pub title: String,
    pub value: String,
    pub trend: Trend,
    pub percentage: String,
}

/// One point of the sales time series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataMetric {
    pub name: String,
    pub value: f64,
    pub prev_value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forecast: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertCategory {
    Churn,
    Market,
    Competitor,
    Sales,
}

/// A risk detected in the dataset, with a suggested counter-measure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAlert {
    pub id: String,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    pub category: AlertCategory,
    pub recommendation: String,
}

/// Generated copy for one marketing channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignMaterial {
    pub channel: String,
    pub copy: String,
    pub strategy: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentRisk {
    Low,
    Med,
    High,
}

/// Audience cluster produced by segmentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub name: String,
    pub size: String,
    pub risk: SegmentRisk,
    pub strategy: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    Trending,
    Stable,
    Declining,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    Invest,
    Scale,
    Discontinue,
}

/// Per-product performance with an optional ranking verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPerformance {
    pub name: String,
    pub revenue: f64,
    pub forecast: f64,
    pub growth: String,
    pub status: ProductStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<Recommendation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Aggregate
// ─────────────────────────────────────────────────────────────────────────────

/// All domain data surfaced to the panels
///
/// Container-level `default` means a snapshot missing a field (older schema)
/// picks that field up from the built-in initial state, so every field is
/// always present after deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppState {
    pub insights: Vec<Insight>,
    pub sales_data: Vec<DataMetric>,
    pub raw_csv: String,
    pub risk_alerts: Vec<RiskAlert>,
    pub campaigns: Vec<CampaignMaterial>,
    pub segments: Vec<Segment>,
    pub product_analysis: Vec<ProductPerformance>,
}

impl Default for AppState {
    fn default() -> Self {
        initial_state()
    }
}

impl AppState {
    /// Report broken invariants (duplicate series names, duplicate alert ids,
    /// a raw dataset that no longer validates)
    ///
    /// The Store logs these rather than rejecting the update.
    pub fn invariant_violations(&self) -> Vec<String> {
        let mut violations = Vec::new();

        let mut names = HashSet::new();
        for point in &self.sales_data {
            if !names.insert(point.name.as_str()) {
                violations.push(format!("duplicate salesData name {:?}", point.name));
            }
        }

        let mut ids = HashSet::new();
        for alert in &self.risk_alerts {
            if !ids.insert(alert.id.as_str()) {
                violations.push(format!("duplicate riskAlerts id {:?}", alert.id));
            }
        }

        if !self.raw_csv.trim().is_empty() {
            if let Err(e) = crate::validator::validate(&self.raw_csv) {
                violations.push(format!("rawCsv does not validate: {}", e));
            }
        }

        violations
    }
}

/// Top-level fields of AppState, used to describe what a panel reads/writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slice {
    Insights,
    SalesData,
    RawCsv,
    RiskAlerts,
    Campaigns,
    Segments,
    ProductAnalysis,
}

impl Slice {
    /// Field name as it appears in the persisted document
    pub fn field_name(&self) -> &'static str {
        match self {
            Slice::Insights => "insights",
            Slice::SalesData => "salesData",
            Slice::RawCsv => "rawCsv",
            Slice::RiskAlerts => "riskAlerts",
            Slice::Campaigns => "campaigns",
            Slice::Segments => "segments",
            Slice::ProductAnalysis => "productAnalysis",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Partial update
// ─────────────────────────────────────────────────────────────────────────────

/// Shallow partial update: present fields overwrite, absent fields are kept
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StatePatch {
    pub insights: Option<Vec<Insight>>,
    pub sales_data: Option<Vec<DataMetric>>,
    pub raw_csv: Option<String>,
    pub risk_alerts: Option<Vec<RiskAlert>>,
    pub campaigns: Option<Vec<CampaignMaterial>>,
    pub segments: Option<Vec<Segment>>,
    pub product_analysis: Option<Vec<ProductPerformance>>,
}

impl StatePatch {
    pub fn with_raw_csv(mut self, raw_csv: impl Into<String>) -> Self {
        self.raw_csv = Some(raw_csv.into());
        self
    }

    pub fn with_risk_alerts(mut self, alerts: Vec<RiskAlert>) -> Self {
        self.risk_alerts = Some(alerts);
        self
    }

    pub fn with_campaigns(mut self, campaigns: Vec<CampaignMaterial>) -> Self {
        self.campaigns = Some(campaigns);
        self
    }

    pub fn with_segments(mut self, segments: Vec<Segment>) -> Self {
        self.segments = Some(segments);
        self
    }

    pub fn with_product_analysis(mut self, products: Vec<ProductPerformance>) -> Self {
        self.product_analysis = Some(products);
        self
    }

    /// Slices this patch touches
    pub fn slices(&self) -> Vec<Slice> {
        let mut slices = Vec::new();
        if self.insights.is_some() {
            slices.push(Slice::Insights);
        }
        if self.sales_data.is_some() {
            slices.push(Slice::SalesData);
        }
        if self.raw_csv.is_some() {
            slices.push(Slice::RawCsv);
        }
        if self.risk_alerts.is_some() {
            slices.push(Slice::RiskAlerts);
        }
        if self.campaigns.is_some() {
            slices.push(Slice::Campaigns);
        }
        if self.segments.is_some() {
            slices.push(Slice::Segments);
        }
        if self.product_analysis.is_some() {
            slices.push(Slice::ProductAnalysis);
        }
        slices
    }

    pub fn is_empty(&self) -> bool {
        self.slices().is_empty()
    }

    /// Merge onto `base`, producing a new state; `base` is left untouched
    pub fn apply_to(self, base: &AppState) -> AppState {
        AppState {
            insights: self.insights.unwrap_or_else(|| base.insights.clone()),
            sales_data: self.sales_data.unwrap_or_else(|| base.sales_data.clone()),
            raw_csv: self.raw_csv.unwrap_or_else(|| base.raw_csv.clone()),
            risk_alerts: self.risk_alerts.unwrap_or_else(|| base.risk_alerts.clone()),
            campaigns: self.campaigns.unwrap_or_else(|| base.campaigns.clone()),
            segments: self.segments.unwrap_or_else(|| base.segments.clone()),
            product_analysis: self
                .product_analysis
                .unwrap_or_else(|| base.product_analysis.clone()),
        }
    }
}
