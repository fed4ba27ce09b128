//! Insight Service port
//!
//! Everything "intelligent" in the workspace (segmentation, campaign copy,
//! risk scans, market briefs, copilot replies, simulations) comes from an
//! [`InsightService`]. Panels only see the trait, so the mock and the live
//! backend are interchangeable.
//!
//! # Architecture
//!
//! ```text
//! InsightService trait
//! ├── MockInsightService (canned results after simulated latency)
//! └── LiveInsightService (OpenAI-compatible chat completions)
//! ```
//!
//! Every call may fail. Callers are expected to turn an [`InsightError`] into
//! a fallback rather than propagate it.

use crate::config::{InsightConfig, InsightMode};
use crate::state::{CampaignMaterial, ProductPerformance, RiskAlert, Segment};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

pub mod live;
pub mod mock;

pub use live::LiveInsightService;
pub use mock::MockInsightService;

/// Who wrote a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

/// One entry of a copilot conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Last id handed out; ids are millisecond-based but strictly increasing
static LAST_MESSAGE_ID: AtomicI64 = AtomicI64::new(0);

fn next_message_id(now_millis: i64) -> i64 {
    let previous = LAST_MESSAGE_ID
        .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |last| {
            Some(now_millis.max(last + 1))
        })
        .unwrap_or_else(|last| last);
    now_millis.max(previous + 1)
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        let timestamp = Utc::now();
        Self {
            id: next_message_id(timestamp.timestamp_millis()).to_string(),
            role,
            content: content.into(),
            timestamp,
        }
    }
}

/// Reference backing a market brief
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingSource {
    pub title: String,
    pub uri: String,
}

/// Market intelligence text with its sources
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketBrief {
    pub text: String,
    #[serde(default)]
    pub sources: Vec<GroundingSource>,
}

/// Failure reported by an Insight Service backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsightError {
    /// No API key configured for the live backend
    MissingCredentials,
    /// Request never got an answer
    Network(String),
    /// Backend answered with an error status
    Api { status: u16, message: String },
    /// Answer could not be interpreted
    Parse(String),
    /// Anything else
    Internal(String),
}

impl InsightError {
    pub fn is_missing_credentials(&self) -> bool {
        matches!(self, Self::MissingCredentials)
    }
}

impl fmt::Display for InsightError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCredentials => write!(f, "API key missing"),
            Self::Network(msg) => write!(f, "Network error: {}", msg),
            Self::Api { status, message } => write!(f, "API error ({}): {}", status, message),
            Self::Parse(msg) => write!(f, "Unparseable response: {}", msg),
            Self::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for InsightError {}

/// Provider of analytics and generated marketing content
#[async_trait]
pub trait InsightService: Send + Sync {
    /// Backend name for logs and the startup banner
    fn name(&self) -> &'static str;

    async fn segment_audience(&self, csv: &str) -> Result<Vec<Segment>, InsightError>;

    async fn generate_campaigns(
        &self,
        csv: &str,
        goal: &str,
    ) -> Result<Vec<CampaignMaterial>, InsightError>;

    async fn fetch_risk_alerts(&self, csv: Option<&str>) -> Result<Vec<RiskAlert>, InsightError>;

    /// Topic-less calls return the general market pulse
    async fn market_intelligence(&self, topic: Option<&str>) -> Result<MarketBrief, InsightError>;

    /// Reply to the last message of `history`
    async fn chat(&self, history: &[ChatMessage], csv: &str) -> Result<String, InsightError>;

    /// Project the effect of price and budget changes (percent deltas)
    async fn what_if(
        &self,
        csv: &str,
        price_delta: f64,
        budget_delta: f64,
    ) -> Result<String, InsightError>;

    async fn explain(&self, csv: &str, query: &str, persona: &str) -> Result<String, InsightError>;

    /// Normalize a dataset; the result is not guaranteed to validate
    async fn clean(&self, csv: &str) -> Result<String, InsightError>;

    async fn analyze_products(&self, csv: &str) -> Result<Vec<ProductPerformance>, InsightError>;
}

/// Pick the backend for `config`
///
/// `auto` goes live only when an API key is available.
pub fn create_service(config: &InsightConfig) -> Box<dyn InsightService> {
    let live = match config.mode {
        InsightMode::Mock => false,
        InsightMode::Live => true,
        InsightMode::Auto => config.api_key.is_some(),
    };

    if !live {
        return Box::new(MockInsightService::new(config.latency()));
    }

    match LiveInsightService::new(config) {
        Ok(service) => Box::new(service),
        Err(e) => {
            tracing::error!("Failed to create live insight service: {}", e);
            Box::new(MockInsightService::new(config.latency()))
        }
    }
}
