// Live Insight Service over an OpenAI-compatible chat-completions API
//
// Works with Groq (default), OpenAI, OpenRouter and any endpoint exposing
// POST {api_base}/chat/completions. Structured operations ask the model for
// JSON and pull the first array/object out of the reply, since models tend to
// wrap JSON in prose or code fences.

use super::{ChatMessage, InsightError, InsightService, MarketBrief};
use crate::config::InsightConfig;
use crate::state::{CampaignMaterial, ProductPerformance, RiskAlert, Segment};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

/// Persona the model answers as
const SYSTEM_PROMPT: &str = "You are MarketMind, a senior marketing analyst. \
Answer concisely and ground every claim in the provided CSV data.";

/// Longest dataset excerpt sent with a prompt
const MAX_CSV_CHARS: usize = 12_000;

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Chat-completions backed Insight Service
pub struct LiveInsightService {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl LiveInsightService {
    /// Build the HTTP client; a missing key is only reported on first call
    pub fn new(config: &InsightConfig) -> Result<Self, InsightError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| InsightError::Internal(format!("Failed to create client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.api_base.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone().filter(|k| !k.trim().is_empty()),
            model: config.model.clone(),
        })
    }

    /// Send a conversation and return the assistant's text
    async fn complete(&self, messages: Vec<serde_json::Value>) -> Result<String, InsightError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(InsightError::MissingCredentials)?;

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&json!({
                "model": self.model,
                "messages": messages,
                "temperature": 0.4,
            }))
            .send()
            .await
            .map_err(|e| InsightError::Network(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(InsightError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: CompletionResponse = response
            .json()
            .await
            .map_err(|e| InsightError::Parse(format!("Failed to parse response: {}", e)))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| InsightError::Parse("Empty completion".to_string()))
    }

    /// Single-turn prompt with the analyst system prompt
    async fn ask(&self, prompt: String) -> Result<String, InsightError> {
        self.complete(vec![
            json!({"role": "system", "content": SYSTEM_PROMPT}),
            json!({"role": "user", "content": prompt}),
        ])
        .await
    }

    /// Prompt for a JSON array and deserialize it
    async fn ask_json<T: DeserializeOwned>(&self, prompt: String) -> Result<T, InsightError> {
        let reply = self.ask(prompt).await?;
        let json = extract_json(&reply, '[', ']')
            .ok_or_else(|| InsightError::Parse("No JSON array in reply".to_string()))?;
        serde_json::from_str(json).map_err(|e| InsightError::Parse(e.to_string()))
    }
}

/// Dataset excerpt safe to embed in a prompt
fn excerpt(csv: &str) -> &str {
    crate::util::truncate_utf8_safe(csv, MAX_CSV_CHARS)
}

/// Outermost `open ... close` span of `text`
fn extract_json(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}

#[async_trait]
impl InsightService for LiveInsightService {
    fn name(&self) -> &'static str {
        "live"
    }

    async fn segment_audience(&self, csv: &str) -> Result<Vec<Segment>, InsightError> {
        self.ask_json(format!(
            "Segment the customers in this dataset into 3-5 audience clusters. \
             Reply with only a JSON array of objects with keys \
             \"name\", \"size\" (e.g. \"24 Accounts\"), \"risk\" (\"low\", \"med\" or \"high\") \
             and \"strategy\".\n\nCSV:\n{}",
            excerpt(csv)
        ))
        .await
    }

    async fn generate_campaigns(
        &self,
        csv: &str,
        goal: &str,
    ) -> Result<Vec<CampaignMaterial>, InsightError> {
        self.ask_json(format!(
            "Create campaign assets for the goal \"{}\" across Email, LinkedIn and Google Ads. \
             Reply with only a JSON array of objects with keys \"channel\", \"copy\" and \
             \"strategy\".\n\nCSV:\n{}",
            goal,
            excerpt(csv)
        ))
        .await
    }

    async fn fetch_risk_alerts(&self, csv: Option<&str>) -> Result<Vec<RiskAlert>, InsightError> {
        let data = csv.map(excerpt).unwrap_or("(no dataset provided)");
        self.ask_json(format!(
            "List the main business risks in this dataset. Reply with only a JSON array of \
             objects with keys \"id\" (R1, R2, ...), \"severity\" (low, medium, high, critical), \
             \"title\", \"description\", \"category\" (churn, market, competitor, sales) and \
             \"recommendation\".\n\nCSV:\n{}",
            data
        ))
        .await
    }

    async fn market_intelligence(&self, topic: Option<&str>) -> Result<MarketBrief, InsightError> {
        let prompt = match topic.map(str::trim).filter(|t| !t.is_empty()) {
            Some(topic) => format!(
                "Write a short market intelligence report on \"{}\": competitive activity, \
                 pricing trends, demand shifts and one strategic signal.",
                topic
            ),
            None => "Give a three-sentence pulse of the current B2B SaaS market.".to_string(),
        };
        let text = self.ask(prompt).await?;
        Ok(MarketBrief {
            text,
            sources: Vec::new(),
        })
    }

    async fn chat(&self, history: &[ChatMessage], csv: &str) -> Result<String, InsightError> {
        let mut messages = vec![json!({
            "role": "system",
            "content": format!("{}\n\nDataset:\n{}", SYSTEM_PROMPT, excerpt(csv)),
        })];
        messages.extend(
            history
                .iter()
                .map(|m| json!({"role": m.role.as_str(), "content": m.content})),
        );
        self.complete(messages).await
    }

    async fn what_if(
        &self,
        csv: &str,
        price_delta: f64,
        budget_delta: f64,
    ) -> Result<String, InsightError> {
        self.ask(format!(
            "Simulate a {:+}% price change and a {:+}% marketing budget change on this business. \
             Give the projected revenue impact in percent and a two-sentence rationale.\n\nCSV:\n{}",
            price_delta,
            budget_delta,
            excerpt(csv)
        ))
        .await
    }

    async fn explain(&self, csv: &str, query: &str, persona: &str) -> Result<String, InsightError> {
        self.ask(format!(
            "Answer as a {}. Question: {}\n\nCSV:\n{}",
            persona,
            query,
            excerpt(csv)
        ))
        .await
    }

    async fn clean(&self, csv: &str) -> Result<String, InsightError> {
        let reply = self
            .ask(format!(
                "Normalize this CSV: consistent column counts, trimmed cells, no blank rows. \
                 Reply with only the CSV, no commentary.\n\n{}",
                excerpt(csv)
            ))
            .await?;
        Ok(strip_code_fence(&reply).to_string())
    }

    async fn analyze_products(&self, csv: &str) -> Result<Vec<ProductPerformance>, InsightError> {
        self.ask_json(format!(
            "Rank the products in this dataset. Reply with only a JSON array of objects with \
             keys \"name\", \"revenue\" (number), \"forecast\" (number), \"growth\" (e.g. \"+12%\"), \
             \"status\" (trending, stable, declining), \"recommendation\" (Invest, Scale, \
             Discontinue), \"reasoning\" and \"rank\" (1 = best).\n\nCSV:\n{}",
            excerpt(csv)
        ))
        .await
    }
}

/// Drop a surrounding ``` fence (with optional language tag) if present
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    body.strip_suffix("```").unwrap_or(body).trim()
}
