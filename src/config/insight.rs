//! Insight Service configuration: backend selection and live API settings

use serde::Deserialize;
use std::time::Duration;

/// Which Insight Service backend to use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InsightMode {
    /// Live when an API key is configured, mock otherwise
    #[default]
    Auto,
    /// Always the canned backend
    Mock,
    /// Always the live backend (calls fail without a key)
    Live,
}

impl InsightMode {
    /// Parse mode string from config
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "mock" => Self::Mock,
            "live" => Self::Live,
            _ => Self::Auto, // Default to auto for unknown values
        }
    }

    /// Convert to string for TOML serialization
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Mock => "mock",
            Self::Live => "live",
        }
    }
}

/// Insight Service configuration
#[derive(Debug, Clone)]
pub struct InsightConfig {
    pub mode: InsightMode,
    /// Simulated latency of the mock backend
    pub latency_ms: u64,
    /// OpenAI-compatible API base URL
    pub api_base: String,
    pub model: String,
    pub timeout_secs: u64,
    /// Env var takes precedence over the file's `api_key`
    pub api_key: Option<String>,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            mode: InsightMode::Auto,
            latency_ms: 800,
            api_base: "https://api.groq.com/openai/v1".to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
            timeout_secs: 30,
            api_key: None,
        }
    }
}

/// Insight settings as loaded from config file
#[derive(Debug, Deserialize, Default)]
pub struct FileInsight {
    pub mode: Option<String>,
    pub latency_ms: Option<u64>,
    pub api_base: Option<String>,
    pub model: Option<String>,
    pub timeout_secs: Option<u64>,
    pub api_key: Option<String>,
}

impl InsightConfig {
    /// Create from file config with defaults
    ///
    /// Note: api_key should be resolved separately (env var takes precedence)
    pub fn from_file(file: Option<FileInsight>, api_key_override: Option<String>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        let api_key = api_key_override
            .or(file.api_key)
            .filter(|k| !k.trim().is_empty());

        Self {
            mode: file
                .mode
                .map(|s| InsightMode::from_str(&s))
                .unwrap_or(defaults.mode),
            latency_ms: file.latency_ms.unwrap_or(defaults.latency_ms),
            api_base: file.api_base.unwrap_or(defaults.api_base),
            model: file.model.unwrap_or(defaults.model),
            timeout_secs: file.timeout_secs.unwrap_or(defaults.timeout_secs),
            api_key,
        }
    }

    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}
