//! Configuration for the MarketMind workspace
//!
//! Configuration is loaded in order of precedence:
//! 1. Environment variables (highest priority)
//! 2. Config file (~/.config/marketmind/config.toml)
//! 3. Built-in defaults (lowest priority)

use serde::Deserialize;
use std::path::{Path, PathBuf};

// ─────────────────────────────────────────────────────────────────────────────
// Submodules
// ─────────────────────────────────────────────────────────────────────────────

mod insight;
mod observability;
mod serialization;

#[cfg(test)]
mod tests;

// ─────────────────────────────────────────────────────────────────────────────
// Re-exports (maintain public API)
// ─────────────────────────────────────────────────────────────────────────────

pub use insight::{FileInsight, InsightConfig, InsightMode};
pub use observability::{FileLogging, LogRotation, LoggingConfig};

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Env vars checked for the Insight API key, in order
const API_KEY_VARS: [&str; 2] = ["MARKETMIND_API_KEY", "GROQ_API_KEY"];

/// Default snapshot directory: the platform data dir, or ./data
fn default_state_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|p| p.join("marketmind"))
        .unwrap_or_else(|| PathBuf::from("./data"))
}

// ─────────────────────────────────────────────────────────────────────────────
// Application Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the persisted snapshot
    pub state_dir: PathBuf,

    /// Snapshot key (file stem under `state_dir`)
    pub state_key: String,

    /// Tab id opened when no subcommand is given
    pub start_tab: String,

    /// Insight Service backend settings
    pub insight: InsightConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            state_dir: default_state_dir(),
            state_key: crate::storage::DEFAULT_STATE_KEY.to_string(),
            start_tab: "dashboard".to_string(),
            insight: InsightConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File Configuration (deserialization layer)
// ─────────────────────────────────────────────────────────────────────────────

/// Config file structure
#[derive(Debug, Deserialize, Default)]
pub(crate) struct FileConfig {
    pub state_dir: Option<String>,
    pub state_key: Option<String>,
    pub start_tab: Option<String>,

    /// Optional [insight] section
    pub insight: Option<FileInsight>,

    /// Optional [logging] section
    pub logging: Option<FileLogging>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration Loading
// ─────────────────────────────────────────────────────────────────────────────

impl Config {
    /// Get the config file path: ~/.config/marketmind/config.toml
    /// Uses Unix-style ~/.config on all platforms for consistency
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".config").join("marketmind").join("config.toml"))
    }

    /// Create config file with defaults if it doesn't exist
    /// Called during startup to help users discover configuration options
    pub fn ensure_config_exists() {
        let Some(path) = Self::config_path() else {
            return;
        };

        // Don't overwrite existing config
        if path.exists() {
            return;
        }

        if let Some(parent) = path.parent() {
            if std::fs::create_dir_all(parent).is_err() {
                return; // Silently fail - config is optional
            }
        }

        // Use Config::default().to_toml() as single source of truth
        let template = Self::default().to_toml();

        // Write config (ignore errors - config is optional)
        let _ = std::fs::write(&path, template);
    }

    /// Parse a config file; a missing file is an empty config
    pub(crate) fn read_file_config(path: &Path) -> Result<FileConfig, String> {
        match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents).map_err(|e| e.to_string()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FileConfig::default()),
            Err(e) => Err(format!("cannot read file: {}", e)),
        }
    }

    /// Load file config if it exists
    ///
    /// A config file that exists but cannot be parsed aborts the process with
    /// a readable message instead of silently falling back to defaults.
    fn load_file_config() -> FileConfig {
        let Some(path) = Self::config_path() else {
            return FileConfig::default();
        };

        match Self::read_file_config(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("\n╔══════════════════════════════════════════════════════════════╗");
                eprintln!("║  CONFIG ERROR - Failed to load configuration file           ║");
                eprintln!("╚══════════════════════════════════════════════════════════════╝\n");
                eprintln!("  File: {}\n", path.display());
                eprintln!("  Error: {}\n", e);
                eprintln!("  Tip: Check for:\n");
                eprintln!("    - Missing quotes around string values");
                eprintln!("    - Invalid boolean values (use true/false)");
                eprintln!("    - Typos in section names\n");
                eprintln!("  To reset, run `marketmind config --reset`.\n");
                std::process::exit(1);
            }
        }
    }

    /// Load configuration: env vars -> file -> defaults
    pub fn from_env() -> Self {
        let file = Self::load_file_config();
        Self::resolve(file, |name| std::env::var(name).ok())
    }

    /// Config as the file at `path` describes it, ignoring the environment
    ///
    /// `config --update` rewrites the file from this so env-only values
    /// (state dir overrides, API keys) never leak into it.
    pub(crate) fn from_file_layer(path: &Path) -> Result<Self, String> {
        Self::read_file_config(path).map(|file| Self::resolve(file, |_| None))
    }

    /// Merge a parsed file config with values from `env`
    pub(crate) fn resolve(file: FileConfig, env: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        // State directory: env > file > default
        let state_dir = env("MARKETMIND_STATE_DIR")
            .or(file.state_dir)
            .map(PathBuf::from)
            .unwrap_or(defaults.state_dir);

        // State key: env > file > default
        let state_key = env("MARKETMIND_STATE_KEY")
            .or(file.state_key)
            .filter(|k| !k.trim().is_empty())
            .unwrap_or(defaults.state_key);

        // Start tab: env > file > default (unknown ids fall back at routing time)
        let start_tab = env("MARKETMIND_START_TAB")
            .or(file.start_tab)
            .unwrap_or(defaults.start_tab);

        // Insight: first API key env var wins over the file
        let api_key = API_KEY_VARS
            .iter()
            .find_map(|name| env(name).filter(|v| !v.trim().is_empty()));
        let mut insight = InsightConfig::from_file(file.insight, api_key);
        if let Some(mode) = env("MARKETMIND_INSIGHT_MODE") {
            insight.mode = InsightMode::from_str(&mode);
        }

        let logging = LoggingConfig::from_file(file.logging);

        Self {
            state_dir,
            state_key,
            start_tab,
            insight,
            logging,
        }
    }
}
