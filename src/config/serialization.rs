//! Config serialization to TOML
//!
//! Single source of truth for config file format.

use super::Config;

/// Escape a value for a TOML basic string
fn toml_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

/// The `api_key` line: the key if one came from the file, else a hint
fn api_key_line(api_key: Option<&str>) -> String {
    match api_key {
        Some(key) => format!("api_key = \"{}\"", toml_str(key)),
        None => "# api_key = \"\"  # prefer MARKETMIND_API_KEY or GROQ_API_KEY".to_string(),
    }
}

impl Config {
    /// Serialize the full config to a commented TOML document
    ///
    /// An API key is written only if the config holds one. Callers that
    /// rewrite the file pass the file layer alone (see
    /// [`Config::from_file_layer`]) so env keys never land on disk.
    pub fn to_toml(&self) -> String {
        format!(
            r#"# marketmind configuration

# Directory holding the persisted workspace snapshot
state_dir = "{state_dir}"

# Snapshot name; the file is <state_dir>/<state_key>.json
state_key = "{state_key}"

# Tab shown when no subcommand is given
# briefing, hub, dashboard, products, forecast, campaigns, segments,
# simulator, synexia, explainer, vision, risk, market
start_tab = "{start_tab}"

# Insight Service backend
# mode: auto (live when an API key is set), mock, live
# API key: MARKETMIND_API_KEY or GROQ_API_KEY environment variable wins
# over api_key below
[insight]
mode = "{insight_mode}"
latency_ms = {insight_latency}
api_base = "{insight_api_base}"
model = "{insight_model}"
timeout_secs = {insight_timeout}
{insight_api_key}

# Logging configuration (RUST_LOG env var overrides)
[logging]
level = "{log_level}"
# JSON file logging (in addition to stderr)
file_enabled = {log_file_enabled}
file_dir = "{log_file_dir}"
file_rotation = "{log_file_rotation}"  # hourly, daily, never
file_prefix = "{log_file_prefix}"
"#,
            state_dir = toml_str(&self.state_dir.display().to_string()),
            state_key = toml_str(&self.state_key),
            start_tab = toml_str(&self.start_tab),
            insight_mode = self.insight.mode.as_str(),
            insight_latency = self.insight.latency_ms,
            insight_api_base = toml_str(&self.insight.api_base),
            insight_model = toml_str(&self.insight.model),
            insight_timeout = self.insight.timeout_secs,
            insight_api_key = api_key_line(self.insight.api_key.as_deref()),
            log_level = toml_str(&self.logging.level),
            log_file_enabled = self.logging.file_enabled,
            log_file_dir = toml_str(&self.logging.file_dir.display().to_string()),
            log_file_rotation = self.logging.file_rotation.as_str(),
            log_file_prefix = toml_str(&self.logging.file_prefix),
        )
    }
}
