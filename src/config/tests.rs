//! Configuration tests
//!
//! Round-trips guard the template: when you add a field, `to_toml` and
//! `FileConfig` must both learn about it or these fail.

use super::*;
use std::collections::HashMap;

fn no_env(_: &str) -> Option<String> {
    None
}

fn env_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| map.get(name).cloned()
}

// ─────────────────────────────────────────────────────────────────────────────
// Round-trip tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_config_roundtrip_default() {
    let config = Config::default();
    let toml_str = config.to_toml();

    let parsed: Result<FileConfig, _> = toml::from_str(&toml_str);
    assert!(
        parsed.is_ok(),
        "Default config should round-trip.\nTOML:\n{}\nError: {:?}",
        toml_str,
        parsed.err()
    );
}

#[test]
fn test_config_roundtrip_preserves_values() {
    let mut config = Config::default();
    config.state_dir = PathBuf::from("/tmp/mm \"state\"");
    config.state_key = "team_board".to_string();
    config.start_tab = "risk".to_string();
    config.insight.mode = InsightMode::Mock;
    config.insight.latency_ms = 50;
    config.insight.model = "mixtral".to_string();
    config.logging.file_enabled = true;
    config.logging.file_rotation = LogRotation::Hourly;

    let file: FileConfig = toml::from_str(&config.to_toml()).unwrap();
    let back = Config::resolve(file, no_env);

    assert_eq!(back.state_dir, config.state_dir);
    assert_eq!(back.state_key, "team_board");
    assert_eq!(back.start_tab, "risk");
    assert_eq!(back.insight.mode, InsightMode::Mock);
    assert_eq!(back.insight.latency_ms, 50);
    assert_eq!(back.insight.model, "mixtral");
    assert!(back.logging.file_enabled);
    assert_eq!(back.logging.file_rotation, LogRotation::Hourly);
}

#[test]
fn test_file_api_key_survives_roundtrip() {
    let file: FileConfig = toml::from_str("[insight]\napi_key = \"gsk_user_key\"\n").unwrap();
    let config = Config::resolve(file, no_env);

    let again: FileConfig = toml::from_str(&config.to_toml()).unwrap();
    let back = Config::resolve(again, no_env);
    assert_eq!(back.insight.api_key.as_deref(), Some("gsk_user_key"));
}

#[test]
fn test_no_api_key_writes_hint_only() {
    let toml_str = Config::default().to_toml();
    let file: FileConfig = toml::from_str(&toml_str).unwrap();
    assert!(file.insight.unwrap().api_key.is_none());
    assert!(toml_str.contains("# api_key"));
}

#[test]
fn test_control_characters_roundtrip() {
    let mut config = Config::default();
    config.state_dir = PathBuf::from("/tmp/line\nbreak\ttab\\slash");
    config.insight.model = "model\r\u{1}".to_string();

    let toml_str = config.to_toml();
    let file: FileConfig = toml::from_str(&toml_str)
        .unwrap_or_else(|e| panic!("invalid TOML:\n{}\nError: {}", toml_str, e));
    let back = Config::resolve(file, no_env);

    assert_eq!(back.state_dir, config.state_dir);
    assert_eq!(back.insight.model, config.insight.model);
}

#[test]
fn test_file_layer_ignores_env_and_keeps_file_key() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        "state_key = \"board\"\n\n[insight]\napi_key = \"gsk_user_key\"\n",
    )
    .unwrap();

    let layered = Config::from_file_layer(&path).unwrap();
    assert_eq!(layered.state_key, "board");
    assert_eq!(layered.state_dir, Config::default().state_dir);
    assert_eq!(layered.insight.api_key.as_deref(), Some("gsk_user_key"));

    // What `config --update` writes back
    let rewritten: FileConfig = toml::from_str(&layered.to_toml()).unwrap();
    assert_eq!(rewritten.insight.unwrap().api_key.as_deref(), Some("gsk_user_key"));
}

#[test]
fn test_file_layer_rejects_broken_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[insight\n").unwrap();
    assert!(Config::from_file_layer(&path).is_err());
}

// ─────────────────────────────────────────────────────────────────────────────
// Precedence
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_env_overrides_file() {
    let file: FileConfig = toml::from_str(
        r#"
state_key = "from_file"
start_tab = "products"

[insight]
mode = "live"
api_key = "file-key"
"#,
    )
    .unwrap();

    let config = Config::resolve(
        file,
        env_from(&[
            ("MARKETMIND_STATE_KEY", "from_env"),
            ("MARKETMIND_INSIGHT_MODE", "mock"),
            ("GROQ_API_KEY", "groq-key"),
        ]),
    );

    assert_eq!(config.state_key, "from_env");
    assert_eq!(config.start_tab, "products");
    assert_eq!(config.insight.mode, InsightMode::Mock);
    assert_eq!(config.insight.api_key.as_deref(), Some("groq-key"));
}

#[test]
fn test_marketmind_key_preferred_over_groq() {
    let config = Config::resolve(
        FileConfig::default(),
        env_from(&[("MARKETMIND_API_KEY", "mm"), ("GROQ_API_KEY", "groq")]),
    );
    assert_eq!(config.insight.api_key.as_deref(), Some("mm"));
}

#[test]
fn test_blank_values_fall_back() {
    let config = Config::resolve(
        FileConfig::default(),
        env_from(&[("MARKETMIND_STATE_KEY", "  "), ("GROQ_API_KEY", "")]),
    );
    assert_eq!(config.state_key, crate::storage::DEFAULT_STATE_KEY);
    assert!(!config.insight.has_api_key());
}

#[test]
fn test_unknown_enum_strings_use_defaults() {
    let file: FileConfig = toml::from_str(
        r#"
[insight]
mode = "telepathy"

[logging]
file_rotation = "weekly"
"#,
    )
    .unwrap();
    let config = Config::resolve(file, no_env);
    assert_eq!(config.insight.mode, InsightMode::Auto);
    assert_eq!(config.logging.file_rotation, LogRotation::Daily);
}

// ─────────────────────────────────────────────────────────────────────────────
// File loading
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_missing_file_is_empty_config() {
    let dir = tempfile::tempdir().unwrap();
    let file = Config::read_file_config(&dir.path().join("absent.toml")).unwrap();
    assert!(file.state_dir.is_none());
    assert!(file.insight.is_none());
}

#[test]
fn test_broken_file_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "state_key = [unterminated").unwrap();
    assert!(Config::read_file_config(&path).is_err());
}
