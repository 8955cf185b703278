use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn parse_environment_development() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
}

#[test]
fn parse_environment_production() {
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "EMA_ENV"));
}

#[test]
fn build_app_config_defaults_with_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.collector, CollectorSettings::default());
    assert_eq!(cfg.collector.scan_cooldown_ms, 2_000);
    assert_eq!(cfg.collector.settle_delay_ms, 2_000);
    assert_eq!(cfg.collector.debounce_ms, 3_000);
    assert_eq!(cfg.collector.min_posts, 10);
    assert_eq!(cfg.collector.ready_posts, 15);
    assert!(cfg.analyzer.api_key.is_none());
    assert_eq!(cfg.analyzer.model, "gemini-2.0-flash");
    assert_eq!(cfg.analyzer.max_attempts, 3);
    assert_eq!(cfg.analyzer.backoff_base_ms, 1_000);
    assert_eq!(cfg.analyzer.timeout_secs, 30);
}

#[test]
fn build_app_config_reads_overrides() {
    let mut map = HashMap::new();
    map.insert("EMA_ENV", "test");
    map.insert("EMA_DEBOUNCE_MS", "500");
    map.insert("EMA_MIN_POSTS", "5");
    map.insert("EMA_READY_POSTS", "8");
    map.insert("GEMINI_API_KEY", "secret");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.env, Environment::Test);
    assert_eq!(cfg.collector.debounce_ms, 500);
    assert_eq!(cfg.collector.min_posts, 5);
    assert_eq!(cfg.collector.ready_posts, 8);
    assert_eq!(cfg.analyzer.api_key.as_deref(), Some("secret"));
}

#[test]
fn build_app_config_empty_api_key_is_absent() {
    let mut map = HashMap::new();
    map.insert("GEMINI_API_KEY", "");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.analyzer.api_key.is_none());
}

#[test]
fn build_app_config_rejects_invalid_cooldown() {
    let mut map = HashMap::new();
    map.insert("EMA_SCAN_COOLDOWN_MS", "soon");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "EMA_SCAN_COOLDOWN_MS"),
        "expected InvalidEnvVar(EMA_SCAN_COOLDOWN_MS), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_ready_below_minimum() {
    let mut map = HashMap::new();
    map.insert("EMA_MIN_POSTS", "20");
    map.insert("EMA_READY_POSTS", "15");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::Validation(_))),
        "expected Validation error, got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_zero_attempts() {
    let mut map = HashMap::new();
    map.insert("EMA_ANALYZER_MAX_ATTEMPTS", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "EMA_ANALYZER_MAX_ATTEMPTS"),
        "expected InvalidEnvVar(EMA_ANALYZER_MAX_ATTEMPTS), got: {result:?}"
    );
}

#[test]
fn analyzer_settings_debug_redacts_api_key() {
    let settings = AnalyzerSettings {
        api_key: Some("super-secret".to_string()),
        ..AnalyzerSettings::default()
    };
    let rendered = format!("{settings:?}");
    assert!(!rendered.contains("super-secret"));
    assert!(rendered.contains("[redacted]"));
}
