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

fn build(map: &HashMap<&str, &str>) -> Result<AppConfig, ConfigError> {
    build_app_config(lookup_from_map(map))
}

#[test]
fn empty_environment_yields_defaults() {
    let config = build(&HashMap::new()).expect("defaults are valid");

    assert_eq!(config.env, Environment::Development);
    assert_eq!(config.log_level, "info");
    assert_eq!(config.database_url, "sqlite://data/search_history.db");
    assert_eq!(config.output_dir, PathBuf::from("./outputs"));
    assert!(config.marketplaces_path.is_none());
    assert_eq!(config.llm_base_url, "http://localhost:5000");
    assert_eq!(config.llm_timeout_secs, 60);
    assert_eq!(config.llm_health_timeout_secs, 5);
    assert!(!config.headless);
    assert_eq!((config.viewport_width, config.viewport_height), (1920, 1080));
    assert_eq!(config.navigation_timeout_secs, 30);
    assert_eq!(config.network_idle_timeout_secs, 15);
    assert_eq!(config.selector_timeout_ms, 10_000);
    assert_eq!(config.request_delay_ms, 2_000);
    assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
    assert_eq!(config.accept_language, "en-US,en;q=0.9");
    assert_eq!(config.max_products_per_site, 10);
    assert_eq!(config.min_moq, 100);
    assert_eq!(config.min_seller_years, 2);
}

#[test]
fn overrides_are_applied() {
    let mut map = HashMap::new();
    map.insert("ARBSCOUT_ENV", "production");
    map.insert("ARBSCOUT_HEADLESS", "TRUE");
    map.insert("ARBSCOUT_MAX_PRODUCTS_PER_SITE", " 25 ");
    map.insert("ARBSCOUT_LLM_BASE_URL", "http://10.0.0.5:8080");
    map.insert("ARBSCOUT_MARKETPLACES_PATH", "./config/marketplaces.yaml");
    map.insert("ARBSCOUT_SELECTOR_TIMEOUT_MS", "2500");

    let config = build(&map).unwrap();
    assert_eq!(config.env, Environment::Production);
    assert!(config.headless);
    assert_eq!(config.max_products_per_site, 25);
    assert_eq!(config.llm_base_url, "http://10.0.0.5:8080");
    assert_eq!(
        config.marketplaces_path,
        Some(PathBuf::from("./config/marketplaces.yaml"))
    );
    assert_eq!(config.selector_timeout().as_millis(), 2500);
}

#[test]
fn blank_marketplaces_path_is_treated_as_unset() {
    let mut map = HashMap::new();
    map.insert("ARBSCOUT_MARKETPLACES_PATH", "   ");
    assert!(build(&map).unwrap().marketplaces_path.is_none());
}

#[test]
fn unknown_environment_is_rejected() {
    let mut map = HashMap::new();
    map.insert("ARBSCOUT_ENV", "staging");
    let result = build(&map);
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "ARBSCOUT_ENV"),
        "expected InvalidEnvVar(ARBSCOUT_ENV), got: {result:?}"
    );
}

#[test]
fn non_numeric_timeout_is_rejected() {
    let mut map = HashMap::new();
    map.insert("ARBSCOUT_NAVIGATION_TIMEOUT_SECS", "thirty");
    let result = build(&map);
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "ARBSCOUT_NAVIGATION_TIMEOUT_SECS"),
        "got: {result:?}"
    );
}

#[test]
fn zero_max_products_is_rejected() {
    let mut map = HashMap::new();
    map.insert("ARBSCOUT_MAX_PRODUCTS_PER_SITE", "0");
    let err = build(&map).unwrap_err();
    assert!(err.to_string().contains("must be at least 1"));
}

#[test]
fn invalid_boolean_is_rejected() {
    let mut map = HashMap::new();
    map.insert("ARBSCOUT_HEADLESS", "maybe");
    let err = build(&map).unwrap_err();
    assert!(err.to_string().contains("expected a boolean"));
}

#[test]
fn parse_bool_accepts_common_spellings() {
    for raw in ["1", "yes", "On", "true"] {
        assert!(parse_bool("X", raw).unwrap(), "{raw}");
    }
    for raw in ["0", "no", "OFF", "false"] {
        assert!(!parse_bool("X", raw).unwrap(), "{raw}");
    }
}
