use std::path::PathBuf;
use std::str::FromStr;

use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from the variables already in the process,
/// without reading `.env`.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var)
            .map(|v| v.trim().to_string())
            .unwrap_or_else(|_| default.to_string())
    };

    let parse_num = |var: &str, default: &str| -> Result<u64, ConfigError> {
        parse_value::<u64>(var, &or_default(var, default))
    };

    let env = parse_environment(&or_default("ARBSCOUT_ENV", "development"))?;
    let log_level = or_default("ARBSCOUT_LOG_LEVEL", "info");
    let database_url = or_default("ARBSCOUT_DATABASE_URL", "sqlite://data/search_history.db");
    let output_dir = PathBuf::from(or_default("ARBSCOUT_OUTPUT_DIR", "./outputs"));
    let marketplaces_path = lookup("ARBSCOUT_MARKETPLACES_PATH")
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from);

    let llm_base_url = or_default("ARBSCOUT_LLM_BASE_URL", "http://localhost:5000");
    let llm_timeout_secs = parse_num("ARBSCOUT_LLM_TIMEOUT_SECS", "60")?;
    let llm_health_timeout_secs = parse_num("ARBSCOUT_LLM_HEALTH_TIMEOUT_SECS", "5")?;

    let headless = parse_bool("ARBSCOUT_HEADLESS", &or_default("ARBSCOUT_HEADLESS", "false"))?;
    let viewport_width =
        parse_value::<u32>("ARBSCOUT_VIEWPORT_WIDTH", &or_default("ARBSCOUT_VIEWPORT_WIDTH", "1920"))?;
    let viewport_height = parse_value::<u32>(
        "ARBSCOUT_VIEWPORT_HEIGHT",
        &or_default("ARBSCOUT_VIEWPORT_HEIGHT", "1080"),
    )?;
    let navigation_timeout_secs = parse_num("ARBSCOUT_NAVIGATION_TIMEOUT_SECS", "30")?;
    let network_idle_timeout_secs = parse_num("ARBSCOUT_NETWORK_IDLE_TIMEOUT_SECS", "15")?;
    let selector_timeout_ms = parse_num("ARBSCOUT_SELECTOR_TIMEOUT_MS", "10000")?;
    let request_delay_ms = parse_num("ARBSCOUT_REQUEST_DELAY_MS", "2000")?;
    let user_agent = or_default("ARBSCOUT_USER_AGENT", DEFAULT_USER_AGENT);
    let accept_language = or_default("ARBSCOUT_ACCEPT_LANGUAGE", "en-US,en;q=0.9");

    let max_products_per_site = parse_value::<usize>(
        "ARBSCOUT_MAX_PRODUCTS_PER_SITE",
        &or_default("ARBSCOUT_MAX_PRODUCTS_PER_SITE", "10"),
    )?;
    if max_products_per_site == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "ARBSCOUT_MAX_PRODUCTS_PER_SITE".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    let min_moq = parse_value::<u32>("ARBSCOUT_MIN_MOQ", &or_default("ARBSCOUT_MIN_MOQ", "100"))?;
    let min_seller_years = parse_value::<u32>(
        "ARBSCOUT_MIN_SELLER_YEARS",
        &or_default("ARBSCOUT_MIN_SELLER_YEARS", "2"),
    )?;

    Ok(AppConfig {
        env,
        log_level,
        database_url,
        output_dir,
        marketplaces_path,
        llm_base_url,
        llm_timeout_secs,
        llm_health_timeout_secs,
        headless,
        viewport_width,
        viewport_height,
        navigation_timeout_secs,
        network_idle_timeout_secs,
        selector_timeout_ms,
        request_delay_ms,
        user_agent,
        accept_language,
        max_products_per_site,
        min_moq,
        min_seller_years,
    })
}

fn parse_value<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|e| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason: e.to_string(),
    })
}

/// Accepts `true/false`, `1/0`, `yes/no`, `on/off` in any case.
fn parse_bool(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("expected a boolean, got '{other}'"),
        }),
    }
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "ARBSCOUT_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
