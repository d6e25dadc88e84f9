use crate::app_config::{AppConfig, Environment};
use crate::{ConfigError, Position};

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real process environment so it can be tested with a
/// plain `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_f64 = |var: &str, default: &str| -> Result<f64, ConfigError> {
        or_default(var, default)
            .parse::<f64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let api_base_url = require("PLATEMAP_API_BASE_URL")?;
    if api_base_url.trim().is_empty() {
        return Err(invalid("PLATEMAP_API_BASE_URL", "must not be empty".to_owned()));
    }

    let env = parse_environment(&or_default("PLATEMAP_ENV", "development"))?;
    let log_level = or_default("PLATEMAP_LOG_LEVEL", "info");

    let geocoder_base_url = or_default(
        "PLATEMAP_GEOCODER_BASE_URL",
        "https://nominatim.openstreetmap.org",
    );
    let geocoder_user_agent = or_default(
        "PLATEMAP_GEOCODER_USER_AGENT",
        "platemap/0.1 (restaurant-location-editor)",
    );

    let request_timeout_secs = parse_u64("PLATEMAP_REQUEST_TIMEOUT_SECS", "15")?;
    let search_debounce_ms = parse_u64("PLATEMAP_SEARCH_DEBOUNCE_MS", "500")?;

    let suggestion_limit = parse_u32("PLATEMAP_SUGGESTION_LIMIT", "5")?;
    if !(1..=50).contains(&suggestion_limit) {
        return Err(invalid(
            "PLATEMAP_SUGGESTION_LIMIT",
            format!("must be between 1 and 50, got {suggestion_limit}"),
        ));
    }

    let geocoder_max_retries = parse_u32("PLATEMAP_GEOCODER_MAX_RETRIES", "1")?;
    let geocoder_backoff_base_ms = parse_u64("PLATEMAP_GEOCODER_BACKOFF_BASE_MS", "250")?;

    let id_cache_path = PathBuf::from(or_default(
        "PLATEMAP_ID_CACHE_PATH",
        "./.platemap/restaurant-id.json",
    ));

    let default_lat = parse_f64("PLATEMAP_DEFAULT_LAT", "21.0285")?;
    let default_lng = parse_f64("PLATEMAP_DEFAULT_LNG", "105.8542")?;
    let default_position = Position::new(default_lat, default_lng)
        .map_err(|e| invalid("PLATEMAP_DEFAULT_LAT/PLATEMAP_DEFAULT_LNG", e.to_string()))?;

    Ok(AppConfig {
        env,
        log_level,
        api_base_url,
        geocoder_base_url,
        geocoder_user_agent,
        request_timeout_secs,
        search_debounce_ms,
        suggestion_limit,
        geocoder_max_retries,
        geocoder_backoff_base_ms,
        id_cache_path,
        default_position,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for unrecognized values.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "PLATEMAP_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
