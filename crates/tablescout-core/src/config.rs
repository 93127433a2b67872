use crate::app_config::{AppConfig, CacheTtls};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a supplied env var has an invalid value.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files. Useful for
/// testing or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if a supplied env var has an invalid value.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup instead of `set_var`/`remove_var`.
///
/// Every setting has a default; credentials are optional and their absence
/// simply disables the corresponding capability.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_f64 = |var: &str, default: &str| -> Result<f64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<f64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let data_dir = lookup("TABLESCOUT_DATA_DIR").map_or_else(
        |_| {
            lookup("HOME").map_or_else(
                |_| PathBuf::from(".tablescout/data"),
                |home| PathBuf::from(home).join(".tablescout/data"),
            )
        },
        PathBuf::from,
    );

    let log_level = or_default("TABLESCOUT_LOG_LEVEL", "info");
    let google_api_key = lookup("TABLESCOUT_GOOGLE_API_KEY").ok();
    let resy_api_key = lookup("TABLESCOUT_RESY_API_KEY").ok();
    let resy_auth_token = lookup("TABLESCOUT_RESY_AUTH_TOKEN").ok();

    let request_timeout_secs = parse_u64("TABLESCOUT_REQUEST_TIMEOUT_SECS", "10")?;
    let google_rate_limit_calls = parse_usize("TABLESCOUT_GOOGLE_RATE_LIMIT_CALLS", "10")?;
    let google_rate_limit_period_secs =
        parse_u64("TABLESCOUT_GOOGLE_RATE_LIMIT_PERIOD_SECS", "1")?;
    let resy_rate_limit_calls = parse_usize("TABLESCOUT_RESY_RATE_LIMIT_CALLS", "5")?;
    let resy_rate_limit_period_secs = parse_u64("TABLESCOUT_RESY_RATE_LIMIT_PERIOD_SECS", "1")?;

    let cache_ttls = CacheTtls {
        search_secs: parse_u64("TABLESCOUT_CACHE_TTL_SEARCH_SECS", "3600")?,
        details_secs: parse_u64("TABLESCOUT_CACHE_TTL_DETAILS_SECS", "86400")?,
        availability_secs: parse_u64("TABLESCOUT_CACHE_TTL_AVAILABILITY_SECS", "300")?,
    };

    // Sydney CBD.
    let default_lat = parse_f64("TABLESCOUT_DEFAULT_LAT", "-33.8688")?;
    let default_lng = parse_f64("TABLESCOUT_DEFAULT_LNG", "151.2093")?;
    let default_radius_m = parse_u32("TABLESCOUT_DEFAULT_RADIUS_M", "5000")?;
    let default_party_size = parse_u32("TABLESCOUT_DEFAULT_PARTY_SIZE", "2")?;

    let places_base_url = or_default(
        "TABLESCOUT_PLACES_BASE_URL",
        "https://places.googleapis.com/v1",
    );
    let resy_base_url = or_default("TABLESCOUT_RESY_BASE_URL", "https://api.resy.com");

    let max_output_chars = parse_usize("TABLESCOUT_MAX_OUTPUT_CHARS", "4096")?;

    Ok(AppConfig {
        data_dir,
        log_level,
        google_api_key,
        resy_api_key,
        resy_auth_token,
        request_timeout_secs,
        google_rate_limit_calls,
        google_rate_limit_period_secs,
        resy_rate_limit_calls,
        resy_rate_limit_period_secs,
        cache_ttls,
        default_lat,
        default_lng,
        default_radius_m,
        default_party_size,
        places_base_url,
        resy_base_url,
        max_output_chars,
    })
}
