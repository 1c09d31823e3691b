use crate::app_config::AppConfig;
use crate::ConfigError;

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

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function,
/// so parsing can be tested with a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

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

    let parse_positive_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        match parse_u64(var, default)? {
            0 => Err(invalid(var, "must be greater than zero".to_string())),
            n => Ok(n),
        }
    };

    let parse_positive_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        match or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))?
        {
            0 => Err(invalid(var, "must be greater than zero".to_string())),
            n => Ok(n),
        }
    };

    let log_level = or_default("PRICETRAWL_LOG_LEVEL", "info");
    let sources_path = PathBuf::from(or_default(
        "PRICETRAWL_SOURCES_PATH",
        "./config/sources.yaml",
    ));
    let out_csv = PathBuf::from(or_default("PRICETRAWL_OUT_CSV", "dump.csv"));

    let run_timeout_secs = parse_positive_u64("PRICETRAWL_RUN_TIMEOUT_SECS", "90")?;
    let request_timeout_secs = parse_positive_u64("PRICETRAWL_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("PRICETRAWL_USER_AGENT", "pricetrawl/0.1 (catalog-capture)");
    let max_concurrent_payloads = parse_positive_usize("PRICETRAWL_MAX_CONCURRENT_PAYLOADS", "8")?;
    let max_retries = parse_u32("PRICETRAWL_MAX_RETRIES", "3")?;
    let retry_backoff_base_secs = parse_u64("PRICETRAWL_RETRY_BACKOFF_BASE_SECS", "2")?;

    Ok(AppConfig {
        log_level,
        sources_path,
        out_csv,
        run_timeout_secs,
        request_timeout_secs,
        user_agent,
        max_concurrent_payloads,
        max_retries,
        retry_backoff_base_secs,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
