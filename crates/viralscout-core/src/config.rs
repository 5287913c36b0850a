use crate::app_config::{AppConfig, Environment};
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

/// Build application configuration using the provided env-var lookup function.
///
/// Credentials are all optional here. Each pipeline stage checks for the
/// ones it needs when it runs, so a server with only a RapidAPI key can
/// still serve enrichment requests.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    // Blank values count as unset so `FOO=` in a .env file doesn't produce
    // an empty bearer token.
    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let parse = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
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

    let env = parse_environment(&or_default("VIRALSCOUT_ENV", "development"));
    let bind_addr = parse("VIRALSCOUT_BIND_ADDR", "0.0.0.0:8000")?;
    let log_level = or_default("VIRALSCOUT_LOG_LEVEL", "info");

    let api_key_secret = optional("API_KEY_SECRET");
    let apify_token = optional("APIFY_TOKEN");
    let rapidapi_key = optional("RAPIDAPI_KEY");
    let google_credentials_path = optional("GOOGLE_CREDENTIALS_PATH").map(PathBuf::from);
    let google_access_token = optional("GOOGLE_ACCESS_TOKEN");

    let search_timeout_secs = parse_u64("VIRALSCOUT_SEARCH_TIMEOUT_SECS", "300")?;
    let provider_timeout_secs = parse_u64("VIRALSCOUT_PROVIDER_TIMEOUT_SECS", "30")?;
    let download_timeout_secs = parse_u64("VIRALSCOUT_DOWNLOAD_TIMEOUT_SECS", "120")?;

    let analysis_max_creators = parse_usize("VIRALSCOUT_ANALYSIS_MAX_CREATORS", "20")?;
    let analysis_videos_per_creator = parse_u32("VIRALSCOUT_ANALYSIS_VIDEOS_PER_CREATOR", "10")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        api_key_secret,
        apify_token,
        rapidapi_key,
        google_credentials_path,
        google_access_token,
        search_timeout_secs,
        provider_timeout_secs,
        download_timeout_secs,
        analysis_max_creators,
        analysis_videos_per_creator,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
