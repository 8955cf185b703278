use crate::app_config::{AnalyzerSettings, AppConfig, CollectorSettings, Environment};
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
/// Every variable is optional; the lookup indirection lets tests feed a plain
/// `HashMap` instead of mutating the process environment.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
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

    let env = parse_environment(&or_default("EMA_ENV", "development"))?;
    let log_level = or_default("EMA_LOG_LEVEL", "info");

    let collector = CollectorSettings {
        scan_cooldown_ms: parse_u64("EMA_SCAN_COOLDOWN_MS", "2000")?,
        settle_delay_ms: parse_u64("EMA_SETTLE_DELAY_MS", "2000")?,
        debounce_ms: parse_u64("EMA_DEBOUNCE_MS", "3000")?,
        min_posts: parse_usize("EMA_MIN_POSTS", "10")?,
        ready_posts: parse_usize("EMA_READY_POSTS", "15")?,
    };

    if collector.ready_posts < collector.min_posts {
        return Err(ConfigError::Validation(format!(
            "EMA_READY_POSTS ({}) must not be below EMA_MIN_POSTS ({})",
            collector.ready_posts, collector.min_posts
        )));
    }

    let max_attempts = parse_u32("EMA_ANALYZER_MAX_ATTEMPTS", "3")?;
    if max_attempts == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "EMA_ANALYZER_MAX_ATTEMPTS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    let analyzer = AnalyzerSettings {
        api_key: lookup("GEMINI_API_KEY").ok().filter(|k| !k.is_empty()),
        model: or_default("EMA_ANALYZER_MODEL", "gemini-2.0-flash"),
        base_url: or_default(
            "EMA_ANALYZER_BASE_URL",
            "https://generativelanguage.googleapis.com/",
        ),
        max_attempts,
        backoff_base_ms: parse_u64("EMA_ANALYZER_BACKOFF_BASE_MS", "1000")?,
        timeout_secs: parse_u64("EMA_ANALYZER_TIMEOUT_SECS", "30")?,
    };

    Ok(AppConfig {
        env,
        log_level,
        collector,
        analyzer,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "EMA_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
