use std::collections::HashMap;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use daybook_core::stats::{MAX_OFFSET_MINUTES, MIN_OFFSET_MINUTES};
use http::HeaderValue;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub database_path: PathBuf,
    pub supabase_url: String,
    pub supabase_jwks_url: String,
    pub supabase_jwt_issuer: String,
    pub supabase_jwt_audience: String,
    pub jwks_cache_ttl: Duration,
    pub auth_clock_skew: Duration,
    /// Viewer zone used when a request carries no `tz_offset_minutes`
    pub default_tz_offset_minutes: i32,
    /// Empty means any origin
    pub cors_allowed_origins: Vec<HeaderValue>,
    /// Mixed into user fingerprints written to logs
    pub log_fingerprint_salt: String,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("database_path", &self.database_path)
            .field("supabase_url", &self.supabase_url)
            .field("supabase_jwks_url", &self.supabase_jwks_url)
            .field("supabase_jwt_issuer", &self.supabase_jwt_issuer)
            .field("supabase_jwt_audience", &self.supabase_jwt_audience)
            .field("jwks_cache_ttl", &self.jwks_cache_ttl)
            .field("auth_clock_skew", &self.auth_clock_skew)
            .field("default_tz_offset_minutes", &self.default_tz_offset_minutes)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("log_fingerprint_salt", &"[REDACTED]")
            .finish()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let values: HashMap<String, String> = env::vars().collect();
        Self::from_lookup(|name| values.get(name).cloned())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_addr = value_or_default(&lookup, "DAYBOOK_API_BIND_ADDR", "127.0.0.1:8080");
        let database_path =
            PathBuf::from(value_or_default(&lookup, "DAYBOOK_DB_PATH", "daybook.db"));

        let supabase_url = required_trimmed(&lookup, "SUPABASE_URL")?;
        if !is_http_url(&supabase_url) {
            return Err(ConfigError::Invalid(
                "SUPABASE_URL must start with http:// or https://".to_string(),
            ));
        }

        let default_jwks = format!(
            "{}/auth/v1/.well-known/jwks.json",
            trim_trailing(&supabase_url)
        );
        let supabase_jwks_url = value_or_default(&lookup, "SUPABASE_JWKS_URL", &default_jwks);
        if !is_http_url(&supabase_jwks_url) {
            return Err(ConfigError::Invalid(
                "SUPABASE_JWKS_URL must start with http:// or https://".to_string(),
            ));
        }

        let default_issuer = format!("{}/auth/v1", trim_trailing(&supabase_url));
        let supabase_jwt_issuer = value_or_default(&lookup, "SUPABASE_JWT_ISSUER", &default_issuer);
        let supabase_jwt_audience =
            value_or_default(&lookup, "SUPABASE_JWT_AUDIENCE", "authenticated");

        let jwks_cache_ttl_secs = value_or_default(&lookup, "SUPABASE_JWKS_CACHE_TTL_SECS", "300")
            .parse::<u64>()
            .map_err(|_| {
                ConfigError::Invalid(
                    "SUPABASE_JWKS_CACHE_TTL_SECS must be an integer >= 30".to_string(),
                )
            })?;
        if jwks_cache_ttl_secs < 30 {
            return Err(ConfigError::Invalid(
                "SUPABASE_JWKS_CACHE_TTL_SECS must be >= 30".to_string(),
            ));
        }

        let auth_clock_skew_secs = value_or_default(&lookup, "AUTH_CLOCK_SKEW_SECS", "60")
            .parse::<u64>()
            .map_err(|_| {
                ConfigError::Invalid(
                    "AUTH_CLOCK_SKEW_SECS must be an integer in [0, 300]".to_string(),
                )
            })?;
        if auth_clock_skew_secs > 300 {
            return Err(ConfigError::Invalid(
                "AUTH_CLOCK_SKEW_SECS must be in [0, 300]".to_string(),
            ));
        }

        let offset_range = format!("[{MIN_OFFSET_MINUTES}, {MAX_OFFSET_MINUTES}]");
        let default_tz_offset_minutes =
            value_or_default(&lookup, "DAYBOOK_DEFAULT_TZ_OFFSET_MINUTES", "0")
                .parse::<i32>()
                .map_err(|_| {
                    ConfigError::Invalid(format!(
                        "DAYBOOK_DEFAULT_TZ_OFFSET_MINUTES must be an integer in {offset_range}"
                    ))
                })?;
        if !(MIN_OFFSET_MINUTES..=MAX_OFFSET_MINUTES).contains(&default_tz_offset_minutes) {
            return Err(ConfigError::Invalid(format!(
                "DAYBOOK_DEFAULT_TZ_OFFSET_MINUTES must be in {offset_range}"
            )));
        }

        let cors_allowed_origins = parse_origins(optional_trimmed(&lookup, "CORS_ALLOWED_ORIGINS"))?;
        let log_fingerprint_salt = value_or_default(&lookup, "DAYBOOK_LOG_SALT", "daybook");

        Ok(Self {
            bind_addr,
            database_path,
            supabase_url,
            supabase_jwks_url,
            supabase_jwt_issuer,
            supabase_jwt_audience,
            jwks_cache_ttl: Duration::from_secs(jwks_cache_ttl_secs),
            auth_clock_skew: Duration::from_secs(auth_clock_skew_secs),
            default_tz_offset_minutes,
            cors_allowed_origins,
            log_fingerprint_salt,
        })
    }
}

fn parse_origins(raw: Option<String>) -> Result<Vec<HeaderValue>, ConfigError> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };

    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| {
            if !is_http_url(origin) {
                return Err(ConfigError::Invalid(format!(
                    "CORS_ALLOWED_ORIGINS entry '{origin}' must start with http:// or https://"
                )));
            }
            HeaderValue::from_str(trim_trailing(origin)).map_err(|_| {
                ConfigError::Invalid(format!(
                    "CORS_ALLOWED_ORIGINS entry '{origin}' is not a valid header value"
                ))
            })
        })
        .collect()
}

fn value_or_default(lookup: impl Fn(&str) -> Option<String>, name: &str, default: &str) -> String {
    optional_trimmed(lookup, name).unwrap_or_else(|| default.to_string())
}

fn required_trimmed(
    lookup: impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<String, ConfigError> {
    optional_trimmed(lookup, name).ok_or(ConfigError::MissingVar(name))
}

fn optional_trimmed(lookup: impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name).and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

fn trim_trailing(value: &str) -> &str {
    value.trim_end_matches('/')
}

#[cfg(test)]
pub(crate) fn test_config() -> AppConfig {
    let mut map = HashMap::new();
    map.insert("SUPABASE_URL", "https://project.supabase.co");
    AppConfig::from_lookup(|key| map.get(key).map(|value| (*value).to_string())).unwrap()
}
