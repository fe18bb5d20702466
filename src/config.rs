//! Configuration module
//!
//! Loads configuration from environment variables.

use std::env;
use std::time::Duration;

/// Default CORS origins for local frontends
const DEFAULT_CORS_ORIGINS: &[&str] = &["http://localhost:3000", "http://localhost:4321"];

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection URL
    pub database_url: String,

    /// Maximum database connections in pool
    pub database_max_connections: u32,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Environment (development, production)
    pub environment: String,

    /// Origins allowed by the CORS layer
    pub cors_allowed_origins: Vec<String>,

    /// Base URL of the external auth provider (issuer is `{url}/auth/v1`)
    pub supabase_url: Option<String>,

    /// PEM-encoded public key used when a published JWK cannot be converted
    pub supabase_jwt_secret: Option<String>,

    /// Explicit key set URL, overrides the one derived from `supabase_url`
    pub jwks_url: Option<String>,

    /// Expected `aud` claim; audience is not checked when unset
    pub jwt_audience: Option<String>,

    /// How long a fetched key set stays fresh
    pub jwks_cache_ttl: Duration,

    /// Timeout for the outbound key set request
    pub jwks_fetch_timeout: Duration,

    /// How long shutdown waits for in-flight requests
    pub shutdown_grace: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env::var("DATABASE_URL")
            .ok()
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingEnv("DATABASE_URL"))?;

        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("DATABASE_MAX_CONNECTIONS"))?;

        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        // Accept the ":8080" form as well as a bare port number
        let port = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .trim_start_matches(':')
            .parse()
            .map_err(|_| ConfigError::InvalidValue("PORT"))?;

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .ok()
            .map(|v| parse_list(&v))
            .filter(|origins| !origins.is_empty())
            .unwrap_or_else(|| DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect());

        Ok(Self {
            database_url,
            database_max_connections,
            host,
            port,
            environment,
            cors_allowed_origins,
            supabase_url: optional_env("SUPABASE_URL").map(|u| u.trim_end_matches('/').to_string()),
            supabase_jwt_secret: optional_env("SUPABASE_JWT_SECRET"),
            jwks_url: optional_env("JWKS_URL"),
            jwt_audience: optional_env("JWT_AUDIENCE"),
            jwks_cache_ttl: duration_env("JWKS_CACHE_TTL_SECS", 3600)?,
            jwks_fetch_timeout: duration_env("JWKS_FETCH_TIMEOUT_SECS", 30)?,
            shutdown_grace: duration_env("SHUTDOWN_GRACE_SECS", 5)?,
        })
    }

    /// Configuration with every optional setting at its default
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            database_max_connections: 10,
            host: "0.0.0.0".to_string(),
            port: 8080,
            environment: "development".to_string(),
            cors_allowed_origins: DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect(),
            supabase_url: None,
            supabase_jwt_secret: None,
            jwks_url: None,
            jwt_audience: None,
            jwks_cache_ttl: Duration::from_secs(3600),
            jwks_fetch_timeout: Duration::from_secs(30),
            shutdown_grace: Duration::from_secs(5),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Issuer expected in the `iss` claim, when an auth provider is configured
    pub fn expected_issuer(&self) -> Option<String> {
        self.supabase_url
            .as_ref()
            .map(|url| format!("{}/auth/v1", url))
    }

    /// URL of the published key set
    pub fn key_set_url(&self) -> Option<String> {
        self.jwks_url.clone().or_else(|| {
            self.supabase_url
                .as_ref()
                .map(|url| format!("{}/auth/v1/jwks", url))
        })
    }
}

fn optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Duration from `key`: bare seconds or a unit form such as `1h`
fn duration_env(key: &'static str, default_secs: u64) -> Result<Duration, ConfigError> {
    match optional_env(key) {
        Some(value) => parse_duration(&value).ok_or(ConfigError::InvalidValue(key)),
        None => Ok(Duration::from_secs(default_secs)),
    }
}

/// Split a comma-separated list, dropping blank entries
pub fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a duration such as `24h`, `1h30m`, `90s` or `500ms`.
/// A bare number is read as seconds.
pub fn parse_duration(value: &str) -> Option<Duration> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(secs) = value.parse::<u64>() {
        return Some(Duration::from_secs(secs));
    }

    let mut total = Duration::ZERO;
    let mut rest = value;
    while !rest.is_empty() {
        let digits = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        if digits == 0 {
            return None;
        }
        let number: u64 = rest[..digits].parse().ok()?;
        rest = &rest[digits..];

        let unit_len = rest.find(|c: char| c.is_ascii_digit()).unwrap_or(rest.len());
        let unit = &rest[..unit_len];
        rest = &rest[unit_len..];

        let part = match unit {
            "ms" => Duration::from_millis(number),
            "s" => Duration::from_secs(number),
            "m" => Duration::from_secs(number.checked_mul(60)?),
            "h" => Duration::from_secs(number.checked_mul(60 * 60)?),
            _ => return None,
        };
        total = total.checked_add(part)?;
    }
    Some(total)
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnv(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration_units() {
        assert_eq!(parse_duration("24h"), Some(Duration::from_secs(86_400)));
        assert_eq!(parse_duration("30m"), Some(Duration::from_secs(1_800)));
        assert_eq!(parse_duration("1h30m"), Some(Duration::from_secs(5_400)));
        assert_eq!(parse_duration("250ms"), Some(Duration::from_millis(250)));
        assert_eq!(parse_duration("45"), Some(Duration::from_secs(45)));
    }

    #[test]
    fn test_parse_duration_rejects_garbage() {
        assert_eq!(parse_duration(""), None);
        assert_eq!(parse_duration("h"), None);
        assert_eq!(parse_duration("10d"), None);
        assert_eq!(parse_duration("ten minutes"), None);
    }

    #[test]
    fn test_parse_duration_rejects_overflow() {
        assert_eq!(parse_duration("10000000000000000h"), None);
        assert_eq!(parse_duration("400000000000000000m"), None);
        assert_eq!(parse_duration("18446744073709551615s1s"), None);
        assert_eq!(parse_duration("99999999999999999999h"), None);
    }

    #[test]
    fn test_duration_env_accepts_seconds_and_units() {
        env::set_var("FINANCE_TEST_DURATION_UNITS", "1h");
        env::set_var("FINANCE_TEST_DURATION_SECS", "90");
        env::set_var("FINANCE_TEST_DURATION_HUGE", "10000000000000000h");

        assert_eq!(
            duration_env("FINANCE_TEST_DURATION_UNITS", 5).unwrap(),
            Duration::from_secs(3_600)
        );
        assert_eq!(
            duration_env("FINANCE_TEST_DURATION_SECS", 5).unwrap(),
            Duration::from_secs(90)
        );
        assert!(matches!(
            duration_env("FINANCE_TEST_DURATION_HUGE", 5),
            Err(ConfigError::InvalidValue("FINANCE_TEST_DURATION_HUGE"))
        ));
        assert_eq!(
            duration_env("FINANCE_TEST_DURATION_UNSET", 5).unwrap(),
            Duration::from_secs(5)
        );
    }

    #[test]
    fn test_parse_list_splits_on_commas() {
        let origins = parse_list("http://a.test, http://b.test,,");
        assert_eq!(origins, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn test_issuer_and_key_set_url() {
        let config = Config {
            database_url: "postgres://localhost/test".to_string(),
            database_max_connections: 1,
            host: "127.0.0.1".to_string(),
            port: 8080,
            environment: "test".to_string(),
            cors_allowed_origins: vec![],
            supabase_url: Some("https://demo.supabase.co".to_string()),
            supabase_jwt_secret: None,
            jwks_url: None,
            jwt_audience: None,
            jwks_cache_ttl: Duration::from_secs(3600),
            jwks_fetch_timeout: Duration::from_secs(30),
            shutdown_grace: Duration::from_secs(5),
        };

        assert_eq!(
            config.expected_issuer().as_deref(),
            Some("https://demo.supabase.co/auth/v1")
        );
        assert_eq!(
            config.key_set_url().as_deref(),
            Some("https://demo.supabase.co/auth/v1/jwks")
        );
        assert!(!config.is_production());
    }
}
