use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),
    #[error("{name} must be a valid {expected}, got {value:?}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server host to bind to.
    pub host: String,
    /// Server port to bind to.
    pub port: u16,
    /// PostgreSQL connection URL for the travel-date tables.
    pub database_url: String,
    /// Maximum database connections in the pool.
    pub db_max_connections: u32,
    /// Minimum database connections in the pool.
    pub db_min_connections: u32,
    /// Root directory of the content collections.
    pub content_dir: PathBuf,
    /// Allowed CORS origin; any origin when unset.
    pub cors_allow_origin: Option<String>,
    /// Sessions unused for this long are closed.
    pub session_idle_timeout: Duration,
    /// How often idle sessions are looked for.
    pub session_sweep_interval: Duration,
    /// Log level (e.g., "info", "debug", "trace").
    pub log_level: String,
}

impl AppConfig {
    /// Load configuration from environment variables with sensible defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "PORT", "u16", 3030)?,
            database_url: lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?,
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", "u32", 20)?,
            db_min_connections: parse_or(&lookup, "DB_MIN_CONNECTIONS", "u32", 5)?,
            content_dir: lookup("CONTENT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("content")),
            cors_allow_origin: lookup("CORS_ALLOW_ORIGIN").filter(|o| !o.is_empty()),
            session_idle_timeout: Duration::from_secs(parse_or(
                &lookup,
                "SESSION_IDLE_TIMEOUT_SECS",
                "u64",
                30 * 60,
            )?),
            session_sweep_interval: Duration::from_secs(parse_or(
                &lookup,
                "SESSION_SWEEP_INTERVAL_SECS",
                "u64",
                60,
            )?),
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Build the socket address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    expected: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid {
                name,
                expected,
                value,
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply() {
        let config = AppConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/voyages")])).unwrap();
        assert_eq!(config.addr(), "0.0.0.0:3030");
        assert_eq!(config.db_max_connections, 20);
        assert_eq!(config.db_min_connections, 5);
        assert_eq!(config.content_dir, PathBuf::from("content"));
        assert!(config.cors_allow_origin.is_none());
        assert_eq!(config.log_level, "info");
        assert_eq!(config.session_idle_timeout, Duration::from_secs(1800));
        assert_eq!(config.session_sweep_interval, Duration::from_secs(60));
    }

    #[test]
    fn database_url_is_required() {
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[])),
            Err(ConfigError::Missing("DATABASE_URL"))
        ));
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        let err = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/voyages"),
            ("PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "PORT", .. }));
    }

    #[test]
    fn overrides_are_read() {
        let config = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db/voyages"),
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("CONTENT_DIR", "/srv/content"),
            ("CORS_ALLOW_ORIGIN", "https://www.example.com"),
            ("SESSION_IDLE_TIMEOUT_SECS", "600"),
        ]))
        .unwrap();
        assert_eq!(config.addr(), "127.0.0.1:8080");
        assert_eq!(config.content_dir, PathBuf::from("/srv/content"));
        assert_eq!(config.cors_allow_origin.as_deref(), Some("https://www.example.com"));
        assert_eq!(config.session_idle_timeout, Duration::from_secs(600));
    }
}
