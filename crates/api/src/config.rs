//! Process configuration from environment variables (optionally via `.env`).

use std::net::SocketAddr;

use thiserror::Error;

const DEV_JWT_SECRET: &str = "carehub-dev-secret";

/// Upper bound on session lifetime: one year.
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub session_ttl_hours: i64,
    pub public_base_url: String,
    pub password_pepper: Option<String>,
    pub min_password_length: usize,
    pub use_persistent_stores: bool,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub sequence_max_retries: u32,
}

impl core::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("session_ttl_hours", &self.session_ttl_hours)
            .field("public_base_url", &self.public_base_url)
            .field("min_password_length", &self.min_password_length)
            .field("use_persistent_stores", &self.use_persistent_stores)
            .field("sequence_max_retries", &self.sequence_max_retries)
            .finish_non_exhaustive()
    }
}

impl Default for AppConfig {
    /// In-memory development defaults.
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            session_ttl_hours: 12,
            public_base_url: "http://localhost:8080".to_string(),
            password_pepper: None,
            min_password_length: 8,
            use_persistent_stores: false,
            database_url: None,
            db_max_connections: 10,
            sequence_max_retries: 5,
        }
    }
}

impl AppConfig {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let use_persistent_stores = match get("USE_PERSISTENT_STORES") {
            Some(v) => parse_bool("USE_PERSISTENT_STORES", &v)?,
            None => defaults.use_persistent_stores,
        };

        let database_url = get("DATABASE_URL");
        if use_persistent_stores && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let jwt_secret = match get("JWT_SECRET") {
            Some(secret) => secret,
            None if use_persistent_stores => return Err(ConfigError::Missing("JWT_SECRET")),
            None => {
                tracing::warn!("JWT_SECRET not set; using insecure dev default");
                defaults.jwt_secret
            }
        };

        let session_ttl_hours = parse_or("SESSION_TTL_HOURS", get("SESSION_TTL_HOURS"), defaults.session_ttl_hours)?;
        session_ttl_from_hours(session_ttl_hours)?;

        Ok(Self {
            bind_addr: parse_or("BIND_ADDR", get("BIND_ADDR"), defaults.bind_addr)?,
            jwt_secret,
            session_ttl_hours,
            public_base_url: get("PUBLIC_BASE_URL").unwrap_or(defaults.public_base_url),
            password_pepper: get("PASSWORD_PEPPER"),
            min_password_length: parse_or(
                "MIN_PASSWORD_LENGTH",
                get("MIN_PASSWORD_LENGTH"),
                defaults.min_password_length,
            )?,
            use_persistent_stores,
            database_url,
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", get("DB_MAX_CONNECTIONS"), defaults.db_max_connections)?,
            sequence_max_retries: parse_or(
                "SEQUENCE_MAX_RETRIES",
                get("SEQUENCE_MAX_RETRIES"),
                defaults.sequence_max_retries,
            )?,
        })
    }
}

impl AppConfig {
    /// Session lifetime, validated against `1..=MAX_SESSION_TTL_HOURS`.
    pub fn session_ttl(&self) -> Result<chrono::Duration, ConfigError> {
        session_ttl_from_hours(self.session_ttl_hours)
    }
}

fn session_ttl_from_hours(hours: i64) -> Result<chrono::Duration, ConfigError> {
    let invalid = || ConfigError::Invalid {
        key: "SESSION_TTL_HOURS",
        value: hours.to_string(),
    };
    if !(1..=MAX_SESSION_TTL_HOURS).contains(&hours) {
        return Err(invalid());
    }
    chrono::Duration::try_hours(hours).ok_or_else(invalid)
}

fn parse_or<T: core::str::FromStr>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn empty_environment_gives_dev_defaults() {
        let cfg = load(&[]).unwrap();
        assert!(!cfg.use_persistent_stores);
        assert_eq!(cfg.session_ttl_hours, 12);
        assert_eq!(cfg.min_password_length, 8);
        assert_eq!(cfg.sequence_max_retries, 5);
        assert_eq!(cfg.jwt_secret, DEV_JWT_SECRET);
    }

    #[test]
    fn persistent_mode_requires_database_and_secret() {
        assert_eq!(
            load(&[("USE_PERSISTENT_STORES", "true")]).unwrap_err(),
            ConfigError::Missing("DATABASE_URL")
        );
        assert_eq!(
            load(&[("USE_PERSISTENT_STORES", "true"), ("DATABASE_URL", "postgres://x")]).unwrap_err(),
            ConfigError::Missing("JWT_SECRET")
        );
        let cfg = load(&[
            ("USE_PERSISTENT_STORES", "1"),
            ("DATABASE_URL", "postgres://x"),
            ("JWT_SECRET", "s3cret"),
        ])
        .unwrap();
        assert!(cfg.use_persistent_stores);
    }

    #[test]
    fn malformed_values_are_rejected() {
        assert!(matches!(
            load(&[("SESSION_TTL_HOURS", "twelve")]),
            Err(ConfigError::Invalid { key: "SESSION_TTL_HOURS", .. })
        ));
        assert!(matches!(
            load(&[("SESSION_TTL_HOURS", "0")]),
            Err(ConfigError::Invalid { key: "SESSION_TTL_HOURS", .. })
        ));
        assert!(matches!(
            load(&[("BIND_ADDR", "nowhere")]),
            Err(ConfigError::Invalid { key: "BIND_ADDR", .. })
        ));
        assert!(matches!(
            load(&[("USE_PERSISTENT_STORES", "maybe")]),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn session_ttl_is_bounded() {
        for huge in ["3000000000", "9223372036854775807", "8761"] {
            assert!(
                matches!(
                    load(&[("SESSION_TTL_HOURS", huge)]),
                    Err(ConfigError::Invalid { key: "SESSION_TTL_HOURS", .. })
                ),
                "{huge}"
            );
        }

        let cfg = load(&[("SESSION_TTL_HOURS", "8760")]).unwrap();
        assert_eq!(cfg.session_ttl().unwrap(), chrono::Duration::hours(MAX_SESSION_TTL_HOURS));

        // Fields are public; the bound is re-checked when services are built.
        let direct = AppConfig {
            session_ttl_hours: 3_000_000_000,
            ..AppConfig::default()
        };
        assert!(direct.session_ttl().is_err());
    }

    #[test]
    fn debug_output_hides_secrets() {
        let cfg = load(&[("JWT_SECRET", "top-secret"), ("PASSWORD_PEPPER", "pepper")]).unwrap();
        let dbg = format!("{cfg:?}");
        assert!(!dbg.contains("top-secret"));
        assert!(!dbg.contains("pepper"));
    }
}
