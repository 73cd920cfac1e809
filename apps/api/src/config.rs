//! API server configuration module.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     KNET_PORT=9000                                                     │
//! │     KNET_JWT_SECRET=...                                                │
//! │     (a .env file in the working directory is loaded first)             │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ./knet.toml, or the path in KNET_CONFIG                            │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Deserialize;
use tracing::warn;

use knet_db::DbConfig;

/// Development-only signing key used when no secret is configured.
const DEV_JWT_SECRET: &str = "knet-dev-secret-change-in-production";

/// API server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Bind address
    pub host: String,

    /// HTTP port
    pub port: u16,

    /// SQLite database file (or `:memory:`)
    pub database_path: String,

    /// Pool size
    pub max_connections: u32,

    /// JWT secret key for signing tokens
    #[serde(default)]
    pub jwt_secret: Option<String>,

    /// JWT access token lifetime in seconds
    pub jwt_access_lifetime_secs: i64,

    /// JWT refresh token lifetime in seconds
    pub jwt_refresh_lifetime_secs: i64,

    /// Single allowed CORS origin. Any origin when unset.
    #[serde(default)]
    pub cors_allowed_origin: Option<String>,

    /// Admin account created at startup when no account has this email.
    #[serde(default)]
    pub admin_email: Option<String>,

    #[serde(default)]
    pub admin_password: Option<String>,

    #[serde(default)]
    pub admin_name: Option<String>,
}

impl ApiConfig {
    /// Load configuration from defaults, an optional TOML file and `KNET_*`
    /// environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let file = std::env::var("KNET_CONFIG").unwrap_or_else(|_| "knet.toml".to_string());

        let config = config::Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 8080)?
            .set_default("database_path", "knet.db")?
            .set_default("max_connections", 5)?
            .set_default("jwt_access_lifetime_secs", 3600)? // 1 hour
            .set_default("jwt_refresh_lifetime_secs", 604_800)? // 7 days
            .add_source(config::File::with_name(&file).required(false))
            .add_source(config::Environment::with_prefix("KNET"))
            .build()?
            .try_deserialize::<ApiConfig>()?;

        config.validate()?;
        Ok(config)
    }

    /// Checks values the type system can't.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_access_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue("jwt_access_lifetime_secs".to_string()));
        }
        if self.jwt_refresh_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue("jwt_refresh_lifetime_secs".to_string()));
        }
        if self.max_connections == 0 {
            return Err(ConfigError::InvalidValue("max_connections".to_string()));
        }
        if self.admin_email.is_some() != self.admin_password.is_some() {
            return Err(ConfigError::MissingRequired(
                "admin_email and admin_password must be set together".to_string(),
            ));
        }
        Ok(())
    }

    /// `host:port` for the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Pool settings for the configured database.
    pub fn db_config(&self) -> DbConfig {
        if self.database_path == ":memory:" {
            DbConfig::in_memory()
        } else {
            DbConfig::new(&self.database_path).max_connections(self.max_connections)
        }
    }

    /// The configured signing secret, or the development default.
    pub fn jwt_secret(&self) -> String {
        match self.jwt_secret.as_deref() {
            Some(secret) if !secret.is_empty() => secret.to_string(),
            _ => {
                warn!("KNET_JWT_SECRET not set, using the development signing key");
                DEV_JWT_SECRET.to_string()
            }
        }
    }

    /// Settings for tests and embedding: in-memory database, fixed secret.
    pub fn for_tests() -> Self {
        ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            database_path: ":memory:".to_string(),
            max_connections: 1,
            jwt_secret: Some("test-secret".to_string()),
            jwt_access_lifetime_secs: 3600,
            jwt_refresh_lifetime_secs: 604_800,
            cors_allowed_origin: None,
            admin_email: None,
            admin_password: None,
            admin_name: None,
        }
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error(transparent)]
    Source(#[from] config::ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_lifetimes() {
        let mut config = ApiConfig::for_tests();
        assert!(config.validate().is_ok());

        config.jwt_access_lifetime_secs = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_admin_bootstrap_needs_both_fields() {
        let mut config = ApiConfig::for_tests();
        config.admin_email = Some("root@example.com".to_string());
        assert!(matches!(config.validate(), Err(ConfigError::MissingRequired(_))));

        config.admin_password = Some("changeme".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_jwt_secret_fallback() {
        let mut config = ApiConfig::for_tests();
        assert_eq!(config.jwt_secret(), "test-secret");

        config.jwt_secret = Some(String::new());
        assert_eq!(config.jwt_secret(), DEV_JWT_SECRET);
    }

    #[test]
    fn test_db_config() {
        let mut config = ApiConfig::for_tests();
        assert!(config.db_config().is_in_memory());

        config.database_path = "shop.db".to_string();
        config.max_connections = 8;
        let db = config.db_config();
        assert!(!db.is_in_memory());
        assert_eq!(db.max_connections, 8);
    }

    #[test]
    fn test_bind_address() {
        let config = ApiConfig::for_tests();
        assert_eq!(config.bind_address(), "127.0.0.1:0");
    }
}
