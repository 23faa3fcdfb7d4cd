//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `two_factor` - Verification code length, message template and routes
//! - `throttle` - Failed login attempt limits
//! - `sms` - Delivery provider selection and credentials
//! - `database` / `cache` - Storage backends
//! - `environment` - Environment detection and logging configuration
//! - `server` - HTTP server and session cookie configuration

pub mod cache;
pub mod database;
pub mod environment;
pub mod server;
pub mod sms;
pub mod throttle;
pub mod two_factor;

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use cache::CacheConfig;
pub use database::DatabaseConfig;
pub use environment::{Environment, LoggingConfig};
pub use server::{ServerConfig, SessionConfig};
pub use sms::{SmsConfig, SmsProvider};
pub use throttle::ThrottleConfig;
pub use two_factor::TwoFactorConfig;

/// Where tokens, users and sessions are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process-local stores, lost on restart
    Memory,
    /// MySQL for tokens and users, Redis for sessions and throttling
    Mysql,
}

impl StorageBackend {
    /// Read `STORAGE_BACKEND`, defaulting to in-memory stores
    pub fn from_env() -> Self {
        match std::env::var("STORAGE_BACKEND")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "mysql" => StorageBackend::Mysql,
            _ => StorageBackend::Memory,
        }
    }
}

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Server configuration
    pub server: ServerConfig,

    /// Session cookie configuration
    #[serde(default)]
    pub session: SessionConfig,

    /// Storage backend selection
    pub storage: StorageBackend,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Cache configuration
    pub cache: CacheConfig,

    /// Second-factor flow configuration
    #[serde(default)]
    pub two_factor: TwoFactorConfig,

    /// Failed attempt throttling
    #[serde(default)]
    pub throttle: ThrottleConfig,

    /// Delivery provider configuration
    pub sms: SmsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            server: ServerConfig::default(),
            session: SessionConfig::default(),
            storage: StorageBackend::Memory,
            database: DatabaseConfig::default(),
            cache: CacheConfig::default(),
            two_factor: TwoFactorConfig::default(),
            throttle: ThrottleConfig::default(),
            sms: SmsConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// Call `dotenvy::dotenv()` beforehand to pick up a `.env` file.
    pub fn from_env() -> Result<Self, String> {
        let environment = Environment::from_env();
        let mut session = SessionConfig::from_env();
        if environment.is_production() {
            session.secure = true;
        }

        let config = Self {
            environment,
            server: ServerConfig::from_env(),
            session,
            storage: StorageBackend::from_env(),
            database: DatabaseConfig::from_env(),
            cache: CacheConfig::from_env(),
            two_factor: TwoFactorConfig::from_env(),
            throttle: ThrottleConfig::from_env(),
            sms: SmsConfig::from_env(),
            logging: LoggingConfig::from_env(environment),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate cross-section invariants
    pub fn validate(&self) -> Result<(), String> {
        self.two_factor.validate()?;
        self.throttle.validate()?;
        self.sms.validate()?;
        Ok(())
    }
}

/// Parse an environment variable, falling back to `default` when absent or malformed
pub(crate) fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.two_factor.code_length, 6);
    }

    #[test]
    fn test_invalid_code_length_rejected() {
        let mut config = AppConfig::default();
        config.two_factor.code_length = 0;
        assert!(config.validate().is_err());
    }
}
