//! Redis configuration module

use serde::{Deserialize, Serialize};

use super::env_or;

/// Redis connection settings used for sessions and throttling
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Redis connection URL
    pub url: String,

    /// Key prefix applied to every key this service writes
    pub key_prefix: String,

    /// Connection attempts before giving up
    pub max_retries: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: String::from("redis://127.0.0.1:6379"),
            key_prefix: String::from("tfa"),
            max_retries: 3,
        }
    }
}

impl CacheConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            url: std::env::var("REDIS_URL").unwrap_or(defaults.url),
            key_prefix: std::env::var("REDIS_KEY_PREFIX").unwrap_or(defaults.key_prefix),
            max_retries: env_or("REDIS_MAX_RETRIES", defaults.max_retries),
        }
    }

    /// Build a namespaced key
    pub fn key(&self, parts: &[&str]) -> String {
        let mut key = self.key_prefix.clone();
        for part in parts {
            key.push(':');
            key.push_str(part);
        }
        key
    }
}
