//! Server configuration module

use serde::{Deserialize, Serialize};

use super::env_or;

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server host address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Worker threads (0 = number of CPU cores)
    #[serde(default)]
    pub workers: usize,

    /// Externally reachable base URL, used for provider callbacks
    pub public_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::from("127.0.0.1"),
            port: 8080,
            workers: 0,
            public_url: String::from("http://127.0.0.1:8080"),
        }
    }
}

impl ServerConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let host = std::env::var("SERVER_HOST").unwrap_or(defaults.host);
        let port = env_or("SERVER_PORT", defaults.port);
        let public_url = std::env::var("PUBLIC_URL")
            .unwrap_or_else(|_| format!("http://{}:{}", host, port));

        Self {
            host,
            port,
            workers: env_or("SERVER_WORKERS", defaults.workers),
            public_url,
        }
    }

    /// Address to bind the listener to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Session cookie configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Session cookie name
    pub cookie_name: String,

    /// Session cookie secure flag (HTTPS only)
    pub secure: bool,

    /// Session cookie SameSite attribute
    pub same_site: String,

    /// Idle lifetime of stored session data in seconds
    pub ttl_seconds: u64,

    /// Cookie and session lifetime when "remember me" was ticked
    pub remember_ttl_seconds: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: String::from("tfa_session"),
            secure: false,
            same_site: String::from("Lax"),
            ttl_seconds: 7200,
            remember_ttl_seconds: 2_592_000, // 30 days
        }
    }
}

impl SessionConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            cookie_name: std::env::var("SESSION_COOKIE").unwrap_or(defaults.cookie_name),
            secure: env_or("SESSION_SECURE", defaults.secure),
            same_site: std::env::var("SESSION_SAME_SITE").unwrap_or(defaults.same_site),
            ttl_seconds: env_or("SESSION_TTL_SECONDS", defaults.ttl_seconds),
            remember_ttl_seconds: env_or(
                "SESSION_REMEMBER_TTL_SECONDS",
                defaults.remember_ttl_seconds,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_address() {
        let config = ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 9000,
            ..Default::default()
        };
        assert_eq!(config.bind_address(), "0.0.0.0:9000");
    }
}
