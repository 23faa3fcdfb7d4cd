//! Login throttling configuration

use serde::{Deserialize, Serialize};

use super::env_or;

/// Failed-attempt throttling for login and code submission
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ThrottleConfig {
    /// Enable throttling
    pub enabled: bool,

    /// Failed attempts allowed within the decay window
    pub max_attempts: u32,

    /// Window length in seconds; also the lockout duration
    pub decay_seconds: u64,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: 5,
            decay_seconds: 60,
        }
    }
}

impl ThrottleConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: env_or("THROTTLE_ENABLED", defaults.enabled),
            max_attempts: env_or("THROTTLE_MAX_ATTEMPTS", defaults.max_attempts),
            decay_seconds: env_or("THROTTLE_DECAY_SECONDS", defaults.decay_seconds),
        }
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), String> {
        if self.enabled && (self.max_attempts == 0 || self.decay_seconds == 0) {
            return Err("THROTTLE_MAX_ATTEMPTS and THROTTLE_DECAY_SECONDS must be positive".to_string());
        }
        Ok(())
    }
}
