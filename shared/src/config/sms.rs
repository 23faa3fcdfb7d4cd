//! Delivery provider configuration

use serde::{Deserialize, Serialize};

/// Which gateway delivers verification codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SmsProvider {
    /// Log codes instead of sending them
    Mock,
    /// Twilio programmable messaging and voice
    Twilio,
}

/// SMS / voice provider configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SmsConfig {
    /// Provider selection
    pub provider: SmsProvider,
    /// Twilio account SID
    pub account_sid: String,
    /// Twilio auth token
    pub auth_token: String,
    /// Number messages and calls originate from (E.164)
    pub from_number: String,
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            provider: SmsProvider::Mock,
            account_sid: String::new(),
            auth_token: String::new(),
            from_number: String::from("+15005550006"),
        }
    }
}

impl SmsConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let provider = match std::env::var("SMS_PROVIDER")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "twilio" => SmsProvider::Twilio,
            _ => SmsProvider::Mock,
        };

        Self {
            provider,
            account_sid: std::env::var("TWILIO_ACCOUNT_SID").unwrap_or(defaults.account_sid),
            auth_token: std::env::var("TWILIO_AUTH_TOKEN").unwrap_or(defaults.auth_token),
            from_number: std::env::var("TWILIO_FROM_NUMBER").unwrap_or(defaults.from_number),
        }
    }

    /// Twilio needs credentials and an E.164 sender
    pub fn validate(&self) -> Result<(), String> {
        if self.provider == SmsProvider::Twilio {
            if self.account_sid.is_empty() || self.auth_token.is_empty() {
                return Err("TWILIO_ACCOUNT_SID and TWILIO_AUTH_TOKEN must be set".to_string());
            }
            if !self.from_number.starts_with('+') {
                return Err(
                    "TWILIO_FROM_NUMBER must be in E.164 format (starting with '+')".to_string(),
                );
            }
        }
        Ok(())
    }
}
