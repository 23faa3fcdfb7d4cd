//! Second-factor flow configuration

use serde::{Deserialize, Serialize};

use super::env_or;

/// Digit count of generated verification codes
pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Longest code that still fits a `u64` range
pub const MAX_CODE_LENGTH: usize = 18;

/// Default SMS / voice message, `%s` is replaced by the code
pub const DEFAULT_MESSAGE_TEMPLATE: &str = "Your verification code is %s";

/// Configuration of the verification-code step
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TwoFactorConfig {
    /// Number of digits in a verification code
    pub code_length: usize,

    /// Message template with a `%s` placeholder for the code
    pub message_template: String,

    /// Delete every token of a user once they are authenticated
    pub delete_tokens_after_auth: bool,

    /// Route of the code entry form, without a leading slash
    pub verification_route: String,

    /// Route of the primary login form, without a leading slash
    pub login_route: String,

    /// Where a fully authenticated user is sent
    pub redirect_to: String,
}

impl Default for TwoFactorConfig {
    fn default() -> Self {
        Self {
            code_length: DEFAULT_CODE_LENGTH,
            message_template: DEFAULT_MESSAGE_TEMPLATE.to_string(),
            delete_tokens_after_auth: false,
            verification_route: String::from("login/tfa"),
            login_route: String::from("login"),
            redirect_to: String::from("/home"),
        }
    }
}

impl TwoFactorConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            code_length: env_or("TFA_CODE_LENGTH", defaults.code_length),
            message_template: std::env::var("TFA_MESSAGE_TEMPLATE")
                .unwrap_or(defaults.message_template),
            delete_tokens_after_auth: env_or(
                "TFA_DELETE_TOKENS_AFTER_AUTH",
                defaults.delete_tokens_after_auth,
            ),
            verification_route: std::env::var("TFA_VERIFICATION_ROUTE")
                .map(|r| r.trim_matches('/').to_string())
                .unwrap_or(defaults.verification_route),
            login_route: std::env::var("TFA_LOGIN_ROUTE")
                .map(|r| r.trim_matches('/').to_string())
                .unwrap_or(defaults.login_route),
            redirect_to: std::env::var("TFA_REDIRECT_TO").unwrap_or(defaults.redirect_to),
        }
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), String> {
        if self.code_length == 0 || self.code_length > MAX_CODE_LENGTH {
            return Err(format!(
                "TFA_CODE_LENGTH must be between 1 and {}, got {}",
                MAX_CODE_LENGTH, self.code_length
            ));
        }
        if !self.message_template.contains("%s") {
            return Err("TFA_MESSAGE_TEMPLATE must contain a %s placeholder".to_string());
        }
        if self.verification_route.is_empty() {
            return Err("TFA_VERIFICATION_ROUTE must not be empty".to_string());
        }
        Ok(())
    }

    /// Absolute path of the code entry form
    pub fn verification_path(&self) -> String {
        format!("/{}", self.verification_route)
    }

    /// Absolute path of the login form
    pub fn login_path(&self) -> String {
        format!("/{}", self.login_route)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TwoFactorConfig::default();
        assert_eq!(config.code_length, 6);
        assert_eq!(config.verification_path(), "/login/tfa");
        assert_eq!(config.login_path(), "/login");
        assert!(!config.delete_tokens_after_auth);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_template_requires_placeholder() {
        let config = TwoFactorConfig {
            message_template: "no code here".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_code_length_bounds() {
        let too_long = TwoFactorConfig {
            code_length: MAX_CODE_LENGTH + 1,
            ..Default::default()
        };
        assert!(too_long.validate().is_err());

        let legacy = TwoFactorConfig {
            code_length: 4,
            ..Default::default()
        };
        assert!(legacy.validate().is_ok());
    }
}
