//! Configuration for the second-factor flow service

use tfa_shared::TwoFactorConfig;

use crate::domain::value_objects::MessageTemplate;
use crate::errors::{DomainError, DomainResult};

/// Validated settings for `TwoFactorService`
#[derive(Debug, Clone)]
pub struct TwoFactorServiceConfig {
    /// Digits per generated code
    pub code_length: usize,
    /// Message wrapped around the code
    pub message_template: MessageTemplate,
    /// Path of the code form, e.g. `/login/tfa`
    pub verification_path: String,
    /// Path of the login form
    pub login_path: String,
    /// Destination after successful verification
    pub redirect_to: String,
}

impl Default for TwoFactorServiceConfig {
    fn default() -> Self {
        let defaults = TwoFactorConfig::default();
        Self {
            code_length: defaults.code_length,
            message_template: MessageTemplate::default(),
            verification_path: defaults.verification_path(),
            login_path: defaults.login_path(),
            redirect_to: defaults.redirect_to,
        }
    }
}

impl TwoFactorServiceConfig {
    pub fn from_config(config: &TwoFactorConfig) -> DomainResult<Self> {
        config
            .validate()
            .map_err(|message| DomainError::Configuration { message })?;

        Ok(Self {
            code_length: config.code_length,
            message_template: MessageTemplate::new(config.message_template.clone())?,
            verification_path: config.verification_path(),
            login_path: config.login_path(),
            redirect_to: config.redirect_to.clone(),
        })
    }

    /// Path of the resend endpoint
    pub fn resend_path(&self) -> String {
        format!("{}/resend", self.verification_path)
    }
}
