//! Primary login form input.

use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

/// Decoded login form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginCredentials {
    pub identifier: String,
    pub secret: String,
    #[serde(default)]
    pub remember: bool,
}

impl LoginCredentials {
    pub fn new(identifier: impl Into<String>, secret: impl Into<String>, remember: bool) -> Self {
        Self {
            identifier: identifier.into(),
            secret: secret.into(),
            remember,
        }
    }

    /// Both fields are required
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.identifier.trim().is_empty() {
            return Err(ValidationError::RequiredField {
                field: "email".to_string(),
            });
        }
        if self.secret.is_empty() {
            return Err(ValidationError::RequiredField {
                field: "password".to_string(),
            });
        }
        Ok(())
    }
}
