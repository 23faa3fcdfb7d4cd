//! DTOs for the login and verification routes

use serde::{Deserialize, Serialize};
use validator::Validate;

use tfa_core::LoginCredentials;

/// Body of `POST /login`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    #[serde(default)]
    pub remember: bool,
}

impl LoginRequest {
    pub fn credentials(&self) -> LoginCredentials {
        LoginCredentials::new(self.email.trim(), self.password.clone(), self.remember)
    }
}

/// Body of a code submission; emptiness is checked by the flow itself
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeSubmitRequest {
    #[serde(default)]
    pub code: String,
}

/// Query of the resend route, `?via=sms|call`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResendQuery {
    pub via: Option<String>,
}
