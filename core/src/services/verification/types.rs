//! Result types returned by the flow controller

use serde::{Deserialize, Serialize};

use crate::errors::AuthError;
use crate::services::throttle::LockoutResponse;

/// Where the client goes after a login or code submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowOutcome {
    /// Continue to `to`
    Redirect { to: String },
    /// Return to `to`; `error` has been flashed to the session
    RedirectWithError { to: String, error: AuthError },
    /// Too many failed attempts
    Lockout(LockoutResponse),
}

impl FlowOutcome {
    /// Redirect target, `None` for a lockout
    pub fn location(&self) -> Option<&str> {
        match self {
            FlowOutcome::Redirect { to } | FlowOutcome::RedirectWithError { to, .. } => Some(to),
            FlowOutcome::Lockout(_) => None,
        }
    }

    pub fn error(&self) -> Option<AuthError> {
        match self {
            FlowOutcome::Redirect { .. } => None,
            FlowOutcome::RedirectWithError { error, .. } => Some(error.clone()),
            FlowOutcome::Lockout(lockout) => Some(lockout.error()),
        }
    }
}

/// What the code entry form needs to render
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeForm {
    pub action: String,
    pub resend_action: String,
    pub code_length: usize,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeFormView {
    Form(CodeForm),
    /// No pending login; send the client back to the login form
    Redirect { to: String },
}

/// Reply to a resend request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResendResult {
    pub error: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ResendResult {
    pub fn sent() -> Self {
        Self {
            error: false,
            message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: true,
            message: Some(message.into()),
        }
    }
}
