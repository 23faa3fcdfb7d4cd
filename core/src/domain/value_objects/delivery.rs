//! Delivery channel selection and the result of a send attempt.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{AuthError, ValidationError};

/// Out-of-band channel a code travels over
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryChannel {
    #[default]
    Sms,
    /// Voice call reading the code aloud
    Call,
}

impl fmt::Display for DeliveryChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryChannel::Sms => write!(f, "sms"),
            DeliveryChannel::Call => write!(f, "call"),
        }
    }
}

impl FromStr for DeliveryChannel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sms" => Ok(DeliveryChannel::Sms),
            "call" | "phone" | "voice" => Ok(DeliveryChannel::Call),
            _ => Err(ValidationError::InvalidFormat {
                field: "via".to_string(),
            }),
        }
    }
}

/// What happened when a token's code was sent
///
/// Only `Sent` means the user can expect a code; every other variant is a
/// failed login from the flow's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Sent,
    /// The gateway reported a provider failure
    Failed,
    UserNotFound,
    SecondFactorDisabled,
}

impl DeliveryOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, DeliveryOutcome::Sent)
    }

    /// Error to surface to the user, `None` when the code went out
    pub fn failure(&self) -> Option<AuthError> {
        match self {
            DeliveryOutcome::Sent => None,
            DeliveryOutcome::Failed => Some(AuthError::DeliveryFailure),
            DeliveryOutcome::UserNotFound => Some(AuthError::UserNotFound),
            DeliveryOutcome::SecondFactorDisabled => Some(AuthError::SecondFactorDisabled),
        }
    }
}
