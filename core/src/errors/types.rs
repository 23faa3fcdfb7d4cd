//! Error types for the second-factor flow and input validation
//!
//! `AuthError` display strings are flashed to users as-is. Every failed
//! token check surfaces as `InvalidToken`.

use thiserror::Error;

/// Authentication-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("These credentials do not match our records.")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("Two-factor authentication is not enabled for this account.")]
    SecondFactorDisabled,

    #[error("The verification code is invalid or has expired.")]
    InvalidToken,

    #[error("Could not send the verification code. Please try again.")]
    DeliveryFailure,

    #[error("Too many login attempts. Please try again in {retry_after_seconds} seconds.")]
    TooManyAttempts { retry_after_seconds: u64 },
}

/// Validation errors
///
/// These represent malformed or missing input and never count as a failed
/// login attempt.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field: {field}")]
    RequiredField { field: String },

    #[error("Invalid format: {field}")]
    InvalidFormat { field: String },

    #[error("Out of range: {field} (min: {min}, max: {max})")]
    OutOfRange {
        field: String,
        min: String,
        max: String,
    },
}

impl ValidationError {
    /// Name of the offending field
    pub fn field(&self) -> &str {
        match self {
            ValidationError::RequiredField { field }
            | ValidationError::InvalidFormat { field }
            | ValidationError::OutOfRange { field, .. } => field,
        }
    }
}
