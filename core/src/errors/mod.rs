//! Domain-specific error types and error handling.

mod types;

#[cfg(test)]
mod tests;

pub use types::{AuthError, ValidationError};

use thiserror::Error;

/// Core domain errors (general purpose)
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    /// A store write or read failed; fatal for the current request
    #[error("Persistence error: {message}")]
    Persistence { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    ValidationErr(#[from] ValidationError),
}

impl DomainError {
    /// Shorthand for store failures
    pub fn persistence(message: impl Into<String>) -> Self {
        DomainError::Persistence {
            message: message.into(),
        }
    }

    /// Input problems that never cost a throttle attempt
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            DomainError::Validation { .. } | DomainError::ValidationErr(_)
        )
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
