//! MySQL implementations of the core repository traits

pub mod token_repository;
pub mod user_repository;

pub use token_repository::MySqlTokenRepository;
pub use user_repository::MySqlUserRepository;

use tfa_core::DomainError;

/// Wrap a SQLx error as a store failure
pub(crate) fn db_error(context: &str, e: sqlx::Error) -> DomainError {
    tracing::error!(error = %e, context = context, "Database operation failed");
    DomainError::Persistence {
        message: format!("{}: {}", context, e),
    }
}

pub(crate) fn parse_uuid(value: &str, column: &str) -> Result<uuid::Uuid, DomainError> {
    uuid::Uuid::parse_str(value).map_err(|e| DomainError::Persistence {
        message: format!("Invalid UUID in {}: {}", column, e),
    })
}
