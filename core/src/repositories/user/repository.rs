//! Interfaces onto the primary account system.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::UserRecord;
use crate::errors::DomainError;

/// Primary (password) credential check
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// Resolve an identifier/secret pair to a user id, `None` when rejected
    async fn resolve(&self, identifier: &str, secret: &str) -> Result<Option<Uuid>, DomainError>;
}

/// Read access to user records
#[async_trait]
pub trait UserLookup: Send + Sync {
    async fn find_user(&self, id: Uuid) -> Result<Option<UserRecord>, DomainError>;
}
