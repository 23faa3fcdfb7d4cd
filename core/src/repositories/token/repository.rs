//! Token repository trait defining the interface for verification token persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::VerificationToken;
use crate::errors::DomainError;

/// Keyed store for `VerificationToken` records
///
/// Implementations map backend failures to `DomainError::Persistence`.
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Insert a new token
    async fn create(&self, token: &VerificationToken) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<VerificationToken>, DomainError>;

    /// Every token of a user, newest first
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Vec<VerificationToken>, DomainError>;

    /// Overwrite the mutable fields (`used`, `updated_at`) of an existing token
    async fn update(&self, token: &VerificationToken) -> Result<(), DomainError>;

    /// Conditionally flip `used` from false to true
    ///
    /// # Returns
    /// * `Ok(true)` - this call performed the transition
    /// * `Ok(false)` - token missing or already used
    ///
    /// Concurrent callers on the same token see exactly one `true`.
    async fn mark_used(&self, id: Uuid) -> Result<bool, DomainError>;

    /// Returns whether a row was removed
    async fn delete_by_id(&self, id: Uuid) -> Result<bool, DomainError>;

    /// Returns the number of tokens removed
    async fn delete_all_for_user(&self, user_id: Uuid) -> Result<u64, DomainError>;
}
