//! Session persistence interface.

use async_trait::async_trait;

use crate::domain::session::SessionData;
use crate::errors::DomainError;

/// Stores session data by opaque session id
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// `None` for unknown or expired ids
    async fn load(&self, session_id: &str) -> Result<Option<SessionData>, DomainError>;

    /// Write the session, replacing any previous data and resetting its lifetime
    async fn save(
        &self,
        session_id: &str,
        data: &SessionData,
        ttl_seconds: u64,
    ) -> Result<(), DomainError>;

    async fn destroy(&self, session_id: &str) -> Result<(), DomainError>;
}
