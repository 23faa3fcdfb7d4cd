//! Reactions to completed authentication

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::events::AuthenticatedEvent;
use crate::repositories::TokenRepository;

/// Receives `AuthenticatedEvent`s
///
/// Handlers must not fail the login: they log and swallow their own errors.
#[async_trait]
pub trait AuthenticatedListener: Send + Sync {
    async fn handle(&self, event: &AuthenticatedEvent);
}

/// Deletes every token of a user once they are authenticated
pub struct TokenPurgeListener {
    tokens: Arc<dyn TokenRepository>,
}

impl TokenPurgeListener {
    pub fn new(tokens: Arc<dyn TokenRepository>) -> Self {
        Self { tokens }
    }
}

#[async_trait]
impl AuthenticatedListener for TokenPurgeListener {
    async fn handle(&self, event: &AuthenticatedEvent) {
        match self.tokens.delete_all_for_user(event.user_id).await {
            Ok(deleted) => tracing::debug!(
                user_id = %event.user_id,
                deleted = deleted,
                event = "tokens_purged",
                "Deleted verification tokens after authentication"
            ),
            Err(e) => tracing::error!(
                user_id = %event.user_id,
                error = %e,
                event = "token_purge_failed",
                "Failed to delete verification tokens after authentication"
            ),
        }
    }
}
