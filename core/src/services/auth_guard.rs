//! Final session establishment

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::session::Session;
use crate::errors::DomainResult;

pub const AUTH_USER_ID_KEY: &str = "auth_user_id";
pub const AUTH_REMEMBER_KEY: &str = "auth_remember";

/// Marks a session as fully authenticated
#[async_trait]
pub trait AuthGuard: Send + Sync {
    async fn login(&self, session: &mut dyn Session, user_id: Uuid, remember: bool)
        -> DomainResult<()>;

    /// User the session is authenticated as, if any
    fn authenticated_user(&self, session: &dyn Session) -> Option<Uuid>;
}

/// Guard that records the authenticated user inside the session itself
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionAuthGuard;

#[async_trait]
impl AuthGuard for SessionAuthGuard {
    async fn login(
        &self,
        session: &mut dyn Session,
        user_id: Uuid,
        remember: bool,
    ) -> DomainResult<()> {
        session.set(AUTH_USER_ID_KEY, Value::String(user_id.to_string()));
        session.set(AUTH_REMEMBER_KEY, Value::Bool(remember));
        Ok(())
    }

    fn authenticated_user(&self, session: &dyn Session) -> Option<Uuid> {
        session
            .get(AUTH_USER_ID_KEY)
            .and_then(Value::as_str)
            .and_then(|s| Uuid::parse_str(s).ok())
    }
}

/// Whether the session asked to be remembered
pub fn remember_requested(session: &dyn Session) -> bool {
    session
        .get(AUTH_REMEMBER_KEY)
        .and_then(Value::as_bool)
        .unwrap_or(false)
}
