//! Failed-attempt throttling for login and code submission

mod memory;

pub use memory::InMemoryThrottle;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::RequestContext;
use crate::errors::{AuthError, DomainResult};

/// Counts failed attempts per `RequestContext::throttle_key` and locks out
/// once a configured maximum is reached within the decay window
#[async_trait]
pub trait ThrottleGuard: Send + Sync {
    async fn too_many_attempts(&self, ctx: &RequestContext) -> DomainResult<bool>;

    async fn record_failed_attempt(&self, ctx: &RequestContext) -> DomainResult<()>;

    async fn clear_attempts(&self, ctx: &RequestContext) -> DomainResult<()>;

    /// Describe the active lockout for `ctx`
    async fn lockout_response(&self, ctx: &RequestContext) -> DomainResult<LockoutResponse>;
}

/// Reply sent while a client is locked out
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockoutResponse {
    pub retry_after_seconds: u64,
    pub message: String,
}

impl LockoutResponse {
    pub fn new(retry_after_seconds: u64) -> Self {
        let message = AuthError::TooManyAttempts {
            retry_after_seconds,
        }
        .to_string();
        Self {
            retry_after_seconds,
            message,
        }
    }

    pub fn error(&self) -> AuthError {
        AuthError::TooManyAttempts {
            retry_after_seconds: self.retry_after_seconds,
        }
    }
}
