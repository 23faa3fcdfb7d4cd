//! Redis-based login throttle

use async_trait::async_trait;
use redis::AsyncCommands;
use sha2::{Digest, Sha256};
use std::sync::Arc;

use tfa_core::{DomainError, DomainResult, LockoutResponse, RequestContext, ThrottleGuard};
use tfa_shared::ThrottleConfig;

use crate::cache::RedisClient;

/// Fixed-window failure counter shared across server instances
///
/// The first failure in a window sets the expiry; the key's remaining TTL
/// is the lockout reported to the client.
pub struct RedisThrottle {
    redis: Arc<RedisClient>,
    config: ThrottleConfig,
}

impl RedisThrottle {
    pub fn new(redis: Arc<RedisClient>, config: ThrottleConfig) -> Self {
        Self { redis, config }
    }

    fn attempts_key(&self, ctx: &RequestContext) -> String {
        self.redis.key(&["throttle", &hash_key(&ctx.throttle_key())])
    }

    async fn attempts(&self, key: &str) -> DomainResult<u32> {
        let mut conn = self.redis.connection();
        let count: Option<u32> = conn.get(key).await.map_err(|e| DomainError::Internal {
            message: format!("Failed to read attempt counter: {}", e),
        })?;
        Ok(count.unwrap_or(0))
    }
}

#[async_trait]
impl ThrottleGuard for RedisThrottle {
    async fn too_many_attempts(&self, ctx: &RequestContext) -> DomainResult<bool> {
        let key = self.attempts_key(ctx);
        Ok(self.attempts(&key).await? >= self.config.max_attempts)
    }

    async fn record_failed_attempt(&self, ctx: &RequestContext) -> DomainResult<()> {
        let key = self.attempts_key(ctx);
        let mut conn = self.redis.connection();

        let (count,): (u32,) = record_pipeline(&key, self.config.decay_seconds)
            .query_async(&mut conn)
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to record attempt: {}", e),
            })?;

        tracing::debug!(attempts = count, "Failed attempt recorded");
        Ok(())
    }

    async fn clear_attempts(&self, ctx: &RequestContext) -> DomainResult<()> {
        let key = self.attempts_key(ctx);
        let mut conn = self.redis.connection();
        conn.del::<_, ()>(&key).await.map_err(|e| DomainError::Internal {
            message: format!("Failed to clear attempts: {}", e),
        })?;
        Ok(())
    }

    async fn lockout_response(&self, ctx: &RequestContext) -> DomainResult<LockoutResponse> {
        let key = self.attempts_key(ctx);
        let mut conn = self.redis.connection();
        let ttl: i64 = conn.ttl(&key).await.map_err(|e| DomainError::Internal {
            message: format!("Failed to read lockout window: {}", e),
        })?;

        // -1 / -2 mean no expiry or no key
        let retry_after = if ttl > 0 {
            ttl as u64
        } else {
            self.config.decay_seconds
        };
        Ok(LockoutResponse::new(retry_after.max(1)))
    }
}

/// Open the window with its expiry and count the failure in one transaction
fn record_pipeline(key: &str, decay_seconds: u64) -> redis::Pipeline {
    let mut pipe = redis::pipe();
    pipe.atomic()
        .cmd("SET")
        .arg(key)
        .arg(0)
        .arg("EX")
        .arg(decay_seconds.max(1))
        .arg("NX")
        .ignore()
        .incr(key, 1);
    pipe
}

/// Keep raw identifiers and addresses out of Redis key names
fn hash_key(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    format!("{:x}", hasher.finalize())
}
