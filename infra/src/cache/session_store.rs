//! Redis-backed session storage

use async_trait::async_trait;
use redis::AsyncCommands;
use std::sync::Arc;

use tfa_core::{DomainError, SessionData, SessionStore};

use super::RedisClient;
use crate::InfrastructureError;

/// Sessions stored as JSON under `<prefix>:session:<id>` with a TTL
#[derive(Clone)]
pub struct RedisSessionStore {
    redis: Arc<RedisClient>,
}

impl RedisSessionStore {
    pub fn new(redis: Arc<RedisClient>) -> Self {
        Self { redis }
    }

    fn session_key(&self, id: &str) -> String {
        self.redis.key(&["session", id])
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn load(&self, id: &str) -> Result<Option<SessionData>, DomainError> {
        let mut conn = self.redis.connection();
        let raw: Option<String> = conn
            .get(self.session_key(id))
            .await
            .map_err(InfrastructureError::from)?;

        match raw {
            Some(json) => {
                let data = serde_json::from_str(&json).map_err(InfrastructureError::from)?;
                Ok(Some(data))
            }
            None => Ok(None),
        }
    }

    async fn save(&self, id: &str, data: &SessionData, ttl_seconds: u64) -> Result<(), DomainError> {
        let json = serde_json::to_string(data).map_err(InfrastructureError::from)?;
        let mut conn = self.redis.connection();
        conn.set_ex::<_, _, ()>(self.session_key(id), json, ttl_seconds.max(1))
            .await
            .map_err(InfrastructureError::from)?;

        tracing::debug!(ttl_seconds = ttl_seconds, "Session saved");
        Ok(())
    }

    async fn destroy(&self, id: &str) -> Result<(), DomainError> {
        let mut conn = self.redis.connection();
        conn.del::<_, ()>(self.session_key(id))
            .await
            .map_err(InfrastructureError::from)?;
        Ok(())
    }
}
