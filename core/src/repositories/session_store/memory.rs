//! In-process session store

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::domain::session::SessionData;
use crate::errors::DomainError;

use super::repository::SessionStore;

/// Session store keeping data in a `HashMap` with per-entry deadlines
#[derive(Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, (SessionData, Instant)>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, session_id: &str) -> Result<Option<SessionData>, DomainError> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .get(session_id)
            .filter(|(_, deadline)| Instant::now() < *deadline)
            .map(|(data, _)| data.clone()))
    }

    async fn save(
        &self,
        session_id: &str,
        data: &SessionData,
        ttl_seconds: u64,
    ) -> Result<(), DomainError> {
        let mut sessions = self.sessions.write().await;
        let now = Instant::now();
        sessions.retain(|_, (_, deadline)| now < *deadline);
        sessions.insert(
            session_id.to_string(),
            (data.clone(), now + Duration::from_secs(ttl_seconds)),
        );
        Ok(())
    }

    async fn destroy(&self, session_id: &str) -> Result<(), DomainError> {
        self.sessions.write().await.remove(session_id);
        Ok(())
    }
}
