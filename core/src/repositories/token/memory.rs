//! In-process token store

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::VerificationToken;
use crate::errors::DomainError;

use super::repository::TokenRepository;

/// Token repository backed by a `HashMap` under a `RwLock`
#[derive(Clone, Default)]
pub struct InMemoryTokenRepository {
    tokens: Arc<RwLock<HashMap<Uuid, VerificationToken>>>,
}

impl InMemoryTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.tokens.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tokens.read().await.is_empty()
    }
}

#[async_trait]
impl TokenRepository for InMemoryTokenRepository {
    async fn create(&self, token: &VerificationToken) -> Result<(), DomainError> {
        let mut tokens = self.tokens.write().await;

        if tokens.contains_key(&token.id) {
            return Err(DomainError::persistence(format!(
                "token {} already exists",
                token.id
            )));
        }

        tokens.insert(token.id, token.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<VerificationToken>, DomainError> {
        let tokens = self.tokens.read().await;
        Ok(tokens.get(&id).cloned())
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Vec<VerificationToken>, DomainError> {
        let tokens = self.tokens.read().await;
        let mut found: Vec<_> = tokens
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn update(&self, token: &VerificationToken) -> Result<(), DomainError> {
        let mut tokens = self.tokens.write().await;

        match tokens.get_mut(&token.id) {
            Some(existing) => {
                existing.used = token.used;
                existing.updated_at = token.updated_at;
                Ok(())
            }
            None => Err(DomainError::NotFound {
                resource: format!("token {}", token.id),
            }),
        }
    }

    async fn mark_used(&self, id: Uuid) -> Result<bool, DomainError> {
        // Check and flip under one write lock
        let mut tokens = self.tokens.write().await;

        match tokens.get_mut(&id) {
            Some(token) if !token.used => {
                token.used = true;
                token.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut tokens = self.tokens.write().await;
        Ok(tokens.remove(&id).is_some())
    }

    async fn delete_all_for_user(&self, user_id: Uuid) -> Result<u64, DomainError> {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, t| t.user_id != user_id);
        Ok((before - tokens.len()) as u64)
    }
}
