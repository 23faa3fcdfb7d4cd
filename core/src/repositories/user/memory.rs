//! In-process user directory with bcrypt-hashed passwords

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::UserRecord;
use crate::errors::DomainError;

use super::repository::{CredentialVerifier, UserLookup};

#[derive(Clone)]
struct StoredUser {
    record: UserRecord,
    password_hash: String,
}

/// User directory held in memory
#[derive(Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<Uuid, StoredUser>>>,
    bcrypt_cost: u32,
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::with_bcrypt_cost(bcrypt::DEFAULT_COST)
    }

    /// Lower costs keep test suites fast
    pub fn with_bcrypt_cost(cost: u32) -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
            bcrypt_cost: cost,
        }
    }

    /// Register a user with a plaintext password
    pub async fn add_user(&self, record: UserRecord, password: &str) -> Result<(), DomainError> {
        let password_hash =
            bcrypt::hash(password, self.bcrypt_cost).map_err(|e| DomainError::Internal {
                message: format!("Failed to hash password: {}", e),
            })?;

        let mut users = self.users.write().await;
        if users.values().any(|u| u.record.email.eq_ignore_ascii_case(&record.email)) {
            return Err(DomainError::Validation {
                message: format!("User {} already exists", record.email),
            });
        }
        users.insert(
            record.id,
            StoredUser {
                record,
                password_hash,
            },
        );
        Ok(())
    }

    /// Replace the stored record, keeping the password
    pub async fn update_user(&self, record: UserRecord) -> Result<(), DomainError> {
        let mut users = self.users.write().await;
        match users.get_mut(&record.id) {
            Some(stored) => {
                stored.record = record;
                Ok(())
            }
            None => Err(DomainError::NotFound {
                resource: format!("user {}", record.id),
            }),
        }
    }

    pub async fn remove_user(&self, id: Uuid) -> bool {
        self.users.write().await.remove(&id).is_some()
    }
}

#[async_trait]
impl CredentialVerifier for InMemoryUserRepository {
    async fn resolve(&self, identifier: &str, secret: &str) -> Result<Option<Uuid>, DomainError> {
        let users = self.users.read().await;
        let Some(stored) = users
            .values()
            .find(|u| u.record.email.eq_ignore_ascii_case(identifier.trim()))
        else {
            return Ok(None);
        };

        let matches = bcrypt::verify(secret, &stored.password_hash).map_err(|e| {
            DomainError::Internal {
                message: format!("Failed to verify password: {}", e),
            }
        })?;

        Ok(matches.then_some(stored.record.id))
    }
}

#[async_trait]
impl UserLookup for InMemoryUserRepository {
    async fn find_user(&self, id: Uuid) -> Result<Option<UserRecord>, DomainError> {
        let users = self.users.read().await;
        Ok(users.get(&id).map(|u| u.record.clone()))
    }
}
