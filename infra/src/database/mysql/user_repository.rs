//! Read access to the `users` table for the second-factor flow.

use async_trait::async_trait;
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use tfa_core::{CredentialVerifier, DomainError, UserLookup, UserRecord};

use super::{db_error, parse_uuid};

/// User directory backed by MySQL, passwords stored as bcrypt hashes
pub struct MySqlUserRepository {
    pool: MySqlPool,
}

impl MySqlUserRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_user(row: &sqlx::mysql::MySqlRow) -> Result<UserRecord, DomainError> {
        let id: String = row.try_get("id").map_err(|e| db_error("id", e))?;

        Ok(UserRecord {
            id: parse_uuid(&id, "users.id")?,
            email: row.try_get("email").map_err(|e| db_error("email", e))?,
            country_code: row
                .try_get("country_code")
                .map_err(|e| db_error("country_code", e))?,
            phone: row.try_get("phone").map_err(|e| db_error("phone", e))?,
            second_factor_enabled: row
                .try_get("tfa_enabled")
                .map_err(|e| db_error("tfa_enabled", e))?,
        })
    }
}

#[async_trait]
impl CredentialVerifier for MySqlUserRepository {
    async fn resolve(&self, identifier: &str, secret: &str) -> Result<Option<Uuid>, DomainError> {
        let row = sqlx::query("SELECT id, password FROM users WHERE email = ?")
            .bind(identifier.trim())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to look up credentials", e))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let id: String = row.try_get("id").map_err(|e| db_error("id", e))?;
        let hash: String = row.try_get("password").map_err(|e| db_error("password", e))?;

        let matches = bcrypt::verify(secret, &hash).map_err(|e| DomainError::Internal {
            message: format!("Failed to verify password: {}", e),
        })?;

        if matches {
            Ok(Some(parse_uuid(&id, "users.id")?))
        } else {
            Ok(None)
        }
    }
}

#[async_trait]
impl UserLookup for MySqlUserRepository {
    async fn find_user(&self, id: Uuid) -> Result<Option<UserRecord>, DomainError> {
        let row = sqlx::query(
            "SELECT id, email, country_code, phone, tfa_enabled FROM users WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find user", e))?;

        row.as_ref().map(Self::row_to_user).transpose()
    }
}
