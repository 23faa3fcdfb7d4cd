//! MySQL implementation of the TokenRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use tfa_core::{DomainError, TokenRepository, VerificationToken};

use super::{db_error, parse_uuid};

const SELECT_COLUMNS: &str = "SELECT id, code, used, user_id, created_at, updated_at FROM tfa_tokens";

/// Token store over the `tfa_tokens` table
pub struct MySqlTokenRepository {
    pool: MySqlPool,
}

impl MySqlTokenRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_token(row: &sqlx::mysql::MySqlRow) -> Result<VerificationToken, DomainError> {
        let id: String = row.try_get("id").map_err(|e| db_error("id", e))?;
        let user_id: String = row.try_get("user_id").map_err(|e| db_error("user_id", e))?;

        Ok(VerificationToken {
            id: parse_uuid(&id, "tfa_tokens.id")?,
            code: row.try_get("code").map_err(|e| db_error("code", e))?,
            user_id: parse_uuid(&user_id, "tfa_tokens.user_id")?,
            used: row.try_get("used").map_err(|e| db_error("used", e))?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(|e| db_error("created_at", e))?,
            updated_at: row
                .try_get::<DateTime<Utc>, _>("updated_at")
                .map_err(|e| db_error("updated_at", e))?,
        })
    }
}

#[async_trait]
impl TokenRepository for MySqlTokenRepository {
    async fn create(&self, token: &VerificationToken) -> Result<(), DomainError> {
        let query = r#"
            INSERT INTO tfa_tokens (id, code, used, user_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(token.id.to_string())
            .bind(&token.code)
            .bind(token.used)
            .bind(token.user_id.to_string())
            .bind(token.created_at)
            .bind(token.updated_at)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to create token", e))?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<VerificationToken>, DomainError> {
        let query = format!("{} WHERE id = ?", SELECT_COLUMNS);

        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to find token", e))?;

        row.as_ref().map(Self::row_to_token).transpose()
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Vec<VerificationToken>, DomainError> {
        let query = format!("{} WHERE user_id = ? ORDER BY created_at DESC", SELECT_COLUMNS);

        let rows = sqlx::query(&query)
            .bind(user_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Failed to find user tokens", e))?;

        rows.iter().map(Self::row_to_token).collect()
    }

    async fn update(&self, token: &VerificationToken) -> Result<(), DomainError> {
        let result = sqlx::query("UPDATE tfa_tokens SET used = ?, updated_at = ? WHERE id = ?")
            .bind(token.used)
            .bind(token.updated_at)
            .bind(token.id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to update token", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound {
                resource: format!("token {}", token.id),
            });
        }
        Ok(())
    }

    async fn mark_used(&self, id: Uuid) -> Result<bool, DomainError> {
        let result = sqlx::query(
            "UPDATE tfa_tokens SET used = TRUE, updated_at = ? WHERE id = ? AND used = FALSE",
        )
        .bind(Utc::now())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to mark token used", e))?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM tfa_tokens WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to delete token", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_all_for_user(&self, user_id: Uuid) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM tfa_tokens WHERE user_id = ?")
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to delete user tokens", e))?;

        Ok(result.rows_affected())
    }
}
