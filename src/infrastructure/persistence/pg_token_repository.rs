//! PostgreSQL implementation of the admin token repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::repositories::{AdminToken, TokenRepository};
use crate::error::AppError;

/// PostgreSQL repository for admin token digests.
///
/// Raw tokens are never persisted.
pub struct PgTokenRepository {
    pool: Arc<PgPool>,
}

impl PgTokenRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenRepository for PgTokenRepository {
    async fn find_active_by_hash(&self, token_hash: &str) -> Result<Option<AdminToken>, AppError> {
        let row = sqlx::query_as::<_, AdminToken>(
            r#"
            SELECT id, name, token_hash, created_at, last_used_at, revoked_at
            FROM admin_tokens
            WHERE token_hash = $1
              AND revoked_at IS NULL
            "#,
        )
        .bind(token_hash)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row)
    }

    async fn touch(&self, id: i64) -> Result<(), AppError> {
        sqlx::query("UPDATE admin_tokens SET last_used_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }

    async fn create(&self, name: &str, token_hash: &str) -> Result<AdminToken, AppError> {
        let row = sqlx::query_as::<_, AdminToken>(
            r#"
            INSERT INTO admin_tokens (name, token_hash)
            VALUES ($1, $2)
            RETURNING id, name, token_hash, created_at, last_used_at, revoked_at
            "#,
        )
        .bind(name)
        .bind(token_hash)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row)
    }

    async fn list(&self) -> Result<Vec<AdminToken>, AppError> {
        let rows = sqlx::query_as::<_, AdminToken>(
            r#"
            SELECT id, name, token_hash, created_at, last_used_at, revoked_at
            FROM admin_tokens
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<AdminToken>, AppError> {
        let row = sqlx::query_as::<_, AdminToken>(
            r#"
            SELECT id, name, token_hash, created_at, last_used_at, revoked_at
            FROM admin_tokens
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<AdminToken>, AppError> {
        let row = sqlx::query_as::<_, AdminToken>(
            r#"
            SELECT id, name, token_hash, created_at, last_used_at, revoked_at
            FROM admin_tokens
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row)
    }

    async fn revoke(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE admin_tokens
            SET revoked_at = NOW()
            WHERE id = $1 AND revoked_at IS NULL
            "#,
        )
        .bind(id)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
