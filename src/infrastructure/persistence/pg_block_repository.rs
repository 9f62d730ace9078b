//! PostgreSQL implementation of the block repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{BlockRecord, NewBlock};
use crate::domain::repositories::BlockRepository;
use crate::error::AppError;

/// PostgreSQL repository for the `blocked_ips` table.
///
/// Uniqueness of `ip` is enforced by the `blocked_ips_ip_key` constraint, so
/// concurrent escalations for one identity collapse into a single row.
pub struct PgBlockRepository {
    pool: Arc<PgPool>,
}

impl PgBlockRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BlockRepository for PgBlockRepository {
    async fn find_by_ip(&self, ip: &str) -> Result<Option<BlockRecord>, AppError> {
        let row = sqlx::query_as::<_, BlockRecord>(
            r#"
            SELECT id, ip, reason, request_count, active, created_at, updated_at
            FROM blocked_ips
            WHERE ip = $1
            "#,
        )
        .bind(ip)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row)
    }

    async fn find_active(&self, ip: &str) -> Result<Option<BlockRecord>, AppError> {
        let row = sqlx::query_as::<_, BlockRecord>(
            r#"
            SELECT id, ip, reason, request_count, active, created_at, updated_at
            FROM blocked_ips
            WHERE ip = $1
              AND active = TRUE
            "#,
        )
        .bind(ip)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row)
    }

    async fn insert_if_absent(&self, block: NewBlock) -> Result<Option<BlockRecord>, AppError> {
        let row = sqlx::query_as::<_, BlockRecord>(
            r#"
            INSERT INTO blocked_ips (ip, reason, request_count, active)
            VALUES ($1, $2, $3, TRUE)
            ON CONFLICT (ip) DO NOTHING
            RETURNING id, ip, reason, request_count, active, created_at, updated_at
            "#,
        )
        .bind(&block.ip)
        .bind(&block.reason)
        .bind(block.request_count)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row)
    }

    async fn upsert_active(
        &self,
        block: NewBlock,
        replace_reason: bool,
    ) -> Result<BlockRecord, AppError> {
        let row = sqlx::query_as::<_, BlockRecord>(
            r#"
            INSERT INTO blocked_ips (ip, reason, request_count, active)
            VALUES ($1, $2, $3, TRUE)
            ON CONFLICT (ip) DO UPDATE
            SET active = TRUE,
                reason = CASE WHEN $4 THEN EXCLUDED.reason ELSE blocked_ips.reason END,
                updated_at = NOW()
            RETURNING id, ip, reason, request_count, active, created_at, updated_at
            "#,
        )
        .bind(&block.ip)
        .bind(&block.reason)
        .bind(block.request_count)
        .bind(replace_reason)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row)
    }

    async fn deactivate(
        &self,
        ip: &str,
        reason: Option<String>,
    ) -> Result<Option<BlockRecord>, AppError> {
        let row = sqlx::query_as::<_, BlockRecord>(
            r#"
            UPDATE blocked_ips
            SET active = FALSE,
                reason = COALESCE($2, reason),
                updated_at = NOW()
            WHERE ip = $1
            RETURNING id, ip, reason, request_count, active, created_at, updated_at
            "#,
        )
        .bind(ip)
        .bind(reason)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row)
    }

    async fn delete(&self, ip: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM blocked_ips WHERE ip = $1")
            .bind(ip)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self) -> Result<Vec<BlockRecord>, AppError> {
        let rows = sqlx::query_as::<_, BlockRecord>(
            r#"
            SELECT id, ip, reason, request_count, active, created_at, updated_at
            FROM blocked_ips
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(self.pool.as_ref()).await?;
        Ok(())
    }
}
