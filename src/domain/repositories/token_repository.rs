//! Repository trait for admin bearer tokens.

use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Admin credential. Only the HMAC digest of the raw token is stored.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AdminToken {
    pub id: i64,
    pub name: String,
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl AdminToken {
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }
}

/// Repository interface for admin token management.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgTokenRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Finds a non-revoked token by its digest.
    async fn find_active_by_hash(&self, token_hash: &str) -> Result<Option<AdminToken>, AppError>;

    /// Records a successful authentication.
    async fn touch(&self, id: i64) -> Result<(), AppError>;

    /// Stores a new token digest.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the name or digest already exists.
    async fn create(&self, name: &str, token_hash: &str) -> Result<AdminToken, AppError>;

    /// Lists all tokens, newest first.
    async fn list(&self) -> Result<Vec<AdminToken>, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<AdminToken>, AppError>;

    async fn find_by_name(&self, name: &str) -> Result<Option<AdminToken>, AppError>;

    /// Revokes a token. Returns `false` if it was missing or already revoked.
    async fn revoke(&self, id: i64) -> Result<bool, AppError>;
}
