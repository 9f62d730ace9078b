//! Repository trait for the persistent block list.

use crate::domain::entities::{BlockRecord, NewBlock};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for block records.
///
/// Implementations must guarantee at most one record per `ip`, also under
/// concurrent writers.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgBlockRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::MemoryBlockRepository`] - in-process map
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlockRepository: Send + Sync {
    /// Finds the record for an identity, active or not.
    async fn find_by_ip(&self, ip: &str) -> Result<Option<BlockRecord>, AppError>;

    /// Finds the record for an identity only if it is active.
    async fn find_active(&self, ip: &str) -> Result<Option<BlockRecord>, AppError>;

    /// Inserts a record unless one already exists for the identity.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(record))` if this call created the record
    /// - `Ok(None)` if a record already existed (it is left untouched)
    async fn insert_if_absent(&self, block: NewBlock) -> Result<Option<BlockRecord>, AppError>;

    /// Creates an active record, or reactivates the existing one.
    ///
    /// `block.reason` replaces the stored reason only when `replace_reason` is set.
    async fn upsert_active(
        &self,
        block: NewBlock,
        replace_reason: bool,
    ) -> Result<BlockRecord, AppError>;

    /// Marks an existing record inactive, optionally replacing its reason.
    ///
    /// Returns `Ok(None)` if no record exists.
    async fn deactivate(
        &self,
        ip: &str,
        reason: Option<String>,
    ) -> Result<Option<BlockRecord>, AppError>;

    /// Hard-deletes a record. Returns `true` if a row was removed.
    async fn delete(&self, ip: &str) -> Result<bool, AppError>;

    /// Lists every record, newest first.
    async fn list(&self) -> Result<Vec<BlockRecord>, AppError>;

    /// Cheap round trip used by health checks.
    async fn ping(&self) -> Result<(), AppError>;
}
