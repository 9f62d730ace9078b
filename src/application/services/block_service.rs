//! Block list service.

use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::entities::{BlockList, BlockRecord, NewBlock};
use crate::domain::repositories::BlockRepository;
use crate::error::AppError;
use crate::utils::ClientIdentity;

/// Default bound on a single block store call.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_millis(500);

/// Service owning the lifecycle of block records.
///
/// Every repository call is bounded by a timeout. Timeouts and database
/// failures surface as [`AppError::StoreUnavailable`]; the gate decides what
/// to do with them.
///
/// # Lifecycle
///
/// ```text
///            record_auto_block / set_active(true)
///   (none) ─────────────────────────────────────▶ active
///                                                  │  ▲
///                              set_active(false)   │  │ set_active(true)
///                                                  ▼  │
///                                                inactive
///
///   active | inactive ──remove──▶ (none)
/// ```
pub struct BlockService {
    repository: Arc<dyn BlockRepository>,
    timeout: Duration,
}

impl BlockService {
    pub fn new(repository: Arc<dyn BlockRepository>, timeout: Duration) -> Self {
        Self {
            repository,
            timeout,
        }
    }

    async fn bounded<T, F>(&self, op: &'static str, fut: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, AppError>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(AppError::Internal { message, .. })) => {
                metrics::counter!("gate_store_errors_total", "op" => op).increment(1);
                Err(AppError::store_unavailable(format!("{op}: {message}")))
            }
            Ok(Err(e)) => Err(e),
            Err(_) => {
                metrics::counter!("gate_store_errors_total", "op" => op).increment(1);
                Err(AppError::store_unavailable(format!(
                    "{op}: timed out after {}ms",
                    self.timeout.as_millis()
                )))
            }
        }
    }

    /// Returns the active block for an identity, if any.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StoreUnavailable`] if the store fails or times out.
    pub async fn active_block(
        &self,
        identity: &ClientIdentity,
    ) -> Result<Option<BlockRecord>, AppError> {
        self.bounded("lookup", self.repository.find_active(identity.as_str()))
            .await
    }

    /// Returns whether an identity is currently blocked.
    pub async fn is_active(&self, identity: &ClientIdentity) -> Result<bool, AppError> {
        Ok(self.active_block(identity).await?.is_some())
    }

    /// Records an automatic block unless the identity already has a record.
    ///
    /// An existing record, active or not, is preserved. Store failures are
    /// logged and swallowed.
    ///
    /// Returns the new record if this call created it.
    pub async fn record_auto_block(
        &self,
        identity: &ClientIdentity,
        reason: String,
        request_count: u32,
    ) -> Option<BlockRecord> {
        let block = NewBlock::automatic(identity.as_str(), reason, request_count);

        match self
            .bounded("auto_block", self.repository.insert_if_absent(block))
            .await
        {
            Ok(Some(record)) => {
                tracing::info!(
                    ip = %identity,
                    request_count,
                    reason = %record.reason,
                    "Auto-blocked client"
                );
                Some(record)
            }
            Ok(None) => {
                tracing::debug!(ip = %identity, "Block record already exists, skipping auto-block");
                None
            }
            Err(e) => {
                tracing::error!(ip = %identity, error = %e, "Failed to persist auto-block");
                None
            }
        }
    }

    /// Sets the active flag of an identity's block.
    ///
    /// - `active = true`: reactivates the existing record (replacing its reason
    ///   when one is given) or creates a new active record with
    ///   `request_count = 0`
    /// - `active = false`: deactivates the existing record, keeping history
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] when deactivating an identity without a record.
    /// Returns [`AppError::StoreUnavailable`] if the store fails or times out.
    pub async fn set_active(
        &self,
        identity: &ClientIdentity,
        active: bool,
        reason: Option<String>,
    ) -> Result<BlockRecord, AppError> {
        let reason = reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());

        let record = if active {
            let replace_reason = reason.is_some();
            let block = NewBlock::manual(identity.as_str(), reason);
            self.bounded(
                "set_active",
                self.repository.upsert_active(block, replace_reason),
            )
            .await?
        } else {
            self.bounded(
                "set_active",
                self.repository.deactivate(identity.as_str(), reason),
            )
            .await?
            .ok_or_else(|| not_found(identity))?
        };

        tracing::info!(ip = %identity, active = record.active, "Block status changed");
        Ok(record)
    }

    /// Flips the active flag of an existing record, optionally replacing its reason.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the identity has no record.
    pub async fn toggle(
        &self,
        identity: &ClientIdentity,
        reason: Option<String>,
    ) -> Result<BlockRecord, AppError> {
        let current = self
            .bounded("toggle", self.repository.find_by_ip(identity.as_str()))
            .await?
            .ok_or_else(|| not_found(identity))?;

        self.set_active(identity, !current.active, reason).await
    }

    /// Hard-deletes an identity's record.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the identity has no record.
    pub async fn remove(&self, identity: &ClientIdentity) -> Result<(), AppError> {
        let removed = self
            .bounded("remove", self.repository.delete(identity.as_str()))
            .await?;

        if !removed {
            return Err(not_found(identity));
        }

        tracing::info!(ip = %identity, "Block record removed");
        Ok(())
    }

    /// Finds an identity's record, active or not.
    pub async fn find(&self, identity: &ClientIdentity) -> Result<Option<BlockRecord>, AppError> {
        self.bounded("find", self.repository.find_by_ip(identity.as_str()))
            .await
    }

    /// Lists all records newest first, with totals.
    pub async fn list(&self) -> Result<BlockList, AppError> {
        let records = self.bounded("list", self.repository.list()).await?;
        Ok(BlockList::from_records(records))
    }

    /// Checks that the store answers within the timeout.
    pub async fn health_check(&self) -> Result<(), AppError> {
        self.bounded("ping", self.repository.ping()).await
    }
}

fn not_found(identity: &ClientIdentity) -> AppError {
    AppError::not_found("Block not found", json!({ "ip": identity.as_str() }))
}
