//! In-process block repository.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::domain::entities::{BlockRecord, NewBlock};
use crate::domain::repositories::BlockRepository;
use crate::error::AppError;

/// Block repository backed by a concurrent map.
///
/// Has the same upsert semantics as [`super::PgBlockRepository`] but forgets
/// everything on restart. Used by tests and single-process development runs.
#[derive(Default)]
pub struct MemoryBlockRepository {
    records: DashMap<String, BlockRecord>,
    next_id: AtomicI64,
}

impl MemoryBlockRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn build(&self, block: NewBlock) -> BlockRecord {
        let now = Utc::now();
        BlockRecord {
            id: self.next_id.fetch_add(1, Ordering::Relaxed) + 1,
            ip: block.ip,
            reason: block.reason,
            request_count: block.request_count,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

#[async_trait]
impl BlockRepository for MemoryBlockRepository {
    async fn find_by_ip(&self, ip: &str) -> Result<Option<BlockRecord>, AppError> {
        Ok(self.records.get(ip).map(|r| r.value().clone()))
    }

    async fn find_active(&self, ip: &str) -> Result<Option<BlockRecord>, AppError> {
        Ok(self
            .records
            .get(ip)
            .filter(|r| r.active)
            .map(|r| r.value().clone()))
    }

    async fn insert_if_absent(&self, block: NewBlock) -> Result<Option<BlockRecord>, AppError> {
        match self.records.entry(block.ip.clone()) {
            Entry::Occupied(_) => Ok(None),
            Entry::Vacant(slot) => {
                let record = self.build(block);
                slot.insert(record.clone());
                Ok(Some(record))
            }
        }
    }

    async fn upsert_active(
        &self,
        block: NewBlock,
        replace_reason: bool,
    ) -> Result<BlockRecord, AppError> {
        match self.records.entry(block.ip.clone()) {
            Entry::Occupied(mut slot) => {
                let record = slot.get_mut();
                record.active = true;
                if replace_reason {
                    record.reason = block.reason;
                }
                record.updated_at = Utc::now();
                Ok(record.clone())
            }
            Entry::Vacant(slot) => {
                let record = self.build(block);
                slot.insert(record.clone());
                Ok(record)
            }
        }
    }

    async fn deactivate(
        &self,
        ip: &str,
        reason: Option<String>,
    ) -> Result<Option<BlockRecord>, AppError> {
        Ok(self.records.get_mut(ip).map(|mut record| {
            record.active = false;
            if let Some(reason) = reason {
                record.reason = reason;
            }
            record.updated_at = Utc::now();
            record.value().clone()
        }))
    }

    async fn delete(&self, ip: &str) -> Result<bool, AppError> {
        Ok(self.records.remove(ip).is_some())
    }

    async fn list(&self) -> Result<Vec<BlockRecord>, AppError> {
        let mut items: Vec<BlockRecord> = self.records.iter().map(|r| r.value().clone()).collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(items)
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
