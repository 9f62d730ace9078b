//! Domain entity representing a blocked client identity.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Reason recorded for blocks created by an administrator without one.
pub const DEFAULT_MANUAL_REASON: &str = "Blocked by administrator";

/// Durable block record for one client identity.
///
/// At most one record exists per identity. `active = false` keeps the history
/// but lets the identity through the block check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct BlockRecord {
    pub id: i64,
    pub ip: String,
    pub reason: String,
    /// Requests counted in the window that triggered the block; 0 for manual blocks.
    pub request_count: i64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BlockRecord {
    pub fn is_manual(&self) -> bool {
        self.request_count == 0
    }
}

/// Input for creating a block record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBlock {
    pub ip: String,
    pub reason: String,
    pub request_count: i64,
}

impl NewBlock {
    /// Block created by the escalation path after a budget was exceeded.
    pub fn automatic(ip: impl Into<String>, reason: impl Into<String>, request_count: u32) -> Self {
        Self {
            ip: ip.into(),
            reason: reason.into(),
            request_count: i64::from(request_count),
        }
    }

    /// Block created by an administrator.
    pub fn manual(ip: impl Into<String>, reason: Option<String>) -> Self {
        Self {
            ip: ip.into(),
            reason: reason.unwrap_or_else(|| DEFAULT_MANUAL_REASON.to_string()),
            request_count: 0,
        }
    }
}

/// All block records plus derived counts.
#[derive(Debug, Clone, Default)]
pub struct BlockList {
    /// Newest first.
    pub items: Vec<BlockRecord>,
    pub total: usize,
    pub active: usize,
}

impl BlockList {
    pub fn from_records(mut items: Vec<BlockRecord>) -> Self {
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        let active = items.iter().filter(|b| b.active).count();
        Self {
            total: items.len(),
            active,
            items,
        }
    }
}
