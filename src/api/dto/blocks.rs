//! DTOs for block management.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entities::BlockRecord;

/// Block record as returned by the admin API.
#[derive(Debug, Serialize)]
pub struct BlockItem {
    pub id: i64,
    pub ip: String,
    pub reason: String,
    pub request_count: i64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BlockRecord> for BlockItem {
    fn from(r: BlockRecord) -> Self {
        Self {
            id: r.id,
            ip: r.ip,
            reason: r.reason,
            request_count: r.request_count,
            active: r.active,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BlockStats {
    pub total: usize,
    pub active: usize,
}

/// Response for `GET /api/admin/blocks`.
#[derive(Debug, Serialize)]
pub struct BlockListResponse {
    pub status: &'static str,
    pub data: Vec<BlockItem>,
    pub stats: BlockStats,
}

/// Response carrying a single block record.
#[derive(Debug, Serialize)]
pub struct BlockResponse {
    pub status: &'static str,
    pub message: String,
    pub data: BlockItem,
}

impl BlockResponse {
    pub fn new(record: BlockRecord) -> Self {
        let message = if record.active {
            format!("{} is blocked", record.ip)
        } else {
            format!("{} is unblocked", record.ip)
        };

        Self {
            status: "success",
            message,
            data: record.into(),
        }
    }
}

/// Manual block request.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBlockRequest {
    #[validate(length(min = 1, max = 64, message = "IP must be 1-64 characters"))]
    pub ip: String,

    #[validate(length(max = 500, message = "Reason must be at most 500 characters"))]
    pub reason: Option<String>,
}

/// Partial update of a block.
///
/// Omitting `active` toggles the current state.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateBlockRequest {
    pub active: Option<bool>,

    #[validate(length(max = 500, message = "Reason must be at most 500 characters"))]
    pub reason: Option<String>,
}
