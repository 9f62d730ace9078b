//! DTOs for token verification.

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub status: &'static str,
    pub token: TokenInfo,
}

/// Public view of an admin token. Never includes the digest.
#[derive(Debug, Serialize)]
pub struct TokenInfo {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}
