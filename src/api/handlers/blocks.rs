//! Handlers for block management endpoints.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::blocks::{
    BlockListResponse, BlockResponse, BlockStats, CreateBlockRequest, UpdateBlockRequest,
};
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::ClientIdentity;

/// Lists all block records, newest first.
///
/// # Endpoint
///
/// `GET /api/admin/blocks`
///
/// # Response
///
/// ```json
/// {
///   "status": "success",
///   "data": [{ "ip": "203.0.113.5", "reason": "abuse report", "active": true, ... }],
///   "stats": { "total": 1, "active": 1 }
/// }
/// ```
pub async fn list_blocks_handler(
    State(state): State<AppState>,
) -> Result<Json<BlockListResponse>, AppError> {
    let list = state.block_service.list().await?;

    Ok(Json(BlockListResponse {
        status: "success",
        stats: BlockStats {
            total: list.total,
            active: list.active,
        },
        data: list.items.into_iter().map(Into::into).collect(),
    }))
}

/// Blocks an identity manually.
///
/// # Endpoint
///
/// `POST /api/admin/blocks`
///
/// An existing record is reactivated; its reason is replaced only when a
/// non-empty `reason` is given.
///
/// # Errors
///
/// Returns 400 if the IP is blank or the reason is too long.
pub async fn create_block_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateBlockRequest>,
) -> Result<(StatusCode, Json<BlockResponse>), AppError> {
    payload.validate()?;

    if payload.ip.trim().is_empty() {
        return Err(AppError::bad_request(
            "Validation failed",
            json!({ "ip": ["IP must not be blank"] }),
        ));
    }

    let identity = ClientIdentity::new(&payload.ip);
    let record = state
        .block_service
        .set_active(&identity, true, payload.reason)
        .await?;

    Ok((StatusCode::CREATED, Json(BlockResponse::new(record))))
}

/// Changes the active flag of a block.
///
/// # Endpoint
///
/// `PATCH /api/admin/blocks/{ip}`
///
/// `{"active": true}` blocks (creating the record if needed),
/// `{"active": false}` unblocks, and a body without `active` (or no body)
/// toggles the current state.
///
/// # Errors
///
/// Returns 404 when unblocking or toggling an identity without a record.
pub async fn update_block_handler(
    Path(ip): Path<String>,
    State(state): State<AppState>,
    payload: Option<Json<UpdateBlockRequest>>,
) -> Result<Json<BlockResponse>, AppError> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    payload.validate()?;

    let identity = ClientIdentity::new(&ip);
    let record = match payload.active {
        Some(active) => {
            state
                .block_service
                .set_active(&identity, active, payload.reason)
                .await?
        }
        None => state.block_service.toggle(&identity, payload.reason).await?,
    };

    Ok(Json(BlockResponse::new(record)))
}

/// Deletes a block record.
///
/// # Endpoint
///
/// `DELETE /api/admin/blocks/{ip}`
///
/// # Errors
///
/// Returns 404 if the identity has no record.
pub async fn delete_block_handler(
    Path(ip): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    state
        .block_service
        .remove(&ClientIdentity::new(&ip))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
