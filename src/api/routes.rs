//! API route groups.
//!
//! Each group is gated with its own rate-limit tier in
//! [`crate::routes::app_router`].

use crate::api::handlers::{
    create_block_handler, delete_block_handler, health_handler, list_blocks_handler,
    update_block_handler, verify_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, patch},
};

/// Block management, nested under `/api/admin`.
///
/// # Endpoints
///
/// - `GET    /blocks`       - List block records with totals
/// - `POST   /blocks`       - Block an identity manually
/// - `PATCH  /blocks/{ip}`  - Activate, deactivate or toggle a block
/// - `DELETE /blocks/{ip}`  - Delete a block record
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/blocks",
            get(list_blocks_handler).post(create_block_handler),
        )
        .route(
            "/blocks/{ip}",
            patch(update_block_handler).delete(delete_block_handler),
        )
}

/// Credential-checking routes, nested under `/api/auth`.
///
/// - `GET /verify` - Validate an admin bearer token
pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/verify", get(verify_handler))
}

/// Unauthenticated routes.
///
/// - `GET /api/health` - Block store and counter health
pub fn public_routes() -> Router<AppState> {
    Router::new().route("/api/health", get(health_handler))
}
