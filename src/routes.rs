//! Top-level router configuration.
//!
//! # Route Structure
//!
//! | Prefix         | Tier   | Auth   |
//! |----------------|--------|--------|
//! | `/api/auth/*`  | auth   | bearer |
//! | `/api/admin/*` | admin  | bearer |
//! | everything else| public | none   |
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Gate** - Block list check and per-tier rate limiting, ahead of every route
//! - **Authentication** - Bearer token, checked after the gate so guessing is counted
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::middleware::gate::GateState;
use crate::api::middleware::{auth, gate, tracing};
use crate::domain::rate_limit::Tier;
use crate::error::AppError;
use crate::state::AppState;
use axum::http::Uri;
use axum::{Router, middleware};
use serde_json::json;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(api_router(state))
}

/// Gated routes without path normalization.
pub fn api_router(state: AppState) -> Router {
    let admin_router = api::routes::admin_routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer))
        .layer(middleware::from_fn_with_state(
            GateState::new(&state, Tier::Admin),
            gate::layer,
        ));

    let auth_router = api::routes::auth_routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer))
        .layer(middleware::from_fn_with_state(
            GateState::new(&state, Tier::Auth),
            gate::layer,
        ));

    let public_router = api::routes::public_routes()
        .fallback(not_found_handler)
        .layer(middleware::from_fn_with_state(
            GateState::new(&state, Tier::Public),
            gate::layer,
        ));

    Router::new()
        .nest("/api/admin", admin_router)
        .nest("/api/auth", auth_router)
        .merge(public_router)
        .with_state(state)
        .layer(tracing::layer())
}

async fn not_found_handler(uri: Uri) -> AppError {
    AppError::not_found("Not found", json!({ "path": uri.path() }))
}
