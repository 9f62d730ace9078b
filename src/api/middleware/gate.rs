//! Abuse-control gate applied ahead of every route group.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::application::services::GateService;
use crate::domain::rate_limit::Tier;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::ClientIdentity;

/// Per-route-group gate configuration.
#[derive(Clone)]
pub struct GateState {
    gate: Arc<GateService>,
    tier: Tier,
    trust_proxy: bool,
}

impl GateState {
    pub fn new(state: &AppState, tier: Tier) -> Self {
        Self {
            gate: Arc::clone(&state.gate),
            tier,
            trust_proxy: state.trust_proxy,
        }
    }
}

/// Rejects blocked or over-budget clients before the request reaches a handler.
///
/// # Responses
///
/// - **403 Forbidden**: the client identity has an active block
/// - **429 Too Many Requests**: the tier budget is exhausted
///
/// Block store failures never reject a request.
///
/// # Example
///
/// ```rust,ignore
/// let admin = Router::new()
///     .route("/blocks", get(list_blocks_handler))
///     .layer(middleware::from_fn_with_state(
///         GateState::new(&state, Tier::Admin),
///         gate::layer,
///     ));
/// ```
pub async fn layer(
    State(gate): State<GateState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let identity = ClientIdentity::from_request(&req, gate.trust_proxy);

    gate.gate.evaluate(&identity, gate.tier).await.into_result()?;

    Ok(next.run(req).await)
}
