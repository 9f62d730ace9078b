//! Handler for admin token verification.

use axum::{Extension, Json};

use crate::api::dto::auth::{TokenInfo, VerifyResponse};
use crate::domain::repositories::AdminToken;

/// Confirms that the bearer token is valid.
///
/// # Endpoint
///
/// `GET /api/auth/verify`
///
/// Runs behind the auth-tier limiter, so repeated guessing is rate limited
/// and eventually blocked.
pub async fn verify_handler(Extension(token): Extension<AdminToken>) -> Json<VerifyResponse> {
    Json(VerifyResponse {
        status: "success",
        token: TokenInfo {
            id: token.id,
            name: token.name,
            created_at: token.created_at,
        },
    })
}
