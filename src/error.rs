//! Application error type and its HTTP mapping.
//!
//! Every error leaves the service as a JSON body of the shape
//!
//! ```json
//! { "status": "error", "code": "rate_limited", "message": "..." }
//! ```
//!
//! Block denials additionally carry `blocked_at`, and errors raised by the
//! admin surface may carry a `details` object.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Value, json};

/// Message returned to clients that hit an active block.
pub const BLOCKED_MESSAGE: &str = "Access denied. Your IP has been blocked.";

/// Message returned to clients that exceed their tier budget.
pub const RATE_LIMITED_MESSAGE: &str = "Too many requests, please try again later.";

#[derive(Serialize)]
struct ErrorBody {
    status: &'static str,
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    blocked_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "is_empty_details")]
    details: Value,
}

fn is_empty_details(details: &Value) -> bool {
    match details {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Validation { message: String, details: Value },

    #[error("{message}")]
    Unauthorized { message: String, details: Value },

    #[error("{message}")]
    NotFound { message: String, details: Value },

    #[error("{message}")]
    Conflict { message: String, details: Value },

    #[error("{message}")]
    Internal { message: String, details: Value },

    /// The client identity has an active block record.
    #[error("{message}")]
    Blocked {
        message: String,
        blocked_at: DateTime<Utc>,
    },

    /// The client exceeded its tier budget in the current window.
    #[error("{message}")]
    RateLimited { message: String },

    /// The durable block store failed or did not answer in time.
    #[error("block store unavailable: {message}")]
    StoreUnavailable { message: String },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }

    pub fn unauthorized(message: impl Into<String>, details: Value) -> Self {
        Self::Unauthorized {
            message: message.into(),
            details,
        }
    }

    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }

    pub fn conflict(message: impl Into<String>, details: Value) -> Self {
        Self::Conflict {
            message: message.into(),
            details,
        }
    }

    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    pub fn blocked(blocked_at: DateTime<Utc>) -> Self {
        Self::Blocked {
            message: BLOCKED_MESSAGE.to_string(),
            blocked_at,
        }
    }

    pub fn rate_limited() -> Self {
        Self::RateLimited {
            message: RATE_LIMITED_MESSAGE.to_string(),
        }
    }

    pub fn store_unavailable(message: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            message: message.into(),
        }
    }

    /// HTTP status this error is rendered with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Blocked { .. } => StatusCode::FORBIDDEN,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::StoreUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let is_unauthorized = matches!(self, AppError::Unauthorized { .. });

        let (code, message, blocked_at, details) = match self {
            AppError::Validation { message, details } => {
                ("validation_error", message, None, details)
            }
            AppError::Unauthorized { message, details } => {
                ("unauthorized", message, None, details)
            }
            AppError::NotFound { message, details } => ("not_found", message, None, details),
            AppError::Conflict { message, details } => ("conflict", message, None, details),
            AppError::Internal { message, details } => ("internal_error", message, None, details),
            AppError::Blocked {
                message,
                blocked_at,
            } => ("blocked", message, Some(blocked_at), Value::Null),
            AppError::RateLimited { message } => ("rate_limited", message, None, Value::Null),
            // Store internals are not echoed to clients.
            AppError::StoreUnavailable { .. } => (
                "store_unavailable",
                "Service temporarily unavailable".to_string(),
                None,
                Value::Null,
            ),
        };

        let body = ErrorBody {
            status: "error",
            code,
            message,
            blocked_at,
            details,
        };

        let mut response = (status, Json(body)).into_response();

        if is_unauthorized {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }

        response
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db) = e.as_database_error()
            && db.is_unique_violation()
        {
            return AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": db.constraint() }),
            );
        }

        tracing::error!(error = %e, "Database error");
        AppError::internal("Database error", json!({}))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        AppError::bad_request("Validation failed", json!(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_rate_limited_response_shape() {
        let response = AppError::rate_limited().into_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

        let json = body_json(response).await;
        assert_eq!(json["status"], "error");
        assert_eq!(json["message"], RATE_LIMITED_MESSAGE);
        assert!(json.get("blocked_at").is_none());
        assert!(json.get("details").is_none());
    }

    #[tokio::test]
    async fn test_blocked_response_carries_timestamp() {
        let blocked_at = Utc::now();
        let response = AppError::blocked(blocked_at).into_response();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let json = body_json(response).await;
        assert_eq!(json["status"], "error");
        assert_eq!(json["message"], BLOCKED_MESSAGE);
        assert_eq!(json["blocked_at"], json!(blocked_at));
    }

    #[tokio::test]
    async fn test_unauthorized_sets_www_authenticate() {
        let response = AppError::unauthorized("Unauthorized", json!({})).into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
    }

    #[tokio::test]
    async fn test_store_unavailable_hides_cause() {
        let response = AppError::store_unavailable("connection refused").into_response();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let json = body_json(response).await;
        assert_eq!(json["code"], "store_unavailable");
        assert!(!json["message"].as_str().unwrap().contains("refused"));
    }
}
