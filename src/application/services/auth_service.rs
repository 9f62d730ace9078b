//! Admin token authentication.

use hmac::{Hmac, Mac};
use rand::Rng;
use serde_json::json;
use sha2::Sha256;
use std::sync::Arc;

use crate::domain::repositories::{AdminToken, TokenRepository};
use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

const TOKEN_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Length of generated admin tokens.
pub const TOKEN_LENGTH: usize = 48;

/// Hashes a raw token with HMAC-SHA256 keyed by the server signing secret.
///
/// Returns a 64-character lowercase hex digest. The admin CLI and the
/// running server must agree on `secret`.
pub fn hash_token(secret: &str, token: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(token.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Generates a random alphanumeric admin token.
pub fn generate_token() -> String {
    let mut rng = rand::rng();
    (0..TOKEN_LENGTH)
        .map(|_| TOKEN_CHARSET[rng.random_range(0..TOKEN_CHARSET.len())] as char)
        .collect()
}

/// Service guarding the admin tier with bearer tokens.
pub struct AuthService {
    repository: Arc<dyn TokenRepository>,
    signing_secret: String,
}

impl AuthService {
    pub fn new(repository: Arc<dyn TokenRepository>, signing_secret: String) -> Self {
        Self {
            repository,
            signing_secret,
        }
    }

    /// Authenticates a raw bearer token.
    ///
    /// Updates `last_used_at` on success; a failed update does not reject
    /// the request.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] if the token is unknown or revoked.
    pub async fn authenticate(&self, token: &str) -> Result<AdminToken, AppError> {
        let token_hash = hash_token(&self.signing_secret, token);

        let Some(admin) = self.repository.find_active_by_hash(&token_hash).await? else {
            return Err(AppError::unauthorized(
                "Unauthorized",
                json!({ "reason": "Invalid or revoked token" }),
            ));
        };

        if let Err(e) = self.repository.touch(admin.id).await {
            tracing::warn!(token_id = admin.id, error = %e, "Failed to update token last_used_at");
        }

        Ok(admin)
    }

    /// Creates a token and returns it with its raw value.
    ///
    /// The raw value is not recoverable afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if a token with this name exists.
    pub async fn issue(&self, name: &str) -> Result<(AdminToken, String), AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::bad_request(
                "Token name must not be empty",
                json!({}),
            ));
        }

        let raw = generate_token();
        let token = self
            .repository
            .create(name, &hash_token(&self.signing_secret, &raw))
            .await?;

        tracing::info!(token_id = token.id, name = %token.name, "Admin token issued");
        Ok((token, raw))
    }

    pub async fn list(&self) -> Result<Vec<AdminToken>, AppError> {
        self.repository.list().await
    }

    /// Revokes a token by id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no active token has this id.
    pub async fn revoke(&self, id: i64) -> Result<(), AppError> {
        if !self.repository.revoke(id).await? {
            return Err(AppError::not_found(
                "Token not found or already revoked",
                json!({ "id": id }),
            ));
        }

        tracing::info!(token_id = id, "Admin token revoked");
        Ok(())
    }
}
