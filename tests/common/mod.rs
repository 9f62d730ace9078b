#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use site_guard::application::services::auth_service::hash_token;
use site_guard::domain::entities::{BlockRecord, NewBlock};
use site_guard::domain::rate_limit::{TierPolicy, WindowCounter};
use site_guard::domain::repositories::{AdminToken, BlockRepository, TokenRepository};
use site_guard::error::AppError;
use site_guard::infrastructure::persistence::MemoryBlockRepository;
use site_guard::routes::api_router;
use site_guard::state::{AppState, StateSettings};

pub const SIGNING_SECRET: &str = "test-signing-secret";
pub const ADMIN_TOKEN: &str = "test-admin-token";

/// Token repository holding rows in memory.
#[derive(Default)]
pub struct MemoryTokenRepository {
    tokens: DashMap<i64, AdminToken>,
    next_id: AtomicI64,
}

impl MemoryTokenRepository {
    pub fn with_token(name: &str, raw: &str) -> Self {
        let repo = Self::default();
        let id = repo.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        repo.tokens.insert(
            id,
            AdminToken {
                id,
                name: name.to_string(),
                token_hash: hash_token(SIGNING_SECRET, raw),
                created_at: Utc::now(),
                last_used_at: None,
                revoked_at: None,
            },
        );
        repo
    }
}

#[async_trait]
impl TokenRepository for MemoryTokenRepository {
    async fn find_active_by_hash(&self, token_hash: &str) -> Result<Option<AdminToken>, AppError> {
        Ok(self
            .tokens
            .iter()
            .find(|t| t.token_hash == token_hash && !t.is_revoked())
            .map(|t| t.value().clone()))
    }

    async fn touch(&self, id: i64) -> Result<(), AppError> {
        if let Some(mut token) = self.tokens.get_mut(&id) {
            token.last_used_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn create(&self, name: &str, token_hash: &str) -> Result<AdminToken, AppError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let token = AdminToken {
            id,
            name: name.to_string(),
            token_hash: token_hash.to_string(),
            created_at: Utc::now(),
            last_used_at: None,
            revoked_at: None,
        };
        self.tokens.insert(id, token.clone());
        Ok(token)
    }

    async fn list(&self) -> Result<Vec<AdminToken>, AppError> {
        Ok(self.tokens.iter().map(|t| t.value().clone()).collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<AdminToken>, AppError> {
        Ok(self.tokens.get(&id).map(|t| t.value().clone()))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<AdminToken>, AppError> {
        Ok(self
            .tokens
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.value().clone()))
    }

    async fn revoke(&self, id: i64) -> Result<bool, AppError> {
        Ok(match self.tokens.get_mut(&id) {
            Some(mut token) if token.revoked_at.is_none() => {
                token.revoked_at = Some(Utc::now());
                true
            }
            _ => false,
        })
    }
}

fn store_down() -> AppError {
    AppError::internal("connection refused", serde_json::json!({}))
}

/// Block repository whose every call fails.
pub struct FailingBlockRepository;

#[async_trait]
impl BlockRepository for FailingBlockRepository {
    async fn find_by_ip(&self, _ip: &str) -> Result<Option<BlockRecord>, AppError> {
        Err(store_down())
    }

    async fn find_active(&self, _ip: &str) -> Result<Option<BlockRecord>, AppError> {
        Err(store_down())
    }

    async fn insert_if_absent(&self, _block: NewBlock) -> Result<Option<BlockRecord>, AppError> {
        Err(store_down())
    }

    async fn upsert_active(
        &self,
        _block: NewBlock,
        _replace_reason: bool,
    ) -> Result<BlockRecord, AppError> {
        Err(store_down())
    }

    async fn deactivate(
        &self,
        _ip: &str,
        _reason: Option<String>,
    ) -> Result<Option<BlockRecord>, AppError> {
        Err(store_down())
    }

    async fn delete(&self, _ip: &str) -> Result<bool, AppError> {
        Err(store_down())
    }

    async fn list(&self) -> Result<Vec<BlockRecord>, AppError> {
        Err(store_down())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Err(store_down())
    }
}

/// Block repository whose lookups hang past any reasonable timeout.
///
/// Writes go to an inner memory repository.
#[derive(Default)]
pub struct SlowBlockRepository {
    pub inner: MemoryBlockRepository,
}

const HANG: Duration = Duration::from_secs(30);

#[async_trait]
impl BlockRepository for SlowBlockRepository {
    async fn find_by_ip(&self, ip: &str) -> Result<Option<BlockRecord>, AppError> {
        self.inner.find_by_ip(ip).await
    }

    async fn find_active(&self, _ip: &str) -> Result<Option<BlockRecord>, AppError> {
        tokio::time::sleep(HANG).await;
        Ok(None)
    }

    async fn insert_if_absent(&self, block: NewBlock) -> Result<Option<BlockRecord>, AppError> {
        self.inner.insert_if_absent(block).await
    }

    async fn upsert_active(
        &self,
        block: NewBlock,
        replace_reason: bool,
    ) -> Result<BlockRecord, AppError> {
        self.inner.upsert_active(block, replace_reason).await
    }

    async fn deactivate(
        &self,
        ip: &str,
        reason: Option<String>,
    ) -> Result<Option<BlockRecord>, AppError> {
        self.inner.deactivate(ip, reason).await
    }

    async fn delete(&self, ip: &str) -> Result<bool, AppError> {
        self.inner.delete(ip).await
    }

    async fn list(&self) -> Result<Vec<BlockRecord>, AppError> {
        self.inner.list().await
    }

    async fn ping(&self) -> Result<(), AppError> {
        tokio::time::sleep(HANG).await;
        Ok(())
    }
}

pub fn create_test_state(policy: TierPolicy, blocks: Arc<dyn BlockRepository>) -> AppState {
    let tokens = Arc::new(MemoryTokenRepository::with_token("test", ADMIN_TOKEN));
    let counter = Arc::new(WindowCounter::new(policy));

    AppState::new(
        blocks,
        tokens,
        counter,
        StateSettings {
            store_timeout: Duration::from_millis(100),
            token_signing_secret: SIGNING_SECRET.to_string(),
            trust_proxy: true,
        },
    )
}

pub fn make_server(state: AppState) -> TestServer {
    TestServer::new(api_router(state)).unwrap()
}

pub fn bearer() -> String {
    format!("Bearer {ADMIN_TOKEN}")
}
