//! PostgreSQL admin token repository tests. Require `DATABASE_URL`; run with
//! `cargo test -- --ignored`.

use sqlx::PgPool;
use std::sync::Arc;
use site_guard::domain::repositories::TokenRepository;
use site_guard::error::AppError;
use site_guard::infrastructure::persistence::PgTokenRepository;

#[sqlx::test]
#[ignore]
async fn test_create_token(pool: PgPool) {
    let repo = PgTokenRepository::new(Arc::new(pool));

    let token = repo.create("laptop", "hash123").await.unwrap();

    assert_eq!(token.name, "laptop");
    assert_eq!(token.token_hash, "hash123");
    assert!(token.revoked_at.is_none());
    assert!(token.last_used_at.is_none());
}

#[sqlx::test]
#[ignore]
async fn test_duplicate_name_is_conflict(pool: PgPool) {
    let repo = PgTokenRepository::new(Arc::new(pool));

    repo.create("laptop", "hash-a").await.unwrap();
    let result = repo.create("laptop", "hash-b").await;

    assert!(matches!(result, Err(AppError::Conflict { .. })));
}

#[sqlx::test]
#[ignore]
async fn test_find_active_by_hash(pool: PgPool) {
    let repo = PgTokenRepository::new(Arc::new(pool));

    repo.create("valid", "validhash").await.unwrap();

    assert!(repo.find_active_by_hash("validhash").await.unwrap().is_some());
    assert!(repo.find_active_by_hash("nonexistent").await.unwrap().is_none());
}

#[sqlx::test]
#[ignore]
async fn test_revoked_token_is_not_active(pool: PgPool) {
    let repo = PgTokenRepository::new(Arc::new(pool));

    let token = repo.create("revoked", "revokedhash").await.unwrap();

    assert!(repo.revoke(token.id).await.unwrap());
    assert!(!repo.revoke(token.id).await.unwrap());
    assert!(repo.find_active_by_hash("revokedhash").await.unwrap().is_none());

    let stored = repo.find_by_id(token.id).await.unwrap().unwrap();
    assert!(stored.is_revoked());
}

#[sqlx::test]
#[ignore]
async fn test_touch_sets_last_used(pool: PgPool) {
    let repo = PgTokenRepository::new(Arc::new(pool));

    let token = repo.create("ci", "cihash").await.unwrap();
    repo.touch(token.id).await.unwrap();

    let stored = repo.find_by_name("ci").await.unwrap().unwrap();
    assert!(stored.last_used_at.is_some());
}

#[sqlx::test]
#[ignore]
async fn test_list_tokens(pool: PgPool) {
    let repo = PgTokenRepository::new(Arc::new(pool));

    repo.create("one", "h1").await.unwrap();
    repo.create("two", "h2").await.unwrap();

    let tokens = repo.list().await.unwrap();
    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[0].name, "two");
}
