//! Repository implementations.
//!
//! # Repositories
//!
//! - [`PgBlockRepository`] - Block list in PostgreSQL
//! - [`MemoryBlockRepository`] - Block list in process memory
//! - [`PgTokenRepository`] - Admin token digests in PostgreSQL

pub mod memory_block_repository;
pub mod pg_block_repository;
pub mod pg_token_repository;

pub use memory_block_repository::MemoryBlockRepository;
pub use pg_block_repository::PgBlockRepository;
pub use pg_token_repository::PgTokenRepository;
