//! Repository trait definitions for the domain layer.
//!
//! Traits define the contract for data operations; implementations live in
//! `crate::infrastructure::persistence`. Mock implementations are generated via
//! `mockall` for unit tests.
//!
//! - [`BlockRepository`] - Persistent block list
//! - [`TokenRepository`] - Admin bearer tokens

pub mod block_repository;
pub mod token_repository;

pub use block_repository::BlockRepository;
pub use token_repository::{AdminToken, TokenRepository};

#[cfg(test)]
pub use block_repository::MockBlockRepository;
#[cfg(test)]
pub use token_repository::MockTokenRepository;
