//! HTTP request handlers for API endpoints.

pub mod auth;
pub mod blocks;
pub mod health;

pub use auth::verify_handler;
pub use blocks::{
    create_block_handler, delete_block_handler, list_blocks_handler, update_block_handler,
};
pub use health::health_handler;
