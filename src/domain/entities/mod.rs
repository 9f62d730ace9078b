//! Core domain entities.
//!
//! - [`BlockRecord`] - A persisted block for one client identity
//! - [`NewBlock`] - Input for creating a block
//! - [`BlockList`] - All blocks with derived counts

pub mod block;

pub use block::{BlockList, BlockRecord, DEFAULT_MANUAL_REASON, NewBlock};
