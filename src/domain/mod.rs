//! Domain layer: identities, tiers, counters and block records.
//!
//! # Architecture
//!
//! - [`entities`] - Block records and their inputs
//! - [`repositories`] - Data access trait definitions
//! - [`rate_limit`] - Tier policy, window counter and its sweeper
//!
//! # Design Principles
//!
//! - Domain layer has no dependencies on infrastructure or presentation layers
//! - Repository traits define contracts implemented by infrastructure layer
//! - Orchestration lives in services (see [`crate::application::services`])

pub mod entities;
pub mod rate_limit;
pub mod repositories;
