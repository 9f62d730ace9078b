//! # Site Guard
//!
//! IP abuse control for a personal site backend, built with Axum and PostgreSQL.
//!
//! Every request passes a gate that first consults a persistent block list and
//! then an in-memory per-tier window counter. Clients that exceed a tier budget
//! receive `429` and, on the first excess request in a window, are recorded as
//! blocked so later requests receive `403`.
//!
//! ## Architecture
//!
//! - **Domain Layer** ([`domain`]) - Block records, repository traits, tiers and the window counter
//! - **Application Layer** ([`application`]) - Gate, block and admin auth services
//! - **Infrastructure Layer** ([`infrastructure`]) - PostgreSQL and in-memory repositories
//! - **API Layer** ([`api`]) - Gate middleware, admin handlers, DTOs
//!
//! ## Tiers
//!
//! | Routes         | Tier   | Default budget |
//! |----------------|--------|----------------|
//! | `/api/auth/*`  | auth   | 10 / 60s       |
//! | `/api/admin/*` | admin  | 20 / 60s       |
//! | everything else| public | 100 / 60s      |
//!
//! ## Limitations
//!
//! Window counters live in process memory, so with several instances the
//! effective budget is per instance. Block records are shared through the
//! database.
//!
//! ## Configuration
//!
//! Service configuration is loaded from environment variables via [`config::Config`].
//! See [`config`] module for available options.

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod state;
pub mod utils;

pub mod config;
pub mod server;

pub mod routes;

pub use error::AppError;
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::{
        AuthService, BlockService, GateDecision, GateService,
    };
    pub use crate::domain::entities::{BlockList, BlockRecord, NewBlock};
    pub use crate::domain::rate_limit::{Tier, TierLimit, TierPolicy, WindowCounter};
    pub use crate::error::AppError;
    pub use crate::state::{AppState, StateSettings};
    pub use crate::utils::ClientIdentity;
}
