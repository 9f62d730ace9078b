//! Application layer services.
//!
//! Services consume repository traits and the in-memory window counter and
//! expose the operations used by the HTTP middleware, handlers and admin CLI.
//!
//! # Available Services
//!
//! - [`services::gate_service::GateService`] - Block and rate limit decisions per request
//! - [`services::block_service::BlockService`] - Block record lifecycle
//! - [`services::auth_service::AuthService`] - Admin token authentication

pub mod services;
