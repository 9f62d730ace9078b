//! Business logic services for the application layer.

pub mod auth_service;
pub mod block_service;
pub mod gate_service;

pub use auth_service::AuthService;
pub use block_service::BlockService;
pub use gate_service::{GateDecision, GateService};
