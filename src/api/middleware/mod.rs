//! HTTP middleware for request processing and protection.
//!
//! Provides the abuse-control gate, admin authentication and request tracing.

pub mod auth;
pub mod gate;
pub mod tracing;
