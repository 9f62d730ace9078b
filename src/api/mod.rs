//! REST API layer for HTTP request/response handling.
//!
//! # Modules
//!
//! - [`dto`] - Data Transfer Objects for request/response serialization
//! - [`handlers`] - HTTP request handlers
//! - [`middleware`] - Gate, authentication and tracing middleware
//! - [`routes`] - Route groups per tier

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
