//! Request helpers shared by the gate and the admin tooling.
//!
//! - [`client_identity`] - Client IP extraction and normalization

pub mod client_identity;

pub use client_identity::{ClientIdentity, normalize};
