//! v1 API Data Transfer Objects.
//!
//! Request shapes only; responses serialize the domain types directly.

pub mod graphs;

pub use graphs::*;
