//! Utility types and functions for VEC3.
//!
//! - [`Error`] / [`Result`] - Error handling
//! - Math type re-exports from glam and the container axis convention

mod error;
mod math;

pub use error::*;
pub use math::*;
