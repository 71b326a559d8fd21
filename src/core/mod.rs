//! Core layer - codec trait and block compression.
//!
//! This module provides:
//! - [`Codec`] - encode/decode contract implemented by every container entity
//! - [`compress`] / [`decompress`] - gzip blocks with size verification

mod compression;
mod traits;

pub use compression::{compress, decompress};
pub use traits::Codec;
