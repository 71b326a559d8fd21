//! # VEC3
//!
//! Reader and writer for the VEC3 binary model container.
//!
//! A container holds a material table and a list of named models. Each model
//! is split into per-material meshes whose vertex attributes are indexed
//! independently per channel. Attribute and index blocks may be gzipped.
//!
//! ## Modules
//!
//! - [`util`] - Errors and axis conventions
//! - [`core`] - Codec trait and block compression
//! - [`stream`] - Little-endian byte streams
//! - [`model`] - On-disk entities (Body, Material, Model, Mesh, VertexAttribute)
//! - [`geom`] - Export weld/split and import merge
//!
//! ## Example
//!
//! ```ignore
//! use vec3::prelude::*;
//!
//! let body = load_from_path("scene.vec3")?;
//! for surface in import_body(&body)? {
//!     println!("{}: {} triangles", surface.name, surface.triangle_count());
//! }
//! ```

pub mod util;
pub mod core;
pub mod stream;
pub mod model;
pub mod geom;

// Re-export commonly used types
pub use util::{Error, Result};
pub use model::{load_from_bytes, load_from_path, write_to_path, Body};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{Error, Result, Vec2, Vec3, Vec4};
    pub use crate::core::Codec;
    pub use crate::model::{
        load_from_bytes, load_from_path, load_from_reader, write_to_path, write_to_writer, Body, Material,
        MaterialTable, Mesh, Model, VertexAttribute, VertexAttributeType,
    };
    pub use crate::geom::*;
}
