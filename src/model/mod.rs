//! On-disk entities of the VEC3 container and their codecs.
//!
//! Every entity implements [`Codec`](crate::core::Codec). Data flows down
//! this list when writing and back up when reading:
//!
//! - [`Body`] - header, material list, models
//! - [`Material`] - name and flags
//! - [`Model`] - named, originated group of meshes
//! - [`Mesh`] - one material's triangles and index tensor
//! - [`VertexAttribute`] - one typed float channel

mod attribute;
mod body;
mod format;
mod material;
mod mesh;
mod submodel;

pub use attribute::{VertexAttribute, VertexAttributeType};
pub use body::{
    load_from_bytes, load_from_path, load_from_path_opts, load_from_reader, write_to_path, write_to_writer, Body,
};
pub use format::*;
pub use material::{Material, MaterialTable, DEFAULT_MATERIAL_NAME};
pub use mesh::{IndexTensor, Mesh};
pub use submodel::Model;

use crate::util::{Error, Result};

/// Narrow a count to its u16 field.
pub(crate) fn checked_u16(count: usize, what: &'static str) -> Result<u16> {
    u16::try_from(count).map_err(|_| Error::CountOverflow { what, count, max: u16::MAX as usize })
}

/// Narrow a count to its u32 field.
pub(crate) fn checked_u32(count: usize, what: &'static str) -> Result<u32> {
    u32::try_from(count).map_err(|_| Error::CountOverflow { what, count, max: u32::MAX as usize })
}
