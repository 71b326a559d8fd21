//! Named submodels.
//!
//! ```text
//! name_len:u16 origin:f32[3] mesh_count:u32 Mesh{mesh_count} name_bytes[name_len]
//! ```
//!
//! The name length is written before the meshes but the name bytes after
//! them; readers depend on this order.

use std::io::{Read, Write};

use super::mesh::Mesh;
use super::{checked_u16, checked_u32};
use crate::core::Codec;
use crate::stream::{unpack_f32, IStream, OStream, Packed};
use crate::util::Result;

/// One authored surface, split into per-material meshes.
#[derive(Clone, Debug, PartialEq)]
pub struct Model {
    pub name: String,
    /// Origin in container axes.
    pub origin: [f32; 3],
    pub meshes: Vec<Mesh>,
}

impl Model {
    pub fn new(name: impl Into<String>, origin: [f32; 3], meshes: Vec<Mesh>) -> Self {
        Self { name: name.into(), origin, meshes }
    }

    /// Total triangles over all meshes.
    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(Mesh::triangle_count).sum()
    }
}

impl Codec for Model {
    fn decode<R: Read>(stream: &mut IStream<R>) -> Result<Self> {
        let name_len = stream.read_u16()? as usize;
        let origin = unpack_f32::<3>(&stream.read_packed("3f")?)?;
        let mesh_count = stream.read_u32()?;

        let meshes = (0..mesh_count)
            .map(|_| Mesh::decode(stream))
            .collect::<Result<Vec<_>>>()?;
        let name = stream.read_ascii_string(name_len)?;

        tracing::debug!(model = %name, meshes = meshes.len(), "decoded model");
        Ok(Self { name, origin, meshes })
    }

    fn encode<W: Write>(&self, stream: &mut OStream<W>) -> Result<()> {
        stream.write_u16(checked_u16(self.name.len(), "model name bytes")?)?;
        stream.write_packed("3f", &self.origin.map(Packed::F32))?;
        stream.write_u32(checked_u32(self.meshes.len(), "meshes")?)?;
        for mesh in &self.meshes {
            mesh.encode(stream)?;
        }
        stream.write_ascii_string(&self.name)
    }
}
