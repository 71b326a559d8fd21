//! Top-level container.
//!
//! ```text
//! magic[8] version:u16 reserved:u16
//! material_count:u16 model_count:u16
//! Material{material_count} Model{model_count}
//! ```

use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use memmap2::Mmap;

use super::format::{AttributeFlags, MeshFlags, CURRENT_VERSION, VEC3_MAGIC};
use super::material::Material;
use super::submodel::Model;
use super::checked_u16;
use crate::core::Codec;
use crate::stream::{unpack_u32, IStream, OStream, Packed};
use crate::util::{Error, Result};

/// Decoded container: the material list and every submodel.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Body {
    pub materials: Vec<Material>,
    pub models: Vec<Model>,
}

impl Body {
    pub fn new(materials: Vec<Material>, models: Vec<Model>) -> Self {
        Self { materials, models }
    }

    /// Check that every mesh references an existing material.
    pub fn validate(&self) -> Result<()> {
        for model in &self.models {
            for (i, mesh) in model.meshes.iter().enumerate() {
                if mesh.material_id as usize >= self.materials.len() {
                    return Err(Error::invalid(format!(
                        "model '{}' mesh {} references material {} of {}",
                        model.name,
                        i,
                        mesh.material_id,
                        self.materials.len()
                    )));
                }
            }
        }
        Ok(())
    }

    /// Copy of this body with GZIP set or cleared on every block.
    pub fn with_compression(&self, gzip: bool) -> Body {
        let mut body = self.clone();
        for mesh in body.models.iter_mut().flat_map(|m| m.meshes.iter_mut()) {
            mesh.flags.set(MeshFlags::GZIP, gzip);
            for attribute in &mut mesh.attributes {
                attribute.flags.set(AttributeFlags::GZIP, gzip);
            }
        }
        body
    }

    /// Total number of meshes over all models.
    pub fn mesh_count(&self) -> usize {
        self.models.iter().map(|m| m.meshes.len()).sum()
    }
}

/// Read and check magic and version.
fn read_header<R: Read>(stream: &mut IStream<R>) -> Result<()> {
    let magic = stream.read_bytes(VEC3_MAGIC.len())?;
    if magic != VEC3_MAGIC[..] {
        let mut got = [0u8; 8];
        got.copy_from_slice(&magic);
        return Err(Error::InvalidMagic(got));
    }

    let [version, _reserved] = unpack_u32::<2>(&stream.read_packed("2H")?)?;
    if version != CURRENT_VERSION as u32 {
        return Err(Error::UnsupportedVersion(version as u16));
    }
    Ok(())
}

impl Codec for Body {
    fn decode<R: Read>(stream: &mut IStream<R>) -> Result<Self> {
        read_header(stream)?;

        let [material_count, model_count] = unpack_u32::<2>(&stream.read_packed("2H")?)?;
        let materials = (0..material_count)
            .map(|_| Material::decode(stream))
            .collect::<Result<Vec<_>>>()?;
        let models = (0..model_count)
            .map(|_| Model::decode(stream))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(materials = materials.len(), models = models.len(), bytes = stream.pos(), "decoded body");
        Ok(Self { materials, models })
    }

    fn encode<W: Write>(&self, stream: &mut OStream<W>) -> Result<()> {
        self.validate()?;

        stream.write_bytes(VEC3_MAGIC)?;
        stream.write_packed("2H", &[Packed::U16(CURRENT_VERSION), Packed::U16(0)])?;
        stream.write_packed(
            "2H",
            &[
                Packed::U16(checked_u16(self.materials.len(), "materials")?),
                Packed::U16(checked_u16(self.models.len(), "models")?),
            ],
        )?;

        for material in &self.materials {
            material.encode(stream)?;
        }
        for model in &self.models {
            model.encode(stream)?;
        }

        tracing::debug!(materials = self.materials.len(), models = self.models.len(), bytes = stream.pos(), "encoded body");
        Ok(())
    }
}

/// Decode a container from any reader.
pub fn load_from_reader<R: Read>(reader: R) -> Result<Body> {
    Body::decode(&mut IStream::new(reader))
}

/// Decode a container held in memory.
pub fn load_from_bytes(bytes: &[u8]) -> Result<Body> {
    load_from_reader(bytes)
}

/// Open and decode a container file.
///
/// Uses a memory map when the `mmap` feature is enabled.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<Body> {
    load_from_path_opts(path, cfg!(feature = "mmap"))
}

/// Open and decode a container file with optional memory mapping.
pub fn load_from_path_opts(path: impl AsRef<Path>, use_mmap: bool) -> Result<Body> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::FileNotFound(path.to_path_buf())
        } else {
            Error::Io(e)
        }
    })?;

    let size = file.metadata()?.len();
    tracing::debug!(path = %path.display(), size, use_mmap, "loading container");

    if use_mmap && size > 0 {
        // Safety: the mapping is read-only and dropped before returning.
        let mmap = unsafe { Mmap::map(&file) }.map_err(|e| Error::MmapFailed(e.to_string()))?;
        return load_from_bytes(&mmap);
    }

    load_from_reader(BufReader::new(file))
}

/// Encode a container into any writer and flush it.
pub fn write_to_writer<W: Write>(writer: &mut W, body: &Body) -> Result<()> {
    let mut stream = OStream::new(writer);
    body.encode(&mut stream)?;
    stream.finish()?;
    Ok(())
}

/// Encode a container into a file, replacing it.
pub fn write_to_path(path: impl AsRef<Path>, body: &Body) -> Result<()> {
    let mut stream = OStream::create(path.as_ref())?;
    body.encode(&mut stream)?;
    stream.finish()?;
    Ok(())
}
