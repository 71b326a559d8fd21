//! Vertex attribute blocks.
//!
//! ```text
//! type:u8 flags:u8 size:u32 [uncompressed_size:u32] data_bytes
//! ```
//!
//! `size` always precedes the payload. For compressed blocks it counts the
//! 4-byte `uncompressed_size` field plus the gzip bytes.

use std::fmt;
use std::io::{Read, Write};
use std::slice::ChunksExact;

use byteorder::{ByteOrder, LittleEndian};

use super::format::{AttributeFlags, UNCOMPRESSED_SIZE_FIELD};
use super::checked_u32;
use crate::core::{compress, decompress, Codec};
use crate::stream::{unpack_u32, IStream, OStream, Packed};
use crate::util::{Error, Result};

/// Vertex attribute channel type.
///
/// Every type is stored as f32 components; the type fixes how many.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum VertexAttributeType {
    /// Vertex position (3 components)
    Position = 0,
    /// Texture coordinate (2 components)
    Uv = 1,
    /// Vertex normal (3 components)
    Normal = 2,
    /// Vertex color, RGBA (4 components)
    Color = 4,
}

impl VertexAttributeType {
    /// Convert the on-disk type byte.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Position),
            1 => Some(Self::Uv),
            2 => Some(Self::Normal),
            4 => Some(Self::Color),
            _ => None,
        }
    }

    /// On-disk type byte.
    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Number of f32 components per row.
    #[inline]
    pub const fn component_count(self) -> usize {
        match self {
            Self::Position | Self::Normal => 3,
            Self::Uv => 2,
            Self::Color => 4,
        }
    }

    /// Size of one row in bytes.
    #[inline]
    pub const fn row_size(self) -> usize {
        self.component_count() * 4
    }

    /// Human readable name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Position => "POSITION",
            Self::Uv => "UV",
            Self::Normal => "NORMAL",
            Self::Color => "COLOR",
        }
    }
}

impl fmt::Display for VertexAttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One typed vertex attribute channel: rows of f32 components.
#[derive(Clone, Debug, PartialEq)]
pub struct VertexAttribute {
    pub ty: VertexAttributeType,
    pub flags: AttributeFlags,
    /// Flat component data, `row_count * ty.component_count()` floats.
    pub data: Vec<f32>,
}

impl VertexAttribute {
    /// Create an attribute from flat component data.
    pub fn new(ty: VertexAttributeType, flags: AttributeFlags, data: Vec<f32>) -> Result<Self> {
        if data.len() % ty.component_count() != 0 {
            return Err(Error::invalid(format!(
                "{} data has {} floats, not a multiple of {}",
                ty,
                data.len(),
                ty.component_count()
            )));
        }
        Ok(Self { ty, flags, data })
    }

    /// Create an attribute from fixed-width rows.
    pub fn from_rows<const N: usize>(
        ty: VertexAttributeType,
        flags: AttributeFlags,
        rows: &[[f32; N]],
    ) -> Result<Self>
    where
        [f32; N]: bytemuck::Pod,
    {
        if N != ty.component_count() {
            return Err(Error::invalid(format!("{} rows need {} components, got {}", ty, ty.component_count(), N)));
        }
        Ok(Self { ty, flags, data: bytemuck::cast_slice(rows).to_vec() })
    }

    /// Number of rows.
    #[inline]
    pub fn row_count(&self) -> usize {
        self.data.len() / self.ty.component_count()
    }

    /// Iterate rows as component slices.
    pub fn rows(&self) -> ChunksExact<'_, f32> {
        self.data.chunks_exact(self.ty.component_count())
    }

    /// View rows as fixed-width arrays when `N` matches the component count.
    pub fn rows_as<const N: usize>(&self) -> Option<&[[f32; N]]>
    where
        [f32; N]: bytemuck::Pod,
    {
        if N != self.ty.component_count() {
            return None;
        }
        bytemuck::try_cast_slice(&self.data).ok()
    }

    /// Uncompressed payload size in bytes.
    #[inline]
    pub fn byte_size(&self) -> usize {
        self.data.len() * 4
    }

    /// Check if the payload is written compressed.
    #[inline]
    pub fn is_compressed(&self) -> bool {
        self.flags.contains(AttributeFlags::GZIP)
    }

    fn raw_bytes(&self) -> Vec<u8> {
        let mut raw = vec![0u8; self.byte_size()];
        LittleEndian::write_f32_into(&self.data, &mut raw);
        raw
    }
}

impl Codec for VertexAttribute {
    fn decode<R: Read>(stream: &mut IStream<R>) -> Result<Self> {
        let [ty, flags] = unpack_u32::<2>(&stream.read_packed("2B")?)?;
        let ty = VertexAttributeType::from_u8(ty as u8).ok_or(Error::UnknownAttributeType(ty as u8))?;
        let flags = AttributeFlags::from_bits(flags as u8);
        let size = stream.read_u32()? as usize;

        let raw = if flags.contains(AttributeFlags::GZIP) {
            let Some(compressed_size) = size.checked_sub(UNCOMPRESSED_SIZE_FIELD) else {
                return Err(Error::invalid(format!("{} compressed payload size {} is too small", ty, size)));
            };
            let uncompressed_size = stream.read_u32()? as usize;
            let compressed = stream.read_bytes(compressed_size)?;
            decompress(&compressed, uncompressed_size)?
        } else {
            stream.read_bytes(size)?
        };

        if raw.len() % ty.row_size() != 0 {
            return Err(Error::invalid(format!(
                "{} payload of {} bytes is not a whole number of {}-byte rows",
                ty,
                raw.len(),
                ty.row_size()
            )));
        }

        let mut data = vec![0f32; raw.len() / 4];
        LittleEndian::read_f32_into(&raw, &mut data);

        tracing::trace!(attribute = %ty, rows = data.len() / ty.component_count(), compressed = flags.contains(AttributeFlags::GZIP), "decoded attribute");
        Ok(Self { ty, flags, data })
    }

    fn encode<W: Write>(&self, stream: &mut OStream<W>) -> Result<()> {
        stream.write_packed("2B", &[Packed::U8(self.ty.as_u8()), Packed::U8(self.flags.bits())])?;

        let raw = self.raw_bytes();
        if self.is_compressed() {
            let compressed = compress(&raw)?;
            stream.write_u32(checked_u32(compressed.len() + UNCOMPRESSED_SIZE_FIELD, "attribute payload bytes")?)?;
            stream.write_u32(checked_u32(raw.len(), "attribute bytes")?)?;
            stream.write_bytes(&compressed)?;
        } else {
            stream.write_u32(checked_u32(raw.len(), "attribute bytes")?)?;
            stream.write_bytes(&raw)?;
        }
        Ok(())
    }
}
