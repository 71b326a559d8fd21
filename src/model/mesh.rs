//! Per-material triangle batches.
//!
//! ```text
//! triangle_count:u32 material_id:u16 flags:u16 attr_count:u16
//! Attribute{attr_count}
//! [compressed_size:u32] index_bytes
//! ```
//!
//! The index tensor has shape (triangle, corner, attribute) in row-major
//! order; each element is 1 byte, or 2 bytes with `USHORT_INDICES`.

use std::io::{Read, Write};

use byteorder::{ByteOrder, LittleEndian};

use super::attribute::{VertexAttribute, VertexAttributeType};
use super::format::MeshFlags;
use super::{checked_u16, checked_u32};
use crate::core::{compress, decompress, Codec};
use crate::stream::{unpack_u32, IStream, OStream, Packed};
use crate::util::{Error, Result};

/// Row indices of every (triangle, corner, attribute) triple.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IndexTensor {
    triangle_count: usize,
    attribute_count: usize,
    data: Vec<u16>,
}

impl IndexTensor {
    /// Wrap flat index data of shape (triangle_count, 3, attribute_count).
    pub fn new(triangle_count: usize, attribute_count: usize, data: Vec<u16>) -> Result<Self> {
        let expected = triangle_count
            .checked_mul(3 * attribute_count)
            .ok_or_else(|| Error::invalid("index tensor shape overflows"))?;
        if data.len() != expected {
            return Err(Error::invalid(format!(
                "index tensor ({}, 3, {}) needs {} values, got {}",
                triangle_count,
                attribute_count,
                expected,
                data.len()
            )));
        }
        Ok(Self { triangle_count, attribute_count, data })
    }

    /// Tensor filled with zeros.
    pub fn zeros(triangle_count: usize, attribute_count: usize) -> Self {
        Self {
            triangle_count,
            attribute_count,
            data: vec![0; triangle_count * 3 * attribute_count],
        }
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangle_count
    }

    #[inline]
    pub fn attribute_count(&self) -> usize {
        self.attribute_count
    }

    /// Flat row-major data.
    #[inline]
    pub fn as_slice(&self) -> &[u16] {
        &self.data
    }

    #[inline]
    fn offset(&self, triangle: usize, corner: usize, attribute: usize) -> usize {
        debug_assert!(corner < 3 && attribute < self.attribute_count);
        (triangle * 3 + corner) * self.attribute_count + attribute
    }

    /// Row index for one corner of one triangle in one attribute.
    #[inline]
    pub fn get(&self, triangle: usize, corner: usize, attribute: usize) -> u16 {
        self.data[self.offset(triangle, corner, attribute)]
    }

    /// Set the row index for one corner of one triangle in one attribute.
    #[inline]
    pub fn set(&mut self, triangle: usize, corner: usize, attribute: usize, value: u16) {
        let offset = self.offset(triangle, corner, attribute);
        self.data[offset] = value;
    }

    /// Per-corner indices of one attribute, triangle-major.
    pub fn column(&self, attribute: usize) -> impl Iterator<Item = u16> + '_ {
        self.data
            .iter()
            .skip(attribute)
            .step_by(self.attribute_count.max(1))
            .copied()
            .take(if self.attribute_count == 0 { 0 } else { self.triangle_count * 3 })
    }

    /// Largest index value, or None for an empty tensor.
    pub fn max_value(&self) -> Option<u16> {
        self.data.iter().copied().max()
    }

    fn to_bytes(&self, width: usize) -> Result<Vec<u8>> {
        if width == 2 {
            let mut raw = vec![0u8; self.data.len() * 2];
            LittleEndian::write_u16_into(&self.data, &mut raw);
            return Ok(raw);
        }
        self.data
            .iter()
            .map(|&v| u8::try_from(v).map_err(|_| Error::IndexOverflow { value: v as u32, width: 1 }))
            .collect()
    }

    fn from_bytes(triangle_count: usize, attribute_count: usize, raw: &[u8], width: usize) -> Result<Self> {
        let data = if width == 2 {
            let mut values = vec![0u16; raw.len() / 2];
            LittleEndian::read_u16_into(raw, &mut values);
            values
        } else {
            raw.iter().map(|&b| b as u16).collect()
        };
        Self::new(triangle_count, attribute_count, data)
    }
}

/// One material's triangles with their own attribute arrays.
#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
    /// Index into the body's material list.
    pub material_id: u16,
    pub flags: MeshFlags,
    /// Attribute channels; order matches the tensor's attribute axis.
    pub attributes: Vec<VertexAttribute>,
    pub indices: IndexTensor,
}

impl Mesh {
    /// Get number of triangles.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.triangle_count()
    }

    /// Index element width in bytes.
    #[inline]
    pub fn index_width(&self) -> usize {
        self.flags.index_width()
    }

    /// Find an attribute by type, with its position in the attribute list.
    pub fn find_attribute(&self, ty: VertexAttributeType) -> Option<(usize, &VertexAttribute)> {
        self.attributes.iter().enumerate().find(|(_, a)| a.ty == ty)
    }

    /// Check if mesh has an attribute of this type.
    pub fn has_attribute(&self, ty: VertexAttributeType) -> bool {
        self.find_attribute(ty).is_some()
    }

    /// Attribute types in declared order.
    pub fn attribute_types(&self) -> Vec<VertexAttributeType> {
        self.attributes.iter().map(|a| a.ty).collect()
    }
}

impl Codec for Mesh {
    fn decode<R: Read>(stream: &mut IStream<R>) -> Result<Self> {
        let [triangle_count, material_id, flags, attribute_count] = unpack_u32::<4>(&stream.read_packed("I3H")?)?;
        let flags = MeshFlags::from_bits(flags as u16);
        let triangle_count = triangle_count as usize;
        let attribute_count = attribute_count as usize;

        let attributes = (0..attribute_count)
            .map(|_| VertexAttribute::decode(stream))
            .collect::<Result<Vec<_>>>()?;

        let width = flags.index_width();
        let expected_size = triangle_count
            .checked_mul(3 * attribute_count)
            .and_then(|n| n.checked_mul(width))
            .ok_or_else(|| Error::invalid(format!("index block of {} triangles overflows", triangle_count)))?;

        let raw = if flags.contains(MeshFlags::GZIP) {
            let compressed_size = stream.read_u32()? as usize;
            let compressed = stream.read_bytes(compressed_size)?;
            decompress(&compressed, expected_size)?
        } else {
            stream.read_bytes(expected_size)?
        };

        let indices = IndexTensor::from_bytes(triangle_count, attribute_count, &raw, width)?;

        tracing::trace!(triangles = triangle_count, material_id, attributes = attribute_count, width, "decoded mesh");
        Ok(Self {
            material_id: material_id as u16,
            flags,
            attributes,
            indices,
        })
    }

    fn encode<W: Write>(&self, stream: &mut OStream<W>) -> Result<()> {
        if self.attributes.len() != self.indices.attribute_count() {
            return Err(Error::invalid(format!(
                "mesh has {} attributes but its index tensor has {}",
                self.attributes.len(),
                self.indices.attribute_count()
            )));
        }

        stream.write_packed(
            "I3H",
            &[
                Packed::U32(checked_u32(self.triangle_count(), "triangles")?),
                Packed::U16(self.material_id),
                Packed::U16(self.flags.bits()),
                Packed::U16(checked_u16(self.attributes.len(), "attributes")?),
            ],
        )?;

        for attribute in &self.attributes {
            attribute.encode(stream)?;
        }

        let raw = self.indices.to_bytes(self.index_width())?;
        if self.flags.contains(MeshFlags::GZIP) {
            let compressed = compress(&raw)?;
            stream.write_u32(checked_u32(compressed.len(), "index block bytes")?)?;
            stream.write_bytes(&compressed)?;
        } else {
            stream.write_bytes(&raw)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AttributeFlags;

    fn quad(flags: MeshFlags, attr_flags: AttributeFlags) -> Mesh {
        let positions = VertexAttribute::from_rows(
            VertexAttributeType::Position,
            attr_flags,
            &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
        )
        .unwrap();
        let normals =
            VertexAttribute::from_rows(VertexAttributeType::Normal, attr_flags, &[[0.0, 0.0, 1.0]]).unwrap();
        #[rustfmt::skip]
        let indices = IndexTensor::new(2, 2, vec![
            0, 0,  1, 0,  2, 0,
            0, 0,  2, 0,  3, 0,
        ]).unwrap();
        Mesh { material_id: 3, flags, attributes: vec![positions, normals], indices }
    }

    #[test]
    fn test_tensor_access() {
        let mesh = quad(MeshFlags::NONE, AttributeFlags::NONE);
        assert_eq!(mesh.indices.get(1, 2, 0), 3);
        assert_eq!(mesh.indices.column(0).collect::<Vec<_>>(), vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(mesh.indices.column(1).collect::<Vec<_>>(), vec![0; 6]);
        assert_eq!(mesh.indices.max_value(), Some(3));
        assert!(IndexTensor::new(2, 2, vec![0; 11]).is_err());

        let mut tensor = IndexTensor::zeros(2, 3);
        assert_eq!(tensor.as_slice().len(), 18);
        tensor.set(1, 0, 2, 7);
        assert_eq!(tensor.as_slice()[11], 7);
    }

    #[test]
    fn test_header_layout() {
        let mesh = quad(MeshFlags::NONE, AttributeFlags::NONE);
        let bytes = mesh.to_bytes().unwrap();

        assert_eq!(u32::from_le_bytes(bytes[0..4].try_into().unwrap()), 2);
        assert_eq!(u16::from_le_bytes(bytes[4..6].try_into().unwrap()), 3);
        assert_eq!(u16::from_le_bytes(bytes[6..8].try_into().unwrap()), 0);
        assert_eq!(u16::from_le_bytes(bytes[8..10].try_into().unwrap()), 2);

        // header + position block + normal block + 12 one-byte indices
        assert_eq!(bytes.len(), 10 + (6 + 48) + (6 + 12) + 12);
        assert_eq!(&bytes[bytes.len() - 12..], &[0, 0, 1, 0, 2, 0, 0, 0, 2, 0, 3, 0]);
    }

    #[test]
    fn test_roundtrip_variants() {
        for flags in [
            MeshFlags::NONE,
            MeshFlags::USHORT_INDICES,
            MeshFlags::GZIP,
            MeshFlags::GZIP | MeshFlags::USHORT_INDICES,
        ] {
            let mesh = quad(flags, AttributeFlags::GZIP);
            let decoded = Mesh::from_bytes(&mesh.to_bytes().unwrap()).unwrap();
            assert_eq!(decoded, mesh, "flags {:?}", flags);
        }
    }

    #[test]
    fn test_ushort_width() {
        let narrow = quad(MeshFlags::NONE, AttributeFlags::NONE).to_bytes().unwrap();
        let wide = quad(MeshFlags::USHORT_INDICES, AttributeFlags::NONE).to_bytes().unwrap();
        assert_eq!(wide.len(), narrow.len() + 12);
    }

    #[test]
    fn test_byte_index_overflow() {
        let mut mesh = quad(MeshFlags::NONE, AttributeFlags::NONE);
        mesh.indices.set(0, 0, 0, 300);
        assert!(matches!(mesh.to_bytes(), Err(Error::IndexOverflow { value: 300, width: 1 })));

        mesh.flags = MeshFlags::USHORT_INDICES;
        assert!(mesh.to_bytes().is_ok());
    }

    #[test]
    fn test_tampered_index_block() {
        let mesh = quad(MeshFlags::GZIP, AttributeFlags::NONE);
        let mut bytes = mesh.to_bytes().unwrap();
        // Claim one triangle fewer: the inflated block is now too large.
        bytes[0..4].copy_from_slice(&1u32.to_le_bytes());
        let err = Mesh::from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, Error::CorruptData { expected: 6, .. }));
    }

    #[test]
    fn test_attribute_count_mismatch() {
        let mut mesh = quad(MeshFlags::NONE, AttributeFlags::NONE);
        mesh.attributes.pop();
        assert!(matches!(mesh.to_bytes(), Err(Error::InvalidStructure(_))));
    }

    #[test]
    fn test_find_attribute() {
        let mesh = quad(MeshFlags::NONE, AttributeFlags::NONE);
        assert_eq!(mesh.find_attribute(VertexAttributeType::Normal).map(|(i, _)| i), Some(1));
        assert!(!mesh.has_attribute(VertexAttributeType::Uv));
        assert_eq!(
            mesh.attribute_types(),
            vec![VertexAttributeType::Position, VertexAttributeType::Normal]
        );
    }
}
