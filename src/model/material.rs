//! Materials and the export-side material table.
//!
//! ```text
//! flags:u16 name_len:u16 name_bytes[name_len]
//! ```

use std::io::{Read, Write};

use super::checked_u16;
use super::format::MaterialFlags;
use crate::core::Codec;
use crate::stream::{IStream, OStream};
use crate::util::{Error, Result};

/// Name used for objects that carry no material slots.
pub const DEFAULT_MATERIAL_NAME: &str = "NoMaterial";

/// A named material referenced by meshes through its table index.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Material {
    pub name: String,
    pub flags: MaterialFlags,
}

impl Material {
    pub fn new(name: impl Into<String>, flags: MaterialFlags) -> Self {
        Self { name: name.into(), flags }
    }

    /// Check if the material ignores lighting.
    #[inline]
    pub fn is_shadeless(&self) -> bool {
        self.flags.contains(MaterialFlags::SHADELESS)
    }
}

impl Codec for Material {
    fn decode<R: Read>(stream: &mut IStream<R>) -> Result<Self> {
        let flags = MaterialFlags::from_bits(stream.read_u16()?);
        let name_len = stream.read_u16()? as usize;
        let name = stream.read_ascii_string(name_len)?;
        Ok(Self { name, flags })
    }

    fn encode<W: Write>(&self, stream: &mut OStream<W>) -> Result<()> {
        stream.write_u16(self.flags.bits())?;
        stream.write_u16(checked_u16(self.name.len(), "material name bytes")?)?;
        stream.write_ascii_string(&self.name)
    }
}

/// Growing list of materials, deduplicated by name.
///
/// Threaded through every export call of one body; indices handed out are
/// stable for the lifetime of the table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MaterialTable {
    materials: Vec<Material>,
}

impl MaterialTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the material with this exact name.
    ///
    /// Entries past the u16 id range are never returned.
    pub fn find(&self, name: &str) -> Option<u16> {
        let i = self.materials.iter().position(|m| m.name == name)?;
        u16::try_from(i).ok()
    }

    /// Index of `name`, appending a new entry with `flags` if absent.
    ///
    /// An existing entry keeps its original flags.
    pub fn get_or_insert(&mut self, name: &str, flags: MaterialFlags) -> Result<u16> {
        if let Some(id) = self.find(name) {
            return Ok(id);
        }
        let id = u16::try_from(self.materials.len()).map_err(|_| Error::CountOverflow {
            what: "materials",
            count: self.materials.len() + 1,
            max: u16::MAX as usize,
        })?;
        self.materials.push(Material::new(name, flags));
        Ok(id)
    }

    pub fn get(&self, id: u16) -> Option<&Material> {
        self.materials.get(id as usize)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn as_slice(&self) -> &[Material] {
        &self.materials
    }

    pub fn into_vec(self) -> Vec<Material> {
        self.materials
    }
}

impl From<Vec<Material>> for MaterialTable {
    fn from(materials: Vec<Material>) -> Self {
        Self { materials }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_material_layout() {
        let mat = Material::new("Glass", MaterialFlags::SHADELESS);
        let bytes = mat.to_bytes().unwrap();
        assert_eq!(bytes, [&[1u8, 0, 5, 0][..], b"Glass"].concat());
        assert_eq!(Material::from_bytes(&bytes).unwrap(), mat);
        assert!(mat.is_shadeless());
    }

    #[test]
    fn test_truncated_name() {
        let bytes = [0u8, 0, 9, 0, b'a', b'b'];
        assert!(matches!(Material::from_bytes(&bytes), Err(Error::UnexpectedEof(_))));
    }

    #[test]
    fn test_table_dedup() {
        let mut table = MaterialTable::new();
        assert_eq!(table.get_or_insert("Stone", MaterialFlags::NONE).unwrap(), 0);
        assert_eq!(table.get_or_insert("Lamp", MaterialFlags::SHADELESS).unwrap(), 1);
        assert_eq!(table.get_or_insert("Stone", MaterialFlags::SHADELESS).unwrap(), 0);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(0).unwrap().flags, MaterialFlags::NONE);
        assert_eq!(table.find("Lamp"), Some(1));
        assert_eq!(table.find("lamp"), None);
    }

    #[test]
    fn test_table_beyond_id_range() {
        let materials: Vec<Material> = (0..=u16::MAX as usize + 1)
            .map(|i| Material::new(format!("M{i}"), MaterialFlags::NONE))
            .collect();
        let mut table = MaterialTable::from(materials);

        assert_eq!(table.find("M65535"), Some(u16::MAX));
        assert_eq!(table.find("M65536"), None);
        assert!(matches!(
            table.get_or_insert("M65536", MaterialFlags::NONE),
            Err(Error::CountOverflow { what: "materials", .. })
        ));
    }
}
