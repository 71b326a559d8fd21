//! Unindexed, per-vertex mesh records exchanged with a host application.

use super::dedup::dedup_rows;
use crate::model::{MaterialFlags, DEFAULT_MATERIAL_NAME};
use crate::util::{to_container_axes, Error, Result, Vec2, Vec3};

/// Material name and shading flag of one host material slot.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MaterialSlot {
    pub name: String,
    pub shadeless: bool,
}

impl MaterialSlot {
    pub fn new(name: impl Into<String>, shadeless: bool) -> Self {
        Self { name: name.into(), shadeless }
    }

    /// Slot used for objects without materials.
    pub fn fallback() -> Self {
        Self::new(DEFAULT_MATERIAL_NAME, false)
    }

    /// Container flags for this slot.
    pub fn flags(&self) -> MaterialFlags {
        if self.shadeless {
            MaterialFlags::SHADELESS
        } else {
            MaterialFlags::NONE
        }
    }
}

/// Triangle soup with per-vertex channels and per-triangle material slots.
///
/// All three channels are indexed by the vertex ids in `polygons`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UnindexedMesh {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    /// Vertex ids of each triangle.
    pub polygons: Vec<[u32; 3]>,
    /// Slot index of each triangle.
    pub material_ids: Vec<u32>,
    /// Material slots referenced by `material_ids`.
    pub materials: Vec<MaterialSlot>,
}

impl UnindexedMesh {
    /// Get number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.polygons.len()
    }

    /// Largest vertex id used by any triangle.
    pub fn max_vertex_id(&self) -> Option<u32> {
        self.polygons.iter().flatten().copied().max()
    }

    /// Check lengths and ranges before welding.
    pub fn validate(&self) -> Result<()> {
        if self.material_ids.len() != self.polygons.len() {
            return Err(Error::invalid_mesh(format!(
                "{} material ids for {} triangles",
                self.material_ids.len(),
                self.polygons.len()
            )));
        }

        if let Some(max) = self.max_vertex_id() {
            let needed = max as usize + 1;
            for (channel, len) in [
                ("positions", self.positions.len()),
                ("normals", self.normals.len()),
                ("uvs", self.uvs.len()),
            ] {
                if len < needed {
                    return Err(Error::invalid_mesh(format!(
                        "vertex id {} out of range for {} {}",
                        max, len, channel
                    )));
                }
            }
        }

        if let Some(&slot) = self.material_ids.iter().find(|&&m| m as usize >= self.materials.len()) {
            return Err(Error::invalid_mesh(format!(
                "material slot {} out of range for {} slots",
                slot,
                self.materials.len()
            )));
        }

        Ok(())
    }

    /// Copy with positions and normals converted into container axes.
    pub fn to_container_axes(&self) -> Self {
        Self {
            positions: self.positions.iter().copied().map(to_container_axes).collect(),
            normals: self.normals.iter().copied().map(to_container_axes).collect(),
            ..self.clone()
        }
    }

    /// Build a mesh from per-corner data, three corners per triangle.
    ///
    /// Corners whose position, normal and uv are all bit-identical share one
    /// vertex id.
    pub fn from_corners(
        positions: &[Vec3],
        normals: &[Vec3],
        uvs: &[Vec2],
        material_ids: &[u32],
        materials: Vec<MaterialSlot>,
    ) -> Result<Self> {
        let corner_count = positions.len();
        if normals.len() != corner_count || uvs.len() != corner_count {
            return Err(Error::invalid_mesh(format!(
                "corner channels differ in length: {} positions, {} normals, {} uvs",
                corner_count,
                normals.len(),
                uvs.len()
            )));
        }
        if corner_count % 3 != 0 || material_ids.len() != corner_count / 3 {
            return Err(Error::invalid_mesh(format!(
                "{} corners and {} material ids do not form whole triangles",
                corner_count,
                material_ids.len()
            )));
        }

        let records: Vec<[f32; 8]> = positions
            .iter()
            .zip(normals)
            .zip(uvs)
            .map(|((p, n), uv)| [p.x, p.y, p.z, n.x, n.y, n.z, uv.x, uv.y])
            .collect();
        let (unique, inverse) = dedup_rows(&records);

        Ok(Self {
            positions: unique.iter().map(|r| Vec3::new(r[0], r[1], r[2])).collect(),
            normals: unique.iter().map(|r| Vec3::new(r[3], r[4], r[5])).collect(),
            uvs: unique.iter().map(|r| Vec2::new(r[6], r[7])).collect(),
            polygons: inverse.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect(),
            material_ids: material_ids.to_vec(),
            materials,
        })
    }
}
