//! Export-side welding: unindexed mesh to per-material indexed meshes.
//!
//! Each material's triangles get their own POSITION, UV and NORMAL arrays,
//! deduplicated independently, so one visual corner may use different rows
//! in each channel. The index tensor stores one row index per channel per
//! corner, in the attribute order POSITION, UV, NORMAL.

use rayon::prelude::*;

use super::dedup::{dedup_rows, unique_ids};
use super::unindexed::UnindexedMesh;
use crate::model::{
    AttributeFlags, IndexTensor, MaterialTable, Mesh, MeshFlags, VertexAttribute, VertexAttributeType,
    USHORT_INDEX_THRESHOLD,
};
use crate::util::{Error, Result};

/// Attribute order of exported meshes.
pub const EXPORT_ATTRIBUTES: [VertexAttributeType; 3] =
    [VertexAttributeType::Position, VertexAttributeType::Uv, VertexAttributeType::Normal];

/// Export settings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExportOptions {
    /// Gzip every attribute and index block.
    pub compress: bool,
}

impl ExportOptions {
    /// Options with compression enabled.
    pub fn compressed() -> Self {
        Self { compress: true }
    }
}

/// One material's welded data before material resolution.
struct WeldedBatch {
    slot: u32,
    positions: Vec<[f32; 3]>,
    uvs: Vec<[f32; 2]>,
    normals: Vec<[f32; 3]>,
    indices: IndexTensor,
}

fn index_u16(value: u32) -> Result<u16> {
    u16::try_from(value).map_err(|_| Error::IndexOverflow { value, width: 2 })
}

fn weld_material(mesh: &UnindexedMesh, slot: u32) -> Result<WeldedBatch> {
    let corners: Vec<u32> = mesh
        .polygons
        .iter()
        .zip(&mesh.material_ids)
        .filter(|(_, &m)| m == slot)
        .flat_map(|(tri, _)| tri.iter().copied())
        .collect();

    // Vertex ids used by this material, and each corner's position among them.
    let (vertex_ids, corner_local) = unique_ids(&corners);

    let positions: Vec<[f32; 3]> = vertex_ids.iter().map(|&v| mesh.positions[v as usize].to_array()).collect();
    let uvs: Vec<[f32; 2]> = vertex_ids.iter().map(|&v| mesh.uvs[v as usize].to_array()).collect();
    let normals: Vec<[f32; 3]> = vertex_ids.iter().map(|&v| mesh.normals[v as usize].to_array()).collect();

    let (positions, position_rows) = dedup_rows(&positions);
    let (uvs, uv_rows) = dedup_rows(&uvs);
    let (normals, normal_rows) = dedup_rows(&normals);

    let mut indices = IndexTensor::zeros(corners.len() / 3, EXPORT_ATTRIBUTES.len());
    for (k, &local) in corner_local.iter().enumerate() {
        let local = local as usize;
        let (triangle, corner) = (k / 3, k % 3);
        indices.set(triangle, corner, 0, index_u16(position_rows[local])?);
        indices.set(triangle, corner, 1, index_u16(uv_rows[local])?);
        indices.set(triangle, corner, 2, index_u16(normal_rows[local])?);
    }

    Ok(WeldedBatch {
        slot,
        positions,
        uvs,
        normals,
        indices,
    })
}

/// Split an unindexed mesh into one indexed [`Mesh`] per material slot.
///
/// The mesh must already be in container axes. Slot names are resolved
/// against `materials`; a name the table does not know yet is appended
/// with the slot's flags. Meshes come out in ascending slot order.
///
/// Index width is shared by all returned meshes: 2 bytes if any vertex id
/// of the whole input reaches 255, 1 byte otherwise. An input without
/// triangles yields no meshes.
pub fn weld_meshes(mesh: &UnindexedMesh, materials: &mut MaterialTable, options: &ExportOptions) -> Result<Vec<Mesh>> {
    let _span = tracing::info_span!("weld_meshes", triangles = mesh.triangle_count()).entered();

    mesh.validate()?;

    let Some(max_vertex_id) = mesh.max_vertex_id() else {
        tracing::debug!("no triangles to weld");
        return Ok(Vec::new());
    };
    let use_short_indices = max_vertex_id >= USHORT_INDEX_THRESHOLD;

    let (slots, _) = unique_ids(&mesh.material_ids);
    let batches = slots
        .par_iter()
        .map(|&slot| weld_material(mesh, slot))
        .collect::<Result<Vec<_>>>()?;

    let mut attribute_flags = AttributeFlags::NONE;
    let mut mesh_flags = MeshFlags::NONE;
    attribute_flags.set(AttributeFlags::GZIP, options.compress);
    mesh_flags.set(MeshFlags::GZIP, options.compress);
    mesh_flags.set(MeshFlags::USHORT_INDICES, use_short_indices);

    let mut meshes = Vec::with_capacity(batches.len());
    for batch in batches {
        let slot = &mesh.materials[batch.slot as usize];
        let material_id = match materials.find(&slot.name) {
            Some(id) => id,
            None => {
                tracing::warn!(material = %slot.name, "material not registered, adding it to the table");
                materials.get_or_insert(&slot.name, slot.flags())?
            }
        };

        tracing::trace!(
            material = %slot.name,
            triangles = batch.indices.triangle_count(),
            positions = batch.positions.len(),
            uvs = batch.uvs.len(),
            normals = batch.normals.len(),
            "welded material"
        );

        meshes.push(Mesh {
            material_id,
            flags: mesh_flags,
            attributes: vec![
                VertexAttribute::from_rows(VertexAttributeType::Position, attribute_flags, &batch.positions)?,
                VertexAttribute::from_rows(VertexAttributeType::Uv, attribute_flags, &batch.uvs)?,
                VertexAttribute::from_rows(VertexAttributeType::Normal, attribute_flags, &batch.normals)?,
            ],
            indices: batch.indices,
        });
    }

    Ok(meshes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::MaterialSlot;
    use crate::model::MaterialFlags;
    use crate::util::{Vec2, Vec3};

    /// Two triangles sharing an edge, one material, shared normal.
    fn quad() -> UnindexedMesh {
        UnindexedMesh {
            positions: vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
            ],
            normals: vec![Vec3::Z; 4],
            uvs: vec![Vec2::ZERO, Vec2::X, Vec2::ONE, Vec2::Y],
            polygons: vec![[0, 1, 2], [0, 2, 3]],
            material_ids: vec![0, 0],
            materials: vec![MaterialSlot::new("Stone", false)],
        }
    }

    /// Triangle strip over `n` distinct vertices.
    fn strip(n: u32) -> UnindexedMesh {
        UnindexedMesh {
            positions: (0..n).map(|i| Vec3::new(i as f32, (i % 2) as f32, 0.0)).collect(),
            normals: vec![Vec3::Z; n as usize],
            uvs: (0..n).map(|i| Vec2::new(i as f32, 0.0)).collect(),
            polygons: (0..n - 2).map(|i| [i, i + 1, i + 2]).collect(),
            material_ids: vec![0; (n - 2) as usize],
            materials: vec![MaterialSlot::new("Strip", false)],
        }
    }

    #[test]
    fn test_weld_quad() {
        let mut table = MaterialTable::new();
        table.get_or_insert("Stone", MaterialFlags::NONE).unwrap();
        let meshes = weld_meshes(&quad(), &mut table, &ExportOptions::default()).unwrap();

        assert_eq!(meshes.len(), 1);
        let mesh = &meshes[0];
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.attributes.len(), 3);
        assert_eq!(mesh.attribute_types(), EXPORT_ATTRIBUTES.to_vec());
        assert_eq!(mesh.attributes[0].row_count(), 4);
        assert_eq!(mesh.attributes[1].row_count(), 4);
        assert_eq!(mesh.attributes[2].row_count(), 1);
        assert_eq!(mesh.flags, MeshFlags::NONE);
        assert_eq!(mesh.index_width(), 1);

        // Corner values survive the indirection.
        let positions = mesh.attributes[0].rows_as::<3>().unwrap();
        let p = positions[mesh.indices.get(1, 2, 0) as usize];
        assert_eq!(p, [0.0, 1.0, 0.0]);
        assert!(mesh.indices.column(2).all(|i| i == 0));
    }

    #[test]
    fn test_indices_follow_corners() {
        let source = strip(12);
        let meshes = weld_meshes(&source, &mut MaterialTable::new(), &ExportOptions::default()).unwrap();
        let mesh = &meshes[0];
        let positions = mesh.attributes[0].rows_as::<3>().unwrap();
        let uvs = mesh.attributes[1].rows_as::<2>().unwrap();

        assert_eq!(mesh.indices.triangle_count(), source.triangle_count());
        for (t, tri) in source.polygons.iter().enumerate() {
            for (c, &v) in tri.iter().enumerate() {
                assert_eq!(positions[mesh.indices.get(t, c, 0) as usize], source.positions[v as usize].to_array());
                assert_eq!(uvs[mesh.indices.get(t, c, 1) as usize], source.uvs[v as usize].to_array());
                assert_eq!(mesh.indices.get(t, c, 2), 0);
            }
        }
    }

    #[test]
    fn test_weld_idempotent() {
        let mesh = strip(40);
        let a = weld_meshes(&mesh, &mut MaterialTable::new(), &ExportOptions::default()).unwrap();
        let b = weld_meshes(&mesh, &mut MaterialTable::new(), &ExportOptions::default()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_index_width_boundary() {
        let narrow = weld_meshes(&strip(255), &mut MaterialTable::new(), &ExportOptions::default()).unwrap();
        assert_eq!(narrow[0].flags, MeshFlags::NONE);
        assert_eq!(narrow[0].index_width(), 1);

        let wide = weld_meshes(&strip(256), &mut MaterialTable::new(), &ExportOptions::default()).unwrap();
        assert!(wide[0].flags.contains(MeshFlags::USHORT_INDICES));
        assert_eq!(wide[0].index_width(), 2);
    }

    #[test]
    fn test_width_shared_across_materials() {
        let mut mesh = strip(300);
        mesh.materials.push(MaterialSlot::new("Small", false));
        // The first triangle alone only touches vertex ids 0..=2.
        mesh.material_ids[0] = 1;
        let meshes = weld_meshes(&mesh, &mut MaterialTable::new(), &ExportOptions::default()).unwrap();
        assert_eq!(meshes.len(), 2);
        assert!(meshes.iter().all(|m| m.flags.contains(MeshFlags::USHORT_INDICES)));
        assert_eq!(meshes[1].triangle_count(), 1);
    }

    #[test]
    fn test_split_by_material() {
        let mut mesh = quad();
        mesh.materials.push(MaterialSlot::new("Lamp", true));
        mesh.material_ids = vec![1, 0];

        let mut table = MaterialTable::new();
        table.get_or_insert("Lamp", MaterialFlags::SHADELESS).unwrap();
        table.get_or_insert("Stone", MaterialFlags::NONE).unwrap();

        let meshes = weld_meshes(&mesh, &mut table, &ExportOptions::compressed()).unwrap();
        assert_eq!(meshes.len(), 2);
        // Slot order: slot 0 ("Stone") first.
        assert_eq!(meshes[0].material_id, 1);
        assert_eq!(meshes[1].material_id, 0);
        assert_eq!(meshes[0].attributes[0].row_count(), 3);
        assert!(meshes.iter().all(|m| m.flags.contains(MeshFlags::GZIP)));
        assert!(meshes.iter().all(|m| m.attributes.iter().all(|a| a.is_compressed())));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_unknown_material_is_added() {
        let mut table = MaterialTable::new();
        table.get_or_insert("Other", MaterialFlags::NONE).unwrap();
        let meshes = weld_meshes(&quad(), &mut table, &ExportOptions::default()).unwrap();
        assert_eq!(meshes[0].material_id, 1);
        assert_eq!(table.get(1).unwrap().name, "Stone");
    }

    #[test]
    fn test_empty_is_noop() {
        let mesh = UnindexedMesh {
            materials: vec![MaterialSlot::fallback()],
            ..Default::default()
        };
        let mut table = MaterialTable::new();
        assert!(weld_meshes(&mesh, &mut table, &ExportOptions::default()).unwrap().is_empty());
        assert!(table.is_empty());
    }

    #[test]
    fn test_invalid_input() {
        let mut mesh = quad();
        mesh.polygons[1] = [0, 2, 9];
        let err = weld_meshes(&mesh, &mut MaterialTable::new(), &ExportOptions::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidMesh(_)));
    }
}
