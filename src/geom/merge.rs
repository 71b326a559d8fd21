//! Import-side merging: one model's per-material meshes back into one surface.

use smallvec::SmallVec;

use crate::model::{AttributeFlags, Mesh, Model, VertexAttribute, VertexAttributeType};
use crate::util::{from_container_axes, origin_from_container, Error, Result, Vec2, Vec3, Vec4};

type Schema = SmallVec<[VertexAttributeType; 4]>;

fn schema_of(mesh: &Mesh) -> Schema {
    mesh.attributes.iter().map(|a| a.ty).collect()
}

/// All meshes of one model concatenated into shared attribute arrays.
#[derive(Clone, Debug, PartialEq)]
pub struct MergedModel {
    pub name: String,
    /// Origin in container axes.
    pub origin: [f32; 3],
    /// One merged array per attribute, in the model's attribute order.
    pub attributes: Vec<VertexAttribute>,
    /// Index tensor of shape (triangle, 3, attribute), flattened.
    pub indices: Vec<u32>,
    /// Global material id of each triangle.
    pub material_ids: Vec<u16>,
}

impl MergedModel {
    /// Get number of triangles.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.material_ids.len()
    }

    #[inline]
    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    /// Position of an attribute type in the attribute list.
    pub fn find_attribute(&self, ty: VertexAttributeType) -> Option<usize> {
        self.attributes.iter().position(|a| a.ty == ty)
    }

    /// Per-corner indices of one attribute, triangle-major.
    pub fn column(&self, attribute: usize) -> Vec<u32> {
        let stride = self.attribute_count();
        self.indices.iter().skip(attribute).step_by(stride.max(1)).copied().collect()
    }

    /// Expand one attribute to per-corner values through its own index column.
    fn expand<T>(&self, ty: VertexAttributeType, convert: impl Fn(&[f32]) -> T) -> Result<Option<Vec<T>>> {
        let Some(slot) = self.find_attribute(ty) else {
            return Ok(None);
        };
        let rows: Vec<&[f32]> = self.attributes[slot].rows().collect();
        self.column(slot)
            .into_iter()
            .map(|i| {
                rows.get(i as usize)
                    .map(|&row| convert(row))
                    .ok_or_else(|| Error::invalid(format!("{} index {} out of range for {} rows", ty, i, rows.len())))
            })
            .collect::<Result<Vec<_>>>()
            .map(Some)
    }

    /// Build the host-facing surface.
    ///
    /// POSITION indices become the triangle connectivity; NORMAL, UV and
    /// COLOR are expanded per corner. Positions, normals and the origin are
    /// converted back to host axes.
    pub fn into_surface(self) -> Result<ImportedSurface> {
        let slot = self
            .find_attribute(VertexAttributeType::Position)
            .ok_or_else(|| Error::MissingAttribute {
                model: self.name.clone(),
                attribute: VertexAttributeType::Position,
            })?;

        let positions: Vec<Vec3> = self.attributes[slot]
            .rows()
            .map(|r| from_container_axes(Vec3::from_slice(r)))
            .collect();

        let column = self.column(slot);
        if let Some(&bad) = column.iter().find(|&&i| i as usize >= positions.len()) {
            return Err(Error::invalid(format!(
                "POSITION index {} out of range for {} rows in model '{}'",
                bad,
                positions.len(),
                self.name
            )));
        }
        let triangles = column.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect();

        let normals = self.expand(VertexAttributeType::Normal, |r| from_container_axes(Vec3::from_slice(r)))?;
        let uvs = self.expand(VertexAttributeType::Uv, Vec2::from_slice)?;
        let colors = self.expand(VertexAttributeType::Color, Vec4::from_slice)?;

        Ok(ImportedSurface {
            location: origin_from_container(self.origin),
            name: self.name,
            positions,
            triangles,
            material_ids: self.material_ids,
            normals,
            uvs,
            colors,
        })
    }
}

/// Merge every mesh of a model.
///
/// All meshes must declare the same attribute types in the same order.
/// Each mesh's indices are shifted, per attribute, past the largest index
/// already merged for that attribute.
pub fn merge_model(model: &Model) -> Result<MergedModel> {
    let schema = model.meshes.first().map(schema_of).unwrap_or_default();

    for (i, mesh) in model.meshes.iter().enumerate() {
        let actual = schema_of(mesh);
        if actual != schema {
            return Err(Error::AttributeSchemaMismatch {
                model: model.name.clone(),
                mesh: i,
                expected: schema.to_vec(),
                actual: actual.to_vec(),
            });
        }
    }

    let attribute_count = schema.len();
    let triangle_count = model.triangle_count();

    let mut attributes: Vec<VertexAttribute> = schema
        .iter()
        .map(|&ty| VertexAttribute { ty, flags: AttributeFlags::NONE, data: Vec::new() })
        .collect();
    let mut indices = Vec::with_capacity(triangle_count * 3 * attribute_count);
    let mut material_ids = Vec::with_capacity(triangle_count);
    let mut running_max: SmallVec<[Option<u32>; 4]> = SmallVec::from_elem(None, attribute_count);

    for mesh in &model.meshes {
        let offsets: SmallVec<[u32; 4]> = running_max.iter().map(|m| m.map_or(0, |v| v + 1)).collect();

        for (k, &value) in mesh.indices.as_slice().iter().enumerate() {
            let attribute = k % attribute_count;
            let value = value as u32 + offsets[attribute];
            indices.push(value);
            let max = &mut running_max[attribute];
            *max = Some(max.map_or(value, |m| m.max(value)));
        }

        for (merged, attribute) in attributes.iter_mut().zip(&mesh.attributes) {
            merged.data.extend_from_slice(&attribute.data);
        }

        material_ids.extend(std::iter::repeat(mesh.material_id).take(mesh.triangle_count()));
    }

    tracing::debug!(
        model = %model.name,
        meshes = model.meshes.len(),
        triangles = material_ids.len(),
        "merged model"
    );

    Ok(MergedModel {
        name: model.name.clone(),
        origin: model.origin,
        attributes,
        indices,
        material_ids,
    })
}

/// Indexed surface ready for a host application.
#[derive(Clone, Debug, PartialEq)]
pub struct ImportedSurface {
    pub name: String,
    /// Object location in host axes.
    pub location: Vec3,
    /// Vertex positions in host axes.
    pub positions: Vec<Vec3>,
    /// Position indices of each triangle.
    pub triangles: Vec<[u32; 3]>,
    /// Global material id of each triangle.
    pub material_ids: Vec<u16>,
    /// Per-corner normals in host axes.
    pub normals: Option<Vec<Vec3>>,
    /// Per-corner texture coordinates.
    pub uvs: Option<Vec<Vec2>>,
    /// Per-corner colors.
    pub colors: Option<Vec<Vec4>>,
}

impl ImportedSurface {
    /// Get number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Get number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Per-object material slots.
    ///
    /// Returns the distinct global material ids in first-use order and, for
    /// each triangle, its index into that list.
    pub fn material_slots(&self) -> (Vec<u16>, Vec<u32>) {
        let mut slots: Vec<u16> = Vec::new();
        let per_triangle = self
            .material_ids
            .iter()
            .map(|&id| match slots.iter().position(|&s| s == id) {
                Some(i) => i as u32,
                None => {
                    slots.push(id);
                    (slots.len() - 1) as u32
                }
            })
            .collect();
        (slots, per_triangle)
    }
}
