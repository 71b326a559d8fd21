//! Whole-scene export and import.

use super::merge::{merge_model, ImportedSurface};
use super::unindexed::{MaterialSlot, UnindexedMesh};
use super::weld::{weld_meshes, ExportOptions};
use crate::model::{Body, MaterialTable, Model};
use crate::util::{origin_to_container, Result, Vec3};

/// A named host object: location plus its unindexed mesh in host axes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SceneObject {
    pub name: String,
    pub location: Vec3,
    pub mesh: UnindexedMesh,
}

impl SceneObject {
    pub fn new(name: impl Into<String>, location: Vec3, mesh: UnindexedMesh) -> Self {
        Self { name: name.into(), location, mesh }
    }
}

/// Export one object into a model, registering its materials.
///
/// Objects without material slots are exported with the `NoMaterial`
/// fallback. Slots are registered in slot order before welding so material
/// ids follow first use across the scene.
pub fn export_object(object: &SceneObject, materials: &mut MaterialTable, options: &ExportOptions) -> Result<Model> {
    let mut mesh = object.mesh.to_container_axes();
    if mesh.materials.is_empty() {
        mesh.materials.push(MaterialSlot::fallback());
        mesh.material_ids.iter_mut().for_each(|id| *id = 0);
    }

    for slot in &mesh.materials {
        materials.get_or_insert(&slot.name, slot.flags())?;
    }

    let meshes = weld_meshes(&mesh, materials, options)?;
    tracing::debug!(object = %object.name, meshes = meshes.len(), "exported object");

    Ok(Model::new(object.name.clone(), origin_to_container(object.location), meshes))
}

/// Export a scene into a container body.
pub fn export_scene(objects: &[SceneObject], options: &ExportOptions) -> Result<Body> {
    let _span = tracing::info_span!("export_scene", objects = objects.len()).entered();

    let mut materials = MaterialTable::new();
    let models = objects
        .iter()
        .map(|object| export_object(object, &mut materials, options))
        .collect::<Result<Vec<_>>>()?;

    let body = Body::new(materials.into_vec(), models);
    tracing::info!(
        materials = body.materials.len(),
        models = body.models.len(),
        meshes = body.mesh_count(),
        "scene exported"
    );
    Ok(body)
}

/// Merge one model into a host surface.
pub fn import_model(model: &Model) -> Result<ImportedSurface> {
    merge_model(model)?.into_surface()
}

/// Import every model of a body.
///
/// Material references are checked against the body's material list first.
pub fn import_body(body: &Body) -> Result<Vec<ImportedSurface>> {
    let _span = tracing::info_span!("import_body", models = body.models.len()).entered();

    body.validate()?;
    body.models.iter().map(import_model).collect()
}
