//! Geometry conversion between host meshes and container models.
//!
//! Export welds an unindexed triangle soup into per-material indexed meshes.
//! Import merges a model's meshes back into one indexed surface.

mod dedup;
mod merge;
mod scene;
mod unindexed;
mod weld;

pub use merge::{merge_model, ImportedSurface, MergedModel};
pub use scene::{export_object, export_scene, import_body, import_model, SceneObject};
pub use unindexed::{MaterialSlot, UnindexedMesh};
pub use weld::{weld_meshes, ExportOptions, EXPORT_ATTRIBUTES};
