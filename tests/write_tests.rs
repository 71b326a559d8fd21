//! Integration tests for exporting scenes and verifying round-trip.

use vec3::core::Codec;
use vec3::geom::{export_scene, import_body, ExportOptions, MaterialSlot, SceneObject, UnindexedMesh};
use vec3::model::{load_from_bytes, load_from_path, load_from_path_opts, write_to_path, MeshFlags, VertexAttributeType};
use vec3::util::{Vec2, Vec3};

use tempfile::NamedTempFile;

/// Two triangles sharing an edge, four distinct corners.
fn quad() -> UnindexedMesh {
    UnindexedMesh {
        positions: vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ],
        normals: vec![Vec3::Z; 4],
        uvs: vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(1.0, 1.0), Vec2::new(0.0, 1.0)],
        polygons: vec![[0, 1, 2], [0, 2, 3]],
        material_ids: vec![0, 0],
        materials: vec![MaterialSlot::new("Stone", false)],
    }
}

/// Triangle fan over `n` vertices on a circle, two materials alternating.
fn fan(n: u32) -> UnindexedMesh {
    let positions: Vec<Vec3> = (0..n)
        .map(|i| {
            let a = i as f32 / n as f32 * std::f32::consts::TAU;
            Vec3::new(a.cos(), a.sin(), 0.0)
        })
        .collect();
    let polygons: Vec<[u32; 3]> = (1..n - 1).map(|i| [0, i, i + 1]).collect();
    UnindexedMesh {
        normals: vec![Vec3::Z; n as usize],
        uvs: positions.iter().map(|p| Vec2::new(p.x, p.y)).collect(),
        material_ids: (0..polygons.len() as u32).map(|i| i % 2).collect(),
        materials: vec![MaterialSlot::new("Glass", true), MaterialSlot::new("Metal", false)],
        positions,
        polygons,
    }
}

#[test]
fn test_end_to_end_quad() {
    let object = SceneObject::new("Quad", Vec3::ZERO, quad());
    let body = export_scene(&[object], &ExportOptions::default()).expect("Failed to export scene");

    assert_eq!(body.models.len(), 1);
    let meshes = &body.models[0].meshes;
    assert_eq!(meshes.len(), 1, "One material should give one mesh");

    let mesh = &meshes[0];
    assert_eq!(mesh.triangle_count(), 2);
    assert_eq!(mesh.indices.attribute_count(), 3);
    assert_eq!(mesh.attributes[0].ty, VertexAttributeType::Position);
    assert_eq!(mesh.attributes[0].row_count(), 4);
    assert_eq!(mesh.index_width(), 1);
    assert!(!mesh.flags.contains(MeshFlags::USHORT_INDICES));

    let bytes = body.to_bytes().expect("Failed to encode");
    let decoded = load_from_bytes(&bytes).expect("Failed to decode");
    let surfaces = import_body(&decoded).expect("Failed to import");

    assert_eq!(surfaces.len(), 1);
    assert_eq!(surfaces[0].triangle_count(), 2);
    assert_eq!(surfaces[0].vertex_count(), 4);
    assert_eq!(surfaces[0].material_ids, vec![0, 0]);
}

#[test]
fn test_roundtrip_identity() {
    let objects = [
        SceneObject::new("Quad", Vec3::new(1.0, 2.0, 3.0), quad()),
        SceneObject::new("Fan", Vec3::new(-4.0, 0.5, 0.0), fan(12)),
    ];

    for options in [ExportOptions::default(), ExportOptions::compressed()] {
        let body = export_scene(&objects, &options).expect("Failed to export scene");
        let decoded = load_from_bytes(&body.to_bytes().unwrap()).expect("Failed to decode");
        assert_eq!(decoded, body, "Round-trip changed the body (compress = {})", options.compress);
    }
}

#[test]
fn test_roundtrip_path() {
    let temp = NamedTempFile::new().expect("Failed to create temp file");
    let path = temp.path();

    let body = export_scene(&[SceneObject::new("Fan", Vec3::ZERO, fan(300))], &ExportOptions::compressed())
        .expect("Failed to export scene");
    write_to_path(path, &body).expect("Failed to write container");

    let mapped = load_from_path_opts(path, true).expect("Failed to load with mmap");
    let buffered = load_from_path_opts(path, false).expect("Failed to load without mmap");
    assert_eq!(mapped, body);
    assert_eq!(buffered, body);
    assert_eq!(load_from_path(path).unwrap(), body);

    for mesh in &mapped.models[0].meshes {
        assert_eq!(mesh.index_width(), 2, "300 vertices need 2-byte indices");
    }
}

#[test]
fn test_index_width_boundary() {
    // Fans of 255 and 256 vertices: max vertex id 254 and 255.
    let narrow = export_scene(&[SceneObject::new("A", Vec3::ZERO, fan(255))], &ExportOptions::default()).unwrap();
    let wide = export_scene(&[SceneObject::new("B", Vec3::ZERO, fan(256))], &ExportOptions::default()).unwrap();

    assert!(narrow.models[0].meshes.iter().all(|m| m.index_width() == 1));
    assert!(wide.models[0].meshes.iter().all(|m| m.index_width() == 2));

    let decoded = load_from_bytes(&wide.to_bytes().unwrap()).unwrap();
    assert_eq!(decoded, wide);
}

#[test]
fn test_weld_is_deterministic() {
    let object = SceneObject::new("Fan", Vec3::ZERO, fan(64));
    let first = export_scene(std::slice::from_ref(&object), &ExportOptions::default()).unwrap();
    let second = export_scene(std::slice::from_ref(&object), &ExportOptions::default()).unwrap();

    assert_eq!(first.to_bytes().unwrap(), second.to_bytes().unwrap());
}

#[test]
fn test_import_restores_host_space() {
    let location = Vec3::new(5.0, -1.0, 2.5);
    let body = export_scene(&[SceneObject::new("Fan", location, fan(8))], &ExportOptions::default()).unwrap();
    let surfaces = import_body(&body).unwrap();
    let surface = &surfaces[0];

    assert_eq!(surface.location, location);
    assert_eq!(surface.triangle_count(), 6);
    assert!(surface.positions.iter().all(|p| p.z == 0.0));
    assert!(surface.normals.as_ref().unwrap().iter().all(|n| *n == Vec3::Z));

    // Triangles come back grouped by mesh, one mesh per material.
    let (slots, per_triangle) = surface.material_slots();
    assert_eq!(slots, vec![0, 1]);
    assert_eq!(per_triangle, vec![0, 0, 0, 1, 1, 1]);
    assert_eq!(body.materials[0].name, "Glass");
    assert!(body.materials[0].is_shadeless());
}

#[test]
fn test_recompress() {
    let body = export_scene(&[SceneObject::new("Quad", Vec3::ZERO, quad())], &ExportOptions::default()).unwrap();
    let raw = body.to_bytes().unwrap();

    let gzipped = body.with_compression(true);
    assert!(gzipped.models[0].meshes[0].flags.contains(MeshFlags::GZIP));
    let decoded = load_from_bytes(&gzipped.to_bytes().unwrap()).unwrap();

    assert_eq!(decoded.with_compression(false).to_bytes().unwrap(), raw);
}
