//! Integration tests for OBJ mesh loading.

use std::fs;
use std::path::{Path, PathBuf};

use engine_resources::{MeshData, ResourceError};
use glam::Vec3;

/// Writes `contents` to a uniquely named file under the system temp dir.
fn write_temp_obj(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "engine_resources_{}_{}.obj",
        std::process::id(),
        name
    ));
    fs::write(&path, contents).expect("Failed to write temp OBJ");
    path
}

#[test]
fn test_load_quad_shares_vertices() {
    let path = write_temp_obj(
        "quad",
        "# two triangles sharing an edge\n\
         v -0.5 -0.5 0.0\n\
         v 0.5 -0.5 0.0\n\
         v -0.5 0.5 0.0\n\
         v 0.5 0.5 0.0\n\
         vn 0 0 -1\n\
         f 1//1 2//1 3//1\n\
         f 2//1 4//1 3//1\n",
    );

    let mesh = MeshData::from_obj_file(&path).expect("Failed to load quad");
    fs::remove_file(&path).ok();

    assert_eq!(mesh.vertices.len(), 4, "Shared corners should be stored once");
    assert_eq!(mesh.indices.len(), 6);
    assert_eq!(mesh.indices[1], mesh.indices[3]);
    assert_eq!(mesh.indices[2], mesh.indices[5]);
    assert!(mesh.vertices.iter().all(|v| v.normal == Vec3::NEG_Z));
}

#[test]
fn test_multiple_objects_are_merged() {
    let path = write_temp_obj(
        "two_objects",
        "o first\n\
         v 0 0 0\nv 1 0 0\nv 0 1 0\n\
         f 1 2 3\n\
         o second\n\
         v 0 0 1\nv 1 0 1\nv 0 1 1\n\
         f 4 5 6\n",
    );

    let mesh = MeshData::from_obj_file(&path).expect("Failed to load OBJ");
    fs::remove_file(&path).ok();

    assert_eq!(mesh.vertices.len(), 6);
    assert_eq!(mesh.indices, vec![0, 1, 2, 3, 4, 5]);
}

#[test]
fn test_vertex_colors_survive_loading() {
    let path = write_temp_obj(
        "colors",
        "v 0 0 0 1 0 0\nv 1 0 0 1 0 0\nv 0 1 0 0 0 1\nf 1 2 3\n",
    );

    let mesh = MeshData::from_obj_file(&path).expect("Failed to load OBJ");
    fs::remove_file(&path).ok();

    assert_eq!(mesh.vertices[0].color, Vec3::X);
    assert_eq!(mesh.vertices[2].color, Vec3::Z);
}

#[test]
fn test_malformed_obj_is_parse_error() {
    let path = write_temp_obj("malformed", "v 0 0 0\nv 1 0\nf 1 2 3\n");

    let err = MeshData::from_obj_file(&path).unwrap_err();
    fs::remove_file(&path).ok();

    match err {
        ResourceError::ObjParse { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("Expected ObjParse, got {other}"),
    }
}

#[test]
fn test_missing_file_is_reported() {
    let path = Path::new("definitely/not/here.obj");
    match MeshData::from_obj_file(path) {
        Err(ResourceError::FileNotFound(reported)) => assert_eq!(reported, path),
        other => panic!("Expected FileNotFound, got {other:?}"),
    }
}

#[test]
fn test_load_bundled_cube() {
    let model_path = Path::new("../../assets/models/cube.obj");

    // Skip test if file doesn't exist
    if !model_path.exists() {
        println!("Skipping test: model file not found at {:?}", model_path);
        return;
    }

    let mesh = MeshData::from_obj_file(model_path).expect("Failed to load cube");
    assert_eq!(mesh.indices.len(), 36);
    assert_eq!(mesh.vertices.len(), 24, "Cube has 4 unique vertices per face");
    mesh.validate().expect("Loaded cube should validate");
}
