//! CPU-side mesh data and OBJ import.
//!
//! OBJ files are parsed with `tobj`, triangulated and flattened to a single
//! index stream. Identical vertices (all eleven floats bit-equal) are then
//! collapsed so each unique vertex is stored once.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use engine_rhi::vertex::Vertex;
use glam::{Vec2, Vec3};
use tracing::{debug, info};

use crate::error::{ResourceError, ResourceResult};

/// Shown in errors for meshes that did not come from a file.
const IN_MEMORY_SOURCE: &str = "<memory>";

/// Vertex list plus an optional index list. An empty `indices` means the
/// vertices are drawn in order as a triangle list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// Loads and deduplicates an OBJ file. Materials are ignored; colors come
    /// from `v x y z r g b` lines when present.
    ///
    /// # Errors
    ///
    /// [`ResourceError::FileNotFound`] for a missing file,
    /// [`ResourceError::ObjParse`] with the parser's message for malformed
    /// input, and [`ResourceError::EmptyMesh`] when there are no faces.
    pub fn from_obj_file(path: &Path) -> ResourceResult<Self> {
        if !path.exists() {
            return Err(ResourceError::FileNotFound(path.to_path_buf()));
        }
        let mut reader = BufReader::new(File::open(path)?);
        let data = Self::parse_obj(&mut reader, path)?;

        info!(
            "Loaded '{}': {} unique vertices, {} indices",
            path.display(),
            data.vertices.len(),
            data.indices.len()
        );
        Ok(data)
    }

    /// Same as [`from_obj_file`](Self::from_obj_file) for an in-memory source.
    pub fn from_obj_reader<R: BufRead>(reader: &mut R) -> ResourceResult<Self> {
        Self::parse_obj(reader, Path::new(IN_MEMORY_SOURCE))
    }

    fn parse_obj<R: BufRead>(reader: &mut R, origin: &Path) -> ResourceResult<Self> {
        let options = tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        };
        let (models, _materials) = tobj::load_obj_buf(reader, &options, |_| {
            Ok(Default::default())
        })
        .map_err(|e| ResourceError::ObjParse {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })?;

        let mut builder = DedupBuilder::default();
        for model in &models {
            let mesh = &model.mesh;
            for &index in &mesh.indices {
                builder.push(vertex_at(mesh, index as usize));
            }
            debug!(
                "OBJ object '{}': {} indices",
                model.name,
                mesh.indices.len()
            );
        }

        let data = builder.finish();
        if data.indices.is_empty() {
            return Err(ResourceError::EmptyMesh(PathBuf::from(origin)));
        }
        data.validate()?;
        Ok(data)
    }

    /// Checks the invariants [`Mesh`](crate::Mesh) relies on.
    ///
    /// # Errors
    ///
    /// [`ResourceError::TooFewVertices`] below 3 vertices, and
    /// [`ResourceError::IndexOutOfRange`] for an index past the vertex list.
    pub fn validate(&self) -> ResourceResult<()> {
        if self.vertices.len() < 3 {
            return Err(ResourceError::TooFewVertices(self.vertices.len()));
        }
        if let Some(&index) = self
            .indices
            .iter()
            .find(|&&index| index as usize >= self.vertices.len())
        {
            return Err(ResourceError::IndexOutOfRange {
                index,
                vertex_count: self.vertices.len(),
            });
        }
        Ok(())
    }

    #[inline]
    pub fn has_indices(&self) -> bool {
        !self.indices.is_empty()
    }

    /// Unit cube centred on the origin, one flat color and normal per face.
    pub fn colored_cube() -> Self {
        // (normal, color, four corners); corners 0-1 and 2-3 are diagonals.
        const FACES: [([f32; 3], [f32; 3], [[f32; 3]; 4]); 6] = [
            // left, white
            ([-1.0, 0.0, 0.0], [0.9, 0.9, 0.9], [[-0.5, -0.5, -0.5], [-0.5, 0.5, 0.5], [-0.5, -0.5, 0.5], [-0.5, 0.5, -0.5]]),
            // right, yellow
            ([1.0, 0.0, 0.0], [0.8, 0.8, 0.1], [[0.5, -0.5, -0.5], [0.5, 0.5, 0.5], [0.5, -0.5, 0.5], [0.5, 0.5, -0.5]]),
            // top (-y), orange
            ([0.0, -1.0, 0.0], [0.9, 0.6, 0.1], [[-0.5, -0.5, -0.5], [0.5, -0.5, 0.5], [-0.5, -0.5, 0.5], [0.5, -0.5, -0.5]]),
            // bottom (+y), red
            ([0.0, 1.0, 0.0], [0.8, 0.1, 0.1], [[-0.5, 0.5, -0.5], [0.5, 0.5, 0.5], [-0.5, 0.5, 0.5], [0.5, 0.5, -0.5]]),
            // front (+z), blue
            ([0.0, 0.0, 1.0], [0.1, 0.1, 0.8], [[-0.5, -0.5, 0.5], [0.5, 0.5, 0.5], [-0.5, 0.5, 0.5], [0.5, -0.5, 0.5]]),
            // back (-z), green
            ([0.0, 0.0, -1.0], [0.1, 0.8, 0.1], [[-0.5, -0.5, -0.5], [0.5, 0.5, -0.5], [-0.5, 0.5, -0.5], [0.5, -0.5, -0.5]]),
        ];

        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        for (normal, color, corners) in FACES {
            let base = vertices.len() as u32;
            for corner in corners {
                vertices.push(Vertex::new(
                    Vec3::from(corner),
                    Vec3::from(color),
                    Vec3::from(normal),
                    Vec2::ZERO,
                ));
            }
            indices.extend([0, 1, 2, 0, 3, 1].map(|i| base + i));
        }

        Self { vertices, indices }
    }
}

/// Builds the vertex at `index` of a single-index mesh. Missing attributes
/// default to white color and zero normal and uv.
fn vertex_at(mesh: &tobj::Mesh, index: usize) -> Vertex {
    let vec3_at = |data: &[f32], default: Vec3| {
        data.get(3 * index..3 * index + 3)
            .map_or(default, Vec3::from_slice)
    };

    Vertex::new(
        vec3_at(&mesh.positions, Vec3::ZERO),
        vec3_at(&mesh.vertex_color, Vec3::ONE),
        vec3_at(&mesh.normals, Vec3::ZERO),
        mesh.texcoords
            .get(2 * index..2 * index + 2)
            .map_or(Vec2::ZERO, Vec2::from_slice),
    )
}

/// Accumulates a triangle list, storing each distinct vertex once.
#[derive(Default)]
struct DedupBuilder {
    unique: HashMap<Vertex, u32>,
    data: MeshData,
}

impl DedupBuilder {
    fn push(&mut self, vertex: Vertex) {
        let vertices = &mut self.data.vertices;
        let index = *self.unique.entry(vertex).or_insert_with(|| {
            vertices.push(vertex);
            (vertices.len() - 1) as u32
        });
        self.data.indices.push(index);
    }

    fn finish(self) -> MeshData {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn parse(src: &str) -> ResourceResult<MeshData> {
        MeshData::from_obj_reader(&mut Cursor::new(src.as_bytes()))
    }

    #[test]
    fn test_dedup_builder_collapses_repeats() {
        let a = Vertex::colored(Vec3::ZERO, Vec3::ONE);
        let b = Vertex::colored(Vec3::X, Vec3::ONE);
        let mut builder = DedupBuilder::default();
        for v in [a, b, a, a] {
            builder.push(v);
        }
        let data = builder.finish();
        assert_eq!(data.vertices, vec![a, b]);
        assert_eq!(data.indices, vec![0, 1, 0, 0]);
    }

    #[test]
    fn test_quad_shares_diagonal_vertices() {
        let data = parse(
            "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nvn 0 0 1\n\
             f 1//1 2//1 3//1\nf 1//1 3//1 4//1\n",
        )
        .unwrap();

        assert_eq!(data.vertices.len(), 4);
        assert_eq!(data.indices.len(), 6);
        assert_eq!(data.indices[0], data.indices[3]);
        assert_eq!(data.indices[2], data.indices[4]);
        assert!(data.vertices.iter().all(|v| v.normal == Vec3::Z));
    }

    #[test]
    fn test_quad_face_is_triangulated() {
        let data = parse("v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n").unwrap();
        assert_eq!(data.indices.len(), 6);
        assert_eq!(data.vertices.len(), 4);
    }

    #[test]
    fn test_vertex_colors_and_defaults() {
        let data = parse("v 0 0 0 1 0 0\nv 1 0 0 0 1 0\nv 0 1 0 0 0 1\nf 1 2 3\n").unwrap();
        assert_eq!(data.vertices[0].color, Vec3::X);
        assert_eq!(data.vertices[1].color, Vec3::Y);
        assert_eq!(data.vertices[2].color, Vec3::Z);
        assert_eq!(data.vertices[0].uv, Vec2::ZERO);

        let plain = parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        assert!(plain.vertices.iter().all(|v| v.color == Vec3::ONE));
    }

    #[test]
    fn test_texcoords_are_read() {
        let data = parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0.25 0.75\nf 1/1 2/1 3/1\n").unwrap();
        assert_eq!(data.vertices[1].uv, Vec2::new(0.25, 0.75));
    }

    #[test]
    fn test_no_faces_is_empty_mesh() {
        let err = parse("v 0 0 0\nv 1 0 0\nv 0 1 0\n").unwrap_err();
        assert!(matches!(err, ResourceError::EmptyMesh(_)));
    }

    #[test]
    fn test_malformed_face_reports_parser_message() {
        let err = parse("v 0 0 0\nf 1 x 3\n").unwrap_err();
        match err {
            ResourceError::ObjParse { path, message } => {
                assert_eq!(path, PathBuf::from(IN_MEMORY_SOURCE));
                assert!(!message.is_empty());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_validate_rejects_short_and_out_of_range() {
        let tri = vec![Vertex::default(); 2];
        assert!(matches!(
            MeshData::new(tri, vec![]).validate(),
            Err(ResourceError::TooFewVertices(2))
        ));

        let tri = vec![Vertex::default(); 3];
        assert!(matches!(
            MeshData::new(tri, vec![0, 1, 3]).validate(),
            Err(ResourceError::IndexOutOfRange { index: 3, vertex_count: 3 })
        ));
    }

    #[test]
    fn test_colored_cube() {
        let cube = MeshData::colored_cube();
        assert_eq!(cube.vertices.len(), 24);
        assert_eq!(cube.indices.len(), 36);
        cube.validate().unwrap();
        assert!(cube.vertices.iter().all(|v| v.position.abs() == Vec3::splat(0.5)));
    }

    #[test]
    fn test_missing_file() {
        let err = MeshData::from_obj_file(Path::new("does/not/exist.obj")).unwrap_err();
        assert!(matches!(err, ResourceError::FileNotFound(_)));
    }
}
