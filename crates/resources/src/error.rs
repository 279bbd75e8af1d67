//! Error types for resource loading.

use std::path::PathBuf;

use engine_rhi::RhiError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResourceError {
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The OBJ parser rejected the input. `message` is its own diagnostic.
    #[error("Failed to parse OBJ '{path}': {message}")]
    ObjParse { path: PathBuf, message: String },

    /// The input contained no triangles.
    #[error("Mesh '{0}' contains no triangles")]
    EmptyMesh(PathBuf),

    /// A mesh needs at least one triangle's worth of vertices.
    #[error("Mesh needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),

    /// An index points past the end of the vertex list.
    #[error("Index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },

    /// Creating or filling GPU buffers failed.
    #[error("GPU upload failed: {0}")]
    Rhi(#[from] RhiError),
}

/// Result type alias for resource operations.
pub type ResourceResult<T> = Result<T, ResourceError>;
