//! Mesh resources.
//!
//! This crate handles:
//! - OBJ import with vertex deduplication
//! - Built-in primitive meshes
//! - Uploading mesh data to device-local GPU buffers

mod error;

pub mod mesh;
pub mod mesh_data;

pub use error::{ResourceError, ResourceResult};
pub use mesh::Mesh;
pub use mesh_data::MeshData;
