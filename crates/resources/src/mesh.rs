//! GPU-resident meshes.

use std::path::Path;
use std::sync::Arc;

use ash::vk;
use engine_rhi::buffer::{Buffer, BufferUsage};
use engine_rhi::command::CommandBuffer;
use engine_rhi::device::Device;
use tracing::debug;

use crate::error::ResourceResult;
use crate::mesh_data::MeshData;

/// Vertex and optional index buffer in device-local memory.
///
/// Both buffers are filled once at creation through a staging copy and are
/// immutable afterwards.
pub struct Mesh {
    vertex_buffer: Buffer,
    index_buffer: Option<Buffer>,
    vertex_count: u32,
    index_count: u32,
}

impl Mesh {
    /// Uploads `data` to the GPU. Blocks until the transfer has completed.
    ///
    /// # Errors
    ///
    /// Fails when `data` does not validate or a buffer cannot be created.
    pub fn new(device: Arc<Device>, data: &MeshData) -> ResourceResult<Self> {
        data.validate()?;

        let vertex_buffer = Buffer::new_device_local(
            device.clone(),
            BufferUsage::Vertex,
            bytemuck::cast_slice(&data.vertices),
        )?;
        let index_buffer = if data.has_indices() {
            Some(Buffer::new_device_local(
                device,
                BufferUsage::Index,
                bytemuck::cast_slice(&data.indices),
            )?)
        } else {
            None
        };

        debug!(
            "Uploaded mesh: {} vertices, {} indices",
            data.vertices.len(),
            data.indices.len()
        );

        Ok(Self {
            vertex_buffer,
            index_buffer,
            vertex_count: data.vertices.len() as u32,
            index_count: data.indices.len() as u32,
        })
    }

    /// Loads an OBJ file and uploads it.
    pub fn from_obj_file(device: Arc<Device>, path: &Path) -> ResourceResult<Self> {
        let data = MeshData::from_obj_file(path)?;
        Self::new(device, &data)
    }

    /// Binds the vertex buffer at binding 0 and, if present, the index buffer.
    pub fn bind(&self, command_buffer: &CommandBuffer) {
        command_buffer.bind_vertex_buffers(0, &[self.vertex_buffer.handle()], &[0]);
        if let Some(index_buffer) = &self.index_buffer {
            command_buffer.bind_index_buffer(index_buffer.handle(), 0, vk::IndexType::UINT32);
        }
    }

    /// Records one draw of the whole mesh. Call [`bind`](Self::bind) first.
    pub fn draw(&self, command_buffer: &CommandBuffer) {
        if self.has_indices() {
            command_buffer.draw_indexed(self.index_count, 1, 0, 0, 0);
        } else {
            command_buffer.draw(self.vertex_count, 1, 0, 0);
        }
    }

    #[inline]
    pub fn has_indices(&self) -> bool {
        self.index_buffer.is_some()
    }

    #[inline]
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    #[inline]
    pub fn index_count(&self) -> u32 {
        self.index_count
    }
}
