//! Draws game objects with a single pipeline and per-object push constants.

use std::path::Path;
use std::sync::Arc;

use ash::vk;
use glam::Mat4;
use tracing::info;

use engine_resources::Mesh;
use engine_rhi::command::CommandBuffer;
use engine_rhi::device::Device;
use engine_rhi::pipeline::{Pipeline, PipelineConfig, PipelineLayout};
use engine_scene::{Camera, GameObject};

use crate::error::{RendererError, RendererResult};
use crate::push_constants::{PUSH_CONSTANT_STAGES, SimplePushConstantData};

pub struct RenderSystem {
    pipeline: Pipeline,
    layout: PipelineLayout,
}

impl RenderSystem {
    /// Builds the pipeline layout (one push constant range, no descriptor
    /// sets) and a pipeline with default settings for `render_pass`.
    pub fn new(
        device: Arc<Device>,
        render_pass: vk::RenderPass,
        vertex_shader: &Path,
        fragment_shader: &Path,
    ) -> RendererResult<Self> {
        Self::with_config(device, render_pass, vertex_shader, fragment_shader, |_| {})
    }

    /// Like [`new`](Self::new), letting `customize` adjust the pipeline
    /// configuration before it is built.
    pub fn with_config<F>(
        device: Arc<Device>,
        render_pass: vk::RenderPass,
        vertex_shader: &Path,
        fragment_shader: &Path,
        customize: F,
    ) -> RendererResult<Self>
    where
        F: FnOnce(&mut PipelineConfig),
    {
        let size = SimplePushConstantData::size();
        let limit = device.limits().max_push_constants_size;
        if size > limit {
            return Err(RendererError::PushConstantsTooLarge { size, limit });
        }

        let layout = PipelineLayout::new(device.clone(), &[], &[SimplePushConstantData::range()])?;

        let mut config = PipelineConfig::new(layout.handle(), render_pass);
        customize(&mut config);
        let pipeline = Pipeline::new_graphics(device, vertex_shader, fragment_shader, &config)?;

        info!(
            "Render system ready ({}, {})",
            vertex_shader.display(),
            fragment_shader.display()
        );
        Ok(Self { pipeline, layout })
    }

    /// Records draws for `objects` in order. Must be called inside the swap
    /// chain render pass. Objects without a mesh are skipped.
    pub fn render_game_objects<'a, I>(&self, command_buffer: &CommandBuffer, objects: I, camera: &Camera)
    where
        I: IntoIterator<Item = &'a GameObject<Mesh>>,
    {
        command_buffer.bind_graphics_pipeline(self.pipeline.handle());

        let projection_view = camera.projection_view();
        for object in objects {
            let Some(mesh) = &object.mesh else {
                continue;
            };

            let push = object_push_constants(projection_view, object);
            command_buffer.push_constants(self.layout.handle(), PUSH_CONSTANT_STAGES, 0, &push);
            mesh.bind(command_buffer);
            mesh.draw(command_buffer);
        }
    }

    #[inline]
    pub fn pipeline_layout(&self) -> vk::PipelineLayout {
        self.layout.handle()
    }
}

/// Push constants for one object: `projection * view * model` and its color.
pub fn object_push_constants<M>(projection_view: Mat4, object: &GameObject<M>) -> SimplePushConstantData {
    SimplePushConstantData::new(projection_view * object.transform.mat4(), object.color)
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use engine_scene::GameObjectRegistry;

    use super::*;

    #[test]
    fn test_push_constants_combine_camera_and_model() {
        let mut registry = GameObjectRegistry::<()>::new();
        let object = registry.spawn().unwrap();
        object.color = Vec3::new(0.1, 0.8, 0.1);
        object.transform.translation = Vec3::new(0.0, 0.0, 2.5);
        object.transform.scale = Vec3::splat(0.5);

        let mut camera = Camera::new();
        camera.set_view_yxz(Vec3::new(0.0, 0.0, -1.0), Vec3::ZERO);

        let push = object_push_constants(camera.projection_view(), object);
        let expected = *camera.view() * object.transform.mat4();
        assert!(push.transform.abs_diff_eq(expected, 1e-5));
        assert_eq!(push.color, Vec3::new(0.1, 0.8, 0.1));

        // Model origin lands 3.5 units in front of the camera.
        let origin = push.transform.transform_point3(Vec3::ZERO);
        assert!((origin - Vec3::new(0.0, 0.0, 3.5)).length() < 1e-5);
    }
}
