//! Per-draw data pushed to the simple shader pair.

use ash::vk;
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

/// Shader stages that read [`SimplePushConstantData`].
pub const PUSH_CONSTANT_STAGES: vk::ShaderStageFlags =
    vk::ShaderStageFlags::from_raw(
        vk::ShaderStageFlags::VERTEX.as_raw() | vk::ShaderStageFlags::FRAGMENT.as_raw(),
    );

/// Matches the shader block
///
/// ```glsl
/// layout(push_constant) uniform Push {
///     mat4 transform;
///     vec3 color;
/// } push;
/// ```
///
/// `color` starts at byte 64 and is padded to 16 bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct SimplePushConstantData {
    /// `projection * view * model`.
    pub transform: Mat4,
    pub color: Vec3,
    _padding: f32,
}

const _: () = assert!(std::mem::size_of::<SimplePushConstantData>() == 80);

impl SimplePushConstantData {
    pub fn new(transform: Mat4, color: Vec3) -> Self {
        Self {
            transform,
            color,
            _padding: 0.0,
        }
    }

    /// Size in bytes, as declared in the pipeline layout range.
    #[inline]
    pub const fn size() -> u32 {
        std::mem::size_of::<Self>() as u32
    }

    /// The single range covering the whole payload at offset 0.
    pub fn range() -> vk::PushConstantRange {
        vk::PushConstantRange::default()
            .stage_flags(PUSH_CONSTANT_STAGES)
            .offset(0)
            .size(Self::size())
    }
}

impl Default for SimplePushConstantData {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY, Vec3::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use std::mem::offset_of;

    use super::*;

    #[test]
    fn test_layout_matches_shader_block() {
        assert_eq!(offset_of!(SimplePushConstantData, transform), 0);
        assert_eq!(offset_of!(SimplePushConstantData, color), 64);
        assert_eq!(SimplePushConstantData::size(), 80);
        // Guaranteed minimum for maxPushConstantsSize.
        assert!(SimplePushConstantData::size() <= 128);
    }

    #[test]
    fn test_bytes_follow_field_order() {
        let data = SimplePushConstantData::new(Mat4::IDENTITY, Vec3::new(0.1, 0.2, 0.3));
        let floats: &[f32] = bytemuck::cast_slice(bytemuck::bytes_of(&data));
        assert_eq!(floats.len(), 20);
        assert_eq!(floats[0], 1.0);
        assert_eq!(floats[5], 1.0);
        assert_eq!(&floats[16..19], &[0.1, 0.2, 0.3]);
        assert_eq!(floats[19], 0.0);
    }

    #[test]
    fn test_range_is_visible_to_both_stages() {
        let range = SimplePushConstantData::range();
        assert_eq!(range.offset, 0);
        assert_eq!(range.size, 80);
        assert!(range.stage_flags.contains(vk::ShaderStageFlags::VERTEX));
        assert!(range.stage_flags.contains(vk::ShaderStageFlags::FRAGMENT));
    }
}
