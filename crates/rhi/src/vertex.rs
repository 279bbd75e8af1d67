//! Vertex format and input descriptions.
//!
//! # Memory Layout
//!
//! [`Vertex`] is `#[repr(C)]` and tightly packed:
//! - Offset 0: position (12 bytes)
//! - Offset 12: color (12 bytes)
//! - Offset 24: normal (12 bytes)
//! - Offset 36: uv (8 bytes)
//! - Total size: 44 bytes
//!
//! # Shader Locations
//!
//! - location 0: position (vec3)
//! - location 1: color (vec3)
//! - location 2: normal (vec3)
//! - location 3: uv (vec2)

use std::hash::{Hash, Hasher};
use std::mem::offset_of;

use ash::vk;
use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

/// Mesh vertex.
///
/// Equality and hashing compare the bit patterns of all eleven floats, so
/// two vertices are equal exactly when they would upload identical bytes.
/// This is what mesh import uses to collapse duplicates.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct Vertex {
    pub position: Vec3,
    pub color: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
}

impl Vertex {
    #[inline]
    pub const fn new(position: Vec3, color: Vec3, normal: Vec3, uv: Vec2) -> Self {
        Self {
            position,
            color,
            normal,
            uv,
        }
    }

    /// Position and color only; normal and uv are zero.
    #[inline]
    pub const fn colored(position: Vec3, color: Vec3) -> Self {
        Self::new(position, color, Vec3::ZERO, Vec2::ZERO)
    }

    #[inline]
    pub const fn size() -> usize {
        size_of::<Self>()
    }

    /// One interleaved binding at slot 0, advanced per vertex.
    pub fn binding_descriptions() -> [vk::VertexInputBindingDescription; 1] {
        [vk::VertexInputBindingDescription {
            binding: 0,
            stride: size_of::<Self>() as u32,
            input_rate: vk::VertexInputRate::VERTEX,
        }]
    }

    pub fn attribute_descriptions() -> [vk::VertexInputAttributeDescription; 4] {
        [
            vk::VertexInputAttributeDescription {
                binding: 0,
                location: 0,
                format: vk::Format::R32G32B32_SFLOAT,
                offset: offset_of!(Vertex, position) as u32,
            },
            vk::VertexInputAttributeDescription {
                binding: 0,
                location: 1,
                format: vk::Format::R32G32B32_SFLOAT,
                offset: offset_of!(Vertex, color) as u32,
            },
            vk::VertexInputAttributeDescription {
                binding: 0,
                location: 2,
                format: vk::Format::R32G32B32_SFLOAT,
                offset: offset_of!(Vertex, normal) as u32,
            },
            vk::VertexInputAttributeDescription {
                binding: 0,
                location: 3,
                format: vk::Format::R32G32_SFLOAT,
                offset: offset_of!(Vertex, uv) as u32,
            },
        ]
    }

    fn bits(&self) -> [u32; 11] {
        let mut bits = [0u32; 11];
        for (dst, src) in bits.iter_mut().zip(bytemuck::cast_slice::<Vertex, f32>(
            std::slice::from_ref(self),
        )) {
            *dst = src.to_bits();
        }
        bits
    }
}

impl PartialEq for Vertex {
    fn eq(&self, other: &Self) -> bool {
        self.bits() == other.bits()
    }
}

impl Eq for Vertex {}

impl Hash for Vertex {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bits().hash(state);
    }
}
