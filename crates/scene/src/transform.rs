//! Transform component for scene objects.
//!
//! Rotation is stored as Tait-Bryan angles in radians and applied in the
//! intrinsic order Y (yaw), X (pitch), Z (roll). The model matrix is
//! `T * Ry * Rx * Rz * S`, written out directly rather than multiplied.
//!
//! # Example
//!
//! ```
//! use engine_scene::TransformComponent;
//! use glam::Vec3;
//!
//! let transform = TransformComponent::new()
//!     .with_translation(Vec3::new(0.0, 0.5, 2.5))
//!     .with_scale(Vec3::splat(3.0));
//!
//! let world_pos = transform.mat4().transform_point3(Vec3::ZERO);
//! assert_eq!(world_pos, Vec3::new(0.0, 0.5, 2.5));
//! ```

use glam::{Mat3, Mat4, Vec3, Vec4};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformComponent {
    pub translation: Vec3,
    pub scale: Vec3,
    /// Euler angles in radians: `x` pitch, `y` yaw, `z` roll.
    pub rotation: Vec3,
}

impl Default for TransformComponent {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            scale: Vec3::ONE,
            rotation: Vec3::ZERO,
        }
    }
}

/// Sines and cosines of the three angles, named after their application
/// order: 1 = yaw (y), 2 = pitch (x), 3 = roll (z).
struct EulerTerms {
    c1: f32,
    s1: f32,
    c2: f32,
    s2: f32,
    c3: f32,
    s3: f32,
}

impl EulerTerms {
    fn new(rotation: Vec3) -> Self {
        let (s1, c1) = rotation.y.sin_cos();
        let (s2, c2) = rotation.x.sin_cos();
        let (s3, c3) = rotation.z.sin_cos();
        Self {
            c1,
            s1,
            c2,
            s2,
            c3,
            s3,
        }
    }

    /// Columns of `Ry * Rx * Rz`.
    fn basis(&self) -> [Vec3; 3] {
        let Self {
            c1,
            s1,
            c2,
            s2,
            c3,
            s3,
        } = *self;
        [
            Vec3::new(c1 * c3 + s1 * s2 * s3, c2 * s3, c1 * s2 * s3 - c3 * s1),
            Vec3::new(c3 * s1 * s2 - c1 * s3, c2 * c3, c1 * c3 * s2 + s1 * s3),
            Vec3::new(c2 * s1, -s2, c1 * c2),
        ]
    }
}

/// Orthonormal basis `[u, v, w]` of the Y-X-Z rotation `rotation`.
pub(crate) fn yxz_basis(rotation: Vec3) -> [Vec3; 3] {
    EulerTerms::new(rotation).basis()
}

impl TransformComponent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_translation(mut self, translation: Vec3) -> Self {
        self.translation = translation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    /// Model matrix: translation, then Y-X-Z rotation, then scale.
    pub fn mat4(&self) -> Mat4 {
        let [u, v, w] = yxz_basis(self.rotation);
        Mat4::from_cols(
            (u * self.scale.x).extend(0.0),
            (v * self.scale.y).extend(0.0),
            (w * self.scale.z).extend(0.0),
            Vec4::new(self.translation.x, self.translation.y, self.translation.z, 1.0),
        )
    }

    /// Inverse transpose of the rotation-scale block, for transforming
    /// normals under non-uniform scale.
    ///
    /// A zero scale component has no inverse; identity is returned instead
    /// so shaders never see NaN or infinity.
    pub fn normal_matrix(&self) -> Mat3 {
        const EPSILON: f32 = 1e-6;
        if self.scale.abs().min_element() < EPSILON {
            return Mat3::IDENTITY;
        }

        let inverse_scale = self.scale.recip();
        let [u, v, w] = yxz_basis(self.rotation);
        Mat3::from_cols(u * inverse_scale.x, v * inverse_scale.y, w * inverse_scale.z)
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use super::*;

    const EPSILON: f32 = 1e-5;

    fn approx_eq_vec3(a: Vec3, b: Vec3) -> bool {
        (a - b).abs().max_element() < EPSILON
    }

    fn approx_eq_mat4(a: Mat4, b: Mat4) -> bool {
        a.abs_diff_eq(b, EPSILON)
    }

    #[test]
    fn test_default_is_identity() {
        let t = TransformComponent::default();
        assert_eq!(t.scale, Vec3::ONE);
        assert_eq!(t.mat4(), Mat4::IDENTITY);
        assert_eq!(t.normal_matrix(), Mat3::IDENTITY);
    }

    #[test]
    fn test_translation_only() {
        let t = TransformComponent::new().with_translation(Vec3::new(1.0, 2.0, 3.0));
        let m = t.mat4();

        assert!(approx_eq_mat4(
            Mat4::from_mat3(Mat3::from_mat4(m)),
            Mat4::IDENTITY
        ));
        assert_eq!(m.w_axis, Vec4::new(1.0, 2.0, 3.0, 1.0));
    }

    #[test]
    fn test_matches_composed_rotations() {
        let rotation = Vec3::new(0.3, -1.1, 0.7);
        let t = TransformComponent::new()
            .with_translation(Vec3::new(-2.0, 0.5, 4.0))
            .with_rotation(rotation)
            .with_scale(Vec3::new(1.0, 2.0, 0.5));

        let expected = Mat4::from_translation(t.translation)
            * Mat4::from_rotation_y(rotation.y)
            * Mat4::from_rotation_x(rotation.x)
            * Mat4::from_rotation_z(rotation.z)
            * Mat4::from_scale(t.scale);

        assert!(approx_eq_mat4(t.mat4(), expected));
    }

    #[test]
    fn test_yaw_quarter_turn() {
        let t = TransformComponent::new().with_rotation(Vec3::new(0.0, FRAC_PI_2, 0.0));
        let p = t.mat4().transform_point3(Vec3::Z);
        assert!(approx_eq_vec3(p, Vec3::X), "got {:?}", p);
    }

    #[test]
    fn test_normal_matrix_is_inverse_transpose() {
        let t = TransformComponent::new()
            .with_rotation(Vec3::new(0.4, 0.2, -0.9))
            .with_scale(Vec3::new(1.0, 3.0, 0.5));

        let expected = Mat3::from_mat4(t.mat4()).inverse().transpose();
        assert!(t.normal_matrix().abs_diff_eq(expected, EPSILON));
    }

    #[test]
    fn test_normal_matrix_zero_scale_falls_back() {
        let t = TransformComponent::new().with_scale(Vec3::new(1.0, 0.0, 1.0));
        let normal = t.normal_matrix();
        assert_eq!(normal, Mat3::IDENTITY);
        assert!(!normal.is_nan());
    }
}
