//! Camera projection and view matrices.
//!
//! Matrices follow the Vulkan conventions the shaders expect: clip-space depth
//! runs from 0 at the near plane to 1 at the far plane, and +Y points down, so
//! the default world "up" is -Y.

use glam::{Mat3, Mat4, Vec3, Vec4};
use tracing::trace;

use crate::error::{SceneError, SceneResult};
use crate::transform::yxz_basis;

/// World up used when a caller does not supply one.
pub const DEFAULT_UP: Vec3 = Vec3::NEG_Y;

/// Holds the last computed projection and view matrices. Each setter replaces
/// one of them wholesale.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    projection: Mat4,
    view: Mat4,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            projection: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Orthographic projection of the box `[left, right] x [top, bottom] x
    /// [near, far]` onto clip space with depth in `[0, 1]`.
    pub fn set_orthographic_projection(
        &mut self,
        left: f32,
        right: f32,
        top: f32,
        bottom: f32,
        near: f32,
        far: f32,
    ) {
        self.projection = Mat4::from_cols(
            Vec4::new(2.0 / (right - left), 0.0, 0.0, 0.0),
            Vec4::new(0.0, 2.0 / (bottom - top), 0.0, 0.0),
            Vec4::new(0.0, 0.0, 1.0 / (far - near), 0.0),
            Vec4::new(
                -(right + left) / (right - left),
                -(bottom + top) / (bottom - top),
                -near / (far - near),
                1.0,
            ),
        );
    }

    /// Perspective projection with vertical field of view `fov_y` in radians.
    ///
    /// # Errors
    ///
    /// [`SceneError::DegenerateAspectRatio`] when `aspect` is zero or not finite.
    pub fn set_perspective_projection(
        &mut self,
        fov_y: f32,
        aspect: f32,
        near: f32,
        far: f32,
    ) -> SceneResult<()> {
        if !aspect.is_finite() || aspect.abs() <= f32::EPSILON {
            return Err(SceneError::DegenerateAspectRatio(aspect));
        }

        let tan_half_fov = (fov_y / 2.0).tan();
        self.projection = Mat4::from_cols(
            Vec4::new(1.0 / (aspect * tan_half_fov), 0.0, 0.0, 0.0),
            Vec4::new(0.0, 1.0 / tan_half_fov, 0.0, 0.0),
            Vec4::new(0.0, 0.0, far / (far - near), 1.0),
            Vec4::new(0.0, 0.0, -(far * near) / (far - near), 0.0),
        );
        trace!(fov_y, aspect, near, far, "perspective projection updated");
        Ok(())
    }

    /// Looks from `position` along `direction`.
    ///
    /// # Errors
    ///
    /// [`SceneError::DegenerateViewDirection`] when `direction` is zero or
    /// parallel to `up`, since neither yields a basis.
    pub fn set_view_direction(&mut self, position: Vec3, direction: Vec3, up: Vec3) -> SceneResult<()> {
        let w = direction.try_normalize().ok_or_else(|| {
            SceneError::DegenerateViewDirection(format!("zero direction {direction}"))
        })?;
        let u = w.cross(up).try_normalize().ok_or_else(|| {
            SceneError::DegenerateViewDirection(format!(
                "direction {direction} is parallel to up {up}"
            ))
        })?;
        let v = w.cross(u);

        self.view = view_from_basis(position, u, v, w);
        Ok(())
    }

    /// Looks from `position` towards `target`.
    ///
    /// # Errors
    ///
    /// [`SceneError::DegenerateViewDirection`] when `target == position`.
    pub fn set_view_target(&mut self, position: Vec3, target: Vec3, up: Vec3) -> SceneResult<()> {
        if target == position {
            return Err(SceneError::DegenerateViewDirection(format!(
                "target equals camera position {position}"
            )));
        }
        self.set_view_direction(position, target - position, up)
    }

    /// Places the camera at `position` with yaw-pitch-roll `rotation`, using
    /// the same Y-X-Z convention as [`TransformComponent`](crate::TransformComponent).
    pub fn set_view_yxz(&mut self, position: Vec3, rotation: Vec3) {
        let [u, v, w] = yxz_basis(rotation);
        self.view = view_from_basis(position, u, v, w);
    }

    #[inline]
    pub fn projection(&self) -> &Mat4 {
        &self.projection
    }

    #[inline]
    pub fn view(&self) -> &Mat4 {
        &self.view
    }

    /// `projection * view`.
    #[inline]
    pub fn projection_view(&self) -> Mat4 {
        self.projection * self.view
    }
}

/// World-to-camera matrix for the orthonormal basis `(u, v, w)` at `position`.
fn view_from_basis(position: Vec3, u: Vec3, v: Vec3, w: Vec3) -> Mat4 {
    let rotation = Mat3::from_cols(u, v, w).transpose();
    let translation = Vec3::new(-u.dot(position), -v.dot(position), -w.dot(position));
    Mat4::from_cols(
        rotation.x_axis.extend(0.0),
        rotation.y_axis.extend(0.0),
        rotation.z_axis.extend(0.0),
        translation.extend(1.0),
    )
}
