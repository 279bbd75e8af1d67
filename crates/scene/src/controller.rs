//! First-person movement controllers.
//!
//! Controllers read a snapshot of input state rather than the window, so they
//! can be driven by any input source (and by tests). Both keep pitch within
//! [`PITCH_LIMIT`] and yaw within `[0, 2π)`.

use std::f32::consts::TAU;

use glam::{Vec2, Vec3};

use crate::transform::TransformComponent;

/// Maximum absolute pitch in radians, just short of straight up or down.
pub const PITCH_LIMIT: f32 = 1.5;

/// Which movement actions are held this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MovementInput {
    pub move_left: bool,
    pub move_right: bool,
    pub move_forward: bool,
    pub move_backward: bool,
    pub move_up: bool,
    pub move_down: bool,
    pub look_left: bool,
    pub look_right: bool,
    pub look_up: bool,
    pub look_down: bool,
}

/// Mouse state sampled this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MouseInput {
    pub left_button: bool,
    /// Cursor position in window pixels.
    pub cursor: Vec2,
}

/// Normalizes `v` unless it is (numerically) zero.
fn unit_or_zero(v: Vec3) -> Option<Vec3> {
    (v.dot(v) > f32::EPSILON).then(|| v.normalize())
}

fn clamp_orientation(rotation: &mut Vec3) {
    rotation.x = rotation.x.clamp(-PITCH_LIMIT, PITCH_LIMIT);
    rotation.y = rotation.y.rem_euclid(TAU);
}

/// Keyboard fly-through controller that moves in the XZ plane relative to yaw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KeyboardMovementController {
    /// Units per second.
    pub move_speed: f32,
    /// Radians per second.
    pub turn_speed: f32,
}

impl Default for KeyboardMovementController {
    fn default() -> Self {
        Self {
            move_speed: 3.0,
            turn_speed: 1.5,
        }
    }
}

impl KeyboardMovementController {
    pub fn new(move_speed: f32, turn_speed: f32) -> Self {
        Self {
            move_speed,
            turn_speed,
        }
    }

    /// Applies one frame of input to `transform`. Diagonal movement and
    /// combined look keys are normalized so they are not faster.
    pub fn move_in_plane_xz(&self, input: &MovementInput, dt: f32, transform: &mut TransformComponent) {
        let mut rotate = Vec3::ZERO;
        if input.look_right {
            rotate.y += 1.0;
        }
        if input.look_left {
            rotate.y -= 1.0;
        }
        if input.look_up {
            rotate.x += 1.0;
        }
        if input.look_down {
            rotate.x -= 1.0;
        }

        if let Some(rotate) = unit_or_zero(rotate) {
            transform.rotation += self.turn_speed * dt * rotate;
        }
        clamp_orientation(&mut transform.rotation);

        let yaw = transform.rotation.y;
        let forward = Vec3::new(yaw.sin(), 0.0, yaw.cos());
        let right = Vec3::new(forward.z, 0.0, -forward.x);
        let up = Vec3::NEG_Y;

        let mut direction = Vec3::ZERO;
        if input.move_forward {
            direction += forward;
        }
        if input.move_backward {
            direction -= forward;
        }
        if input.move_right {
            direction += right;
        }
        if input.move_left {
            direction -= right;
        }
        if input.move_up {
            direction += up;
        }
        if input.move_down {
            direction -= up;
        }

        if let Some(direction) = unit_or_zero(direction) {
            transform.translation += self.move_speed * dt * direction;
        }
    }
}

/// Left-button drag to look around.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MouseLookController {
    /// Radians per processed drag step.
    pub sensitivity: f32,
    last_cursor: Option<Vec2>,
}

impl Default for MouseLookController {
    fn default() -> Self {
        Self::new(0.02)
    }
}

impl MouseLookController {
    pub fn new(sensitivity: f32) -> Self {
        Self {
            sensitivity,
            last_cursor: None,
        }
    }

    /// Applies the cursor movement since the previous call while the left
    /// button is held. Releasing the button forgets the anchor, so the next
    /// drag does not jump.
    ///
    /// Returns `true` while a drag is in progress; the window uses this to
    /// capture the cursor.
    pub fn update(&mut self, input: &MouseInput, transform: &mut TransformComponent) -> bool {
        if !input.left_button {
            self.last_cursor = None;
            return false;
        }

        let last = self.last_cursor.replace(input.cursor).unwrap_or(input.cursor);
        let delta = input.cursor - last;

        // Screen Y grows downwards; dragging up pitches up.
        let rotate = Vec3::new(-delta.y, delta.x, 0.0);
        if let Some(rotate) = unit_or_zero(rotate) {
            transform.rotation += self.sensitivity * rotate;
        }
        clamp_orientation(&mut transform.rotation);
        true
    }

    #[inline]
    pub fn is_dragging(&self) -> bool {
        self.last_cursor.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn approx_eq_vec3(a: Vec3, b: Vec3) -> bool {
        (a - b).abs().max_element() < EPSILON
    }

    #[test]
    fn test_forward_moves_along_z_at_zero_yaw() {
        let controller = KeyboardMovementController::default();
        let mut transform = TransformComponent::default();
        let input = MovementInput {
            move_forward: true,
            ..Default::default()
        };

        controller.move_in_plane_xz(&input, 0.5, &mut transform);
        assert!(approx_eq_vec3(transform.translation, Vec3::new(0.0, 0.0, 1.5)));
    }

    #[test]
    fn test_diagonal_movement_is_normalized() {
        let controller = KeyboardMovementController::new(2.0, 1.5);
        let mut transform = TransformComponent::default();
        let input = MovementInput {
            move_forward: true,
            move_right: true,
            ..Default::default()
        };

        controller.move_in_plane_xz(&input, 1.0, &mut transform);
        assert!(approx_eq(transform.translation.length(), 2.0));
    }

    #[test]
    fn test_up_is_negative_y() {
        let controller = KeyboardMovementController::default();
        let mut transform = TransformComponent::default();
        let input = MovementInput {
            move_up: true,
            ..Default::default()
        };

        controller.move_in_plane_xz(&input, 1.0, &mut transform);
        assert!(approx_eq_vec3(transform.translation, Vec3::new(0.0, -3.0, 0.0)));
    }

    #[test]
    fn test_opposing_keys_cancel() {
        let controller = KeyboardMovementController::default();
        let mut transform = TransformComponent::default();
        let input = MovementInput {
            move_left: true,
            move_right: true,
            look_up: true,
            look_down: true,
            ..Default::default()
        };

        controller.move_in_plane_xz(&input, 1.0, &mut transform);
        assert_eq!(transform, TransformComponent::default());
    }

    #[test]
    fn test_pitch_is_clamped_and_yaw_wraps() {
        let controller = KeyboardMovementController::default();
        let mut transform = TransformComponent::default();
        let input = MovementInput {
            look_up: true,
            ..Default::default()
        };
        controller.move_in_plane_xz(&input, 10.0, &mut transform);
        assert!(approx_eq(transform.rotation.x, PITCH_LIMIT));

        let input = MovementInput {
            look_left: true,
            ..Default::default()
        };
        let mut transform = TransformComponent::default();
        controller.move_in_plane_xz(&input, 1.0, &mut transform);
        assert!(approx_eq(transform.rotation.y, TAU - 1.5));
    }

    #[test]
    fn test_mouse_first_press_does_not_rotate() {
        let mut controller = MouseLookController::new(0.1);
        let mut transform = TransformComponent::default();
        let input = MouseInput {
            left_button: true,
            cursor: Vec2::new(400.0, 300.0),
        };

        assert!(controller.update(&input, &mut transform));
        assert_eq!(transform.rotation, Vec3::ZERO);
        assert!(controller.is_dragging());
    }

    #[test]
    fn test_mouse_drag_rotates_by_sensitivity() {
        let mut controller = MouseLookController::new(0.1);
        let mut transform = TransformComponent::default();
        let mut input = MouseInput {
            left_button: true,
            cursor: Vec2::new(400.0, 300.0),
        };
        controller.update(&input, &mut transform);

        input.cursor = Vec2::new(450.0, 300.0);
        controller.update(&input, &mut transform);
        assert!(approx_eq_vec3(transform.rotation, Vec3::new(0.0, 0.1, 0.0)));

        input.cursor = Vec2::new(450.0, 250.0);
        controller.update(&input, &mut transform);
        assert!(approx_eq(transform.rotation.x, 0.1));
    }

    #[test]
    fn test_mouse_release_resets_anchor() {
        let mut controller = MouseLookController::new(0.1);
        let mut transform = TransformComponent::default();
        controller.update(
            &MouseInput {
                left_button: true,
                cursor: Vec2::ZERO,
            },
            &mut transform,
        );
        assert!(!controller.update(&MouseInput::default(), &mut transform));
        assert!(!controller.is_dragging());

        // A new press far away must not produce a jump.
        controller.update(
            &MouseInput {
                left_button: true,
                cursor: Vec2::new(1000.0, 1000.0),
            },
            &mut transform,
        );
        assert_eq!(transform.rotation, Vec3::ZERO);
    }
}
