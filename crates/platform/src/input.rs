//! Keyboard and mouse state, and its mapping onto controller input.

use std::collections::HashSet;

use engine_scene::{MouseInput, MovementInput};
use glam::Vec2;

pub use winit::keyboard::KeyCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    /// `None` for buttons the engine does not track.
    pub fn from_winit(button: winit::event::MouseButton) -> Option<Self> {
        match button {
            winit::event::MouseButton::Left => Some(MouseButton::Left),
            winit::event::MouseButton::Right => Some(MouseButton::Right),
            winit::event::MouseButton::Middle => Some(MouseButton::Middle),
            _ => None,
        }
    }
}

/// Tracks the current state of keyboard and mouse input.
#[derive(Debug, Default)]
pub struct InputState {
    pressed_keys: HashSet<KeyCode>,
    /// Keys that went down since the last [`begin_frame`](Self::begin_frame).
    just_pressed_keys: HashSet<KeyCode>,
    pressed_buttons: HashSet<MouseButton>,
    cursor_position: Vec2,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears per-frame state. Called before each batch of events.
    pub fn begin_frame(&mut self) {
        self.just_pressed_keys.clear();
    }

    pub fn on_key_pressed(&mut self, key: KeyCode) {
        if self.pressed_keys.insert(key) {
            self.just_pressed_keys.insert(key);
        }
    }

    pub fn on_key_released(&mut self, key: KeyCode) {
        self.pressed_keys.remove(&key);
    }

    pub fn on_mouse_pressed(&mut self, button: MouseButton) {
        self.pressed_buttons.insert(button);
    }

    pub fn on_mouse_released(&mut self, button: MouseButton) {
        self.pressed_buttons.remove(&button);
    }

    pub fn on_cursor_moved(&mut self, x: f32, y: f32) {
        self.cursor_position = Vec2::new(x, y);
    }

    /// Drops every held key and button, e.g. when the window loses focus and
    /// release events would otherwise be missed.
    pub fn release_all(&mut self) {
        self.pressed_keys.clear();
        self.pressed_buttons.clear();
    }

    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.pressed_keys.contains(&key)
    }

    pub fn is_key_just_pressed(&self, key: KeyCode) -> bool {
        self.just_pressed_keys.contains(&key)
    }

    pub fn is_mouse_pressed(&self, button: MouseButton) -> bool {
        self.pressed_buttons.contains(&button)
    }

    /// Cursor position in physical pixels.
    pub fn cursor_position(&self) -> Vec2 {
        self.cursor_position
    }

    pub fn mouse_input(&self) -> MouseInput {
        MouseInput {
            left_button: self.is_mouse_pressed(MouseButton::Left),
            cursor: self.cursor_position,
        }
    }
}

/// Keys bound to each movement action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyMappings {
    pub move_left: KeyCode,
    pub move_right: KeyCode,
    pub move_forward: KeyCode,
    pub move_backward: KeyCode,
    pub move_up: KeyCode,
    pub move_down: KeyCode,
    pub look_left: KeyCode,
    pub look_right: KeyCode,
    pub look_up: KeyCode,
    pub look_down: KeyCode,
}

impl Default for KeyMappings {
    fn default() -> Self {
        Self {
            move_left: KeyCode::KeyA,
            move_right: KeyCode::KeyD,
            move_forward: KeyCode::KeyW,
            move_backward: KeyCode::KeyS,
            move_up: KeyCode::KeyE,
            move_down: KeyCode::KeyQ,
            look_left: KeyCode::ArrowLeft,
            look_right: KeyCode::ArrowRight,
            look_up: KeyCode::ArrowUp,
            look_down: KeyCode::ArrowDown,
        }
    }
}

impl KeyMappings {
    pub fn movement_input(&self, input: &InputState) -> MovementInput {
        let held = |key| input.is_key_pressed(key);
        MovementInput {
            move_left: held(self.move_left),
            move_right: held(self.move_right),
            move_forward: held(self.move_forward),
            move_backward: held(self.move_backward),
            move_up: held(self.move_up),
            move_down: held(self.move_down),
            look_left: held(self.look_left),
            look_right: held(self.look_right),
            look_up: held(self.look_up),
            look_down: held(self.look_down),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_just_pressed_is_cleared_each_frame() {
        let mut input = InputState::new();
        input.on_key_pressed(KeyCode::Escape);
        assert!(input.is_key_just_pressed(KeyCode::Escape));

        input.begin_frame();
        assert!(!input.is_key_just_pressed(KeyCode::Escape));
        assert!(input.is_key_pressed(KeyCode::Escape));

        // Key repeat must not count as a new press.
        input.on_key_pressed(KeyCode::Escape);
        assert!(!input.is_key_just_pressed(KeyCode::Escape));
    }

    #[test]
    fn test_default_mappings() {
        let mut input = InputState::new();
        input.on_key_pressed(KeyCode::KeyW);
        input.on_key_pressed(KeyCode::KeyE);
        input.on_key_pressed(KeyCode::ArrowLeft);

        let movement = KeyMappings::default().movement_input(&input);
        assert_eq!(
            movement,
            MovementInput {
                move_forward: true,
                move_up: true,
                look_left: true,
                ..Default::default()
            }
        );

        input.on_key_released(KeyCode::KeyW);
        assert!(!KeyMappings::default().movement_input(&input).move_forward);
    }

    #[test]
    fn test_mouse_input_snapshot() {
        let mut input = InputState::new();
        input.on_cursor_moved(10.0, 20.0);
        input.on_mouse_pressed(MouseButton::Left);
        assert_eq!(
            input.mouse_input(),
            MouseInput {
                left_button: true,
                cursor: Vec2::new(10.0, 20.0),
            }
        );

        input.release_all();
        assert!(!input.mouse_input().left_button);
    }

    #[test]
    fn test_untracked_mouse_button() {
        assert_eq!(MouseButton::from_winit(winit::event::MouseButton::Back), None);
        assert_eq!(
            MouseButton::from_winit(winit::event::MouseButton::Right),
            Some(MouseButton::Right)
        );
    }
}
