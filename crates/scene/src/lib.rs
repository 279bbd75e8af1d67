//! Scene data and camera math.
//!
//! This crate provides:
//! - Transform components (Y-X-Z Euler rotation)
//! - The camera (projection and view matrices)
//! - Scene objects and the registry that owns them
//! - Keyboard and mouse movement controllers

mod error;

pub mod camera;
pub mod controller;
pub mod game_object;
pub mod transform;

pub use camera::{Camera, DEFAULT_UP};
pub use controller::{KeyboardMovementController, MouseInput, MouseLookController, MovementInput};
pub use error::{SceneError, SceneResult};
pub use game_object::{GameObject, GameObjectId, GameObjectRegistry};
pub use transform::TransformComponent;
