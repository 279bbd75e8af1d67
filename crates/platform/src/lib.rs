//! Platform layer: window, Vulkan surface and input.
//!
//! - Window management via winit, driven by a pumped event loop
//! - Vulkan surface creation through `ash-window`
//! - Keyboard and mouse state mapped onto controller input

mod input;
mod surface;
mod window;

pub use input::{InputState, KeyCode, KeyMappings, MouseButton};
pub use surface::Surface;
pub use window::PlatformWindow;
