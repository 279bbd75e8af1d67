//! Window management using winit.
//!
//! The event loop is pumped by the caller instead of owning the thread, so the
//! frame loop stays in the application and can block on the window when the
//! swap chain needs a non-zero extent.

use std::ffi::c_char;
use std::sync::Arc;
use std::time::Duration;

use ash::vk;
use raw_window_handle::HasDisplayHandle;
use tracing::{debug, info, warn};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{CursorGrabMode, Window as WinitWindow, WindowAttributes, WindowId};

use engine_core::{Error, Result, WindowConfig};

use crate::input::{InputState, MouseButton};
use crate::surface::Surface;

/// Pumps allowed for the platform to deliver the first `resumed` event.
const CREATION_PUMP_LIMIT: usize = 100;

/// Event handler state. Records what happened; never acts on it.
struct WindowState {
    attributes: Option<WindowAttributes>,
    window: Option<Arc<WinitWindow>>,
    creation_error: Option<String>,
    resized: bool,
    close_requested: bool,
    input: InputState,
}

impl ApplicationHandler for WindowState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let Some(attributes) = self.attributes.take() else {
            return;
        };
        match event_loop.create_window(attributes) {
            Ok(window) => self.window = Some(Arc::new(window)),
            Err(e) => self.creation_error = Some(e.to_string()),
        }
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                debug!("Close requested");
                self.close_requested = true;
            }
            WindowEvent::Resized(size) => {
                debug!("Window resized: {}x{}", size.width, size.height);
                self.resized = true;
            }
            WindowEvent::Focused(false) => self.input.release_all(),
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    match event.state {
                        ElementState::Pressed => self.input.on_key_pressed(code),
                        ElementState::Released => self.input.on_key_released(code),
                    }
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if let Some(button) = MouseButton::from_winit(button) {
                    match state {
                        ElementState::Pressed => self.input.on_mouse_pressed(button),
                        ElementState::Released => self.input.on_mouse_released(button),
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.input
                    .on_cursor_moved(position.x as f32, position.y as f32);
            }
            _ => {}
        }
    }
}

/// A resizable window plus the event loop that feeds it.
pub struct PlatformWindow {
    event_loop: EventLoop<()>,
    state: WindowState,
    window: Arc<WinitWindow>,
    cursor_captured: bool,
}

impl PlatformWindow {
    /// Opens a window described by `config` and waits until the platform has
    /// created it.
    pub fn new(config: &WindowConfig) -> Result<Self> {
        let mut event_loop =
            EventLoop::new().map_err(|e| Error::Window(format!("Failed to create event loop: {}", e)))?;

        let attributes = WindowAttributes::default()
            .with_title(config.title.clone())
            .with_inner_size(PhysicalSize::new(config.width, config.height))
            .with_resizable(true);

        let mut state = WindowState {
            attributes: Some(attributes),
            window: None,
            creation_error: None,
            resized: false,
            close_requested: false,
            input: InputState::new(),
        };

        for _ in 0..CREATION_PUMP_LIMIT {
            if let PumpStatus::Exit(code) = event_loop.pump_app_events(Some(Duration::ZERO), &mut state)
            {
                return Err(Error::Window(format!(
                    "Event loop exited with code {} before the window opened",
                    code
                )));
            }
            if let Some(message) = state.creation_error.take() {
                return Err(Error::Window(message));
            }
            if state.window.is_some() {
                break;
            }
        }

        let window = state
            .window
            .clone()
            .ok_or_else(|| Error::Window("Platform never resumed the event loop".to_string()))?;

        info!("Window created: {}x{} '{}'", config.width, config.height, config.title);
        Ok(Self {
            event_loop,
            state,
            window,
            cursor_captured: false,
        })
    }

    /// Processes pending events without blocking.
    pub fn poll_events(&mut self) {
        self.pump(Some(Duration::ZERO));
    }

    /// Blocks until at least one event arrives, then processes it.
    pub fn wait_events(&mut self) {
        self.pump(None);
    }

    fn pump(&mut self, timeout: Option<Duration>) {
        self.state.input.begin_frame();
        if let PumpStatus::Exit(code) = self.event_loop.pump_app_events(timeout, &mut self.state) {
            debug!("Event loop exited with code {}", code);
            self.state.close_requested = true;
        }
    }

    /// Current drawable size in physical pixels. Zero while minimized on
    /// some platforms.
    pub fn extent(&self) -> vk::Extent2D {
        let size = self.window.inner_size();
        vk::Extent2D {
            width: size.width,
            height: size.height,
        }
    }

    pub fn should_close(&self) -> bool {
        self.state.close_requested
    }

    /// Requests that [`should_close`](Self::should_close) return true.
    pub fn request_close(&mut self) {
        self.state.close_requested = true;
    }

    pub fn was_resized(&self) -> bool {
        self.state.resized
    }

    pub fn reset_resized_flag(&mut self) {
        self.state.resized = false;
    }

    pub fn input(&self) -> &InputState {
        &self.state.input
    }

    /// Confines and hides the cursor while `captured` is true. Platforms
    /// without cursor grabbing keep the cursor free.
    pub fn set_cursor_captured(&mut self, captured: bool) {
        if captured == self.cursor_captured {
            return;
        }
        self.cursor_captured = captured;

        if captured {
            let grabbed = self
                .window
                .set_cursor_grab(CursorGrabMode::Confined)
                .or_else(|_| self.window.set_cursor_grab(CursorGrabMode::Locked));
            if let Err(e) = grabbed {
                warn!("Cursor grab unavailable: {}", e);
            }
        } else if let Err(e) = self.window.set_cursor_grab(CursorGrabMode::None) {
            warn!("Failed to release cursor: {}", e);
        }
        self.window.set_cursor_visible(!captured);
    }

    /// Instance extensions needed to create a surface for this window.
    ///
    /// The pointers refer to static strings owned by `ash-window`.
    pub fn required_extensions(&self) -> Result<Vec<*const c_char>> {
        let display_handle = self
            .event_loop
            .display_handle()
            .map_err(|e| Error::Window(format!("Failed to get display handle: {}", e)))?;

        let extensions = ash_window::enumerate_required_extensions(display_handle.as_raw())
            .map_err(|e| Error::Vulkan(format!("Failed to enumerate required extensions: {}", e)))?;

        debug!(
            "Required Vulkan extensions for surface: {:?}",
            extensions
                .iter()
                // SAFETY: ash-window returns static, null-terminated names.
                .map(|&ext| unsafe { std::ffi::CStr::from_ptr(ext) })
                .collect::<Vec<_>>()
        );
        Ok(extensions.to_vec())
    }

    /// Creates a Vulkan surface for this window. `instance` must outlive it.
    pub fn create_surface(&self, entry: &ash::Entry, instance: &ash::Instance) -> Result<Surface> {
        Surface::new(entry, instance, self.window.as_ref())
    }
}
