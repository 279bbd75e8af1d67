//! Instance, surface and device bundled for the lifetime of a window.

use std::mem::ManuallyDrop;
use std::sync::Arc;

use tracing::{error, info, warn};

use engine_core::RendererConfig;
use engine_platform::{PlatformWindow, Surface};
use engine_rhi::device::Device;
use engine_rhi::instance::{Instance, InstanceDesc};
use engine_rhi::physical_device::select_physical_device;

use crate::error::RendererResult;

/// Long-lived Vulkan context shared by everything that renders to one window.
///
/// Destruction order is device, surface, instance. Every GPU resource created
/// from [`device`](Self::device) must be dropped before the engine.
pub struct Engine {
    device: ManuallyDrop<Arc<Device>>,
    surface: ManuallyDrop<Surface>,
    instance: ManuallyDrop<Instance>,
}

impl Engine {
    /// Creates the instance with the window's surface extensions, the surface,
    /// and a logical device on the best GPU that can present to it.
    pub fn new(window: &PlatformWindow, config: &RendererConfig) -> RendererResult<Self> {
        let extensions = window.required_extensions()?;
        let instance = Instance::new(&InstanceDesc {
            application_name: c"engine",
            enable_validation: config.validation,
            extensions: &extensions,
        })?;

        let surface = window.create_surface(instance.entry(), instance.handle())?;
        let physical_device =
            select_physical_device(instance.handle(), surface.handle(), surface.loader())?;
        let device = Device::new(&instance, &physical_device)?;

        info!(
            "Engine initialized on '{}' ({})",
            physical_device.device_name(),
            physical_device.device_type_name()
        );

        Ok(Self {
            device: ManuallyDrop::new(device),
            surface: ManuallyDrop::new(surface),
            instance: ManuallyDrop::new(instance),
        })
    }

    #[inline]
    pub fn device(&self) -> &Arc<Device> {
        &self.device
    }

    #[inline]
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    #[inline]
    pub fn instance(&self) -> &Instance {
        &self.instance
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        if let Err(e) = self.device.wait_idle() {
            error!("Failed to wait for device idle during engine drop: {:?}", e);
        }
        if Arc::strong_count(&self.device) > 1 {
            warn!(
                "{} device references outlive the engine",
                Arc::strong_count(&self.device) - 1
            );
        }

        unsafe {
            ManuallyDrop::drop(&mut self.device);
            ManuallyDrop::drop(&mut self.surface);
            ManuallyDrop::drop(&mut self.instance);
        }
        info!("Engine destroyed");
    }
}
