//! Swap chain plus everything needed to render into and present its images.
//!
//! A [`PresentationChain`] is never resized in place. On resize or an
//! out-of-date surface the frame orchestrator builds a new chain from the old
//! one (so the driver can hand over the retired swap chain) and drops the old.
//!
//! ```text
//! acquire_next_image(frame)        submit_command_buffers(cb, image, frame)
//!   wait in_flight[frame]            wait images_in_flight[image] if set
//!   acquire -> image_available         images_in_flight[image] = in_flight[frame]
//!                                    reset in_flight[frame]
//!                                    submit: wait image_available @ COLOR_ATTACHMENT_OUTPUT
//!                                            signal render_finished + in_flight[frame]
//!                                    present: wait render_finished
//! ```

use std::sync::Arc;

use ash::vk;
use tracing::{debug, info};

use engine_rhi::command::CommandBuffer;
use engine_rhi::device::Device;
use engine_rhi::instance::Instance;
use engine_rhi::render_pass::{Framebuffer, RenderPass};
use engine_rhi::swapchain::{Swapchain, SwapchainDesc};
use engine_rhi::sync::{FrameSync, MAX_FRAMES_IN_FLIGHT, wait_for_fence};

use crate::depth_buffer::DepthBuffer;
use crate::error::{RendererError, RendererResult};

/// Formats a render pass is built against. Two chains with equal formats can
/// share pipelines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SwapFormats {
    pub color: vk::Format,
    pub depth: vk::Format,
}

/// Outcome of [`PresentationChain::acquire_next_image`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AcquireStatus {
    /// `image_index` is ready once the frame's image-available semaphore
    /// signals. A suboptimal image can still be rendered to.
    Ready { image_index: u32, suboptimal: bool },
    /// The surface no longer matches the chain. Nothing was acquired.
    OutOfDate,
}

/// Outcome of [`PresentationChain::submit_command_buffers`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PresentStatus {
    Presented,
    Suboptimal,
    OutOfDate,
}

impl PresentStatus {
    #[inline]
    pub fn needs_recreation(self) -> bool {
        !matches!(self, PresentStatus::Presented)
    }
}

/// Maps the raw present result onto [`PresentStatus`]. Anything other than
/// success, suboptimal or out-of-date is a hard failure.
pub fn classify_present_result(result: Result<bool, vk::Result>) -> RendererResult<PresentStatus> {
    match result {
        Ok(false) => Ok(PresentStatus::Presented),
        Ok(true) | Err(vk::Result::SUBOPTIMAL_KHR) => Ok(PresentStatus::Suboptimal),
        Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(PresentStatus::OutOfDate),
        Err(e) => Err(RendererError::Present(e)),
    }
}

/// Maps the raw acquire result onto [`AcquireStatus`].
pub fn classify_acquire_result(result: Result<(u32, bool), vk::Result>) -> RendererResult<AcquireStatus> {
    match result {
        Ok((image_index, suboptimal)) => Ok(AcquireStatus::Ready {
            image_index,
            suboptimal,
        }),
        Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(AcquireStatus::OutOfDate),
        Err(e) => Err(RendererError::Acquire(e)),
    }
}

/// Parameters for [`PresentationChain::new`].
#[derive(Clone, Copy, Debug)]
pub struct PresentationChainDesc {
    /// Window size in pixels. Must be non-zero.
    pub extent: vk::Extent2D,
    pub prefer_mailbox: bool,
}

pub struct PresentationChain {
    // Field order is drop order: framebuffers before the views they bind.
    framebuffers: Vec<Framebuffer>,
    frame_sync: Vec<FrameSync>,
    render_pass: RenderPass,
    depth_buffers: Vec<DepthBuffer>,
    swapchain: Swapchain,
    /// Fence of the frame that last rendered to each image, null if none.
    images_in_flight: Vec<vk::Fence>,
    device: Arc<Device>,
    formats: SwapFormats,
}

impl PresentationChain {
    /// Builds the swap chain, one depth buffer and framebuffer per image, the
    /// render pass, and [`MAX_FRAMES_IN_FLIGHT`] synchronization sets.
    ///
    /// `previous` is only read during construction; the caller drops it
    /// afterwards.
    ///
    /// # Errors
    ///
    /// [`RendererError::TooFewSwapImages`] when the surface grants fewer
    /// images than [`MAX_FRAMES_IN_FLIGHT`]. Any creation failure is returned
    /// and everything built so far released.
    pub fn new(
        instance: &Instance,
        device: Arc<Device>,
        surface: vk::SurfaceKHR,
        desc: &PresentationChainDesc,
        previous: Option<&PresentationChain>,
    ) -> RendererResult<Self> {
        let swapchain = Swapchain::new(
            instance,
            device.clone(),
            surface,
            &SwapchainDesc {
                extent: desc.extent,
                prefer_mailbox: desc.prefer_mailbox,
                previous: previous.map(|chain| &chain.swapchain),
            },
        )?;
        let extent = swapchain.extent();
        let image_count = swapchain.image_count();
        check_image_count(image_count)?;

        let depth_format = device.find_depth_format()?;
        let depth_buffers = (0..image_count)
            .map(|_| DepthBuffer::new(device.clone(), extent, depth_format))
            .collect::<Result<Vec<_>, _>>()?;

        let render_pass = RenderPass::new_color_depth(device.clone(), swapchain.format(), depth_format)?;

        let framebuffers = swapchain
            .image_views()
            .iter()
            .zip(&depth_buffers)
            .map(|(&color_view, depth)| {
                Framebuffer::new(
                    device.clone(),
                    &render_pass,
                    color_view,
                    depth.image_view(),
                    extent,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        let frame_sync = FrameSync::new_frames(&device)?;

        let formats = SwapFormats {
            color: swapchain.format(),
            depth: depth_format,
        };
        info!(
            "Presentation chain ready: {}x{}, {} images, color {:?}, depth {:?}",
            extent.width, extent.height, image_count, formats.color, formats.depth
        );

        Ok(Self {
            framebuffers,
            frame_sync,
            render_pass,
            depth_buffers,
            swapchain,
            images_in_flight: vec![vk::Fence::null(); image_count],
            device,
            formats,
        })
    }

    /// Waits until frame slot `frame_index` is free, then requests the next
    /// image. The slot's image-available semaphore signals when it is ready.
    pub fn acquire_next_image(&self, frame_index: usize) -> RendererResult<AcquireStatus> {
        let sync = frame_sync_at(&self.frame_sync, frame_index)?;
        sync.in_flight().wait(u64::MAX)?;

        let status = classify_acquire_result(
            self.swapchain
                .acquire_next_image(sync.image_available().handle()),
        )?;
        if status == AcquireStatus::OutOfDate {
            debug!("Swap chain out of date during acquire");
        }
        Ok(status)
    }

    /// Submits `command_buffer` for `image_index` using frame slot
    /// `frame_index`, then presents the image.
    ///
    /// If the image is still being rendered by an older frame (more images
    /// than frames in flight), waits for that frame first.
    pub fn submit_command_buffers(
        &mut self,
        command_buffer: &CommandBuffer,
        image_index: u32,
        frame_index: usize,
    ) -> RendererResult<PresentStatus> {
        let sync = frame_sync_at(&self.frame_sync, frame_index)?;
        let image_fence = self
            .images_in_flight
            .get_mut(image_index as usize)
            .ok_or(RendererError::ImageIndexOutOfRange(image_index))?;

        if *image_fence != vk::Fence::null() {
            wait_for_fence(&self.device, *image_fence, u64::MAX)?;
        }
        *image_fence = sync.in_flight().handle();

        let wait_semaphores = [sync.image_available().handle()];
        let wait_stages = [vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
        let signal_semaphores = [sync.render_finished().handle()];
        let command_buffers = [command_buffer.handle()];

        let submit_info = vk::SubmitInfo::default()
            .wait_semaphores(&wait_semaphores)
            .wait_dst_stage_mask(&wait_stages)
            .command_buffers(&command_buffers)
            .signal_semaphores(&signal_semaphores);

        sync.in_flight().reset()?;
        // SAFETY: recording ended before this call and the fence was just
        // reset after its previous submission completed.
        unsafe {
            self.device
                .submit_graphics(&[submit_info], sync.in_flight().handle())?;
        }

        let status = classify_present_result(self.swapchain.present(
            self.device.present_queue(),
            image_index,
            sync.render_finished().handle(),
        ))?;
        if status.needs_recreation() {
            debug!("Swap chain {:?} during present", status);
        }
        Ok(status)
    }

    /// True when both chains use the same color and depth formats.
    #[inline]
    pub fn compare_swap_formats(&self, other: &PresentationChain) -> bool {
        self.formats == other.formats
    }

    #[inline]
    pub fn formats(&self) -> SwapFormats {
        self.formats
    }

    #[inline]
    pub fn render_pass(&self) -> &RenderPass {
        &self.render_pass
    }

    pub fn framebuffer(&self, image_index: u32) -> RendererResult<vk::Framebuffer> {
        self.framebuffers
            .get(image_index as usize)
            .map(Framebuffer::handle)
            .ok_or(RendererError::ImageIndexOutOfRange(image_index))
    }

    #[inline]
    pub fn extent(&self) -> vk::Extent2D {
        self.swapchain.extent()
    }

    /// Width over height of the current extent.
    pub fn extent_aspect_ratio(&self) -> f32 {
        let extent = self.extent();
        extent.width as f32 / extent.height as f32
    }

    #[inline]
    pub fn image_count(&self) -> usize {
        self.swapchain.image_count()
    }

    #[inline]
    pub fn present_mode(&self) -> vk::PresentModeKHR {
        self.swapchain.present_mode()
    }

    #[inline]
    pub fn image_view_count(&self) -> usize {
        self.swapchain.image_views().len()
    }

    #[inline]
    pub fn depth_buffer_count(&self) -> usize {
        self.depth_buffers.len()
    }

    #[inline]
    pub fn framebuffer_count(&self) -> usize {
        self.framebuffers.len()
    }

    /// Number of synchronization sets, one per frame in flight.
    #[inline]
    pub fn frame_sync_count(&self) -> usize {
        self.frame_sync.len()
    }
}

/// An image can only be owned by one frame in flight at a time.
fn check_image_count(image_count: usize) -> RendererResult<()> {
    if image_count < MAX_FRAMES_IN_FLIGHT {
        return Err(RendererError::TooFewSwapImages {
            count: image_count,
            required: MAX_FRAMES_IN_FLIGHT,
        });
    }
    Ok(())
}

fn frame_sync_at(frame_sync: &[FrameSync], frame_index: usize) -> RendererResult<&FrameSync> {
    frame_sync
        .get(frame_index)
        .ok_or(RendererError::FrameIndexOutOfRange(frame_index))
}
