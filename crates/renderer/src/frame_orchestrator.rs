//! Per-frame protocol: acquire, record, submit, present, and recreation of
//! the presentation chain when the surface changes.
//!
//! A frame is either idle or recording. [`FrameOrchestrator::begin_frame`]
//! moves to recording and hands out the slot's command buffer;
//! [`FrameOrchestrator::end_frame`] submits it and returns to idle. Calls out
//! of order are errors, not no-ops.
//!
//! The protocol itself lives on [`FrameState`] and talks to the GPU through
//! [`FrameTarget`]; the orchestrator's target is the presentation chain and
//! its command buffers.

use std::sync::Arc;

use ash::vk;
use tracing::{debug, error, info};

use engine_core::RendererConfig;
use engine_platform::PlatformWindow;
use engine_rhi::command::CommandBuffer;
use engine_rhi::sync::MAX_FRAMES_IN_FLIGHT;

use crate::engine::Engine;
use crate::error::{RendererError, RendererResult};
use crate::presentation_chain::{AcquireStatus, PresentStatus, PresentationChain, PresentationChainDesc};

/// What the orchestrator needs from the window.
pub trait WindowBoundary {
    /// Drawable size in pixels; zero while minimized.
    fn extent(&self) -> vk::Extent2D;
    /// Blocks until the next platform event has been processed.
    fn wait_events(&mut self);
    fn should_close(&self) -> bool;
    fn was_resized(&self) -> bool;
    fn reset_resized_flag(&mut self);
}

impl WindowBoundary for PlatformWindow {
    fn extent(&self) -> vk::Extent2D {
        PlatformWindow::extent(self)
    }

    fn wait_events(&mut self) {
        PlatformWindow::wait_events(self);
    }

    fn should_close(&self) -> bool {
        PlatformWindow::should_close(self)
    }

    fn was_resized(&self) -> bool {
        PlatformWindow::was_resized(self)
    }

    fn reset_resized_flag(&mut self) {
        PlatformWindow::reset_resized_flag(self);
    }
}

/// GPU side of the frame protocol: one command buffer and one set of sync
/// objects per frame slot, plus the images they render to.
pub trait FrameTarget {
    /// Waits until slot `frame_index` is free and acquires the next image.
    fn acquire(&mut self, frame_index: usize) -> RendererResult<AcquireStatus>;

    /// Resets and begins the slot's command buffer.
    fn begin_recording(&mut self, frame_index: usize) -> RendererResult<()>;

    /// Ends the slot's command buffer, submits it and presents `image_index`.
    fn submit(&mut self, image_index: u32, frame_index: usize) -> RendererResult<PresentStatus>;

    /// Rebuilds the presentation resources for a non-zero `extent` once the
    /// device is idle.
    fn recreate(&mut self, extent: vk::Extent2D) -> RendererResult<()>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FramePhase {
    Idle,
    /// Between a successful `begin_frame` and `end_frame`.
    Recording { image_index: u32 },
}

/// The idle/recording state machine and frame slot counter, without any GPU
/// objects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameState {
    phase: FramePhase,
    frame_index: usize,
}

impl Default for FrameState {
    fn default() -> Self {
        Self {
            phase: FramePhase::Idle,
            frame_index: 0,
        }
    }
}

impl FrameState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enters recording for `image_index`.
    pub fn begin(&mut self, image_index: u32) -> RendererResult<()> {
        match self.phase {
            FramePhase::Idle => {
                self.phase = FramePhase::Recording { image_index };
                Ok(())
            }
            FramePhase::Recording { .. } => Err(RendererError::FrameAlreadyStarted),
        }
    }

    /// Image being recorded, or [`RendererError::FrameNotStarted`].
    pub fn require_recording(&self) -> RendererResult<u32> {
        match self.phase {
            FramePhase::Recording { image_index } => Ok(image_index),
            FramePhase::Idle => Err(RendererError::FrameNotStarted),
        }
    }

    /// Leaves recording and returns the image that was being recorded. The
    /// frame slot is left unchanged; see [`advance`](Self::advance).
    pub fn end(&mut self) -> RendererResult<u32> {
        let image_index = self.require_recording()?;
        self.phase = FramePhase::Idle;
        Ok(image_index)
    }

    /// Moves to the next frame slot, wrapping at [`MAX_FRAMES_IN_FLIGHT`].
    pub fn advance(&mut self) {
        self.frame_index = (self.frame_index + 1) % MAX_FRAMES_IN_FLIGHT;
    }

    #[inline]
    pub fn phase(&self) -> FramePhase {
        self.phase
    }

    #[inline]
    pub fn is_frame_started(&self) -> bool {
        matches!(self.phase, FramePhase::Recording { .. })
    }

    #[inline]
    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    /// Acquires an image from `target` and enters recording on the current
    /// slot.
    ///
    /// Returns `Ok(None)` when the surface was out of date. The target has
    /// been rebuilt, nothing was recorded and the slot is unchanged.
    ///
    /// # Errors
    ///
    /// [`RendererError::FrameAlreadyStarted`] while recording, and any
    /// acquire, recording or recreation failure.
    pub fn begin_frame(
        &mut self,
        target: &mut impl FrameTarget,
        window: &mut impl WindowBoundary,
    ) -> RendererResult<Option<u32>> {
        if self.is_frame_started() {
            return Err(RendererError::FrameAlreadyStarted);
        }

        let image_index = match target.acquire(self.frame_index)? {
            AcquireStatus::Ready {
                image_index,
                suboptimal,
            } => {
                if suboptimal {
                    debug!("Acquired suboptimal image {}", image_index);
                }
                image_index
            }
            AcquireStatus::OutOfDate => {
                recreate_for_window(target, window)?;
                return Ok(None);
            }
        };

        target.begin_recording(self.frame_index)?;
        self.begin(image_index)?;
        Ok(Some(image_index))
    }

    /// Submits and presents the frame being recorded, then rebuilds the
    /// target if the present was out of date or suboptimal, or the window
    /// was resized.
    ///
    /// The slot advances whether submission succeeds, fails or recreates.
    ///
    /// # Errors
    ///
    /// [`RendererError::FrameNotStarted`] while idle, and any submission or
    /// recreation failure.
    pub fn end_frame(
        &mut self,
        target: &mut impl FrameTarget,
        window: &mut impl WindowBoundary,
    ) -> RendererResult<()> {
        let image_index = self.end()?;
        let result = present_and_recover(target, window, image_index, self.frame_index);
        self.advance();
        result
    }
}

fn present_and_recover(
    target: &mut impl FrameTarget,
    window: &mut impl WindowBoundary,
    image_index: u32,
    frame_index: usize,
) -> RendererResult<()> {
    let status = target.submit(image_index, frame_index)?;
    if status.needs_recreation() || window.was_resized() {
        window.reset_resized_flag();
        recreate_for_window(target, window)?;
    }
    Ok(())
}

/// Blocks while the window is minimized, then rebuilds `target` for the new
/// extent. Gives up quietly if the window closes first.
fn recreate_for_window(target: &mut impl FrameTarget, window: &mut impl WindowBoundary) -> RendererResult<()> {
    let mut extent = window.extent();
    while extent.width == 0 || extent.height == 0 {
        if window.should_close() {
            debug!("Window closed while minimized, skipping recreation");
            return Ok(());
        }
        window.wait_events();
        extent = window.extent();
    }
    target.recreate(extent)
}

/// Drives frames through the presentation chain with one command buffer per
/// frame in flight.
pub struct FrameOrchestrator {
    target: ChainTarget,
    state: FrameState,
    clear_color: [f32; 4],
}

impl FrameOrchestrator {
    /// Builds the first presentation chain for the window's current extent.
    pub fn new(engine: Arc<Engine>, window: &impl WindowBoundary, config: &RendererConfig) -> RendererResult<Self> {
        let desc = PresentationChainDesc {
            extent: window.extent(),
            prefer_mailbox: config.prefer_mailbox,
        };
        let chain = PresentationChain::new(
            engine.instance(),
            engine.device().clone(),
            engine.surface().handle(),
            &desc,
            None,
        )?;
        let command_buffers = CommandBuffer::allocate(engine.device(), MAX_FRAMES_IN_FLIGHT as u32)?;

        info!(
            "Frame orchestrator created with {} frames in flight",
            MAX_FRAMES_IN_FLIGHT
        );

        Ok(Self {
            target: ChainTarget {
                chain,
                command_buffers,
                prefer_mailbox: config.prefer_mailbox,
                engine,
            },
            state: FrameState::new(),
            clear_color: config.clear_color,
        })
    }

    /// Starts a frame and returns the command buffer to record into.
    ///
    /// Returns `None` when the surface was out of date; the chain has been
    /// rebuilt and the caller should skip to the next loop iteration.
    ///
    /// # Errors
    ///
    /// [`RendererError::FrameAlreadyStarted`] if the previous frame was never
    /// ended, and any acquire or recreation failure.
    pub fn begin_frame(&mut self, window: &mut impl WindowBoundary) -> RendererResult<Option<CommandBuffer>> {
        if self.state.begin_frame(&mut self.target, window)?.is_none() {
            return Ok(None);
        }
        Ok(Some(self.current_command_buffer()?.clone()))
    }

    /// Ends recording, submits and presents. Rebuilds the chain when the
    /// present reported out-of-date or suboptimal, or the window was resized.
    ///
    /// The frame slot advances even when recreation happens.
    pub fn end_frame(&mut self, window: &mut impl WindowBoundary) -> RendererResult<()> {
        self.state.end_frame(&mut self.target, window)
    }

    /// Begins the chain's render pass on the current image, clearing color
    /// and depth, and sets viewport and scissor to the full extent.
    pub fn begin_swap_chain_render_pass(&self, command_buffer: &CommandBuffer) -> RendererResult<()> {
        let image_index = self.check_command_buffer(command_buffer)?;
        let chain = &self.target.chain;
        let extent = chain.extent();

        let clear_values = [
            vk::ClearValue {
                color: vk::ClearColorValue {
                    float32: self.clear_color,
                },
            },
            vk::ClearValue {
                depth_stencil: vk::ClearDepthStencilValue {
                    depth: 1.0,
                    stencil: 0,
                },
            },
        ];
        let render_area = vk::Rect2D {
            offset: vk::Offset2D { x: 0, y: 0 },
            extent,
        };
        let begin_info = vk::RenderPassBeginInfo::default()
            .render_pass(chain.render_pass().handle())
            .framebuffer(chain.framebuffer(image_index)?)
            .render_area(render_area)
            .clear_values(&clear_values);
        command_buffer.begin_render_pass(&begin_info);

        command_buffer.set_viewport(&full_viewport(extent));
        command_buffer.set_scissor(&render_area);
        Ok(())
    }

    pub fn end_swap_chain_render_pass(&self, command_buffer: &CommandBuffer) -> RendererResult<()> {
        self.check_command_buffer(command_buffer)?;
        command_buffer.end_render_pass();
        Ok(())
    }

    fn current_command_buffer(&self) -> RendererResult<&CommandBuffer> {
        slot_command_buffer(&self.target.command_buffers, self.state.frame_index())
    }

    /// Requires an active frame and its own command buffer; returns the image.
    fn check_command_buffer(&self, command_buffer: &CommandBuffer) -> RendererResult<u32> {
        let image_index = self.state.require_recording()?;
        if command_buffer != self.current_command_buffer()? {
            return Err(RendererError::ForeignCommandBuffer);
        }
        Ok(image_index)
    }

    /// Aspect ratio of the current chain extent.
    #[inline]
    pub fn aspect_ratio(&self) -> f32 {
        self.target.chain.extent_aspect_ratio()
    }

    #[inline]
    pub fn is_frame_in_progress(&self) -> bool {
        self.state.is_frame_started()
    }

    #[inline]
    pub fn frame_index(&self) -> usize {
        self.state.frame_index()
    }

    /// Render pass compatible with every chain this orchestrator builds.
    #[inline]
    pub fn swap_chain_render_pass(&self) -> vk::RenderPass {
        self.target.chain.render_pass().handle()
    }

    #[inline]
    pub fn chain(&self) -> &PresentationChain {
        &self.target.chain
    }
}

/// The presentation chain and per-slot command buffers behind a
/// [`FrameOrchestrator`].
struct ChainTarget {
    // Dropped before `engine`.
    chain: PresentationChain,
    command_buffers: Vec<CommandBuffer>,
    prefer_mailbox: bool,
    engine: Arc<Engine>,
}

impl FrameTarget for ChainTarget {
    fn acquire(&mut self, frame_index: usize) -> RendererResult<AcquireStatus> {
        self.chain.acquire_next_image(frame_index)
    }

    fn begin_recording(&mut self, frame_index: usize) -> RendererResult<()> {
        let command_buffer = slot_command_buffer(&self.command_buffers, frame_index)?;
        command_buffer.reset()?;
        command_buffer.begin()?;
        Ok(())
    }

    fn submit(&mut self, image_index: u32, frame_index: usize) -> RendererResult<PresentStatus> {
        let command_buffer = slot_command_buffer(&self.command_buffers, frame_index)?;
        command_buffer.end()?;
        self.chain
            .submit_command_buffers(command_buffer, image_index, frame_index)
    }

    /// # Errors
    ///
    /// [`RendererError::FormatChanged`] if the new chain picked different
    /// formats, and any creation failure.
    fn recreate(&mut self, extent: vk::Extent2D) -> RendererResult<()> {
        self.engine.device().wait_idle()?;

        let desc = PresentationChainDesc {
            extent,
            prefer_mailbox: self.prefer_mailbox,
        };
        let new_chain = PresentationChain::new(
            self.engine.instance(),
            self.engine.device().clone(),
            self.engine.surface().handle(),
            &desc,
            Some(&self.chain),
        )?;

        if !self.chain.compare_swap_formats(&new_chain) {
            return Err(RendererError::FormatChanged {
                old: self.chain.formats(),
                new: new_chain.formats(),
            });
        }
        self.chain = new_chain;
        info!("Presentation chain recreated at {}x{}", extent.width, extent.height);
        Ok(())
    }
}

impl Drop for ChainTarget {
    fn drop(&mut self) {
        let device = self.engine.device();
        if let Err(e) = device.wait_idle() {
            error!("Failed to wait for device idle during orchestrator drop: {:?}", e);
        }
        let handles: Vec<_> = self.command_buffers.iter().map(CommandBuffer::handle).collect();
        device.free_command_buffers(&handles);
        debug!("Frame orchestrator destroyed");
    }
}

fn slot_command_buffer(command_buffers: &[CommandBuffer], frame_index: usize) -> RendererResult<&CommandBuffer> {
    command_buffers
        .get(frame_index)
        .ok_or(RendererError::FrameIndexOutOfRange(frame_index))
}

fn full_viewport(extent: vk::Extent2D) -> vk::Viewport {
    vk::Viewport {
        x: 0.0,
        y: 0.0,
        width: extent.width as f32,
        height: extent.height as f32,
        min_depth: 0.0,
        max_depth: 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_twice_is_rejected() {
        let mut state = FrameState::new();
        state.begin(0).unwrap();
        assert!(matches!(state.begin(1), Err(RendererError::FrameAlreadyStarted)));
        assert_eq!(state.phase(), FramePhase::Recording { image_index: 0 });
    }

    #[test]
    fn test_end_while_idle_is_rejected() {
        let mut state = FrameState::new();
        assert!(matches!(state.end(), Err(RendererError::FrameNotStarted)));
        assert!(matches!(state.require_recording(), Err(RendererError::FrameNotStarted)));
    }

    #[test]
    fn test_end_returns_image_and_keeps_slot() {
        let mut state = FrameState::new();
        state.begin(2).unwrap();
        assert_eq!(state.end().unwrap(), 2);
        assert!(!state.is_frame_started());
        assert_eq!(state.frame_index(), 0);
    }

    #[test]
    fn test_full_viewport() {
        let viewport = full_viewport(vk::Extent2D {
            width: 800,
            height: 600,
        });
        assert_eq!(viewport.width, 800.0);
        assert_eq!(viewport.height, 600.0);
        assert_eq!((viewport.min_depth, viewport.max_depth), (0.0, 1.0));
    }
}
