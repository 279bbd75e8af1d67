//! Errors raised by the renderer.

use ash::vk;
use engine_resources::ResourceError;
use engine_rhi::RhiError;
use engine_scene::SceneError;
use thiserror::Error;

use crate::presentation_chain::SwapFormats;

#[derive(Error, Debug)]
pub enum RendererError {
    #[error(transparent)]
    Rhi(#[from] RhiError),

    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error(transparent)]
    Resource(#[from] ResourceError),

    /// Window or surface failure reported by the platform layer.
    #[error(transparent)]
    Platform(#[from] engine_core::Error),

    /// A rebuilt presentation chain picked different formats, which would
    /// invalidate every pipeline built against the old render pass.
    #[error("Swap chain formats changed from {old:?} to {new:?}")]
    FormatChanged { old: SwapFormats, new: SwapFormats },

    #[error("begin_frame called while a frame is already in progress")]
    FrameAlreadyStarted,

    #[error("No frame in progress")]
    FrameNotStarted,

    /// The command buffer is not the one handed out for the current frame.
    #[error("Command buffer does not belong to the current frame")]
    ForeignCommandBuffer,

    /// Every frame in flight needs its own swap chain image.
    #[error("Swap chain has {count} images, need at least {required}")]
    TooFewSwapImages { count: usize, required: usize },

    #[error("Frame slot {0} out of range")]
    FrameIndexOutOfRange(usize),

    #[error("Swap chain image {0} out of range")]
    ImageIndexOutOfRange(u32),

    #[error("Failed to acquire swap chain image: {0}")]
    Acquire(vk::Result),

    #[error("Failed to present swap chain image: {0}")]
    Present(vk::Result),

    #[error("Push constants of {size} bytes exceed the device limit of {limit}")]
    PushConstantsTooLarge { size: u32, limit: u32 },
}

pub type RendererResult<T> = std::result::Result<T, RendererError>;
