//! Frame lifecycle and drawing.
//!
//! This crate ties the RHI together into a renderer:
//! - [`Engine`]: instance, surface and device for one window
//! - [`PresentationChain`]: swap chain, depth buffers, render pass, framebuffers and sync
//! - [`FrameOrchestrator`]: acquire/record/submit protocol and chain recreation
//! - [`RenderSystem`]: pipeline and per-object draws with push constants

mod error;

pub mod depth_buffer;
pub mod engine;
pub mod frame_orchestrator;
pub mod presentation_chain;
pub mod push_constants;
pub mod render_system;

pub use engine::Engine;
pub use error::{RendererError, RendererResult};
pub use frame_orchestrator::{FrameOrchestrator, FramePhase, FrameState, FrameTarget, WindowBoundary};
pub use presentation_chain::{
    AcquireStatus, PresentStatus, PresentationChain, PresentationChainDesc, SwapFormats,
};
pub use push_constants::SimplePushConstantData;
pub use render_system::RenderSystem;

pub use engine_rhi::sync::MAX_FRAMES_IN_FLIGHT;

/// Scene object type drawn by [`RenderSystem`].
pub type GameObject = engine_scene::GameObject<engine_resources::Mesh>;
/// Registry of [`GameObject`]s.
pub type GameObjectRegistry = engine_scene::GameObjectRegistry<engine_resources::Mesh>;
