//! Errors raised by the Vulkan abstraction layer.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RhiError {
    /// A Vulkan call returned a failure code.
    #[error("Vulkan error: {0}")]
    VulkanError(#[from] ash::vk::Result),

    /// The Vulkan loader library could not be found or opened.
    #[error("Failed to load Vulkan: {0}")]
    LoadingError(#[from] ash::LoadingError),

    #[error("Allocator error: {0}")]
    AllocatorError(#[from] gpu_allocator::AllocationError),

    /// No physical device offers graphics, present and swap chain support.
    #[error("No suitable GPU found")]
    NoSuitableGpu,

    /// None of the candidate formats supports the requested features.
    #[error("No supported format among {0:?}")]
    NoSupportedFormat(Vec<ash::vk::Format>),

    /// Shader binary missing, empty or malformed.
    #[error("Shader error: {0}")]
    ShaderError(String),

    #[error("Surface error: {0}")]
    SurfaceError(String),

    #[error("Swapchain error: {0}")]
    SwapchainError(String),

    #[error("Pipeline error: {0}")]
    PipelineError(String),

    /// Buffer sizing or mapping misuse.
    #[error("Buffer error: {0}")]
    BufferError(String),
}

pub type RhiResult<T> = std::result::Result<T, RhiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use ash::vk;

    #[test]
    fn test_vulkan_result_converts() {
        fn fails() -> RhiResult<()> {
            Err(vk::Result::ERROR_DEVICE_LOST)?;
            Ok(())
        }
        let err = fails().unwrap_err();
        assert!(matches!(err, RhiError::VulkanError(vk::Result::ERROR_DEVICE_LOST)));
    }

    #[test]
    fn test_no_supported_format_lists_candidates() {
        let err = RhiError::NoSupportedFormat(vec![vk::Format::D32_SFLOAT]);
        assert!(err.to_string().contains("D32_SFLOAT"));
    }
}
