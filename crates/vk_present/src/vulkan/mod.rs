//! Vulkan presentation primitives
//!
//! Low-level wrappers for the swapchain, synchronization, and per-frame
//! resources, following RAII ownership rules: every wrapper releases its
//! Vulkan objects on drop, in reverse creation order.

/// Off-screen image attachments and depth buffer selection
pub mod attachment;
/// Command pool management
pub mod commands;
/// Surface capability queries and swapchain parameter selection
pub mod details;
/// Device and queue handle bundle supplied by the application
pub mod device;
/// Per-frame records and the frame ring cursor
pub mod frame;
/// Swapchain creation, framebuffers, and presentation
pub mod swapchain;
/// Semaphore and fence wrappers
pub mod sync;

use ash::vk;
use thiserror::Error;

/// Vulkan-specific error types
#[derive(Error, Debug)]
pub enum VulkanError {
    /// General Vulkan API error with result code
    #[error("Vulkan API error: {0:?}")]
    Api(vk::Result),

    /// Invalid operation attempted
    #[error("Invalid operation: {reason}")]
    InvalidOperation {
        /// Description of why the operation is invalid
        reason: String,
    },

    /// Vulkan resource initialization failed
    #[error("Initialization failed: {0}")]
    InitializationFailed(String),

    /// No suitable memory type found for allocation
    #[error("No suitable memory type found")]
    NoSuitableMemoryType,

    /// No supported depth format among the ranked candidates
    #[error("No suitable depth format found")]
    NoSuitableDepthFormat,
}

/// Result type for Vulkan operations
pub type VulkanResult<T> = Result<T, VulkanError>;

pub use attachment::{Attachment, DepthAttachment};
pub use commands::CommandPool;
pub use details::SwapchainSupport;
pub use device::{DeviceQueues, RenderDevice};
pub use frame::{FrameCursor, FrameData, FrameRecord};
pub use swapchain::{AcquireOutcome, PresentOutcome, Swapchain};
pub use sync::{Fence, FrameSync, Semaphore};
