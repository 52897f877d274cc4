//! # vk_present
//!
//! Frame-synchronized window and swapchain lifecycle management for Vulkan
//! renderers built on `ash` and GLFW.
//!
//! ## Features
//!
//! - **Bounded frames in flight**: a configurable ring of per-frame records
//!   keeps the CPU a fixed number of frames ahead of the GPU
//! - **Resilient presentation**: surface invalidation and resizes tear down
//!   and rebuild the swapchain without escaping the draw loop
//! - **One extension point**: rendering techniques attach per-frame GPU
//!   resources through a frame-record factory and record commands through a
//!   handler trait, while the window drives all synchronization
//! - **HiDPI-correct extents**: swapchain sizes derive from framebuffer
//!   pixels, not logical window units
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use vk_present::prelude::*;
//!
//! struct ClearScreen;
//!
//! impl WindowHandler for ClearScreen {
//!     fn draw(&mut self, ctx: &mut DrawContext<'_>) -> VulkanResult<()> {
//!         // Record into ctx.command_buffer() against ctx.framebuffer()
//!         let _ = ctx.viewport();
//!         Ok(())
//!     }
//! }
//!
//! # fn acquire_device() -> RenderDevice { unimplemented!() }
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     vk_present::foundation::logging::init();
//!
//!     // Instance, device, and queue acquisition stay on the application side
//!     let device = acquire_device();
//!
//!     let config = PresenterConfig::new(
//!         WindowConfig::new("demo").with_size(1280, 720).with_depth(true),
//!     );
//!
//!     let mut handler = ClearScreen;
//!     let mut window = Window::new(device, &config, InputHooks::KEY)?;
//!     window.initialize(&mut handler)?;
//!     window.run(&mut handler)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

/// Configuration types and loading
pub mod config;
/// Shared utilities
pub mod foundation;
/// Vulkan presentation primitives
pub mod vulkan;
/// Window management and the draw protocol
pub mod window;

/// Common imports for presentation layer users
pub mod prelude {
    pub use crate::config::{ConfigError, PresenterConfig, WindowConfig};
    pub use crate::vulkan::{
        AcquireOutcome, Attachment, CommandPool, DepthAttachment, DeviceQueues, FrameCursor,
        FrameData, FrameRecord, FrameSync, PresentOutcome, RenderDevice, Swapchain,
        SwapchainSupport, VulkanError, VulkanResult,
    };
    pub use crate::window::{
        DrawContext, InputHooks, Window, WindowError, WindowHandler, WindowState,
    };
}
