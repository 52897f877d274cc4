//! Vulkan swapchain management
//!
//! Owns the presentable images, their views, the optional depth attachment,
//! and the per-image framebuffers. Instances are transient: a resize or an
//! out-of-date surface tears the whole chain down and a new one is built in
//! its place, while the owning window and its frame ring live on.

use ash::extensions::khr::{Surface as SurfaceLoader, Swapchain as SwapchainLoader};
use ash::{vk, Device};

use crate::config::WindowConfig;
use crate::vulkan::{DepthAttachment, RenderDevice, SwapchainSupport, VulkanError, VulkanResult};

/// Outcome of acquiring a presentable image
///
/// Fatal errors are the `Err` arm of the surrounding `Result`; these variants
/// cover every non-fatal acquisition status so call sites handle each one
/// explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// An image was acquired and the surface still matches it
    Ready {
        /// Index of the acquired swapchain image
        image_index: u32,
    },
    /// An image was acquired but the surface no longer matches exactly;
    /// usable for this frame, the swapchain should be rebuilt afterwards
    Suboptimal {
        /// Index of the acquired swapchain image
        image_index: u32,
    },
    /// No image could be acquired; the swapchain must be rebuilt first
    OutOfDate,
}

/// Outcome of queuing an image for presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentOutcome {
    /// The image was queued for presentation
    Presented,
    /// Presented, but the swapchain no longer matches the surface exactly
    Suboptimal,
    /// The swapchain is stale and must be rebuilt
    OutOfDate,
}

/// Framebuffer wrapper with RAII cleanup
pub struct Framebuffer {
    device: Device,
    framebuffer: vk::Framebuffer,
}

impl Framebuffer {
    /// Create a new framebuffer over the given attachments
    pub fn new(
        device: Device,
        render_pass: vk::RenderPass,
        attachments: &[vk::ImageView],
        extent: vk::Extent2D,
    ) -> VulkanResult<Self> {
        let framebuffer_create_info = vk::FramebufferCreateInfo::builder()
            .render_pass(render_pass)
            .attachments(attachments)
            .width(extent.width)
            .height(extent.height)
            .layers(1);

        let framebuffer = unsafe {
            device
                .create_framebuffer(&framebuffer_create_info, None)
                .map_err(VulkanError::Api)?
        };

        Ok(Self {
            device,
            framebuffer,
        })
    }

    /// Get the framebuffer handle
    pub fn handle(&self) -> vk::Framebuffer {
        self.framebuffer
    }
}

impl Drop for Framebuffer {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_framebuffer(self.framebuffer, None);
        }
    }
}

/// Swapchain wrapper with RAII cleanup
pub struct Swapchain {
    device: Device,
    swapchain_loader: SwapchainLoader,
    swapchain: vk::SwapchainKHR,
    images: Vec<vk::Image>,
    image_views: Vec<vk::ImageView>,
    depth: Option<DepthAttachment>,
    framebuffers: Vec<Framebuffer>,
    format: vk::SurfaceFormatKHR,
    extent: vk::Extent2D,
}

impl Swapchain {
    /// Create a swapchain for the surface at the current framebuffer size
    ///
    /// Whether a depth attachment exists is decided here from the window
    /// configuration and persists across rebuilds, since rebuilds pass the
    /// same configuration back in. Pass the retiring swapchain's handle as
    /// `old_swapchain` on rebuild (null on first creation). Creation failure
    /// is fatal and propagated, never retried internally.
    pub fn new(
        device: &RenderDevice,
        surface_loader: &SurfaceLoader,
        surface: vk::SurfaceKHR,
        window_config: &WindowConfig,
        framebuffer_size: (u32, u32),
        old_swapchain: vk::SwapchainKHR,
    ) -> VulkanResult<Self> {
        let support = SwapchainSupport::query(surface_loader, device.physical_device(), surface)?;

        let format = support.choose_surface_format();
        let present_mode = support.choose_present_mode();
        let extent = support.choose_extent(framebuffer_size);
        let image_count = support.image_count();

        let swapchain_loader = SwapchainLoader::new(device.instance(), device.handle());

        let queue_family_indices = [device.graphics_family(), device.present_family()];
        let swapchain_create_info = vk::SwapchainCreateInfoKHR::builder()
            .surface(surface)
            .min_image_count(image_count)
            .image_format(format.format)
            .image_color_space(format.color_space)
            .image_extent(extent)
            .image_array_layers(1)
            .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT)
            .pre_transform(support.capabilities().current_transform)
            .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
            .present_mode(present_mode)
            .clipped(true)
            .old_swapchain(old_swapchain);

        // Images touched by both queues need concurrent sharing when the
        // graphics and present families differ
        let swapchain_create_info = if device.graphics_family() == device.present_family() {
            swapchain_create_info.image_sharing_mode(vk::SharingMode::EXCLUSIVE)
        } else {
            swapchain_create_info
                .image_sharing_mode(vk::SharingMode::CONCURRENT)
                .queue_family_indices(&queue_family_indices)
        };

        let swapchain = unsafe {
            swapchain_loader
                .create_swapchain(&swapchain_create_info, None)
                .map_err(VulkanError::Api)?
        };

        let images = unsafe {
            swapchain_loader
                .get_swapchain_images(swapchain)
                .map_err(VulkanError::Api)?
        };

        // From here on Drop owns cleanup, so a failure partway through view
        // or depth creation releases everything built so far
        let mut chain = Self {
            device: device.handle().clone(),
            swapchain_loader,
            swapchain,
            images,
            image_views: Vec::new(),
            depth: None,
            framebuffers: Vec::new(),
            format,
            extent,
        };

        chain.create_image_views()?;

        if window_config.needs_depth || window_config.needs_stencil {
            chain.depth = Some(DepthAttachment::new(
                device,
                extent,
                window_config.needs_stencil,
            )?);
        }

        log::debug!(
            "Created swapchain {}x{} with {} images (depth: {})",
            extent.width,
            extent.height,
            chain.images.len(),
            chain.depth.is_some()
        );

        Ok(chain)
    }

    fn create_image_views(&mut self) -> VulkanResult<()> {
        for &image in &self.images {
            let create_info = vk::ImageViewCreateInfo::builder()
                .image(image)
                .view_type(vk::ImageViewType::TYPE_2D)
                .format(self.format.format)
                .components(vk::ComponentMapping {
                    r: vk::ComponentSwizzle::IDENTITY,
                    g: vk::ComponentSwizzle::IDENTITY,
                    b: vk::ComponentSwizzle::IDENTITY,
                    a: vk::ComponentSwizzle::IDENTITY,
                })
                .subresource_range(vk::ImageSubresourceRange {
                    aspect_mask: vk::ImageAspectFlags::COLOR,
                    base_mip_level: 0,
                    level_count: 1,
                    base_array_layer: 0,
                    layer_count: 1,
                });

            let view = unsafe {
                self.device
                    .create_image_view(&create_info, None)
                    .map_err(VulkanError::Api)?
            };
            self.image_views.push(view);
        }

        Ok(())
    }

    /// Build one framebuffer per swapchain image
    ///
    /// Combines each color view with the depth view when present. Must be
    /// re-invoked whenever the render pass or the swapchain identity changes;
    /// any previous framebuffers are destroyed first.
    ///
    /// `pass_uses_depth` states whether the render pass declares a
    /// depth/stencil attachment; a mismatch with the swapchain's depth
    /// configuration is a caller contract violation.
    pub fn init_framebuffers(
        &mut self,
        render_pass: vk::RenderPass,
        pass_uses_depth: bool,
    ) -> VulkanResult<()> {
        debug_assert_eq!(
            pass_uses_depth,
            self.depth.is_some(),
            "render pass depth attachment expectation does not match the swapchain"
        );

        self.framebuffers.clear();

        for &view in &self.image_views {
            let mut attachments = vec![view];
            if let Some(depth) = &self.depth {
                attachments.push(depth.image_view());
            }

            self.framebuffers.push(Framebuffer::new(
                self.device.clone(),
                render_pass,
                &attachments,
                self.extent,
            )?);
        }

        Ok(())
    }

    /// Acquire the next presentable image
    ///
    /// `signal_semaphore` is signaled once the image is actually ready for
    /// rendering; this call may block until the driver has an image free.
    pub fn acquire_next_image(
        &self,
        signal_semaphore: vk::Semaphore,
    ) -> VulkanResult<AcquireOutcome> {
        match unsafe {
            self.swapchain_loader.acquire_next_image(
                self.swapchain,
                u64::MAX,
                signal_semaphore,
                vk::Fence::null(),
            )
        } {
            Ok((image_index, false)) => Ok(AcquireOutcome::Ready { image_index }),
            Ok((image_index, true)) => Ok(AcquireOutcome::Suboptimal { image_index }),
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(AcquireOutcome::OutOfDate),
            Err(e) => Err(VulkanError::Api(e)),
        }
    }

    /// Queue an image for presentation
    pub fn present(
        &self,
        present_queue: vk::Queue,
        image_index: u32,
        wait_semaphore: vk::Semaphore,
    ) -> VulkanResult<PresentOutcome> {
        let wait_semaphores = [wait_semaphore];
        let swapchains = [self.swapchain];
        let image_indices = [image_index];
        let present_info = vk::PresentInfoKHR::builder()
            .wait_semaphores(&wait_semaphores)
            .swapchains(&swapchains)
            .image_indices(&image_indices);

        match unsafe {
            self.swapchain_loader
                .queue_present(present_queue, &present_info)
        } {
            Ok(false) => Ok(PresentOutcome::Presented),
            Ok(true) => Ok(PresentOutcome::Suboptimal),
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(PresentOutcome::OutOfDate),
            Err(e) => Err(VulkanError::Api(e)),
        }
    }

    /// Get the swapchain extent
    pub fn extent(&self) -> vk::Extent2D {
        self.extent
    }

    /// Get the surface format
    pub fn format(&self) -> vk::SurfaceFormatKHR {
        self.format
    }

    /// Get the image views
    pub fn image_views(&self) -> &[vk::ImageView] {
        &self.image_views
    }

    /// Get the swapchain handle
    pub fn handle(&self) -> vk::SwapchainKHR {
        self.swapchain
    }

    /// Get the number of presentable images
    pub fn image_count(&self) -> u32 {
        self.images.len() as u32
    }

    /// Whether a depth attachment was created
    pub fn has_depth(&self) -> bool {
        self.depth.is_some()
    }

    /// Get the depth attachment format, if one exists
    pub fn depth_format(&self) -> Option<vk::Format> {
        self.depth.as_ref().map(DepthAttachment::format)
    }

    /// Get the depth attachment view, if one exists
    pub fn depth_view(&self) -> Option<vk::ImageView> {
        self.depth.as_ref().map(DepthAttachment::image_view)
    }

    /// Number of framebuffers currently built
    pub fn framebuffer_count(&self) -> usize {
        self.framebuffers.len()
    }

    /// Get the framebuffer for a swapchain image index
    pub fn framebuffer(&self, image_index: usize) -> VulkanResult<vk::Framebuffer> {
        self.framebuffers
            .get(image_index)
            .map(Framebuffer::handle)
            .ok_or_else(|| VulkanError::InvalidOperation {
                reason: format!(
                    "no framebuffer for image {image_index}; init_framebuffers() not run for this swapchain"
                ),
            })
    }
}

impl Drop for Swapchain {
    fn drop(&mut self) {
        // Strict reverse creation order: framebuffers reference the views and
        // depth attachment, so they go first; the views reference the images
        // owned by the swapchain object, which goes last. Safe on partially
        // constructed chains since later stages are simply empty.
        self.framebuffers.clear();
        self.depth = None;

        unsafe {
            for &image_view in &self.image_views {
                self.device.destroy_image_view(image_view, None);
            }

            self.swapchain_loader
                .destroy_swapchain(self.swapchain, None);
        }
    }
}
