//! Off-screen image attachments
//!
//! Generic image + memory + view allocator for render targets that are not
//! swapchain images: depth/stencil buffers here, G-buffer targets for
//! deferred techniques on the caller's side. Cleanup follows RAII rules in
//! reverse creation order.

use ash::{vk, Device};

use crate::vulkan::{RenderDevice, VulkanError, VulkanResult};

/// Off-screen image attachment with RAII cleanup
pub struct Attachment {
    device: Device,
    image: vk::Image,
    memory: vk::DeviceMemory,
    image_view: vk::ImageView,
    format: vk::Format,
}

impl Attachment {
    /// Allocate an image, back it with device-local memory, and create a view
    pub fn new(
        device: &RenderDevice,
        width: u32,
        height: u32,
        format: vk::Format,
        usage: vk::ImageUsageFlags,
        aspect_mask: vk::ImageAspectFlags,
    ) -> VulkanResult<Self> {
        let image_create_info = vk::ImageCreateInfo::builder()
            .image_type(vk::ImageType::TYPE_2D)
            .extent(vk::Extent3D {
                width,
                height,
                depth: 1,
            })
            .mip_levels(1)
            .array_layers(1)
            .format(format)
            .tiling(vk::ImageTiling::OPTIMAL)
            .initial_layout(vk::ImageLayout::UNDEFINED)
            .usage(usage)
            .sharing_mode(vk::SharingMode::EXCLUSIVE)
            .samples(vk::SampleCountFlags::TYPE_1);

        let image = unsafe {
            device
                .handle()
                .create_image(&image_create_info, None)
                .map_err(VulkanError::Api)?
        };

        let memory_requirements = unsafe { device.handle().get_image_memory_requirements(image) };

        let memory_type_index = device.find_memory_type(
            memory_requirements.memory_type_bits,
            vk::MemoryPropertyFlags::DEVICE_LOCAL,
        )?;

        let alloc_info = vk::MemoryAllocateInfo::builder()
            .allocation_size(memory_requirements.size)
            .memory_type_index(memory_type_index);

        let memory = unsafe {
            device
                .handle()
                .allocate_memory(&alloc_info, None)
                .map_err(VulkanError::Api)?
        };

        unsafe {
            device
                .handle()
                .bind_image_memory(image, memory, 0)
                .map_err(VulkanError::Api)?;
        }

        let image_view_create_info = vk::ImageViewCreateInfo::builder()
            .image(image)
            .view_type(vk::ImageViewType::TYPE_2D)
            .format(format)
            .subresource_range(vk::ImageSubresourceRange {
                aspect_mask,
                base_mip_level: 0,
                level_count: 1,
                base_array_layer: 0,
                layer_count: 1,
            });

        let image_view = unsafe {
            device
                .handle()
                .create_image_view(&image_view_create_info, None)
                .map_err(VulkanError::Api)?
        };

        Ok(Self {
            device: device.handle().clone(),
            image,
            memory,
            image_view,
            format,
        })
    }

    /// Get the image handle
    pub fn image(&self) -> vk::Image {
        self.image
    }

    /// Get the image view handle
    pub fn image_view(&self) -> vk::ImageView {
        self.image_view
    }

    /// Get the image format
    pub fn format(&self) -> vk::Format {
        self.format
    }
}

impl Drop for Attachment {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_image_view(self.image_view, None);
            self.device.destroy_image(self.image, None);
            self.device.free_memory(self.memory, None);
        }
    }
}

/// Depth/stencil attachment selecting the best supported format
pub struct DepthAttachment {
    attachment: Attachment,
}

impl DepthAttachment {
    /// Ranked depth format candidates
    ///
    /// Highest-precision depth component first; stencil-capable formats are
    /// only preferred when stencil was requested. The ordering is public so
    /// hosts can audit what a given device will end up with.
    pub fn format_candidates(needs_stencil: bool) -> &'static [vk::Format] {
        if needs_stencil {
            &[
                vk::Format::D32_SFLOAT_S8_UINT,
                vk::Format::D24_UNORM_S8_UINT,
            ]
        } else {
            &[
                vk::Format::D32_SFLOAT,
                vk::Format::D32_SFLOAT_S8_UINT,
                vk::Format::D24_UNORM_S8_UINT,
            ]
        }
    }

    /// Find the best supported depth format on this device
    pub fn find_format(device: &RenderDevice, needs_stencil: bool) -> VulkanResult<vk::Format> {
        device.find_supported_format(
            Self::format_candidates(needs_stencil),
            vk::ImageTiling::OPTIMAL,
            vk::FormatFeatureFlags::DEPTH_STENCIL_ATTACHMENT,
        )
    }

    /// Whether a depth format carries a stencil component
    pub fn has_stencil_component(format: vk::Format) -> bool {
        matches!(
            format,
            vk::Format::D32_SFLOAT_S8_UINT | vk::Format::D24_UNORM_S8_UINT
        )
    }

    /// Create a depth attachment at the given extent
    pub fn new(
        device: &RenderDevice,
        extent: vk::Extent2D,
        needs_stencil: bool,
    ) -> VulkanResult<Self> {
        let format = Self::find_format(device, needs_stencil)?;

        let mut aspect_mask = vk::ImageAspectFlags::DEPTH;
        if Self::has_stencil_component(format) {
            aspect_mask |= vk::ImageAspectFlags::STENCIL;
        }

        let attachment = Attachment::new(
            device,
            extent.width,
            extent.height,
            format,
            vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT,
            aspect_mask,
        )?;

        log::debug!(
            "Created depth attachment {}x{} with format {:?}",
            extent.width,
            extent.height,
            format
        );

        Ok(Self { attachment })
    }

    /// Get the image view handle
    pub fn image_view(&self) -> vk::ImageView {
        self.attachment.image_view()
    }

    /// Get the selected depth format
    pub fn format(&self) -> vk::Format {
        self.attachment.format()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stencil_candidates_are_all_stencil_capable() {
        let candidates = DepthAttachment::format_candidates(true);
        assert_eq!(
            candidates,
            &[
                vk::Format::D32_SFLOAT_S8_UINT,
                vk::Format::D24_UNORM_S8_UINT,
            ]
        );
        assert!(candidates
            .iter()
            .all(|&f| DepthAttachment::has_stencil_component(f)));
    }

    #[test]
    fn depth_only_prefers_pure_depth_format() {
        let candidates = DepthAttachment::format_candidates(false);
        assert_eq!(candidates[0], vk::Format::D32_SFLOAT);
        assert!(!DepthAttachment::has_stencil_component(candidates[0]));
    }

    #[test]
    fn stencil_component_detection() {
        assert!(DepthAttachment::has_stencil_component(
            vk::Format::D24_UNORM_S8_UINT
        ));
        assert!(DepthAttachment::has_stencil_component(
            vk::Format::D32_SFLOAT_S8_UINT
        ));
        assert!(!DepthAttachment::has_stencil_component(vk::Format::D32_SFLOAT));
        assert!(!DepthAttachment::has_stencil_component(
            vk::Format::B8G8R8A8_SRGB
        ));
    }
}
