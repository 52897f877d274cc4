//! Surface capability queries and swapchain parameter selection
//!
//! Captures the surface's capabilities, formats, and present modes as plain
//! data so the selection rules are deterministic and testable without a
//! device. Swapchain creation and recreation both go through one copy of
//! this logic.

use ash::extensions::khr::Surface as SurfaceLoader;
use ash::vk;

use crate::vulkan::{VulkanError, VulkanResult};

/// Surface support details for swapchain creation
pub struct SwapchainSupport {
    capabilities: vk::SurfaceCapabilitiesKHR,
    formats: Vec<vk::SurfaceFormatKHR>,
    present_modes: Vec<vk::PresentModeKHR>,
}

impl SwapchainSupport {
    /// Query surface support from the physical device
    pub fn query(
        surface_loader: &SurfaceLoader,
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> VulkanResult<Self> {
        let capabilities = unsafe {
            surface_loader
                .get_physical_device_surface_capabilities(physical_device, surface)
                .map_err(VulkanError::Api)?
        };

        let formats = unsafe {
            surface_loader
                .get_physical_device_surface_formats(physical_device, surface)
                .map_err(VulkanError::Api)?
        };

        let present_modes = unsafe {
            surface_loader
                .get_physical_device_surface_present_modes(physical_device, surface)
                .map_err(VulkanError::Api)?
        };

        Ok(Self {
            capabilities,
            formats,
            present_modes,
        })
    }

    /// Build support details from already-queried data
    pub fn from_raw(
        capabilities: vk::SurfaceCapabilitiesKHR,
        formats: Vec<vk::SurfaceFormatKHR>,
        present_modes: Vec<vk::PresentModeKHR>,
    ) -> Self {
        Self {
            capabilities,
            formats,
            present_modes,
        }
    }

    /// Get the surface capabilities
    pub fn capabilities(&self) -> &vk::SurfaceCapabilitiesKHR {
        &self.capabilities
    }

    /// Choose the surface format
    ///
    /// Prefers B8G8R8A8_SRGB with the sRGB nonlinear color space; falls back
    /// to the first reported format. Deterministic, no failure path.
    pub fn choose_surface_format(&self) -> vk::SurfaceFormatKHR {
        self.formats
            .iter()
            .find(|sf| {
                sf.format == vk::Format::B8G8R8A8_SRGB
                    && sf.color_space == vk::ColorSpaceKHR::SRGB_NONLINEAR
            })
            .copied()
            .unwrap_or(self.formats[0])
    }

    /// Choose the present mode
    ///
    /// Prefers MAILBOX (triple-buffering style); falls back to FIFO, the one
    /// mode every implementation must support.
    pub fn choose_present_mode(&self) -> vk::PresentModeKHR {
        self.present_modes
            .iter()
            .copied()
            .find(|&mode| mode == vk::PresentModeKHR::MAILBOX)
            .unwrap_or(vk::PresentModeKHR::FIFO)
    }

    /// Choose the swapchain extent
    ///
    /// When the surface reports the "window manager decides" sentinel, the
    /// extent comes from the native framebuffer size in pixels (not the
    /// logical window size, which differs under HiDPI scaling). Otherwise the
    /// requested size is clamped into the supported range.
    pub fn choose_extent(&self, framebuffer_size: (u32, u32)) -> vk::Extent2D {
        if self.capabilities.current_extent.width != u32::MAX {
            self.capabilities.current_extent
        } else {
            vk::Extent2D {
                width: framebuffer_size.0.clamp(
                    self.capabilities.min_image_extent.width,
                    self.capabilities.max_image_extent.width,
                ),
                height: framebuffer_size.1.clamp(
                    self.capabilities.min_image_extent.height,
                    self.capabilities.max_image_extent.height,
                ),
            }
        }
    }

    /// Choose the swapchain image count
    ///
    /// One more than the minimum, so acquisition rarely blocks on the driver,
    /// clamped by the maximum when the surface reports one (zero means
    /// unbounded).
    pub fn image_count(&self) -> u32 {
        let desired = self.capabilities.min_image_count + 1;
        if self.capabilities.max_image_count > 0 {
            desired.min(self.capabilities.max_image_count)
        } else {
            desired
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn support(
        capabilities: vk::SurfaceCapabilitiesKHR,
        formats: Vec<vk::SurfaceFormatKHR>,
        present_modes: Vec<vk::PresentModeKHR>,
    ) -> SwapchainSupport {
        SwapchainSupport::from_raw(capabilities, formats, present_modes)
    }

    fn format(format: vk::Format, color_space: vk::ColorSpaceKHR) -> vk::SurfaceFormatKHR {
        vk::SurfaceFormatKHR {
            format,
            color_space,
        }
    }

    #[test]
    fn surface_format_prefers_srgb_pair() {
        let s = support(
            vk::SurfaceCapabilitiesKHR::default(),
            vec![
                format(vk::Format::R8G8B8A8_UNORM, vk::ColorSpaceKHR::SRGB_NONLINEAR),
                format(vk::Format::B8G8R8A8_SRGB, vk::ColorSpaceKHR::SRGB_NONLINEAR),
            ],
            vec![vk::PresentModeKHR::FIFO],
        );

        let chosen = s.choose_surface_format();
        assert_eq!(chosen.format, vk::Format::B8G8R8A8_SRGB);
        assert_eq!(chosen.color_space, vk::ColorSpaceKHR::SRGB_NONLINEAR);
    }

    #[test]
    fn surface_format_falls_back_to_first() {
        let s = support(
            vk::SurfaceCapabilitiesKHR::default(),
            vec![
                format(vk::Format::R8G8B8A8_UNORM, vk::ColorSpaceKHR::SRGB_NONLINEAR),
                format(vk::Format::B8G8R8A8_UNORM, vk::ColorSpaceKHR::SRGB_NONLINEAR),
            ],
            vec![vk::PresentModeKHR::FIFO],
        );

        assert_eq!(s.choose_surface_format().format, vk::Format::R8G8B8A8_UNORM);
    }

    #[test]
    fn present_mode_prefers_mailbox_when_present() {
        let candidate_sets = [
            vec![vk::PresentModeKHR::MAILBOX],
            vec![vk::PresentModeKHR::FIFO, vk::PresentModeKHR::MAILBOX],
            vec![
                vk::PresentModeKHR::IMMEDIATE,
                vk::PresentModeKHR::MAILBOX,
                vk::PresentModeKHR::FIFO,
            ],
        ];

        for modes in candidate_sets {
            let s = support(vk::SurfaceCapabilitiesKHR::default(), vec![], modes);
            assert_eq!(s.choose_present_mode(), vk::PresentModeKHR::MAILBOX);
        }
    }

    #[test]
    fn present_mode_falls_back_to_fifo() {
        let candidate_sets = [
            vec![vk::PresentModeKHR::FIFO],
            vec![vk::PresentModeKHR::IMMEDIATE, vk::PresentModeKHR::FIFO_RELAXED],
        ];

        for modes in candidate_sets {
            let s = support(vk::SurfaceCapabilitiesKHR::default(), vec![], modes);
            assert_eq!(s.choose_present_mode(), vk::PresentModeKHR::FIFO);
        }
    }

    #[test]
    fn extent_uses_fixed_surface_extent_when_reported() {
        let capabilities = vk::SurfaceCapabilitiesKHR {
            current_extent: vk::Extent2D {
                width: 1280,
                height: 720,
            },
            ..Default::default()
        };
        let s = support(capabilities, vec![], vec![]);

        let extent = s.choose_extent((4096, 4096));
        assert_eq!(extent.width, 1280);
        assert_eq!(extent.height, 720);
    }

    #[test]
    fn extent_clamps_framebuffer_size_under_sentinel() {
        let capabilities = vk::SurfaceCapabilitiesKHR {
            current_extent: vk::Extent2D {
                width: u32::MAX,
                height: u32::MAX,
            },
            min_image_extent: vk::Extent2D {
                width: 64,
                height: 64,
            },
            max_image_extent: vk::Extent2D {
                width: 2048,
                height: 2048,
            },
            ..Default::default()
        };
        let s = support(capabilities, vec![], vec![]);

        // In range: the native framebuffer size passes through untouched
        let extent = s.choose_extent((1600, 900));
        assert_eq!((extent.width, extent.height), (1600, 900));

        // Out of range on both ends: clamped into [min, max]
        let extent = s.choose_extent((16, 8192));
        assert_eq!((extent.width, extent.height), (64, 2048));
    }

    #[test]
    fn image_count_is_min_plus_one_clamped_by_max() {
        let capabilities = vk::SurfaceCapabilitiesKHR {
            min_image_count: 2,
            max_image_count: 3,
            ..Default::default()
        };
        assert_eq!(support(capabilities, vec![], vec![]).image_count(), 3);

        let capabilities = vk::SurfaceCapabilitiesKHR {
            min_image_count: 3,
            max_image_count: 3,
            ..Default::default()
        };
        assert_eq!(support(capabilities, vec![], vec![]).image_count(), 3);

        // max_image_count of zero means no upper bound
        let capabilities = vk::SurfaceCapabilitiesKHR {
            min_image_count: 4,
            max_image_count: 0,
            ..Default::default()
        };
        assert_eq!(support(capabilities, vec![], vec![]).image_count(), 5);
    }
}
