//! Device and queue handle bundle
//!
//! The application acquires the Vulkan instance, physical device, logical
//! device, and queues on its own; this module only bundles the handles the
//! presentation layer needs. The bundle is non-owning: destroying the
//! instance and device remains the application's responsibility, after all
//! windows built on them are gone.

use ash::{vk, Device, Entry, Instance};

use crate::vulkan::{VulkanError, VulkanResult};

/// Queue handles and family indices supplied by the application
#[derive(Clone, Copy)]
pub struct DeviceQueues {
    /// Graphics queue handle
    pub graphics: vk::Queue,
    /// Presentation queue handle
    pub present: vk::Queue,
    /// Compute queue handle
    pub compute: vk::Queue,
    /// Graphics queue family index
    pub graphics_family: u32,
    /// Presentation queue family index
    pub present_family: u32,
    /// Compute queue family index
    pub compute_family: u32,
}

/// Non-owning bundle of device handles for presentation work
///
/// Cloning is cheap: `ash` handles are reference-counted function tables and
/// raw handles underneath.
#[derive(Clone)]
pub struct RenderDevice {
    entry: Entry,
    instance: Instance,
    physical_device: vk::PhysicalDevice,
    device: Device,
    queues: DeviceQueues,
}

impl RenderDevice {
    /// Bundle already-acquired device handles
    pub fn new(
        entry: Entry,
        instance: Instance,
        physical_device: vk::PhysicalDevice,
        device: Device,
        queues: DeviceQueues,
    ) -> Self {
        Self {
            entry,
            instance,
            physical_device,
            device,
            queues,
        }
    }

    /// Get the Vulkan entry point
    pub fn entry(&self) -> &Entry {
        &self.entry
    }

    /// Get the instance handle
    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    /// Get the physical device handle
    pub fn physical_device(&self) -> vk::PhysicalDevice {
        self.physical_device
    }

    /// Get the logical device handle
    pub fn handle(&self) -> &Device {
        &self.device
    }

    /// Get the graphics queue handle
    pub fn graphics_queue(&self) -> vk::Queue {
        self.queues.graphics
    }

    /// Get the presentation queue handle
    pub fn present_queue(&self) -> vk::Queue {
        self.queues.present
    }

    /// Get the compute queue handle
    pub fn compute_queue(&self) -> vk::Queue {
        self.queues.compute
    }

    /// Get the graphics queue family index
    pub fn graphics_family(&self) -> u32 {
        self.queues.graphics_family
    }

    /// Get the presentation queue family index
    pub fn present_family(&self) -> u32 {
        self.queues.present_family
    }

    /// Get the compute queue family index
    pub fn compute_family(&self) -> u32 {
        self.queues.compute_family
    }

    /// Block until all queues on the device are idle
    pub fn wait_idle(&self) -> VulkanResult<()> {
        unsafe { self.device.device_wait_idle().map_err(VulkanError::Api) }
    }

    /// Find a memory type matching the filter and property flags
    pub fn find_memory_type(
        &self,
        type_filter: u32,
        properties: vk::MemoryPropertyFlags,
    ) -> VulkanResult<u32> {
        let memory_properties = unsafe {
            self.instance
                .get_physical_device_memory_properties(self.physical_device)
        };

        for i in 0..memory_properties.memory_type_count {
            if (type_filter & (1 << i)) != 0
                && memory_properties.memory_types[i as usize]
                    .property_flags
                    .contains(properties)
            {
                return Ok(i);
            }
        }

        Err(VulkanError::NoSuitableMemoryType)
    }

    /// Find the first candidate format supporting the tiling and features
    ///
    /// Candidates are tried in order, so callers encode their preference as
    /// the slice ordering.
    pub fn find_supported_format(
        &self,
        candidates: &[vk::Format],
        tiling: vk::ImageTiling,
        features: vk::FormatFeatureFlags,
    ) -> VulkanResult<vk::Format> {
        for &format in candidates {
            let properties = unsafe {
                self.instance
                    .get_physical_device_format_properties(self.physical_device, format)
            };

            let supported = match tiling {
                vk::ImageTiling::LINEAR => properties.linear_tiling_features.contains(features),
                _ => properties.optimal_tiling_features.contains(features),
            };

            if supported {
                return Ok(format);
            }
        }

        Err(VulkanError::NoSuitableDepthFormat)
    }
}
