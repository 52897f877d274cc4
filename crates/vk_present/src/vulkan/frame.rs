//! Per-frame records and the frame ring cursor
//!
//! Each frame in flight owns a command buffer and the three synchronization
//! objects the draw cycle drives. Records live in a fixed ring created once
//! at window initialization and destroyed only at teardown; resizes never
//! reallocate them.
//!
//! Rendering techniques extend the base record through the [`FrameRecord`]
//! trait: their factory returns an enlarged record carrying per-frame GPU
//! resources (uniform buffers, descriptor sets), and `as_any_mut` lets their
//! draw code get back at those fields. The window drives the synchronization
//! objects identically regardless of the concrete record type.

use std::any::Any;

use ash::vk;

use crate::vulkan::{CommandPool, FrameSync, RenderDevice, VulkanResult};

/// Per-frame record interface
///
/// Implementors supply the command buffer and synchronization objects for
/// one ring slot. Creation goes through the window handler's factory;
/// destruction is the record's `Drop`.
pub trait FrameRecord {
    /// Get the command buffer recorded each draw
    fn command_buffer(&self) -> vk::CommandBuffer;

    /// Get the slot's synchronization objects
    fn sync(&self) -> &FrameSync;

    /// Downcast support for technique-specific record types
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Base per-frame record: a command buffer plus synchronization objects
pub struct FrameData {
    command_buffer: vk::CommandBuffer,
    sync: FrameSync,
}

impl FrameData {
    /// Create a base frame record
    ///
    /// The command buffer stays allocated from the pool for the record's
    /// whole life and is freed with the pool.
    pub fn new(device: &RenderDevice, command_pool: &CommandPool) -> VulkanResult<Self> {
        let command_buffer = command_pool.allocate_command_buffers(1)?[0];
        let sync = FrameSync::new(device.handle().clone())?;

        Ok(Self {
            command_buffer,
            sync,
        })
    }
}

impl FrameRecord for FrameData {
    fn command_buffer(&self) -> vk::CommandBuffer {
        self.command_buffer
    }

    fn sync(&self) -> &FrameSync {
        &self.sync
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Ring cursor over the frames in flight
///
/// Pure index arithmetic, kept separate from the records so the slot cycling
/// contract is testable on its own.
#[derive(Debug, Clone, Copy)]
pub struct FrameCursor {
    current: usize,
    count: usize,
}

impl FrameCursor {
    /// Create a cursor over `count` slots, starting at slot 0
    pub fn new(count: usize) -> Self {
        debug_assert!(count >= 1, "frame ring needs at least one slot");
        Self { current: 0, count }
    }

    /// Get the current slot index
    pub fn index(&self) -> usize {
        self.current
    }

    /// Get the number of slots
    pub fn count(&self) -> usize {
        self.count
    }

    /// Advance to the next slot, wrapping at the ring size
    pub fn advance(&mut self) {
        self.current = (self.current + 1) % self.count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_cycles_through_two_slots() {
        let mut cursor = FrameCursor::new(2);

        let mut visited = Vec::new();
        for _ in 0..5 {
            visited.push(cursor.index());
            cursor.advance();
        }

        assert_eq!(visited, vec![0, 1, 0, 1, 0]);
    }

    #[test]
    fn cursor_wraps_at_arbitrary_ring_sizes() {
        for count in 1..=4 {
            let mut cursor = FrameCursor::new(count);
            for i in 0..count * 3 {
                assert_eq!(cursor.index(), i % count);
                cursor.advance();
            }
        }
    }

    #[test]
    fn frame_record_is_object_safe() {
        // Compile-time check that the trait supports the ring's dyn storage
        fn assert_dyn(_: &dyn FrameRecord) {}
        let _ = assert_dyn;
    }
}
