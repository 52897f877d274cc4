//! Window management and the frame-synchronized draw protocol
//!
//! A [`Window`] owns its GLFW window, the Vulkan surface created from it, the
//! current [`Swapchain`], and a fixed ring of per-frame records. Rendering
//! techniques plug in through the [`WindowHandler`] trait: the window drives
//! the synchronization protocol, the handler records commands and reacts to
//! input and resizes.
//!
//! The draw cycle runs once per visible refresh:
//!
//! 1. Select the ring slot under the cursor.
//! 2. Acquire the next presentable image, signaling the slot's
//!    image-available semaphore. Out of date: abort this draw, rebuild the
//!    swapchain, retry next tick with the cursor unchanged.
//! 3. Wait on the slot's in-flight fence, then reset it. This is what bounds
//!    the CPU to `max_frames_in_flight` frames ahead of the GPU.
//! 4. Re-record the slot's command buffer through the handler's `draw` hook.
//! 5. Submit on the graphics queue: wait image-available, signal
//!    render-finished and the fence.
//! 6. Present on the presentation queue, waiting render-finished. Staleness
//!    here triggers a rebuild and never escapes the cycle.
//! 7. Advance the cursor.
//!
//! Hidden and zero-extent windows skip the draw cycle but keep processing
//! input. Teardown drives the device idle before any swapchain-dependent
//! resource is destroyed.

use ash::extensions::khr::Surface as SurfaceLoader;
use ash::vk;
use bitflags::bitflags;
use thiserror::Error;

use crate::config::{PresenterConfig, WindowConfig};
use crate::vulkan::{
    AcquireOutcome, CommandPool, FrameCursor, FrameData, FrameRecord, PresentOutcome,
    RenderDevice, Swapchain, VulkanError, VulkanResult,
};

/// Bounded fence wait so a shutdown request is noticed within a second
const FENCE_WAIT_NS: u64 = 1_000_000_000;

/// Window management errors
#[derive(Error, Debug)]
pub enum WindowError {
    /// GLFW initialization failed
    #[error("GLFW initialization failed")]
    InitializationFailed,

    /// Window creation failed
    #[error("Window creation failed")]
    CreationFailed,

    /// GLFW reported an error
    #[error("GLFW error: {0}")]
    GlfwError(String),

    /// The supplied configuration is invalid
    #[error("Invalid window configuration: {0}")]
    InvalidConfig(String),

    /// A Vulkan operation failed during window construction
    #[error("Vulkan error: {0}")]
    Vulkan(#[from] VulkanError),
}

/// Window lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    /// Constructed, frame ring not yet allocated
    Uninitialized,
    /// Idle between draw cycles
    Ready,
    /// Inside the draw cycle
    Presenting,
    /// Rebuilding the swapchain after a resize or stale surface
    Resizing,
    /// Draining GPU work before teardown
    Closing,
}

bitflags! {
    /// Individually-enablable input hooks
    ///
    /// Only events with an enabled hook are polled and dispatched to the
    /// handler; everything else never leaves GLFW.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct InputHooks: u32 {
        /// Keyboard keys
        const KEY = 1 << 0;
        /// Cursor movement
        const CURSOR_POS = 1 << 1;
        /// Cursor entering or leaving the window
        const CURSOR_ENTER = 1 << 2;
        /// Mouse buttons
        const MOUSE_BUTTON = 1 << 3;
        /// Scroll wheel
        const SCROLL = 1 << 4;
    }
}

impl Default for InputHooks {
    fn default() -> Self {
        Self::empty()
    }
}

/// Vulkan surface wrapper tied to the native window
struct WindowSurface {
    loader: SurfaceLoader,
    surface: vk::SurfaceKHR,
}

impl WindowSurface {
    fn new(device: &RenderDevice, window: &mut glfw::PWindow) -> Result<Self, WindowError> {
        let loader = SurfaceLoader::new(device.entry(), device.instance());

        let mut surface = vk::SurfaceKHR::null();
        let result =
            window.create_window_surface(device.instance().handle(), std::ptr::null(), &mut surface);

        if result != vk::Result::SUCCESS {
            return Err(WindowError::GlfwError(format!(
                "Failed to create Vulkan surface: {result:?}"
            )));
        }

        Ok(Self { loader, surface })
    }

    fn handle(&self) -> vk::SurfaceKHR {
        self.surface
    }

    fn loader(&self) -> &SurfaceLoader {
        &self.loader
    }
}

impl Drop for WindowSurface {
    fn drop(&mut self) {
        unsafe {
            self.loader.destroy_surface(self.surface, None);
        }
    }
}

/// Per-draw context handed to the handler's `draw` hook
///
/// Borrows the slot's frame record and carries the geometry for this draw.
/// All handles other than the frame record are non-owning.
pub struct DrawContext<'a> {
    device: &'a RenderDevice,
    frame: &'a mut dyn FrameRecord,
    frame_index: usize,
    image_index: u32,
    extent: vk::Extent2D,
    framebuffer: vk::Framebuffer,
    render_pass: vk::RenderPass,
}

impl DrawContext<'_> {
    /// Get the device handle bundle
    pub fn device(&self) -> &RenderDevice {
        self.device
    }

    /// Get the frame record for this ring slot
    pub fn frame_mut(&mut self) -> &mut dyn FrameRecord {
        self.frame
    }

    /// Get the command buffer being recorded
    pub fn command_buffer(&self) -> vk::CommandBuffer {
        self.frame.command_buffer()
    }

    /// Get the ring slot index, for indexing per-frame resources
    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    /// Get the acquired swapchain image index
    pub fn image_index(&self) -> u32 {
        self.image_index
    }

    /// Get the swapchain extent
    pub fn extent(&self) -> vk::Extent2D {
        self.extent
    }

    /// Get the framebuffer for the acquired image
    pub fn framebuffer(&self) -> vk::Framebuffer {
        self.framebuffer
    }

    /// Get the render pass bound to the window
    pub fn render_pass(&self) -> vk::RenderPass {
        self.render_pass
    }

    /// Full-extent viewport
    pub fn viewport(&self) -> vk::Viewport {
        full_viewport(self.extent)
    }

    /// Full-extent scissor rectangle
    pub fn scissor(&self) -> vk::Rect2D {
        full_scissor(self.extent)
    }
}

/// Rendering technique hooks driven by a [`Window`]
///
/// Only `draw` is required. Handlers must never submit or present on their
/// own; the window's acquire, fence-wait, submit, present ordering is the
/// synchronization contract for every record in the ring.
pub trait WindowHandler {
    /// Allocate one per-frame record
    ///
    /// Called exactly `max_frames_in_flight` times during
    /// [`Window::initialize`]. Techniques that need per-frame GPU resources
    /// return an enlarged record; the default is the base [`FrameData`].
    fn create_frame_record(
        &mut self,
        device: &RenderDevice,
        command_pool: &CommandPool,
    ) -> VulkanResult<Box<dyn FrameRecord>> {
        Ok(Box::new(FrameData::new(device, command_pool)?))
    }

    /// Second-phase setup with the window fully constructed
    ///
    /// Build the render pass and pipelines here, then call
    /// [`Window::bind_render_pass`] so framebuffers exist before first draw.
    fn initialize(&mut self, window: &mut Window) -> VulkanResult<()> {
        let _ = window;
        Ok(())
    }

    /// Record this frame's commands
    fn draw(&mut self, ctx: &mut DrawContext<'_>) -> VulkanResult<()>;

    /// React to a completed resize, with the new extent in pixels
    ///
    /// Aspect-dependent state such as the projection matrix belongs here.
    fn reshape(&mut self, width: u32, height: u32) {
        let _ = (width, height);
    }

    /// Keyboard key event
    fn key(
        &mut self,
        key: glfw::Key,
        scancode: glfw::Scancode,
        action: glfw::Action,
        mods: glfw::Modifiers,
    ) {
        let _ = (key, scancode, action, mods);
    }

    /// Cursor position event, in screen coordinates
    fn cursor_pos(&mut self, x: f64, y: f64) {
        let _ = (x, y);
    }

    /// Cursor entered or left the window
    fn cursor_enter(&mut self, entered: bool) {
        let _ = entered;
    }

    /// Mouse button event
    fn mouse_button(&mut self, button: glfw::MouseButton, action: glfw::Action, mods: glfw::Modifiers) {
        let _ = (button, action, mods);
    }

    /// Scroll wheel event
    fn scroll(&mut self, dx: f64, dy: f64) {
        let _ = (dx, dy);
    }
}

/// What the draw cycle does with an acquisition outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DrawPlan {
    /// Rebuild the swapchain and skip this draw; the cursor stays put
    RebuildAndSkip,
    /// Record and submit against the acquired image
    Record {
        image_index: u32,
        rebuild_after_present: bool,
    },
}

fn plan_for_acquire(outcome: AcquireOutcome) -> DrawPlan {
    match outcome {
        AcquireOutcome::OutOfDate => DrawPlan::RebuildAndSkip,
        AcquireOutcome::Ready { image_index } => DrawPlan::Record {
            image_index,
            rebuild_after_present: false,
        },
        // A suboptimal image is still usable; draw it, rebuild afterwards
        AcquireOutcome::Suboptimal { image_index } => DrawPlan::Record {
            image_index,
            rebuild_after_present: true,
        },
    }
}

fn rebuild_after_present(outcome: PresentOutcome, rebuild_already_planned: bool) -> bool {
    match outcome {
        PresentOutcome::Presented => rebuild_already_planned,
        PresentOutcome::Suboptimal | PresentOutcome::OutOfDate => true,
    }
}

fn full_viewport(extent: vk::Extent2D) -> vk::Viewport {
    vk::Viewport {
        x: 0.0,
        y: 0.0,
        width: extent.width as f32,
        height: extent.height as f32,
        min_depth: 0.0,
        max_depth: 1.0,
    }
}

fn full_scissor(extent: vk::Extent2D) -> vk::Rect2D {
    vk::Rect2D {
        offset: vk::Offset2D { x: 0, y: 0 },
        extent,
    }
}

/// GLFW window owning its surface, swapchain, and frame ring
///
/// The surface lives for the window's whole lifetime; swapchains are
/// transient within it. Field order matters for teardown: the frame ring
/// goes before the command pool its buffers came from, the swapchain before
/// the surface it was created on, and the surface before the native window.
pub struct Window {
    state: WindowState,
    hooks: InputHooks,
    window_config: WindowConfig,
    max_frames: usize,
    render_pass: Option<vk::RenderPass>,
    pass_uses_depth: bool,
    framebuffer_resized: bool,
    cursor: FrameCursor,
    frames: Vec<Box<dyn FrameRecord>>,
    command_pool: CommandPool,
    swapchain: Swapchain,
    surface: WindowSurface,
    device: RenderDevice,
    events: glfw::GlfwReceiver<(f64, glfw::WindowEvent)>,
    window: glfw::PWindow,
    glfw: glfw::Glfw,
}

impl Window {
    /// Create a window with its surface and initial swapchain
    ///
    /// The frame ring is not allocated yet; call [`initialize`](Self::initialize)
    /// with the handler before drawing.
    pub fn new(
        device: RenderDevice,
        config: &PresenterConfig,
        hooks: InputHooks,
    ) -> Result<Self, WindowError> {
        config.validate().map_err(WindowError::InvalidConfig)?;

        let mut glfw = glfw::init(glfw::fail_on_errors)
            .map_err(|_| WindowError::InitializationFailed)?;

        // Vulkan drives the surface, so no client API context
        glfw.window_hint(glfw::WindowHint::ClientApi(glfw::ClientApiHint::NoApi));
        glfw.window_hint(glfw::WindowHint::Resizable(config.window.resizable));

        let (mut window, events) = glfw
            .create_window(
                config.window.width,
                config.window.height,
                &config.window.title,
                glfw::WindowMode::Windowed,
            )
            .ok_or(WindowError::CreationFailed)?;

        window.set_close_polling(true);
        window.set_framebuffer_size_polling(true);
        if hooks.contains(InputHooks::KEY) {
            window.set_key_polling(true);
        }
        if hooks.contains(InputHooks::CURSOR_POS) {
            window.set_cursor_pos_polling(true);
        }
        if hooks.contains(InputHooks::CURSOR_ENTER) {
            window.set_cursor_enter_polling(true);
        }
        if hooks.contains(InputHooks::MOUSE_BUTTON) {
            window.set_mouse_button_polling(true);
        }
        if hooks.contains(InputHooks::SCROLL) {
            window.set_scroll_polling(true);
        }

        let surface = WindowSurface::new(&device, &mut window)?;

        let (fb_width, fb_height) = window.get_framebuffer_size();
        let swapchain = Swapchain::new(
            &device,
            surface.loader(),
            surface.handle(),
            &config.window,
            (fb_width as u32, fb_height as u32),
            vk::SwapchainKHR::null(),
        )?;

        let command_pool = CommandPool::new(device.handle().clone(), device.graphics_family())?;

        log::debug!(
            "Created window \"{}\" ({}x{} requested, {}x{} framebuffer)",
            config.window.title,
            config.window.width,
            config.window.height,
            fb_width,
            fb_height
        );

        Ok(Self {
            state: WindowState::Uninitialized,
            hooks,
            window_config: config.window.clone(),
            max_frames: config.max_frames_in_flight,
            render_pass: None,
            pass_uses_depth: false,
            framebuffer_resized: false,
            cursor: FrameCursor::new(config.max_frames_in_flight),
            frames: Vec::new(),
            command_pool,
            swapchain,
            surface,
            device,
            events,
            window,
            glfw,
        })
    }

    /// Second-phase initialization: allocate the frame ring and let the
    /// handler finish its own setup
    ///
    /// The ring is built through the handler's `create_frame_record` factory,
    /// exactly once per slot; it persists until teardown and is never
    /// reallocated on resize. The handler's `initialize` hook runs afterwards
    /// against the fully-constructed window.
    pub fn initialize(&mut self, handler: &mut dyn WindowHandler) -> VulkanResult<()> {
        if !self.frames.is_empty() {
            return Err(VulkanError::InvalidOperation {
                reason: "window already initialized".to_string(),
            });
        }

        for _ in 0..self.max_frames {
            let record = handler.create_frame_record(&self.device, &self.command_pool)?;
            self.frames.push(record);
        }
        log::debug!("Allocated frame ring with {} slots", self.max_frames);

        handler.initialize(self)?;

        self.state = WindowState::Ready;
        Ok(())
    }

    /// Bind the technique's render pass and build framebuffers against it
    ///
    /// The handle is a non-owning borrow; the technique keeps ownership of
    /// the render pass and must keep it alive while it stays bound. Call
    /// again if the render pass is ever recreated.
    pub fn bind_render_pass(
        &mut self,
        render_pass: vk::RenderPass,
        pass_uses_depth: bool,
    ) -> VulkanResult<()> {
        self.render_pass = Some(render_pass);
        self.pass_uses_depth = pass_uses_depth;
        self.swapchain.init_framebuffers(render_pass, pass_uses_depth)
    }

    /// Run the event and draw loop until close is requested
    pub fn run(&mut self, handler: &mut dyn WindowHandler) -> VulkanResult<()> {
        if self.frames.is_empty() {
            return Err(VulkanError::InvalidOperation {
                reason: "initialize() must run before the draw loop".to_string(),
            });
        }

        while !self.window.should_close() {
            self.glfw.poll_events();
            self.dispatch_events(handler);

            // Hidden or zero-extent windows keep processing input but skip drawing
            if !self.is_drawable() {
                continue;
            }

            self.draw_frame(handler)?;
        }

        self.close()
    }

    /// Execute one draw cycle
    ///
    /// Presentation staleness is absorbed here: an out-of-date acquire skips
    /// the draw after rebuilding the swapchain, a stale present rebuilds
    /// after the frame is queued. Every other error is fatal and propagates.
    pub fn draw_frame(&mut self, handler: &mut dyn WindowHandler) -> VulkanResult<()> {
        let render_pass = self.render_pass.ok_or_else(|| VulkanError::InvalidOperation {
            reason: "no render pass bound; call bind_render_pass() during initialize".to_string(),
        })?;

        if self.framebuffer_resized {
            self.rebuild_swapchain(handler)?;
            if self.framebuffer_resized {
                // Still zero-extent; nothing to draw yet
                return Ok(());
            }
        }

        self.state = WindowState::Presenting;
        let slot = self.cursor.index();

        // Acquire before the fence wait so the CPU blocks in at most two
        // places per cycle, both of them driver-side waits
        let acquire = self
            .swapchain
            .acquire_next_image(self.frames[slot].sync().image_available.handle())?;

        let (image_index, mut rebuild_planned) = match plan_for_acquire(acquire) {
            DrawPlan::RebuildAndSkip => {
                log::warn!("Swapchain out of date during acquire; rebuilding");
                self.rebuild_swapchain(handler)?;
                return Ok(());
            }
            DrawPlan::Record {
                image_index,
                rebuild_after_present,
            } => (image_index, rebuild_after_present),
        };

        // Gate slot reuse on the previous submission from this slot
        loop {
            if self.frames[slot].sync().in_flight.wait(FENCE_WAIT_NS)? {
                break;
            }
            if self.window.should_close() {
                log::debug!("Close requested while waiting on frame fence");
                self.state = WindowState::Ready;
                return Ok(());
            }
        }
        self.frames[slot].sync().in_flight.reset()?;

        // Re-record this slot's command buffer through the handler
        let command_buffer = self.frames[slot].command_buffer();
        let framebuffer = self.swapchain.framebuffer(image_index as usize)?;
        let extent = self.swapchain.extent();

        unsafe {
            self.device
                .handle()
                .reset_command_buffer(command_buffer, vk::CommandBufferResetFlags::empty())
                .map_err(VulkanError::Api)?;

            let begin_info = vk::CommandBufferBeginInfo::builder()
                .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);
            self.device
                .handle()
                .begin_command_buffer(command_buffer, &begin_info)
                .map_err(VulkanError::Api)?;
        }

        {
            let mut ctx = DrawContext {
                device: &self.device,
                frame: &mut *self.frames[slot],
                frame_index: slot,
                image_index,
                extent,
                framebuffer,
                render_pass,
            };
            handler.draw(&mut ctx)?;
        }

        unsafe {
            self.device
                .handle()
                .end_command_buffer(command_buffer)
                .map_err(VulkanError::Api)?;
        }

        // Submit, waiting on the acquired image and signaling completion
        {
            let sync = self.frames[slot].sync();
            let wait_semaphores = [sync.image_available.handle()];
            let wait_stages = [vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
            let command_buffers = [command_buffer];
            let signal_semaphores = [sync.render_finished.handle()];
            let submit_info = vk::SubmitInfo::builder()
                .wait_semaphores(&wait_semaphores)
                .wait_dst_stage_mask(&wait_stages)
                .command_buffers(&command_buffers)
                .signal_semaphores(&signal_semaphores);

            unsafe {
                self.device
                    .handle()
                    .queue_submit(
                        self.device.graphics_queue(),
                        &[submit_info.build()],
                        sync.in_flight.handle(),
                    )
                    .map_err(VulkanError::Api)?;
            }
        }

        let present_outcome = self.swapchain.present(
            self.device.present_queue(),
            image_index,
            self.frames[slot].sync().render_finished.handle(),
        )?;
        rebuild_planned = rebuild_after_present(present_outcome, rebuild_planned);

        self.cursor.advance();
        self.state = WindowState::Ready;

        if rebuild_planned {
            log::warn!("Swapchain stale after present; rebuilding");
            self.rebuild_swapchain(handler)?;
        }

        Ok(())
    }

    /// Drain GPU work ahead of teardown
    pub fn close(&mut self) -> VulkanResult<()> {
        log::debug!("Closing window; draining device");
        self.state = WindowState::Closing;
        self.device.wait_idle()
    }

    fn dispatch_events(&mut self, handler: &mut dyn WindowHandler) {
        let events: Vec<(f64, glfw::WindowEvent)> = glfw::flush_messages(&self.events).collect();

        for (_, event) in events {
            match event {
                glfw::WindowEvent::FramebufferSize(width, height) => {
                    log::debug!("Framebuffer resized to {width}x{height}");
                    self.framebuffer_resized = true;
                }
                glfw::WindowEvent::Close => {
                    log::debug!("Window close requested");
                }
                glfw::WindowEvent::Key(key, scancode, action, mods)
                    if self.hooks.contains(InputHooks::KEY) =>
                {
                    handler.key(key, scancode, action, mods);
                }
                glfw::WindowEvent::CursorPos(x, y)
                    if self.hooks.contains(InputHooks::CURSOR_POS) =>
                {
                    handler.cursor_pos(x, y);
                }
                glfw::WindowEvent::CursorEnter(entered)
                    if self.hooks.contains(InputHooks::CURSOR_ENTER) =>
                {
                    handler.cursor_enter(entered);
                }
                glfw::WindowEvent::MouseButton(button, action, mods)
                    if self.hooks.contains(InputHooks::MOUSE_BUTTON) =>
                {
                    handler.mouse_button(button, action, mods);
                }
                glfw::WindowEvent::Scroll(dx, dy)
                    if self.hooks.contains(InputHooks::SCROLL) =>
                {
                    handler.scroll(dx, dy);
                }
                _ => {}
            }
        }
    }

    /// Tear down and rebuild the swapchain at the current framebuffer size
    ///
    /// The depth/stencil choice from window creation persists through the
    /// rebuild. Framebuffers are rebuilt against the bound render pass and
    /// the handler's `reshape` hook runs with the new extent. A zero-extent
    /// framebuffer (minimized window) defers the rebuild until a later tick.
    fn rebuild_swapchain(&mut self, handler: &mut dyn WindowHandler) -> VulkanResult<()> {
        self.state = WindowState::Resizing;

        let (fb_width, fb_height) = self.window.get_framebuffer_size();
        if fb_width == 0 || fb_height == 0 {
            self.framebuffer_resized = true;
            self.state = WindowState::Ready;
            return Ok(());
        }

        // Nothing swapchain-dependent may be destroyed while work is pending
        self.device.wait_idle()?;

        let old_swapchain = self.swapchain.handle();
        let next = Swapchain::new(
            &self.device,
            self.surface.loader(),
            self.surface.handle(),
            &self.window_config,
            (fb_width as u32, fb_height as u32),
            old_swapchain,
        )?;
        self.swapchain = next;

        if let Some(render_pass) = self.render_pass {
            self.swapchain
                .init_framebuffers(render_pass, self.pass_uses_depth)?;
        }

        let extent = self.swapchain.extent();
        handler.reshape(extent.width, extent.height);

        self.framebuffer_resized = false;
        self.state = WindowState::Ready;
        log::debug!("Swapchain rebuilt at {}x{}", extent.width, extent.height);
        Ok(())
    }

    fn is_drawable(&self) -> bool {
        let (fb_width, fb_height) = self.window.get_framebuffer_size();
        self.window.is_visible() && fb_width > 0 && fb_height > 0
    }

    /// Get the current lifecycle state
    pub fn state(&self) -> WindowState {
        self.state
    }

    /// Get the device handle bundle
    pub fn device(&self) -> &RenderDevice {
        &self.device
    }

    /// Get the current swapchain
    pub fn swapchain(&self) -> &Swapchain {
        &self.swapchain
    }

    /// Get the command pool frame records allocate from
    pub fn command_pool(&self) -> &CommandPool {
        &self.command_pool
    }

    /// Get the number of frames in flight
    pub fn frames_in_flight(&self) -> usize {
        self.max_frames
    }

    /// Get the ring slot the next draw will use
    pub fn current_frame_index(&self) -> usize {
        self.cursor.index()
    }

    /// Get the current swapchain extent
    pub fn extent(&self) -> vk::Extent2D {
        self.swapchain.extent()
    }

    /// Full-extent viewport for the current swapchain
    pub fn viewport(&self) -> vk::Viewport {
        full_viewport(self.swapchain.extent())
    }

    /// Full-extent scissor rectangle for the current swapchain
    pub fn scissor(&self) -> vk::Rect2D {
        full_scissor(self.swapchain.extent())
    }

    /// Get the native framebuffer size in pixels
    pub fn framebuffer_size(&self) -> (u32, u32) {
        let (width, height) = self.window.get_framebuffer_size();
        (width as u32, height as u32)
    }

    /// Whether close has been requested
    pub fn should_close(&self) -> bool {
        self.window.should_close()
    }

    /// Request or cancel closing
    pub fn set_should_close(&mut self, should_close: bool) {
        self.window.set_should_close(should_close);
    }
}

impl Drop for Window {
    fn drop(&mut self) {
        self.state = WindowState::Closing;
        if let Err(e) = self.device.wait_idle() {
            log::error!("Device wait-idle failed during window teardown: {e}");
        }
        // Frame records go before the pool their command buffers came from;
        // the remaining fields tear down in declaration order
        self.frames.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_date_acquire_skips_the_draw() {
        assert_eq!(
            plan_for_acquire(AcquireOutcome::OutOfDate),
            DrawPlan::RebuildAndSkip
        );
    }

    #[test]
    fn ready_acquire_records_without_rebuild() {
        assert_eq!(
            plan_for_acquire(AcquireOutcome::Ready { image_index: 1 }),
            DrawPlan::Record {
                image_index: 1,
                rebuild_after_present: false,
            }
        );
    }

    #[test]
    fn suboptimal_acquire_still_draws_then_rebuilds() {
        assert_eq!(
            plan_for_acquire(AcquireOutcome::Suboptimal { image_index: 2 }),
            DrawPlan::Record {
                image_index: 2,
                rebuild_after_present: true,
            }
        );
    }

    #[test]
    fn stale_present_always_forces_a_rebuild() {
        assert!(rebuild_after_present(PresentOutcome::OutOfDate, false));
        assert!(rebuild_after_present(PresentOutcome::Suboptimal, false));
        assert!(!rebuild_after_present(PresentOutcome::Presented, false));
        // A rebuild planned at acquire time survives a clean present
        assert!(rebuild_after_present(PresentOutcome::Presented, true));
    }

    #[test]
    fn skipped_draw_leaves_cursor_unchanged() {
        // Out-of-date on the third draw: slots run [0, 1, 0] with the stale
        // cycle repeating its slot instead of advancing
        let mut cursor = FrameCursor::new(2);
        let outcomes = [
            AcquireOutcome::Ready { image_index: 0 },
            AcquireOutcome::Ready { image_index: 1 },
            AcquireOutcome::OutOfDate,
            AcquireOutcome::Ready { image_index: 0 },
        ];

        let mut slots = Vec::new();
        for outcome in outcomes {
            slots.push(cursor.index());
            match plan_for_acquire(outcome) {
                DrawPlan::RebuildAndSkip => {}
                DrawPlan::Record { .. } => cursor.advance(),
            }
        }

        assert_eq!(slots, vec![0, 1, 0, 0]);
    }

    #[test]
    fn input_hooks_default_to_disabled() {
        assert_eq!(InputHooks::default(), InputHooks::empty());
        assert!(InputHooks::all().contains(InputHooks::KEY | InputHooks::SCROLL));
    }

    #[test]
    fn viewport_and_scissor_cover_the_extent() {
        let extent = vk::Extent2D {
            width: 1280,
            height: 720,
        };

        let viewport = full_viewport(extent);
        assert_eq!(viewport.width, 1280.0);
        assert_eq!(viewport.height, 720.0);
        assert_eq!(viewport.max_depth, 1.0);

        let scissor = full_scissor(extent);
        assert_eq!(scissor.offset.x, 0);
        assert_eq!(scissor.extent.width, 1280);
    }
}
