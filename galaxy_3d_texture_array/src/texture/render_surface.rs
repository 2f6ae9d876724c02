/// Render surface of a render-target texture array

/// When the renderer should refresh a render surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SurfaceUpdateMode {
    /// Only when an update is queued explicitly
    Manual,
    /// When the surface's viewport is visible (renderer decides)
    #[default]
    UpdateVisible,
    /// Every frame
    UpdateAlways,
}

/// Render surface attached to a render-target texture array
#[derive(Debug, Clone, Default)]
pub struct RenderSurface {
    update_mode: SurfaceUpdateMode,
    update_queued: bool,
    attached: bool,
    lost: bool,
}

/// Receiver of render surfaces that need rendering this frame
pub trait RenderSurfaceQueue {
    fn queue_render_surface(&mut self, texture: &str, surface: &RenderSurface);
}

impl RenderSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_mode(&self) -> SurfaceUpdateMode {
        self.update_mode
    }

    pub fn set_update_mode(&mut self, mode: SurfaceUpdateMode) {
        self.update_mode = mode;
    }

    /// Request a one-shot update on the next frame
    pub fn queue_update(&mut self) {
        self.update_queued = true;
    }

    pub fn is_update_queued(&self) -> bool {
        self.update_queued
    }

    pub fn reset_update_queued(&mut self) {
        self.update_queued = false;
    }

    /// Called by the renderer once the surface is bound to a framebuffer
    pub fn attach(&mut self) {
        self.attached = true;
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn is_lost(&self) -> bool {
        self.lost
    }

    /// Detach from every framebuffer
    pub fn release(&mut self) {
        self.attached = false;
    }

    pub fn on_device_lost(&mut self) {
        self.attached = false;
        self.lost = true;
    }

    pub fn on_device_reset(&mut self) {
        self.lost = false;
    }
}
