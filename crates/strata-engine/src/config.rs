use crate::coords::ColorRgba;
use crate::render::RenderOrientation;

/// Construction-time settings of a [`crate::render::RenderManager`].
///
/// Keep this structure small. Add fields only when a caller needs them.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Default framebuffer size in physical pixels.
    pub framebuffer_width: u32,
    pub framebuffer_height: u32,

    /// Orientation used for the default framebuffer.
    pub orientation: RenderOrientation,

    /// Target frame rate reported through `RenderManager::fps`.
    pub fps: u32,

    /// Logs texture, shader and render target switches.
    pub debug: bool,

    /// Dumps draw statistics every N frames; `None` disables the dump.
    pub stats_every_n_frames: Option<u32>,

    /// Clear color of the default framebuffer at `begin_frame`.
    pub clear_color: ColorRgba,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            framebuffer_width: 1024,
            framebuffer_height: 768,
            orientation: RenderOrientation::Portrait,
            fps: 60,
            debug: false,
            stats_every_n_frames: None,
            clear_color: ColorRgba::black(),
        }
    }
}
