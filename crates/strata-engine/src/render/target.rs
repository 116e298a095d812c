use crate::device::TargetHandle;

use super::orientation::RenderOrientation;

/// An offscreen surface the manager can render into.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct RenderTarget {
    pub handle: TargetHandle,
    pub width: u32,
    pub height: u32,
}

impl RenderTarget {
    pub fn new(handle: TargetHandle, width: u32, height: u32) -> Self {
        Self { handle, width, height }
    }
}

/// Saved binding restored by `RenderManager::restore_render_target`.
///
/// `target == None` is the default framebuffer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RenderTargetEntry {
    pub target: Option<RenderTarget>,
    pub orientation: RenderOrientation,
}
