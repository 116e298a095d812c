use glam::{Mat4, Vec4};

use crate::coords::Rect;

/// Logical orientation of the default framebuffer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum RenderOrientation {
    #[default]
    Portrait,
    LandscapeLeft,
    LandscapeRight,
}

impl RenderOrientation {
    pub fn is_landscape(self) -> bool {
        !matches!(self, RenderOrientation::Portrait)
    }
}

/// Maps a rectangle in render-orientation coordinates onto the physical
/// framebuffer of `framebuffer_width` x `framebuffer_height` pixels.
///
/// Both landscape orientations use the same remap.
pub fn map_rect_to_viewport(
    rect: Rect,
    orientation: RenderOrientation,
    framebuffer_width: f32,
    framebuffer_height: f32,
) -> Rect {
    match orientation {
        RenderOrientation::Portrait => rect,
        RenderOrientation::LandscapeLeft => Rect::new(
            framebuffer_width - (rect.y + rect.height),
            framebuffer_height - rect.x,
            rect.height,
            rect.width,
        ),
        RenderOrientation::LandscapeRight => Rect::new(
            framebuffer_width - (rect.y + rect.height),
            framebuffer_height - rect.x,
            rect.height,
            rect.width,
        ),
    }
}

/// Turns a [`map_rect_to_viewport`] result into a top-left-origin scissor
/// rectangle that covers what [`orientation_matrix`] draws.
///
/// The landscape remap yields a bottom-left vertical origin.
pub fn viewport_rect_to_scissor(
    mapped: Rect,
    orientation: RenderOrientation,
    framebuffer_height: f32,
) -> Rect {
    if orientation.is_landscape() {
        Rect::new(mapped.x, framebuffer_height - mapped.y, mapped.width, mapped.height)
    } else {
        mapped
    }
}

/// Row-vector transform taking render-orientation coordinates to framebuffer
/// pixels (top-left origin).
///
/// Landscape is a quarter turn: `px = width - y`, `py = x`.
pub fn orientation_matrix(
    orientation: RenderOrientation,
    framebuffer_width: f32,
    _framebuffer_height: f32,
) -> Mat4 {
    match orientation {
        RenderOrientation::Portrait => Mat4::IDENTITY,
        RenderOrientation::LandscapeLeft | RenderOrientation::LandscapeRight => Mat4::from_cols(
            Vec4::new(0.0, 1.0, 0.0, 0.0),
            Vec4::new(-1.0, 0.0, 0.0, 0.0),
            Vec4::new(0.0, 0.0, 1.0, 0.0),
            Vec4::new(framebuffer_width, 0.0, 0.0, 1.0),
        )
        .transpose(),
    }
}
