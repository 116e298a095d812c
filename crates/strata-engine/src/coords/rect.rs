use super::Vec2;

/// Axis-aligned rectangle (top-left origin).
///
/// Clip rectangles use negative width or height as the "no clipping" marker;
/// see [`Rect::no_clip`].
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    #[inline]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// The "no clipping" rectangle `(0, 0, -1, -1)`.
    #[inline]
    pub const fn no_clip() -> Self {
        Self::new(0.0, 0.0, -1.0, -1.0)
    }

    /// True when either dimension carries the unbounded marker.
    #[inline]
    pub fn is_no_clip(self) -> bool {
        self.width < 0.0 || self.height < 0.0
    }

    #[inline]
    pub fn origin(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    #[inline]
    pub fn max(self) -> Vec2 {
        Vec2::new(self.x + self.width, self.y + self.height)
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Replaces unbounded (negative) dimensions with the given extent.
    #[inline]
    pub fn bounded_by(self, width: f32, height: f32) -> Self {
        Self {
            x: self.x,
            y: self.y,
            width: if self.width < 0.0 { width } else { self.width },
            height: if self.height < 0.0 { height } else { self.height },
        }
    }

    /// Overlap of two rectangles, `None` if they do not overlap.
    #[inline]
    pub fn intersect(self, other: Rect) -> Option<Rect> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = (self.x + self.width).min(other.x + other.width);
        let y1 = (self.y + self.height).min(other.y + other.height);

        if x1 <= x0 || y1 <= y0 {
            None
        } else {
            Some(Rect::new(x0, y0, x1 - x0, y1 - y0))
        }
    }
}
