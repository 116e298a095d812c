/// Device viewport in physical pixels.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[inline]
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Viewport covering a whole surface of the given size.
    #[inline]
    pub const fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }
}

/// Scissor rectangle in physical pixels, top-left origin.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct ScissorRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl ScissorRect {
    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Clamps the rectangle to a `width` x `height` surface.
    ///
    /// Returns `None` when nothing of the rectangle remains visible.
    pub fn clamped_to(self, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
        let max_x = width as i64;
        let max_y = height as i64;
        let x0 = (self.x as i64).clamp(0, max_x);
        let y0 = (self.y as i64).clamp(0, max_y);
        let x1 = (self.x as i64 + self.width as i64).clamp(0, max_x);
        let y1 = (self.y as i64 + self.height as i64).clamp(0, max_y);

        if x1 <= x0 || y1 <= y0 {
            None
        } else {
            Some((x0 as u32, y0 as u32, (x1 - x0) as u32, (y1 - y0) as u32))
        }
    }
}
