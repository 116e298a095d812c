use crate::coords::Rect;

/// Current clip rectangle plus the saved ones under it.
///
/// Popping an empty stack yields [`Rect::no_clip`].
#[derive(Debug, Clone)]
pub struct ClipStack {
    current: Rect,
    saved: Vec<Rect>,
}

impl Default for ClipStack {
    fn default() -> Self {
        Self {
            current: Rect::no_clip(),
            saved: Vec::new(),
        }
    }
}

impl ClipStack {
    pub fn current(&self) -> Rect {
        self.current
    }

    pub fn set(&mut self, rect: Rect) {
        self.current = rect;
    }

    pub fn push(&mut self) {
        self.saved.push(self.current);
    }

    /// Restores the last saved clip and returns it.
    pub fn pop(&mut self) -> Rect {
        self.current = self.saved.pop().unwrap_or_else(Rect::no_clip);
        self.current
    }

    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    /// Intersects `rect` with the current clip, treating unbounded
    /// dimensions as the full `width` x `height` screen.
    ///
    /// An empty overlap is reported as a zero-sized rectangle.
    pub fn intersected(&self, rect: Rect, width: f32, height: f32) -> Rect {
        self.current
            .bounded_by(width, height)
            .intersect(rect)
            .unwrap_or(Rect::new(rect.x, rect.y, 0.0, 0.0))
    }
}
