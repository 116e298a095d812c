use glam::Mat4;

use crate::coords::{Rect, Vec2};

use super::matrix;

/// 2D affine transform: `p' = p * scale + offset`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DrawTransform {
    pub offset: Vec2,
    pub scale: Vec2,
}

impl Default for DrawTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl DrawTransform {
    pub const fn identity() -> Self {
        Self {
            offset: Vec2::zero(),
            scale: Vec2::one(),
        }
    }

    pub fn new(offset: Vec2, scale: Vec2) -> Self {
        Self { offset, scale }
    }

    /// Moves the origin by `offset` measured in the current (scaled) units.
    pub fn translate(&mut self, offset: Vec2) {
        self.offset += offset.scaled_by(self.scale);
    }

    pub fn scale(&mut self, scale: Vec2) {
        self.scale = self.scale.scaled_by(scale);
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }

    /// `self` applied after `inner`.
    pub fn then(&self, inner: &DrawTransform) -> DrawTransform {
        DrawTransform {
            offset: self.offset + inner.offset.scaled_by(self.scale),
            scale: self.scale.scaled_by(inner.scale),
        }
    }

    pub fn apply(&self, point: Vec2) -> Vec2 {
        point.scaled_by(self.scale) + self.offset
    }

    /// Maps a rectangle, rounding outward to whole pixels.
    pub fn apply_rect_outward(&self, rect: Rect) -> Rect {
        let min = self.apply(rect.origin());
        let max = self.apply(rect.max());
        let x0 = min.x.min(max.x).floor();
        let y0 = min.y.min(max.y).floor();
        let x1 = min.x.max(max.x).ceil();
        let y1 = min.y.max(max.y).ceil();
        Rect::new(x0, y0, x1 - x0, y1 - y0)
    }

    /// Row-vector model-view matrix.
    pub fn to_matrix(&self) -> Mat4 {
        matrix::scale_translation(self.scale.x, self.scale.y, self.offset.x, self.offset.y)
    }
}

/// A current transform plus the saved values under it.
#[derive(Debug, Clone, Default)]
pub struct TransformStack {
    current: DrawTransform,
    saved: Vec<DrawTransform>,
}

impl TransformStack {
    pub fn current(&self) -> &DrawTransform {
        &self.current
    }

    pub fn current_mut(&mut self) -> &mut DrawTransform {
        &mut self.current
    }

    pub fn set(&mut self, transform: DrawTransform) {
        self.current = transform;
    }

    pub fn push(&mut self) {
        self.saved.push(self.current);
    }

    /// Restores the last saved transform; `false` on underflow.
    pub fn pop(&mut self) -> bool {
        match self.saved.pop() {
            Some(t) => {
                self.current = t;
                true
            }
            None => false,
        }
    }

    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    pub fn reset(&mut self) {
        self.current = DrawTransform::identity();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translation_is_prescaled() {
        let mut t = DrawTransform::identity();
        t.scale(Vec2::new(2.0, 3.0));
        t.translate(Vec2::new(1.0, 1.0));
        assert_eq!(t.offset, Vec2::new(2.0, 3.0));
        assert_eq!(t.apply(Vec2::new(1.0, 1.0)), Vec2::new(4.0, 6.0));
    }

    #[test]
    fn composition_matches_sequential_application() {
        let outer = DrawTransform::new(Vec2::new(5.0, 7.0), Vec2::new(2.0, 2.0));
        let inner = DrawTransform::new(Vec2::new(1.0, -1.0), Vec2::new(0.5, 3.0));
        let p = Vec2::new(3.0, 4.0);
        assert_eq!(outer.then(&inner).apply(p), outer.apply(inner.apply(p)));
    }

    #[test]
    fn outward_rounding_covers_fractional_rects() {
        let t = DrawTransform::new(Vec2::new(0.25, 0.0), Vec2::new(1.5, 1.0));
        let r = t.apply_rect_outward(Rect::new(1.0, 1.5, 1.0, 1.0));
        assert_eq!(r, Rect::new(1.0, 1.0, 3.0, 2.0));
    }

    #[test]
    fn stack_restores_and_reports_underflow() {
        let mut stack = TransformStack::default();
        stack.current_mut().translate(Vec2::new(3.0, 3.0));
        let before = *stack.current();

        stack.push();
        stack.current_mut().scale(Vec2::new(4.0, 4.0));
        assert!(stack.pop());
        assert_eq!(*stack.current(), before);
        assert!(!stack.pop());
        assert_eq!(*stack.current(), before);
    }

    #[test]
    fn matrix_maps_like_apply() {
        let t = DrawTransform::new(Vec2::new(5.0, 6.0), Vec2::new(2.0, 3.0));
        let m = t.to_matrix().transpose();
        let v = m * glam::Vec4::new(1.0, 1.0, 0.0, 1.0);
        assert_eq!((v.x, v.y), (7.0, 9.0));
    }
}
