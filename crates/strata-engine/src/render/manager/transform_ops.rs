use crate::coords::{Rect, ScissorRect, Vec2};

use super::super::matrix::MatrixSlot;
use super::super::orientation::{map_rect_to_viewport, viewport_rect_to_scissor};
use super::super::transform::DrawTransform;
use super::RenderManager;

impl RenderManager {
    // ── user draw transform ───────────────────────────────────────────────

    /// Moves the draw origin; `offset` is scaled by the current draw scale.
    pub fn translate(&mut self, offset: Vec2) {
        self.user.current_mut().translate(offset);
    }

    pub fn scale(&mut self, scale: Vec2) {
        self.user.current_mut().scale(scale);
    }

    pub fn draw_matrix(&self) -> DrawTransform {
        *self.user.current()
    }

    /// Resets the user draw transform only.
    pub fn identity_draw_matrix(&mut self) {
        self.user.reset();
    }

    /// Resets the user, mapping and real transforms.
    pub fn identity_total_matrix(&mut self) {
        self.user.reset();
        self.mapping.reset();
        self.real = DrawTransform::identity();
    }

    pub fn push_draw_matrix(&mut self) {
        self.user.push();
    }

    /// Restores the last pushed draw transform. Popping an empty stack is a
    /// programming error (debug assertion, no-op in release).
    pub fn pop_draw_matrix(&mut self) {
        let popped = self.user.pop();
        debug_assert!(popped, "draw matrix stack underflow");
        if !popped {
            log::error!("pop_draw_matrix on an empty stack");
        }
    }

    // ── view mapping ──────────────────────────────────────────────────────

    pub fn mapping_matrix(&self) -> DrawTransform {
        *self.mapping.current()
    }

    pub fn push_mapping_matrix(&mut self) {
        self.mapping.push();
    }

    /// Restores the last pushed mapping transform. The user draw transform is
    /// left alone so render target restores stay symmetric.
    pub fn pop_mapping_matrix(&mut self) {
        let popped = self.mapping.pop();
        debug_assert!(popped, "mapping matrix stack underflow");
        if !popped {
            log::error!("pop_mapping_matrix on an empty stack");
        }
    }

    /// Physical pixels map 1:1.
    pub fn set_physical_view_scale(&mut self) {
        self.mapping.current_mut().scale = Vec2::one();
    }

    pub fn set_physical_view_offset(&mut self) {
        self.mapping.current_mut().offset = self.metrics.physical_draw_offset();
    }

    pub fn set_virtual_view_scale(&mut self) {
        let factor = self.metrics.virtual_to_physical_factor();
        self.mapping.current_mut().scale = Vec2::new(factor, factor);
    }

    /// Shifts the mapping so the virtual screen's top-left lands on the
    /// physical offset. Accumulates: call after `set_physical_view_offset`.
    pub fn set_virtual_view_offset(&mut self) {
        let min = self.metrics.virtual_screen_min();
        let mapping = self.mapping.current_mut();
        mapping.offset = mapping.offset - min.scaled_by(mapping.scale);
    }

    // ── real transform ────────────────────────────────────────────────────

    /// `mapping` applied after `user`, as of the last [`Self::prepare_real_matrix`].
    pub fn real_matrix(&self) -> DrawTransform {
        self.real
    }

    /// Recomputes the real transform and, if it changed since it was last
    /// written, stores it in the model-view slot.
    pub fn prepare_real_matrix(&mut self) {
        self.real = self.mapping.current().then(self.user.current());
        if self.applied_real != Some(self.real) {
            self.matrices.set_matrix(MatrixSlot::ModelView, self.real.to_matrix());
            self.applied_real = Some(self.real);
        }
    }

    // ── clip stack ────────────────────────────────────────────────────────

    pub fn clip(&self) -> Rect {
        self.clips.current()
    }

    /// Clips to `rect` in draw coordinates; [`Rect::no_clip`] removes the clip.
    pub fn set_clip(&mut self, rect: Rect) {
        self.set_hw_clip(rect);
    }

    pub fn remove_clip(&mut self) {
        self.set_hw_clip(Rect::no_clip());
    }

    /// Narrows the clip to `rect`.
    ///
    /// The overlap with the current clip is computed, but `rect` itself is
    /// what gets applied.
    pub fn clip_rect(&mut self, rect: Rect) {
        let (w, h) = self.screen_size();
        let overlap = self.clips.intersected(rect, w as f32, h as f32);
        log::trace!("clip_rect {rect:?}, overlap with current clip {overlap:?}");
        self.set_hw_clip(rect);
    }

    pub fn clip_push(&mut self) {
        self.clips.push();
    }

    /// Restores the last pushed clip, or removes clipping when nothing was
    /// pushed.
    pub fn clip_pop(&mut self) {
        let rect = self.clips.pop();
        self.set_hw_clip(rect);
    }

    /// Applies `rect` to the device scissor through the real transform and
    /// the orientation mapping.
    pub(super) fn set_hw_clip(&mut self, rect: Rect) {
        self.prepare_real_matrix();
        self.clips.set(rect);

        if rect.is_no_clip() {
            self.verify("set_scissor", |d| d.set_scissor(None));
            return;
        }

        let (surface_w, surface_h) = self.surface_size();
        let physical = self.real.apply_rect_outward(rect);
        let mapped = map_rect_to_viewport(
            physical,
            self.orientation,
            surface_w as f32,
            surface_h as f32,
        );
        let mapped = viewport_rect_to_scissor(mapped, self.orientation, surface_h as f32);
        let scissor = ScissorRect::new(
            mapped.x as i32,
            mapped.y as i32,
            mapped.width as i32,
            mapped.height as i32,
        );
        self.verify("set_scissor", |d| d.set_scissor(Some(scissor)));
    }

    // ── scoped helpers ────────────────────────────────────────────────────

    /// Runs `f` with the clip narrowed to `rect`, restoring it afterwards.
    pub fn with_clip<R>(&mut self, rect: Rect, f: impl FnOnce(&mut Self) -> R) -> R {
        self.clip_push();
        self.clip_rect(rect);
        let out = f(self);
        self.clip_pop();
        out
    }

    pub fn with_draw_matrix<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.push_draw_matrix();
        let out = f(self);
        self.pop_draw_matrix();
        out
    }

    pub fn with_mapping_matrix<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.push_mapping_matrix();
        let out = f(self);
        self.pop_mapping_matrix();
        out
    }
}
