use crate::coords::{Rect, Viewport};

use super::super::matrix::{self, MatrixSlot};
use super::super::orientation::{orientation_matrix, RenderOrientation};
use super::super::target::{RenderTarget, RenderTargetEntry};
use super::super::transform::DrawTransform;
use super::RenderManager;

impl RenderManager {
    /// Redirects output to `target` (`None` is the default framebuffer).
    ///
    /// Saves the current target, clip and both transforms; the draw transform
    /// starts from identity. Undo with [`Self::restore_render_target`].
    pub fn set_render_target(&mut self, target: Option<RenderTarget>) {
        self.targets.push(RenderTargetEntry {
            target: self.current_target,
            orientation: self.orientation,
        });

        self.clip_push();
        self.push_draw_matrix();
        self.push_mapping_matrix();
        self.identity_draw_matrix();
        self.bind_render_target(target, self.orientation);
    }

    /// Rebinds the target saved by the matching [`Self::set_render_target`]
    /// and restores the transforms and clip saved with it.
    pub fn restore_render_target(&mut self) {
        debug_assert!(!self.targets.is_empty(), "render target stack underflow");
        let Some(entry) = self.targets.pop() else {
            log::error!("restore_render_target on an empty stack");
            return;
        };

        self.bind_render_target(entry.target, entry.orientation);
        self.pop_draw_matrix();
        self.pop_mapping_matrix();
        self.clip_pop();
    }

    pub fn is_render_target(&self) -> bool {
        self.current_target.is_some()
    }

    pub fn render_target(&self) -> Option<RenderTarget> {
        self.current_target
    }

    /// Saved entries under the current target.
    pub fn render_target_depth(&self) -> usize {
        self.targets.len()
    }

    pub fn with_render_target<R>(
        &mut self,
        target: RenderTarget,
        f: impl FnOnce(&mut Self) -> R,
    ) -> R {
        self.set_render_target(Some(target));
        let out = f(self);
        self.restore_render_target();
        out
    }

    /// Binds `target` on the device and rebuilds viewport, projection and
    /// view mapping for it. Clipping is removed.
    ///
    /// Offscreen targets are always portrait with an identity mapping; the
    /// default framebuffer uses `orientation` and the virtual view mapping.
    pub(super) fn bind_render_target(
        &mut self,
        target: Option<RenderTarget>,
        orientation: RenderOrientation,
    ) {
        if self.debug && target != self.current_target {
            log::debug!(
                "render target {:?} -> {:?}",
                self.current_target.map(|t| t.handle.raw()),
                target.map(|t| t.handle.raw())
            );
        }

        self.current_target = target;
        self.verify("bind_render_target", |d| d.bind_render_target(target.map(|t| t.handle)));

        match target {
            Some(t) => {
                self.orientation = RenderOrientation::Portrait;
                self.verify("set_viewport", |d| d.set_viewport(Viewport::full(t.width, t.height)));
                let projection = matrix::ortho(t.width as f32, t.height as f32);
                self.matrices.set_matrix(MatrixSlot::Projection, projection);
                self.mapping.set(DrawTransform::identity());
            }
            None => {
                self.orientation = orientation;
                let (fb_w, fb_h) = (self.framebuffer_width, self.framebuffer_height);
                self.verify("set_viewport", |d| d.set_viewport(Viewport::full(fb_w, fb_h)));

                let projection = orientation_matrix(orientation, fb_w as f32, fb_h as f32)
                    * matrix::ortho(fb_w as f32, fb_h as f32);
                self.matrices.set_matrix(MatrixSlot::Projection, projection);

                self.mapping.set(DrawTransform::identity());
                self.set_physical_view_offset();
                self.set_virtual_view_scale();
                self.set_virtual_view_offset();
            }
        }

        self.set_hw_clip(Rect::no_clip());
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::super::test_support::*;
    use super::*;
    use crate::coords::Vec2;
    use crate::core::ScreenGeometry;
    use crate::device::{DeviceCall, TargetHandle};

    fn offscreen() -> RenderTarget {
        RenderTarget::new(TargetHandle(9), 64, 32)
    }

    #[derive(Debug, PartialEq)]
    struct Snapshot {
        target: Option<RenderTarget>,
        orientation: RenderOrientation,
        clip: Rect,
        draw: DrawTransform,
        mapping: DrawTransform,
        clip_depth: usize,
        draw_depth: usize,
        mapping_depth: usize,
    }

    fn snapshot(m: &RenderManager) -> Snapshot {
        Snapshot {
            target: m.render_target(),
            orientation: m.render_orientation(),
            clip: m.clip(),
            draw: m.draw_matrix(),
            mapping: m.mapping_matrix(),
            clip_depth: m.clips.depth(),
            draw_depth: m.user.depth(),
            mapping_depth: m.mapping.depth(),
        }
    }

    // ── save / restore ────────────────────────────────────────────────────

    #[test]
    fn set_then_restore_is_symmetric() {
        let (mut manager, _) = manager();
        manager.set_screen_metrics(Arc::new(ScreenGeometry {
            virtual_to_physical: 1.5,
            virtual_min: Vec2::zero(),
            physical_offset: Vec2::new(2.0, 0.0),
        }));
        manager.set_render_orientation(RenderOrientation::LandscapeRight);
        manager.translate(Vec2::new(7.0, 3.0));
        manager.scale(Vec2::new(2.0, 0.5));
        manager.set_clip(Rect::new(1.0, 1.0, 100.0, 100.0));
        let before = snapshot(&manager);

        manager.set_render_target(Some(offscreen()));
        assert!(manager.is_render_target());
        assert_eq!(manager.render_orientation(), RenderOrientation::Portrait);
        assert!(manager.draw_matrix().is_identity());
        assert!(manager.mapping_matrix().is_identity());
        assert_eq!(manager.clip(), Rect::no_clip());

        manager.restore_render_target();
        assert_eq!(snapshot(&manager), before);
    }

    #[test]
    fn nested_targets_unwind_in_order() {
        let (mut manager, journal) = manager();
        let second = RenderTarget::new(TargetHandle(10), 16, 16);

        manager.with_render_target(offscreen(), |m| {
            m.with_render_target(second, |m| {
                assert_eq!(m.render_target(), Some(second));
                assert_eq!(m.render_target_depth(), 2);
            });
            assert_eq!(m.render_target(), Some(offscreen()));
        });

        assert_eq!(manager.render_target(), None);
        let binds: Vec<_> = journal
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                DeviceCall::BindRenderTarget(t) => Some(t),
                _ => None,
            })
            .collect();
        assert_eq!(
            binds,
            vec![Some(TargetHandle(9)), Some(TargetHandle(10)), Some(TargetHandle(9)), None]
        );
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "render target stack underflow")]
    fn restore_underflow_asserts() {
        let (mut manager, _) = manager();
        manager.restore_render_target();
    }

    // ── binding ───────────────────────────────────────────────────────────

    #[test]
    fn offscreen_binding_sets_viewport_and_projection() {
        let (mut manager, journal) = manager();
        manager.set_render_target(Some(offscreen()));

        assert!(journal.calls().contains(&DeviceCall::SetViewport(Viewport::full(64, 32))));
        assert_eq!(*manager.matrices.matrix(MatrixSlot::Projection), matrix::ortho(64.0, 32.0));
        assert_eq!((manager.screen_width(), manager.screen_height()), (64, 32));
        assert_eq!(journal.last(), Some(DeviceCall::SetScissor(None)));
    }

    #[test]
    fn default_framebuffer_uses_virtual_mapping() {
        let (mut manager, _) = manager();
        manager.set_screen_metrics(Arc::new(ScreenGeometry {
            virtual_to_physical: 2.0,
            virtual_min: Vec2::new(1.0, 0.0),
            physical_offset: Vec2::new(0.0, 10.0),
        }));
        manager.bind_render_target(None, RenderOrientation::Portrait);

        assert_eq!(
            manager.mapping_matrix(),
            DrawTransform::new(Vec2::new(-2.0, 10.0), Vec2::new(2.0, 2.0))
        );
    }

    #[test]
    fn landscape_projection_lands_inside_clip_space() {
        let (mut manager, _) = manager();
        manager.set_render_orientation(RenderOrientation::LandscapeLeft);
        let projection = *manager.matrices.matrix(MatrixSlot::Projection);

        // Logical landscape corners (HEIGHT x WIDTH) stay within [-1, 1].
        let corners = [
            (0.0, 0.0),
            (HEIGHT as f32, 0.0),
            (0.0, WIDTH as f32),
            (HEIGHT as f32, WIDTH as f32),
        ];
        for (x, y) in corners {
            let v = glam::Vec4::new(x, y, 0.0, 1.0);
            let clip = projection.transpose() * v;
            assert!(clip.x.abs() <= 1.0 + 1e-5 && clip.y.abs() <= 1.0 + 1e-5, "{clip:?}");
        }
    }
}
