use crate::coords::ColorRgba;
use crate::device::MAX_TEXTURE_UNITS;
use crate::logging::log_stats;

use super::super::transform::DrawTransform;
use super::RenderManager;

impl RenderManager {
    /// Starts a frame on the default framebuffer.
    ///
    /// Holds the render lock until [`Self::end_frame`], so worker threads
    /// using [`Self::lock_non_main`] wait for the frame to finish.
    pub fn begin_frame(&mut self) {
        if self.inside_draw {
            log::warn!("begin_frame called inside a frame");
            return;
        }

        self.frame_guard = Some(self.lock.lock());
        self.inside_draw = true;

        self.stats.clear();
        self.matrices.clear_uniform_matrices();
        self.identity_total_matrix();
        self.applied_real = None;

        let clear = self.clear_color;
        self.verify("begin_frame", |d| d.begin_frame(clear));
        self.bind_render_target(None, self.screen_orientation);
    }

    pub fn end_frame(&mut self) {
        if !self.inside_draw {
            log::warn!("end_frame called outside a frame");
            return;
        }

        self.check_stack_balance();
        self.process_stats();
        self.verify("end_frame", |d| d.end_frame());

        self.inside_draw = false;
        self.frame_index += 1;
        self.frame_guard = None;
    }

    pub fn is_inside_draw(&self) -> bool {
        self.inside_draw
    }

    /// Frames completed since creation.
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    pub fn set_clear_color(&mut self, color: ColorRgba) {
        self.clear_color = color;
    }

    // ── stats ─────────────────────────────────────────────────────────────

    /// Dumps draw statistics every `frames` frames; `None` turns it off.
    pub fn enable_output_debug_stats_every_n_frames(&mut self, frames: Option<u32>) {
        self.stats_every = frames;
        self.stats_frames = 0;
    }

    /// Counts a frame and logs the stats when the configured interval is
    /// reached. Called by [`Self::end_frame`].
    pub fn process_stats(&mut self) {
        let Some(every) = self.stats_every else {
            return;
        };
        self.stats_frames += 1;
        if self.stats_frames >= every {
            self.stats_frames = 0;
            log_stats(self.frame_index, &self.stats);
        }
    }

    // ── reset ─────────────────────────────────────────────────────────────

    /// Forgets the applied device state and returns to defaults: white
    /// color, no textures, no effect, default framebuffer, no clip and
    /// identity transforms.
    pub fn reset(&mut self) {
        self.cache.invalidate_all();
        self.reset_color();
        self.state.textures = [None; MAX_TEXTURE_UNITS];
        self.effect = None;

        self.user.reset();
        self.real = DrawTransform::identity();
        self.applied_real = None;

        self.bind_render_target(None, self.screen_orientation);
    }

    /// All scoped stacks are back at their base level.
    pub fn stacks_balanced(&self) -> bool {
        self.clips.depth() == 0
            && self.user.depth() == 0
            && self.mapping.depth() == 0
            && self.targets.is_empty()
    }

    fn check_stack_balance(&self) {
        let balanced = self.stacks_balanced();
        if !balanced {
            log::warn!(
                "unbalanced stacks after frame {}: clip {}, draw {}, mapping {}, target {}",
                self.frame_index,
                self.clips.depth(),
                self.user.depth(),
                self.mapping.depth(),
                self.targets.len()
            );
        }
        debug_assert!(balanced, "unbalanced render stacks at end of frame");
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::super::test_support::*;
    use super::*;
    use crate::coords::{Rect, Vec2};
    use crate::device::{DeviceCall, PrimitiveType, TextureHandle};

    // ── lifecycle ─────────────────────────────────────────────────────────

    #[test]
    fn frame_clears_stats_and_holds_the_lock() {
        let (mut manager, journal) = manager();
        let flat = manager.builtin_effects().unwrap().flat_color.clone();
        manager.set_render_effect(Some(flat));

        manager.begin_frame();
        assert!(manager.is_inside_draw());
        assert!(manager.render_lock().is_locked());
        manager.draw_arrays(PrimitiveType::TriangleList, 0, 6);
        assert_eq!(manager.stats().draw_arrays_calls, 1);
        manager.end_frame();

        assert!(!manager.render_lock().is_locked());
        assert_eq!(manager.frame_index(), 1);
        assert_eq!(journal.last(), Some(DeviceCall::EndFrame));

        manager.begin_frame();
        assert_eq!(manager.stats().draw_calls(), 0);
        manager.end_frame();
    }

    #[test]
    fn worker_waits_for_the_frame() {
        let (mut manager, _) = manager();
        let lock = manager.render_lock();

        manager.begin_frame();
        let worker = thread::spawn(move || {
            let guard = lock.lock_non_main();
            guard.is_held()
        });
        thread::sleep(std::time::Duration::from_millis(20));
        assert!(!worker.is_finished());
        manager.end_frame();

        assert!(worker.join().unwrap());
    }

    #[test]
    fn begin_frame_resets_transforms() {
        let (mut manager, _) = manager();
        manager.translate(Vec2::new(4.0, 4.0));
        manager.begin_frame();
        assert!(manager.draw_matrix().is_identity());
        manager.end_frame();
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "unbalanced render stacks")]
    fn unbalanced_frame_asserts() {
        let (mut manager, _) = manager();
        manager.begin_frame();
        manager.clip_push();
        manager.end_frame();
    }

    // ── stats ─────────────────────────────────────────────────────────────

    #[test]
    fn stats_interval_counts_frames() {
        let (mut manager, _) = manager();
        manager.enable_output_debug_stats_every_n_frames(Some(3));
        for expected in [1, 2, 0, 1] {
            manager.begin_frame();
            manager.end_frame();
            assert_eq!(manager.stats_frames, expected);
        }

        manager.enable_output_debug_stats_every_n_frames(None);
        manager.process_stats();
        assert_eq!(manager.stats_frames, 0);
    }

    #[test]
    fn changing_the_stats_interval_restarts_the_count() {
        let (mut manager, _) = manager();
        manager.enable_output_debug_stats_every_n_frames(Some(5));
        manager.process_stats();
        manager.process_stats();
        assert_eq!(manager.stats_frames, 2);

        manager.enable_output_debug_stats_every_n_frames(Some(1));
        assert_eq!(manager.stats_frames, 0);
        manager.process_stats();
        assert_eq!(manager.stats_frames, 0);
    }

    // ── reset ─────────────────────────────────────────────────────────────

    #[test]
    fn reset_reapplies_full_state() {
        let (mut manager, journal) = manager();
        manager.set_texture(0, Some(TextureHandle(2)));
        manager.set_color_rgba(ColorRgba::black());
        manager.flush_state();
        let flat = manager.builtin_effects().unwrap().flat_color.clone();
        manager.set_render_effect(Some(flat));
        manager.set_clip(Rect::new(1.0, 2.0, 3.0, 4.0));

        manager.reset();
        assert!(manager.render_effect().is_none());
        assert_eq!(manager.color(), ColorRgba::white());
        assert_eq!(manager.texture(0), None);
        assert_eq!(manager.clip(), Rect::no_clip());

        journal.clear();
        manager.flush_state();
        assert!(journal.calls().contains(&DeviceCall::SetColor(ColorRgba::white())));
        assert!(journal.calls().contains(&DeviceCall::ActivateTextureUnit(0)));
    }
}
