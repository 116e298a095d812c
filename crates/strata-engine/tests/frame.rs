use std::sync::Arc;
use std::thread;

use strata_engine::coords::{ColorRgba, Rect, ScissorRect, Vec2};
use strata_engine::core::ScreenGeometry;
use strata_engine::device::{
    DeviceCall, IndexFormat, IndexSource, Journal, PrimitiveType, RecordingDevice, TargetHandle,
    TextureHandle, VertexFormat,
};
use strata_engine::render::{map_rect_to_viewport, RenderOrientation, RenderTarget};
use strata_engine::{RenderConfig, RenderManager};

fn manager_with(config: &RenderConfig) -> (RenderManager, Journal) {
    let device = RecordingDevice::new();
    let journal = device.journal();
    let mut manager = RenderManager::new(Box::new(device), config);
    manager.init().unwrap();
    (manager, journal)
}

fn config() -> RenderConfig {
    RenderConfig {
        framebuffer_width: 800,
        framebuffer_height: 600,
        ..RenderConfig::default()
    }
}

fn count(journal: &Journal, pred: impl Fn(&DeviceCall) -> bool) -> usize {
    journal.count(pred)
}

// ── full frame ────────────────────────────────────────────────────────────

#[test]
fn frame_with_target_clip_and_draws() {
    let (mut manager, journal) = manager_with(&config());
    let effects = manager.builtin_effects().cloned().unwrap();
    let data = manager
        .device_mut()
        .create_render_data(VertexFormat::POSITION_TEXCOORD, &[0; 80], None)
        .unwrap();
    let texture = manager.device_mut().create_texture(1, 1, &[255; 4]).unwrap();
    let handle = manager.device_mut().create_render_target(64, 64).unwrap();
    let target = RenderTarget::new(handle, 64, 64);
    journal.clear();

    manager.begin_frame();

    manager.with_render_target(target, |m| {
        m.set_render_effect(Some(effects.flat_color.clone()));
        m.set_render_data(Some(data));
        m.draw_arrays(PrimitiveType::TriangleStrip, 0, 4);
    });

    manager.with_clip(Rect::new(10.0, 10.0, 100.0, 50.0), |m| {
        m.set_render_effect(Some(effects.texture_mul_color.clone()));
        m.set_texture(0, Some(texture));
        m.draw_arrays(PrimitiveType::TriangleStrip, 0, 4);
        m.draw_arrays(PrimitiveType::TriangleStrip, 0, 4);
    });

    assert!(manager.stacks_balanced());
    assert_eq!(manager.stats().draw_arrays_calls, 3);
    assert_eq!(manager.stats().primitives(PrimitiveType::TriangleStrip), 6);
    manager.end_frame();

    let calls = journal.calls();
    assert_eq!(calls.first(), Some(&DeviceCall::BeginFrame(ColorRgba::black())));
    assert_eq!(calls.last(), Some(&DeviceCall::EndFrame));
    assert_eq!(count(&journal, |c| matches!(c, DeviceCall::DrawArrays { .. })), 3);
    assert_eq!(count(&journal, |c| matches!(c, DeviceCall::BindTexture(0, _))), 1);
    assert!(calls.contains(&DeviceCall::SetScissor(Some(ScissorRect::new(10, 10, 100, 50)))));
    assert_eq!(manager.render_target(), None);
}

#[test]
fn indexed_draw_from_client_memory() {
    let (mut manager, journal) = manager_with(&config());
    let effects = manager.builtin_effects().cloned().unwrap();
    manager.set_render_effect(Some(effects.flat_color));

    let indices: Vec<u8> = [0u16, 1, 2, 2, 1, 3].iter().flat_map(|i| i.to_le_bytes()).collect();
    manager.begin_frame();
    manager.draw_elements(
        PrimitiveType::TriangleList,
        6,
        IndexFormat::U16,
        IndexSource::Client(&indices),
    );
    manager.end_frame();

    let client_draws = count(&journal, |c| {
        matches!(c, DeviceCall::DrawElements { client_indices: true, count: 6, .. })
    });
    assert_eq!(client_draws, 1);
}

// ── state cache ───────────────────────────────────────────────────────────

#[test]
fn repeated_texture_requests_bind_once() {
    let (mut manager, journal) = manager_with(&config());
    let texture = TextureHandle(3);

    for _ in 0..5 {
        manager.set_texture(0, Some(texture));
        manager.flush_state();
    }
    assert_eq!(count(&journal, |c| *c == DeviceCall::BindTexture(0, texture)), 1);
}

// ── stacks ────────────────────────────────────────────────────────────────

#[test]
fn render_target_round_trip_restores_everything() {
    let (mut manager, _) = manager_with(&config());
    manager.set_screen_metrics(Arc::new(ScreenGeometry::fitted(
        Vec2::new(400.0, 300.0),
        Vec2::new(800.0, 600.0),
    )));
    manager.set_render_orientation(RenderOrientation::LandscapeLeft);
    manager.translate(Vec2::new(12.0, 8.0));
    manager.set_clip(Rect::new(0.0, 0.0, 30.0, 30.0));

    let draw = manager.draw_matrix();
    let mapping = manager.mapping_matrix();
    let clip = manager.clip();

    manager.set_render_target(Some(RenderTarget::new(TargetHandle(1), 32, 32)));
    manager.translate(Vec2::new(100.0, 100.0));
    manager.clip_rect(Rect::new(1.0, 1.0, 2.0, 2.0));
    manager.restore_render_target();

    assert_eq!(manager.draw_matrix(), draw);
    assert_eq!(manager.mapping_matrix(), mapping);
    assert_eq!(manager.clip(), clip);
    assert_eq!(manager.render_orientation(), RenderOrientation::LandscapeLeft);
    assert!(!manager.is_render_target());
}

#[test]
fn empty_clip_pop_means_no_clip() {
    let (mut manager, _) = manager_with(&config());
    manager.clip_rect(Rect::new(5.0, 5.0, 5.0, 5.0));
    manager.clip_pop();
    assert_eq!(manager.clip(), Rect::new(0.0, 0.0, -1.0, -1.0));
}

// ── orientation ───────────────────────────────────────────────────────────

#[test]
fn landscape_variants_map_identically() {
    let rect = Rect::new(12.0, 34.0, 56.0, 78.0);
    let left = map_rect_to_viewport(rect, RenderOrientation::LandscapeLeft, 800.0, 600.0);
    let right = map_rect_to_viewport(rect, RenderOrientation::LandscapeRight, 800.0, 600.0);
    assert_eq!(left, right);
    assert_eq!(left, Rect::new(800.0 - 112.0, 600.0 - 12.0, 78.0, 56.0));
}

// ── concurrency ───────────────────────────────────────────────────────────

#[test]
fn worker_locks_serialize_with_frames() {
    let (mut manager, _) = manager_with(&config());
    let lock = manager.render_lock();

    let worker = thread::spawn(move || {
        let outer = lock.lock_non_main();
        let inner = lock.lock_non_main();
        let depth = lock.non_main_lock_count();
        drop(inner);
        drop(outer);
        (depth, lock.non_main_lock_count())
    });
    assert_eq!(worker.join().unwrap(), (2, 0));

    let acquired = manager.render_lock().acquisitions();
    let _guard = manager.lock_non_main();
    assert_eq!(manager.non_main_lock_count(), 0);
    assert_eq!(manager.render_lock().acquisitions(), acquired);

    manager.begin_frame();
    manager.end_frame();
}
