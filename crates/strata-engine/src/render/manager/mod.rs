//! The render manager: the single entry point drawing code talks to.
//!
//! Operations are grouped by concern:
//! - `state_ops`: requested device state (color, textures, toggles, shader)
//! - `transform_ops`: draw/mapping transforms, clip stack, hardware clip
//! - `target_ops`: render target stack and binding
//! - `draw`: effect dispatch
//! - `frame`: frame lifecycle, stats, reset

mod draw;
mod frame;
mod state_ops;
mod target_ops;
mod transform_ops;

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config::RenderConfig;
use crate::coords::ColorRgba;
use crate::core::{Cursor, ScreenGeometry, ScreenMetrics};
use crate::device::{verify, Caps, Device, DeviceResult, RendererKind, Stats};
use crate::sync::{NonMainGuard, RenderLock, RenderLockGuard};

use super::clip::ClipStack;
use super::effect::{BuiltinEffects, EffectCtx, RenderEffect};
use super::matrix::MatrixCache;
use super::orientation::RenderOrientation;
use super::shader::Shader;
use super::state::{RenderState, StateCache};
use super::target::{RenderTarget, RenderTargetEntry};
use super::transform::{DrawTransform, TransformStack};

/// Owns the device and every piece of render state in front of it.
///
/// Construct one per device context; share it by reference with drawing code.
/// Worker threads serialize through [`RenderManager::render_lock`].
pub struct RenderManager {
    device: Box<dyn Device>,
    caps: Caps,
    metrics: Arc<dyn ScreenMetrics>,
    lock: RenderLock,
    frame_guard: Option<RenderLockGuard>,

    state: RenderState,
    cache: StateCache,
    matrices: MatrixCache,
    stats: Stats,

    user: TransformStack,
    mapping: TransformStack,
    real: DrawTransform,
    applied_real: Option<DrawTransform>,

    clips: ClipStack,
    targets: Vec<RenderTargetEntry>,
    current_target: Option<RenderTarget>,
    orientation: RenderOrientation,
    screen_orientation: RenderOrientation,
    framebuffer_width: u32,
    framebuffer_height: u32,

    effect: Option<Arc<dyn RenderEffect>>,
    builtin: Option<BuiltinEffects>,
    shader: Option<Arc<Shader>>,
    cursor: Option<Arc<dyn Cursor>>,

    clear_color: ColorRgba,
    fps: u32,
    debug: bool,
    stats_every: Option<u32>,
    stats_frames: u32,
    frame_index: u64,
    inside_draw: bool,
}

impl RenderManager {
    /// Creates a manager over an existing device.
    ///
    /// Call [`RenderManager::init`] before drawing with the built-in effects.
    pub fn new(device: Box<dyn Device>, config: &RenderConfig) -> Self {
        let caps = device.caps();
        log::debug!(
            "render manager created for {:?} ({}x{})",
            device.kind(),
            config.framebuffer_width,
            config.framebuffer_height
        );

        Self {
            device,
            caps,
            metrics: Arc::new(ScreenGeometry::identity()),
            lock: RenderLock::new(),
            frame_guard: None,
            state: RenderState::default(),
            cache: StateCache::default(),
            matrices: MatrixCache::new(),
            stats: Stats::default(),
            user: TransformStack::default(),
            mapping: TransformStack::default(),
            real: DrawTransform::identity(),
            applied_real: None,
            clips: ClipStack::default(),
            targets: Vec::new(),
            current_target: None,
            orientation: config.orientation,
            screen_orientation: config.orientation,
            framebuffer_width: config.framebuffer_width,
            framebuffer_height: config.framebuffer_height,
            effect: None,
            builtin: None,
            shader: None,
            cursor: None,
            clear_color: config.clear_color,
            fps: config.fps,
            debug: config.debug,
            stats_every: config.stats_every_n_frames,
            stats_frames: 0,
            frame_index: 0,
            inside_draw: false,
        }
    }

    /// Creates the backend selected by `kind` and a manager over it.
    pub fn with_renderer(kind: RendererKind, config: &RenderConfig) -> Result<Self> {
        let device = crate::device::create_device(kind, config)?;
        let mut manager = Self::new(device, config);
        manager.init()?;
        Ok(manager)
    }

    /// Creates the built-in effects and binds the default framebuffer.
    pub fn init(&mut self) -> Result<()> {
        if self.builtin.is_none() {
            let effects = BuiltinEffects::create(self.device.as_mut())
                .context("failed to create built-in effects")?;
            self.builtin = Some(effects);
        }
        log::debug!(
            "render manager init: {}x{} {:?}",
            self.framebuffer_width,
            self.framebuffer_height,
            self.orientation
        );
        self.bind_render_target(None, self.screen_orientation);
        Ok(())
    }

    /// Replaces the screen geometry read by the view-mapping helpers.
    pub fn set_screen_metrics(&mut self, metrics: Arc<dyn ScreenMetrics>) {
        self.metrics = metrics;
    }

    // ── accessors ─────────────────────────────────────────────────────────

    pub fn renderer(&self) -> RendererKind {
        self.device.kind()
    }

    pub fn caps(&self) -> &Caps {
        &self.caps
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn builtin_effects(&self) -> Option<&BuiltinEffects> {
        self.builtin.as_ref()
    }

    /// Direct access to the backend, for resource creation.
    pub fn device_mut(&mut self) -> &mut dyn Device {
        self.device.as_mut()
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    pub fn set_fps(&mut self, fps: u32) {
        self.fps = fps;
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn render_orientation(&self) -> RenderOrientation {
        self.orientation
    }

    /// Orientation of the default framebuffer; offscreen targets are always portrait.
    ///
    /// While an offscreen target is bound the change takes effect the next
    /// time a frame begins.
    pub fn set_render_orientation(&mut self, orientation: RenderOrientation) {
        self.screen_orientation = orientation;
        if self.current_target.is_none() {
            self.bind_render_target(None, orientation);
        }
    }

    pub fn framebuffer_size(&self) -> (u32, u32) {
        (self.framebuffer_width, self.framebuffer_height)
    }

    /// Logical width of the current render surface.
    pub fn screen_width(&self) -> u32 {
        self.screen_size().0
    }

    pub fn screen_height(&self) -> u32 {
        self.screen_size().1
    }

    fn screen_size(&self) -> (u32, u32) {
        match self.current_target {
            Some(t) => (t.width, t.height),
            None if self.orientation.is_landscape() => {
                (self.framebuffer_height, self.framebuffer_width)
            }
            None => (self.framebuffer_width, self.framebuffer_height),
        }
    }

    /// Physical size of the surface output currently goes to.
    fn surface_size(&self) -> (u32, u32) {
        match self.current_target {
            Some(t) => (t.width, t.height),
            None => (self.framebuffer_width, self.framebuffer_height),
        }
    }

    pub fn resize_framebuffer(&mut self, width: u32, height: u32) {
        self.framebuffer_width = width;
        self.framebuffer_height = height;
        self.verify("resize_framebuffer", |d| d.resize_framebuffer(width, height));
        if self.current_target.is_none() {
            self.bind_render_target(None, self.screen_orientation);
        }
    }

    // ── cursor ────────────────────────────────────────────────────────────

    /// Takes a reference to `cursor`, releasing the previous one.
    ///
    /// The cursor is made current only on devices with a hardware cursor.
    pub fn set_cursor(&mut self, cursor: Option<Arc<dyn Cursor>>) {
        self.cursor = cursor;
        if !self.caps.hardware_cursor {
            return;
        }
        if let Some(cursor) = &self.cursor {
            cursor.apply();
        }
    }

    pub fn cursor(&self) -> Option<&Arc<dyn Cursor>> {
        self.cursor.as_ref()
    }

    // ── concurrency ───────────────────────────────────────────────────────

    /// Handle to the lock guarding this manager's state, for worker threads.
    pub fn render_lock(&self) -> RenderLock {
        self.lock.clone()
    }

    pub fn lock(&self) -> RenderLockGuard {
        self.lock.lock()
    }

    pub fn lock_non_main(&self) -> NonMainGuard {
        self.lock.lock_non_main()
    }

    pub fn non_main_lock_count(&self) -> usize {
        self.lock.non_main_lock_count()
    }

    // ── internals ─────────────────────────────────────────────────────────

    /// Runs one device call and logs its failure.
    fn verify(&mut self, op: &str, call: impl FnOnce(&mut dyn Device) -> DeviceResult) -> bool {
        verify(op, call(self.device.as_mut()))
    }

    fn effect_ctx(&mut self) -> EffectCtx<'_> {
        EffectCtx {
            state: &mut self.state,
            cache: &mut self.cache,
            device: self.device.as_mut(),
            matrices: &mut self.matrices,
            stats: &mut self.stats,
            texture_units: self.caps.max_texture_units,
            debug: self.debug,
        }
    }
}

impl Drop for RenderManager {
    fn drop(&mut self) {
        self.effect = None;
        self.shader = None;
        self.cursor = None;
        log::debug!("render manager released");
    }
}
