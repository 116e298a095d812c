//! Render effects: draw strategies bound to the manager.
//!
//! An effect requests the shader and state it needs, then draws through an
//! [`EffectCtx`], which flushes the state cache, uploads the model-view-projection
//! matrix and updates the frame statistics.

mod builtin;

use crate::device::{verify, Device, IndexFormat, IndexSource, PrimitiveType, Stats};

use super::matrix::{MatrixCache, UniformMatrixSlot};
use super::state::{RenderState, StateCache};

pub use builtin::{
    BuiltinEffects, FlatColorEffect, TextureMulColorAlphaTestEffect, TextureMulColorEffect,
};

/// Draw strategy owned by the manager (see `RenderManager::set_render_effect`).
pub trait RenderEffect: Send + Sync {
    fn name(&self) -> &str;

    /// Requests the shader and state this effect draws with.
    fn prepare(&self, cx: &mut EffectCtx<'_>);

    fn draw_arrays(
        &self,
        cx: &mut EffectCtx<'_>,
        primitive: PrimitiveType,
        first: u32,
        count: u32,
    ) {
        self.prepare(cx);
        cx.draw_arrays(primitive, first, count);
    }

    fn draw_elements(
        &self,
        cx: &mut EffectCtx<'_>,
        primitive: PrimitiveType,
        count: u32,
        format: IndexFormat,
        indices: IndexSource<'_>,
    ) {
        self.prepare(cx);
        cx.draw_elements(primitive, count, format, indices);
    }
}

/// Borrowed view of the manager handed to an effect for one draw.
pub struct EffectCtx<'a> {
    pub(crate) state: &'a mut RenderState,
    pub(crate) cache: &'a mut StateCache,
    pub(crate) device: &'a mut dyn Device,
    pub(crate) matrices: &'a mut MatrixCache,
    pub(crate) stats: &'a mut Stats,
    pub(crate) texture_units: usize,
    pub(crate) debug: bool,
}

impl EffectCtx<'_> {
    pub fn state(&self) -> &RenderState {
        self.state
    }

    /// Requested state; changes reach the device at the next flush.
    pub fn state_mut(&mut self) -> &mut RenderState {
        self.state
    }

    pub fn flush(&mut self) {
        self.cache.flush(self.state, &mut *self.device, self.texture_units, self.debug);
    }

    fn upload_mvp(&mut self) {
        let mvp = *self.matrices.uniform_matrix(UniformMatrixSlot::ModelViewProjection);
        verify("set_uniform_matrix", self.device.set_uniform_matrix(&mvp));
    }

    pub fn draw_arrays(&mut self, primitive: PrimitiveType, first: u32, count: u32) {
        self.flush();
        self.upload_mvp();
        if verify("draw_arrays", self.device.draw_arrays(primitive, first, count)) {
            self.stats.record_arrays(primitive, count);
        }
    }

    pub fn draw_elements(
        &mut self,
        primitive: PrimitiveType,
        count: u32,
        format: IndexFormat,
        indices: IndexSource<'_>,
    ) {
        self.flush();
        self.upload_mvp();
        if verify(
            "draw_elements",
            self.device.draw_elements(primitive, count, format, indices),
        ) {
            self.stats.record_elements(primitive, count);
        }
    }
}
