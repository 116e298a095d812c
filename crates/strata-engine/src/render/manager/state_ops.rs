use std::sync::Arc;

use crate::coords::ColorRgba;
use crate::device::{
    BlendFactor, CompareFunc, CullFace, RenderDataHandle, TextureHandle, VertexStream,
};

use super::super::shader::Shader;
use super::super::state::RenderState;
use super::RenderManager;

/// Requested-state setters. None of these touch the device; the next flush
/// (explicit or inside a draw) reconciles them.
impl RenderManager {
    pub fn state(&self) -> &RenderState {
        &self.state
    }

    // ── color ─────────────────────────────────────────────────────────────

    pub fn set_color(&mut self, r: f32, g: f32, b: f32, a: f32) {
        self.state.color = ColorRgba::new(r, g, b, a);
    }

    pub fn set_color_rgba(&mut self, color: ColorRgba) {
        self.state.color = color;
    }

    pub fn color(&self) -> ColorRgba {
        self.state.color
    }

    /// Back to opaque white.
    pub fn reset_color(&mut self) {
        self.state.color = ColorRgba::white();
    }

    // ── blending ──────────────────────────────────────────────────────────

    pub fn set_blend_mode(&mut self, src: BlendFactor, dst: BlendFactor) {
        self.state.blend_src = src;
        self.state.blend_dst = dst;
    }

    pub fn blend_mode(&self) -> (BlendFactor, BlendFactor) {
        (self.state.blend_src, self.state.blend_dst)
    }

    pub fn enable_blending(&mut self, enabled: bool) {
        self.state.blending = enabled;
    }

    // ── textures ──────────────────────────────────────────────────────────

    /// Requests `texture` on `unit`.
    ///
    /// # Panics
    /// If `unit` is not below the device's texture unit count.
    pub fn set_texture(&mut self, unit: usize, texture: Option<TextureHandle>) {
        assert!(
            unit < self.caps.max_texture_units,
            "texture unit {unit} out of range (device has {})",
            self.caps.max_texture_units
        );
        self.state.textures[unit] = texture;
    }

    /// Texture requested on `unit`.
    ///
    /// # Panics
    /// If `unit` is not below the device's texture unit count.
    pub fn texture(&self, unit: usize) -> Option<TextureHandle> {
        assert!(
            unit < self.caps.max_texture_units,
            "texture unit {unit} out of range (device has {})",
            self.caps.max_texture_units
        );
        self.state.textures[unit]
    }

    /// Texture the last flush left bound on `unit`.
    pub fn applied_texture(&self, unit: usize) -> Option<TextureHandle> {
        self.cache.applied_texture(unit)
    }

    pub fn enable_texturing(&mut self, enabled: bool) {
        self.state.texturing = enabled;
    }

    // ── vertex streams ────────────────────────────────────────────────────

    pub fn enable_vertex_array(&mut self, enabled: bool) {
        self.state.set_stream(VertexStream::Position, enabled);
    }

    pub fn enable_texcoord_array(&mut self, enabled: bool) {
        self.state.set_stream(VertexStream::TexCoord, enabled);
    }

    pub fn enable_color_array(&mut self, enabled: bool) {
        self.state.set_stream(VertexStream::Color, enabled);
    }

    // ── depth / alpha / culling ───────────────────────────────────────────

    pub fn enable_depth_test(&mut self, enabled: bool) {
        self.state.depth_test = enabled;
    }

    pub fn is_depth_test_enabled(&self) -> bool {
        self.state.depth_test
    }

    pub fn enable_depth_write(&mut self, enabled: bool) {
        self.state.depth_write = enabled;
    }

    pub fn is_depth_write_enabled(&self) -> bool {
        self.state.depth_write
    }

    pub fn enable_alpha_test(&mut self, enabled: bool) {
        self.state.alpha_test = enabled;
    }

    pub fn set_alpha_func(&mut self, func: CompareFunc, reference: f32) {
        self.state.alpha_func = func;
        self.state.alpha_ref = reference;
    }

    pub fn enable_culling(&mut self, enabled: bool) {
        self.state.culling = enabled;
    }

    pub fn set_cull_face(&mut self, face: CullFace) {
        self.state.cull_face = face;
    }

    // ── shader / vertex data ──────────────────────────────────────────────

    /// Takes a reference to `shader` and requests its program; the previous
    /// shader is released.
    pub fn set_shader(&mut self, shader: Option<Arc<Shader>>) {
        self.state.shader = shader.as_ref().map(|s| s.handle());
        self.shader = shader;
    }

    pub fn shader(&self) -> Option<&Arc<Shader>> {
        self.shader.as_ref()
    }

    pub fn set_render_data(&mut self, data: Option<RenderDataHandle>) {
        self.state.render_data = data;
    }

    // ── apply ─────────────────────────────────────────────────────────────

    /// Pushes every requested axis that differs from the applied one.
    pub fn flush_state(&mut self) {
        let units = self.caps.max_texture_units;
        self.cache.flush(&self.state, self.device.as_mut(), units, self.debug);
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::device::{Capability, DeviceCall, ShaderHandle};

    fn binds(journal: &crate::device::Journal) -> usize {
        journal.count(|c| matches!(c, DeviceCall::BindTexture(..)))
    }

    // ── diffing ───────────────────────────────────────────────────────────

    #[test]
    fn same_texture_twice_binds_once() {
        let (mut manager, journal) = manager();
        let tex = TextureHandle(7);

        manager.set_texture(0, Some(tex));
        manager.flush_state();
        assert_eq!(binds(&journal), 1);
        assert_eq!(manager.applied_texture(0), Some(tex));

        manager.set_texture(0, Some(tex));
        manager.flush_state();
        assert_eq!(binds(&journal), 1);
    }

    #[test]
    fn requests_do_not_touch_the_device() {
        let (mut manager, journal) = manager();
        manager.set_color(1.0, 0.0, 0.0, 1.0);
        manager.enable_blending(true);
        manager.set_blend_mode(BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha);
        manager.enable_culling(true);
        assert!(journal.is_empty());

        manager.flush_state();
        let red = ColorRgba::new(1.0, 0.0, 0.0, 1.0);
        assert!(journal.calls().contains(&DeviceCall::SetColor(red)));
        assert!(journal.calls().contains(&DeviceCall::SetCapability(Capability::Blend, true)));
    }

    #[test]
    fn clearing_a_non_zero_unit_disables_it() {
        let (mut manager, journal) = manager();
        manager.set_texture(1, Some(TextureHandle(3)));
        manager.flush_state();
        journal.clear();

        manager.set_texture(1, None);
        manager.flush_state();
        assert_eq!(journal.count(|c| *c == DeviceCall::SetUnitTexturing(1, false)), 1);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn texture_unit_out_of_range_fails_fast() {
        let (mut manager, _) = manager();
        manager.set_texture(crate::device::MAX_TEXTURE_UNITS, None);
    }

    // ── accessors ─────────────────────────────────────────────────────────

    #[test]
    fn reset_color_is_opaque_white() {
        let (mut manager, _) = manager();
        manager.set_color_rgba(ColorRgba::black());
        manager.reset_color();
        assert_eq!(manager.color(), ColorRgba::white());
    }

    #[test]
    fn shader_is_released_on_replace() {
        let (mut manager, _) = manager();
        let first = Arc::new(Shader::new("first", ShaderHandle(40)));
        manager.set_shader(Some(first.clone()));
        assert_eq!(manager.state().shader, Some(ShaderHandle(40)));
        assert_eq!(Arc::strong_count(&first), 2);

        manager.set_shader(None);
        assert_eq!(Arc::strong_count(&first), 1);
        assert_eq!(manager.state().shader, None);
    }

    #[test]
    fn depth_flags_read_back() {
        let (mut manager, _) = manager();
        manager.enable_depth_test(true);
        manager.enable_depth_write(true);
        assert!(manager.is_depth_test_enabled());
        assert!(manager.is_depth_write_enabled());
    }
}
