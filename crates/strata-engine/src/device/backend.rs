use glam::Mat4;

use crate::coords::{ColorRgba, ScissorRect, Viewport};

use super::caps::Caps;
use super::error::DeviceResult;
use super::types::{
    BlendFactor, BuiltinShader, Capability, CompareFunc, CullFace, IndexFormat, IndexSource,
    PrimitiveType, RenderDataHandle, RendererKind, ShaderHandle, TargetHandle, TextureHandle,
    VertexFormat, VertexStream,
};

/// Graphics device backend driven by the render manager.
///
/// Every state method is a direct device command: the backend never diffs,
/// the state cache in front of it does. Calls return a [`DeviceResult`] that
/// the manager logs without altering control flow.
pub trait Device: Send {
    fn kind(&self) -> RendererKind;

    /// Capabilities queried at creation time.
    fn caps(&self) -> Caps;

    // ── frame ─────────────────────────────────────────────────────────────

    /// Starts a frame on the default framebuffer, clearing it to `clear`.
    fn begin_frame(&mut self, clear: ColorRgba) -> DeviceResult;

    /// Finishes the frame and flushes pending work.
    fn end_frame(&mut self) -> DeviceResult;

    /// Reallocates the default framebuffer.
    fn resize_framebuffer(&mut self, width: u32, height: u32) -> DeviceResult;

    // ── fixed state ───────────────────────────────────────────────────────

    fn set_color(&mut self, color: ColorRgba) -> DeviceResult;
    fn set_blend_func(&mut self, src: BlendFactor, dst: BlendFactor) -> DeviceResult;
    fn set_capability(&mut self, cap: Capability, enabled: bool) -> DeviceResult;
    fn set_depth_write(&mut self, enabled: bool) -> DeviceResult;
    fn set_alpha_func(&mut self, func: CompareFunc, reference: f32) -> DeviceResult;
    fn set_cull_face(&mut self, face: CullFace) -> DeviceResult;
    fn set_vertex_stream(&mut self, stream: VertexStream, enabled: bool) -> DeviceResult;

    // ── textures ──────────────────────────────────────────────────────────

    fn activate_texture_unit(&mut self, unit: usize) -> DeviceResult;

    /// Toggles texturing on a unit other than 0 (unit 0 uses [`Capability::Texture2D`]).
    fn set_unit_texturing(&mut self, unit: usize, enabled: bool) -> DeviceResult;

    fn bind_texture(&mut self, unit: usize, texture: TextureHandle) -> DeviceResult;

    // ── programs and vertex data ──────────────────────────────────────────

    fn use_shader(&mut self, shader: Option<ShaderHandle>) -> DeviceResult;
    fn bind_render_data(&mut self, data: Option<RenderDataHandle>) -> DeviceResult;

    /// Uploads the model-view-projection matrix used by the next draw.
    fn set_uniform_matrix(&mut self, mvp: &Mat4) -> DeviceResult;

    // ── targets ───────────────────────────────────────────────────────────

    /// Redirects output; `None` is the default framebuffer.
    fn bind_render_target(&mut self, target: Option<TargetHandle>) -> DeviceResult;
    fn set_viewport(&mut self, viewport: Viewport) -> DeviceResult;

    /// Enables the scissor test with `Some`, disables it with `None`.
    fn set_scissor(&mut self, scissor: Option<ScissorRect>) -> DeviceResult;

    // ── draws ─────────────────────────────────────────────────────────────

    fn draw_arrays(&mut self, primitive: PrimitiveType, first: u32, count: u32) -> DeviceResult;

    fn draw_elements(
        &mut self,
        primitive: PrimitiveType,
        count: u32,
        format: IndexFormat,
        indices: IndexSource<'_>,
    ) -> DeviceResult;

    // ── resources ─────────────────────────────────────────────────────────

    /// Returns the backend program used by a built-in effect.
    fn builtin_shader(&mut self, shader: BuiltinShader) -> anyhow::Result<ShaderHandle>;

    /// Creates an RGBA8 texture from raw, already decoded pixels.
    fn create_texture(
        &mut self,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> anyhow::Result<TextureHandle>;

    fn create_render_target(&mut self, width: u32, height: u32) -> anyhow::Result<TargetHandle>;

    fn create_render_data(
        &mut self,
        format: VertexFormat,
        vertices: &[u8],
        indices: Option<(IndexFormat, &[u8])>,
    ) -> anyhow::Result<RenderDataHandle>;

    fn release_texture(&mut self, texture: TextureHandle) -> DeviceResult;
    fn release_render_target(&mut self, target: TargetHandle) -> DeviceResult;
    fn release_render_data(&mut self, data: RenderDataHandle) -> DeviceResult;
}
