use std::collections::HashMap;
use std::sync::Arc;

use glam::Mat4;
use parking_lot::Mutex;

use crate::coords::{ColorRgba, ScissorRect, Viewport};

use super::backend::Device;
use super::caps::Caps;
use super::error::{DeviceError, DeviceResult};
use super::types::{
    BlendFactor, BuiltinShader, Capability, CompareFunc, CullFace, IndexFormat, IndexSource,
    PrimitiveType, RenderDataHandle, RendererKind, ShaderHandle, TargetHandle, TextureHandle,
    VertexFormat, VertexStream,
};

/// One command received by a [`RecordingDevice`].
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCall {
    BeginFrame(ColorRgba),
    EndFrame,
    ResizeFramebuffer(u32, u32),
    SetColor(ColorRgba),
    SetBlendFunc(BlendFactor, BlendFactor),
    SetCapability(Capability, bool),
    SetDepthWrite(bool),
    SetAlphaFunc(CompareFunc, f32),
    SetCullFace(CullFace),
    SetVertexStream(VertexStream, bool),
    ActivateTextureUnit(usize),
    SetUnitTexturing(usize, bool),
    BindTexture(usize, TextureHandle),
    UseShader(Option<ShaderHandle>),
    BindRenderData(Option<RenderDataHandle>),
    SetUniformMatrix(Mat4),
    BindRenderTarget(Option<TargetHandle>),
    SetViewport(Viewport),
    SetScissor(Option<ScissorRect>),
    DrawArrays {
        primitive: PrimitiveType,
        first: u32,
        count: u32,
    },
    DrawElements {
        primitive: PrimitiveType,
        count: u32,
        format: IndexFormat,
        client_indices: bool,
    },
}

/// Shared, append-only log of device calls.
///
/// Cloning yields another handle to the same log, so tests can keep one after
/// the device has been moved into the manager.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    calls: Arc<Mutex<Vec<DeviceCall>>>,
}

impl Journal {
    fn push(&self, call: DeviceCall) {
        self.calls.lock().push(call);
    }

    /// Snapshot of every call recorded so far.
    pub fn calls(&self) -> Vec<DeviceCall> {
        self.calls.lock().clone()
    }

    /// Number of recorded calls matching `pred`.
    pub fn count(&self, pred: impl Fn(&DeviceCall) -> bool) -> usize {
        self.calls.lock().iter().filter(|c| pred(c)).count()
    }

    pub fn len(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.lock().is_empty()
    }

    pub fn last(&self) -> Option<DeviceCall> {
        self.calls.lock().last().cloned()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }
}

/// Device that performs no GPU work and journals every call.
///
/// Serves as the `Headless` backend and as the observable backend in tests.
#[derive(Debug, Default)]
pub struct RecordingDevice {
    journal: Journal,
    caps: Caps,
    next_handle: u32,
    builtin: HashMap<BuiltinShader, ShaderHandle>,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_caps(caps: Caps) -> Self {
        Self {
            caps,
            ..Self::default()
        }
    }

    /// Handle to the call log.
    pub fn journal(&self) -> Journal {
        self.journal.clone()
    }

    fn allocate(&mut self) -> u32 {
        self.next_handle += 1;
        self.next_handle
    }

    fn record(&self, call: DeviceCall) -> DeviceResult {
        self.journal.push(call);
        Ok(())
    }

    fn check_unit(&self, unit: usize) -> DeviceResult {
        if unit < self.caps.max_texture_units {
            Ok(())
        } else {
            Err(DeviceError::TextureUnitOutOfRange {
                unit,
                limit: self.caps.max_texture_units,
            })
        }
    }
}

impl Device for RecordingDevice {
    fn kind(&self) -> RendererKind {
        RendererKind::Headless
    }

    fn caps(&self) -> Caps {
        self.caps
    }

    fn begin_frame(&mut self, clear: ColorRgba) -> DeviceResult {
        self.record(DeviceCall::BeginFrame(clear))
    }

    fn end_frame(&mut self) -> DeviceResult {
        self.record(DeviceCall::EndFrame)
    }

    fn resize_framebuffer(&mut self, width: u32, height: u32) -> DeviceResult {
        self.record(DeviceCall::ResizeFramebuffer(width, height))
    }

    fn set_color(&mut self, color: ColorRgba) -> DeviceResult {
        self.record(DeviceCall::SetColor(color))
    }

    fn set_blend_func(&mut self, src: BlendFactor, dst: BlendFactor) -> DeviceResult {
        self.record(DeviceCall::SetBlendFunc(src, dst))
    }

    fn set_capability(&mut self, cap: Capability, enabled: bool) -> DeviceResult {
        self.record(DeviceCall::SetCapability(cap, enabled))
    }

    fn set_depth_write(&mut self, enabled: bool) -> DeviceResult {
        self.record(DeviceCall::SetDepthWrite(enabled))
    }

    fn set_alpha_func(&mut self, func: CompareFunc, reference: f32) -> DeviceResult {
        self.record(DeviceCall::SetAlphaFunc(func, reference))
    }

    fn set_cull_face(&mut self, face: CullFace) -> DeviceResult {
        self.record(DeviceCall::SetCullFace(face))
    }

    fn set_vertex_stream(&mut self, stream: VertexStream, enabled: bool) -> DeviceResult {
        self.record(DeviceCall::SetVertexStream(stream, enabled))
    }

    fn activate_texture_unit(&mut self, unit: usize) -> DeviceResult {
        self.check_unit(unit)?;
        self.record(DeviceCall::ActivateTextureUnit(unit))
    }

    fn set_unit_texturing(&mut self, unit: usize, enabled: bool) -> DeviceResult {
        self.check_unit(unit)?;
        self.record(DeviceCall::SetUnitTexturing(unit, enabled))
    }

    fn bind_texture(&mut self, unit: usize, texture: TextureHandle) -> DeviceResult {
        self.check_unit(unit)?;
        self.record(DeviceCall::BindTexture(unit, texture))
    }

    fn use_shader(&mut self, shader: Option<ShaderHandle>) -> DeviceResult {
        self.record(DeviceCall::UseShader(shader))
    }

    fn bind_render_data(&mut self, data: Option<RenderDataHandle>) -> DeviceResult {
        self.record(DeviceCall::BindRenderData(data))
    }

    fn set_uniform_matrix(&mut self, mvp: &Mat4) -> DeviceResult {
        self.record(DeviceCall::SetUniformMatrix(*mvp))
    }

    fn bind_render_target(&mut self, target: Option<TargetHandle>) -> DeviceResult {
        self.record(DeviceCall::BindRenderTarget(target))
    }

    fn set_viewport(&mut self, viewport: Viewport) -> DeviceResult {
        self.record(DeviceCall::SetViewport(viewport))
    }

    fn set_scissor(&mut self, scissor: Option<ScissorRect>) -> DeviceResult {
        self.record(DeviceCall::SetScissor(scissor))
    }

    fn draw_arrays(&mut self, primitive: PrimitiveType, first: u32, count: u32) -> DeviceResult {
        self.record(DeviceCall::DrawArrays { primitive, first, count })
    }

    fn draw_elements(
        &mut self,
        primitive: PrimitiveType,
        count: u32,
        format: IndexFormat,
        indices: IndexSource<'_>,
    ) -> DeviceResult {
        if let IndexSource::Client(bytes) = indices {
            let needed = count as u64 * format.size() as u64;
            if (bytes.len() as u64) < needed {
                return Err(DeviceError::IndexRange {
                    needed,
                    available: bytes.len() as u64,
                });
            }
        }
        self.record(DeviceCall::DrawElements {
            primitive,
            count,
            format,
            client_indices: matches!(indices, IndexSource::Client(_)),
        })
    }

    fn builtin_shader(&mut self, shader: BuiltinShader) -> anyhow::Result<ShaderHandle> {
        if let Some(handle) = self.builtin.get(&shader) {
            return Ok(*handle);
        }
        let handle = ShaderHandle(self.allocate());
        self.builtin.insert(shader, handle);
        Ok(handle)
    }

    fn create_texture(
        &mut self,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> anyhow::Result<TextureHandle> {
        anyhow::ensure!(
            rgba.len() as u64 == width as u64 * height as u64 * 4,
            "texture data is {} bytes, expected {}x{} RGBA8",
            rgba.len(),
            width,
            height
        );
        Ok(TextureHandle(self.allocate()))
    }

    fn create_render_target(&mut self, width: u32, height: u32) -> anyhow::Result<TargetHandle> {
        anyhow::ensure!(width > 0 && height > 0, "render target has zero size");
        Ok(TargetHandle(self.allocate()))
    }

    fn create_render_data(
        &mut self,
        format: VertexFormat,
        vertices: &[u8],
        _indices: Option<(IndexFormat, &[u8])>,
    ) -> anyhow::Result<RenderDataHandle> {
        anyhow::ensure!(
            vertices.len() as u64 % format.stride() == 0,
            "vertex data is not a whole number of {}-byte vertices",
            format.stride()
        );
        Ok(RenderDataHandle(self.allocate()))
    }

    fn release_texture(&mut self, _texture: TextureHandle) -> DeviceResult {
        Ok(())
    }

    fn release_render_target(&mut self, _target: TargetHandle) -> DeviceResult {
        Ok(())
    }

    fn release_render_data(&mut self, _data: RenderDataHandle) -> DeviceResult {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn journal_survives_boxing() {
        let device = RecordingDevice::new();
        let journal = device.journal();
        let mut boxed: Box<dyn Device> = Box::new(device);

        boxed.set_capability(Capability::Blend, true).unwrap();
        boxed.draw_arrays(PrimitiveType::TriangleList, 0, 3).unwrap();

        assert_eq!(journal.len(), 2);
        assert_eq!(
            journal.last(),
            Some(DeviceCall::DrawArrays {
                primitive: PrimitiveType::TriangleList,
                first: 0,
                count: 3,
            })
        );
    }

    #[test]
    fn rejects_units_beyond_caps() {
        let mut device = RecordingDevice::with_caps(Caps {
            max_texture_units: 2,
            ..Caps::default()
        });
        assert!(device.bind_texture(1, TextureHandle(1)).is_ok());
        assert!(matches!(
            device.bind_texture(2, TextureHandle(1)),
            Err(DeviceError::TextureUnitOutOfRange { unit: 2, limit: 2 })
        ));
    }

    #[test]
    fn builtin_shaders_are_stable() {
        let mut device = RecordingDevice::new();
        let a = device.builtin_shader(BuiltinShader::FlatColor).unwrap();
        let b = device.builtin_shader(BuiltinShader::TextureMulColor).unwrap();
        assert_ne!(a, b);
        assert_eq!(device.builtin_shader(BuiltinShader::FlatColor).unwrap(), a);
    }

    #[test]
    fn short_client_indices_are_rejected() {
        let mut device = RecordingDevice::new();
        let bytes = [0u8; 4];
        let res = device.draw_elements(
            PrimitiveType::TriangleList,
            3,
            IndexFormat::U16,
            IndexSource::Client(&bytes),
        );
        assert!(matches!(res, Err(DeviceError::IndexRange { needed: 6, available: 4 })));
    }
}
