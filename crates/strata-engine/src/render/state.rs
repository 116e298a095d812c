use crate::coords::ColorRgba;
use crate::device::{
    verify, BlendFactor, Capability, CompareFunc, CullFace, Device, RenderDataHandle, ShaderHandle,
    TextureHandle, VertexStream, MAX_TEXTURE_UNITS,
};

use super::cached::Cached;

/// Requested device state.
///
/// Mutating this never touches the device; [`StateCache::flush`] reconciles it
/// with what was last applied.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderState {
    pub color: ColorRgba,
    pub blend_src: BlendFactor,
    pub blend_dst: BlendFactor,
    pub textures: [Option<TextureHandle>; MAX_TEXTURE_UNITS],
    pub texturing: bool,
    pub vertex_array: bool,
    pub texcoord_array: bool,
    pub color_array: bool,
    pub blending: bool,
    pub depth_test: bool,
    pub depth_write: bool,
    pub alpha_test: bool,
    pub alpha_func: CompareFunc,
    pub alpha_ref: f32,
    pub culling: bool,
    pub cull_face: CullFace,
    pub shader: Option<ShaderHandle>,
    pub render_data: Option<RenderDataHandle>,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            color: ColorRgba::white(),
            blend_src: BlendFactor::One,
            blend_dst: BlendFactor::Zero,
            textures: [None; MAX_TEXTURE_UNITS],
            texturing: false,
            vertex_array: false,
            texcoord_array: false,
            color_array: false,
            blending: false,
            depth_test: false,
            depth_write: false,
            alpha_test: false,
            alpha_func: CompareFunc::Always,
            alpha_ref: 0.0,
            culling: false,
            cull_face: CullFace::Back,
            shader: None,
            render_data: None,
        }
    }
}

impl RenderState {
    pub fn stream(&self, stream: VertexStream) -> bool {
        match stream {
            VertexStream::Position => self.vertex_array,
            VertexStream::TexCoord => self.texcoord_array,
            VertexStream::Color => self.color_array,
        }
    }

    pub fn set_stream(&mut self, stream: VertexStream, enabled: bool) {
        match stream {
            VertexStream::Position => self.vertex_array = enabled,
            VertexStream::TexCoord => self.texcoord_array = enabled,
            VertexStream::Color => self.color_array = enabled,
        }
    }
}

const STREAMS: [VertexStream; 3] = [
    VertexStream::Position,
    VertexStream::TexCoord,
    VertexStream::Color,
];

/// State last pushed to the device, one [`Cached`] per axis.
#[derive(Debug, Clone)]
pub(crate) struct StateCache {
    color: Cached<ColorRgba>,
    blend: Cached<(BlendFactor, BlendFactor)>,
    textures: [Cached<Option<TextureHandle>>; MAX_TEXTURE_UNITS],
    texturing: Cached<bool>,
    streams: [Cached<bool>; 3],
    blending: Cached<bool>,
    depth_test: Cached<bool>,
    depth_write: Cached<bool>,
    alpha_test: Cached<bool>,
    alpha_func: Cached<(CompareFunc, f32)>,
    culling: Cached<bool>,
    cull_face: Cached<CullFace>,
    shader: Cached<Option<ShaderHandle>>,
    render_data: Cached<Option<RenderDataHandle>>,
}

impl Default for StateCache {
    /// Every axis unknown except bindings (textures, shader, render data),
    /// which start unbound.
    fn default() -> Self {
        Self {
            color: Cached::invalid(),
            blend: Cached::invalid(),
            textures: std::array::from_fn(|_| Cached::new(None)),
            texturing: Cached::invalid(),
            streams: std::array::from_fn(|_| Cached::invalid()),
            blending: Cached::invalid(),
            depth_test: Cached::invalid(),
            depth_write: Cached::invalid(),
            alpha_test: Cached::invalid(),
            alpha_func: Cached::invalid(),
            culling: Cached::invalid(),
            cull_face: Cached::invalid(),
            shader: Cached::new(None),
            render_data: Cached::new(None),
        }
    }
}

impl StateCache {
    /// Forgets everything, so the next flush re-applies every axis.
    pub fn invalidate_all(&mut self) {
        self.color.invalidate();
        self.blend.invalidate();
        self.textures.iter_mut().for_each(Cached::invalidate);
        self.texturing.invalidate();
        self.streams.iter_mut().for_each(Cached::invalidate);
        self.blending.invalidate();
        self.depth_test.invalidate();
        self.depth_write.invalidate();
        self.alpha_test.invalidate();
        self.alpha_func.invalidate();
        self.culling.invalidate();
        self.cull_face.invalidate();
        self.shader.invalidate();
        self.render_data.invalidate();
    }

    /// Texture last bound on `unit`, if known.
    pub fn applied_texture(&self, unit: usize) -> Option<TextureHandle> {
        self.textures.get(unit).and_then(|c| c.get().copied().flatten())
    }

    /// Pushes every axis where `requested` differs from the applied value.
    ///
    /// `units` is the number of texture units the device exposes.
    pub fn flush(
        &mut self,
        requested: &RenderState,
        device: &mut dyn Device,
        units: usize,
        debug: bool,
    ) {
        if self.color.update(&requested.color) {
            verify("set_color", device.set_color(requested.color));
        }

        if self.blend.update(&(requested.blend_src, requested.blend_dst)) {
            verify(
                "set_blend_func",
                device.set_blend_func(requested.blend_src, requested.blend_dst),
            );
        }

        if self.blending.update(&requested.blending) {
            verify(
                "set_capability(blend)",
                device.set_capability(Capability::Blend, requested.blending),
            );
        }

        if self.texturing.update(&requested.texturing) {
            verify(
                "set_capability(texture_2d)",
                device.set_capability(Capability::Texture2D, requested.texturing),
            );
        }

        for unit in 0..units.min(MAX_TEXTURE_UNITS) {
            let texture = requested.textures[unit];
            if !self.textures[unit].update(&texture) {
                continue;
            }
            verify("activate_texture_unit", device.activate_texture_unit(unit));
            match texture {
                Some(handle) => {
                    if unit != 0 {
                        verify("set_unit_texturing", device.set_unit_texturing(unit, true));
                    }
                    if debug {
                        log::debug!("bind texture {} on unit {unit}", handle.raw());
                    }
                    verify("bind_texture", device.bind_texture(unit, handle));
                }
                None => {
                    if unit != 0 {
                        verify("set_unit_texturing", device.set_unit_texturing(unit, false));
                    }
                }
            }
        }

        for (i, stream) in STREAMS.into_iter().enumerate() {
            let enabled = requested.stream(stream);
            if self.streams[i].update(&enabled) {
                verify("set_vertex_stream", device.set_vertex_stream(stream, enabled));
            }
        }

        if self.depth_test.update(&requested.depth_test) {
            verify(
                "set_capability(depth_test)",
                device.set_capability(Capability::DepthTest, requested.depth_test),
            );
        }

        if self.depth_write.update(&requested.depth_write) {
            verify("set_depth_write", device.set_depth_write(requested.depth_write));
        }

        if self.alpha_test.update(&requested.alpha_test) {
            verify(
                "set_capability(alpha_test)",
                device.set_capability(Capability::AlphaTest, requested.alpha_test),
            );
        }

        if self.alpha_func.update(&(requested.alpha_func, requested.alpha_ref)) {
            verify(
                "set_alpha_func",
                device.set_alpha_func(requested.alpha_func, requested.alpha_ref),
            );
        }

        if self.culling.update(&requested.culling) {
            verify(
                "set_capability(cull_face)",
                device.set_capability(Capability::CullFace, requested.culling),
            );
        }

        if self.cull_face.update(&requested.cull_face) {
            verify("set_cull_face", device.set_cull_face(requested.cull_face));
        }

        if self.shader.update(&requested.shader) {
            if debug {
                log::debug!("use shader {:?}", requested.shader.map(ShaderHandle::raw));
            }
            verify("use_shader", device.use_shader(requested.shader));
        }

        if self.render_data.update(&requested.render_data) {
            verify("bind_render_data", device.bind_render_data(requested.render_data));
        }
    }
}
