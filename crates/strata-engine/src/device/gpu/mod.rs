//! Headless wgpu backend.
//!
//! Renders into offscreen RGBA8 surfaces; the "default framebuffer" is one of
//! them. State setters only record into [`BackendState`]; each draw resolves the
//! recorded state into a cached pipeline and a bind group, uploads its uniform
//! block and submits its own encoder, so uniform writes never alias between
//! draws.
//!
//! Viewport and scissor rectangles use a top-left origin.

mod convert;
mod init;
mod pipeline;
mod surface;

use std::collections::HashMap;

use anyhow::{Context, Result};
use glam::Mat4;
use wgpu::util::DeviceExt;

use crate::coords::{ColorRgba, ScissorRect, Viewport};

use super::backend::Device;
use super::caps::{Caps, MAX_TEXTURE_UNITS};
use super::error::{DeviceError, DeviceResult};
use super::types::{
    BlendFactor, BuiltinShader, Capability, CompareFunc, CullFace, IndexFormat, IndexSource,
    PrimitiveType, RenderDataHandle, RendererKind, ShaderHandle, TargetHandle, TextureHandle,
    VertexFormat, VertexStream,
};

use pipeline::{
    DrawUniforms, PipelineKey, Pipelines, StreamMask, SAMPLER_BINDING, TEXTURE_BINDING_BASE,
};
use surface::OffscreenSurface;

pub use init::WgpuInit;

struct GpuTexture {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

struct GpuRenderData {
    format: VertexFormat,
    vertices: wgpu::Buffer,
    vertex_count: u64,
    indices: Option<(IndexFormat, wgpu::Buffer, u64)>,
}

/// Device state as last set through the [`Device`] trait.
#[derive(Debug, Clone)]
struct BackendState {
    color: ColorRgba,
    blend: (BlendFactor, BlendFactor),
    blending: bool,
    texturing: [bool; MAX_TEXTURE_UNITS],
    textures: [Option<TextureHandle>; MAX_TEXTURE_UNITS],
    depth_test: bool,
    alpha_test: bool,
    alpha_func: (CompareFunc, f32),
    culling: bool,
    cull_face: CullFace,
    streams: StreamMask,
    shader: Option<ShaderHandle>,
    render_data: Option<RenderDataHandle>,
    mvp: Mat4,
    target: Option<TargetHandle>,
    viewport: Option<Viewport>,
    scissor: Option<ScissorRect>,
}

impl Default for BackendState {
    fn default() -> Self {
        Self {
            color: ColorRgba::white(),
            blend: (BlendFactor::One, BlendFactor::Zero),
            blending: false,
            texturing: [false; MAX_TEXTURE_UNITS],
            textures: [None; MAX_TEXTURE_UNITS],
            depth_test: false,
            alpha_test: false,
            alpha_func: (CompareFunc::Always, 0.0),
            culling: false,
            cull_face: CullFace::Back,
            streams: StreamMask::default(),
            shader: None,
            render_data: None,
            mvp: Mat4::IDENTITY,
            target: None,
            viewport: None,
            scissor: None,
        }
    }
}

enum DrawKind<'a> {
    Arrays { first: u32, count: u32 },
    Elements { count: u32, format: IndexFormat, indices: IndexSource<'a> },
}

/// wgpu implementation of [`Device`].
pub struct WgpuDevice {
    device: wgpu::Device,
    queue: wgpu::Queue,
    caps: Caps,

    pipelines: Pipelines,
    sampler: wgpu::Sampler,
    uniforms: wgpu::Buffer,
    fallback: GpuTexture,

    framebuffer: OffscreenSurface,
    targets: HashMap<TargetHandle, OffscreenSurface>,
    textures: HashMap<TextureHandle, GpuTexture>,
    render_data: HashMap<RenderDataHandle, GpuRenderData>,
    shaders: HashMap<ShaderHandle, BuiltinShader>,
    builtin: HashMap<BuiltinShader, ShaderHandle>,
    next_handle: u32,

    state: BackendState,
    warned_depth: bool,
}

impl WgpuDevice {
    /// Creates a headless device with a `width` x `height` default framebuffer.
    pub fn new(init: &WgpuInit, width: u32, height: u32) -> Result<Self> {
        let (adapter, device, queue) =
            pollster::block_on(init::request_device(init)).context("wgpu bring-up failed")?;

        let features = adapter.features();
        let limits = device.limits();
        let caps = Caps {
            max_texture_units: (limits.max_sampled_textures_per_shader_stage as usize)
                .min(MAX_TEXTURE_UNITS),
            hardware_cursor: false,
            etc2_textures: features.contains(wgpu::Features::TEXTURE_COMPRESSION_ETC2),
            bc_textures: features.contains(wgpu::Features::TEXTURE_COMPRESSION_BC),
            bgra8888: true,
            float16_textures: true,
            float32_filterable: features.contains(wgpu::Features::FLOAT32_FILTERABLE),
        };
        log::debug!("wgpu caps: {caps:?}");

        let pipelines = Pipelines::new(&device);

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("strata sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let uniforms = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("strata draw ubo"),
            size: std::mem::size_of::<DrawUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let fallback = upload_texture(&device, &queue, "strata white texture", 1, 1, &[255; 4]);
        let framebuffer = OffscreenSurface::new(&device, "strata framebuffer", width, height);

        Ok(Self {
            device,
            queue,
            caps,
            pipelines,
            sampler,
            uniforms,
            fallback,
            framebuffer,
            targets: HashMap::new(),
            textures: HashMap::new(),
            render_data: HashMap::new(),
            shaders: HashMap::new(),
            builtin: HashMap::new(),
            next_handle: 1,
            state: BackendState::default(),
            warned_depth: false,
        })
    }

    fn allocate(&mut self) -> u32 {
        let id = self.next_handle;
        self.next_handle += 1;
        id
    }

    fn check_unit(&self, unit: usize) -> DeviceResult {
        if unit >= self.caps.max_texture_units {
            return Err(DeviceError::TextureUnitOutOfRange {
                unit,
                limit: self.caps.max_texture_units,
            });
        }
        Ok(())
    }

    fn draw(&mut self, primitive: PrimitiveType, kind: DrawKind<'_>) -> DeviceResult {
        let state = &self.state;

        let shader_handle = state.shader.ok_or(DeviceError::NoShaderBound)?;
        let shader = *self
            .shaders
            .get(&shader_handle)
            .ok_or(DeviceError::UnknownShader(shader_handle))?;
        let data_handle = state.render_data.ok_or(DeviceError::NoRenderDataBound)?;
        let data = self
            .render_data
            .get(&data_handle)
            .ok_or(DeviceError::UnknownRenderData(data_handle))?;

        for stream in [VertexStream::Position, VertexStream::TexCoord, VertexStream::Color] {
            if state.streams.get(stream) && !data.format.has(stream) {
                return Err(DeviceError::MissingStream(stream));
            }
        }
        for stream in pipeline::required_streams(shader) {
            if !state.streams.get(*stream) {
                return Err(DeviceError::MissingStream(*stream));
            }
        }

        let topology = convert::topology(primitive)
            .ok_or(DeviceError::Unsupported("triangle fan topology"))?;

        if state.culling && state.cull_face == CullFace::FrontAndBack && primitive.is_triangles() {
            return Ok(());
        }

        if state.depth_test && !self.warned_depth {
            log::warn!("wgpu backend has no depth attachment; depth test ignored");
            self.warned_depth = true;
        }

        // Index buffer for this draw: (buffer, byte offset, format).
        let client_indices;
        let index_binding = match &kind {
            DrawKind::Arrays { first, count } => {
                let end = *first as u64 + *count as u64;
                if end > data.vertex_count {
                    return Err(DeviceError::VertexRange {
                        first: *first,
                        end,
                        available: data.vertex_count,
                    });
                }
                None
            }
            DrawKind::Elements { count, format, indices } => {
                let size = format.size() as u64;
                let needed = *count as u64 * size;
                match indices {
                    IndexSource::Client(bytes) => {
                        if (bytes.len() as u64) < needed {
                            return Err(DeviceError::IndexRange {
                                needed,
                                available: bytes.len() as u64,
                            });
                        }
                        let descriptor = wgpu::util::BufferInitDescriptor {
                            label: Some("strata client indices"),
                            contents: &bytes[..needed as usize],
                            usage: wgpu::BufferUsages::INDEX,
                        };
                        client_indices = self.device.create_buffer_init(&descriptor);
                        Some((&client_indices, 0, *format))
                    }
                    IndexSource::RenderData { offset } => {
                        let (data_format, buffer, len) =
                            data.indices.as_ref().ok_or(DeviceError::NoIndexBuffer)?;
                        if *data_format != *format {
                            return Err(DeviceError::Unsupported(
                                "index format differs from the render data",
                            ));
                        }
                        if offset % size != 0 {
                            return Err(DeviceError::MisalignedIndices { offset: *offset, size });
                        }
                        if offset + needed > *len {
                            return Err(DeviceError::IndexRange {
                                needed: offset + needed,
                                available: *len,
                            });
                        }
                        Some((buffer, *offset, *format))
                    }
                }
            }
        };

        let surface = match state.target {
            None => &mut self.framebuffer,
            Some(handle) => self
                .targets
                .get_mut(&handle)
                .ok_or(DeviceError::UnknownTarget(handle))?,
        };

        let scissor = match state.scissor {
            None => Some((0, 0, surface.width, surface.height)),
            Some(rect) => rect.clamped_to(surface.width, surface.height),
        };
        let Some((sx, sy, sw, sh)) = scissor else {
            // Everything is clipped away.
            return Ok(());
        };

        let viewport = state
            .viewport
            .unwrap_or_else(|| Viewport::full(surface.width, surface.height));
        let Some((vx, vy, vw, vh)) = fit_viewport(viewport, surface.width, surface.height) else {
            return Ok(());
        };

        let key = PipelineKey {
            shader,
            format: data.format,
            streams: state.streams,
            topology,
            strip_index: match (&index_binding, primitive.is_strip()) {
                (Some((_, _, format)), true) => Some(*format),
                _ => None,
            },
            blend: state.blending.then_some(state.blend),
            cull: state.culling.then_some(state.cull_face),
        };

        let uniforms = DrawUniforms {
            mvp: state.mvp.to_cols_array_2d(),
            color: state.color.to_array(),
            alpha_ref: state.alpha_func.1,
            alpha_func: if state.alpha_test {
                convert::alpha_func_code(state.alpha_func.0)
            } else {
                convert::alpha_func_code(CompareFunc::Always)
            },
            _pad: [0; 2],
        };
        self.queue.write_buffer(&self.uniforms, 0, bytemuck::bytes_of(&uniforms));

        let views: Vec<&wgpu::TextureView> = (0..MAX_TEXTURE_UNITS)
            .map(|unit| {
                state.textures[unit]
                    .filter(|_| state.texturing[unit])
                    .and_then(|t| self.textures.get(&t))
                    .map(|t| &t.view)
                    .unwrap_or(&self.fallback.view)
            })
            .collect();

        let mut entries = vec![wgpu::BindGroupEntry {
            binding: 0,
            resource: self.uniforms.as_entire_binding(),
        }];
        for (unit, view) in views.iter().enumerate() {
            entries.push(wgpu::BindGroupEntry {
                binding: TEXTURE_BINDING_BASE + unit as u32,
                resource: wgpu::BindingResource::TextureView(view),
            });
        }
        entries.push(wgpu::BindGroupEntry {
            binding: SAMPLER_BINDING,
            resource: wgpu::BindingResource::Sampler(&self.sampler),
        });

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("strata draw bind group"),
            layout: self.pipelines.bind_group_layout(),
            entries: &entries,
        });

        let pipeline = self
            .pipelines
            .get_or_create(&self.device, key)
            .ok_or(DeviceError::UnknownShader(shader_handle))?;

        let load = surface.take_load_op();
        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("strata draw encoder"),
        });

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("strata draw pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            rpass.set_pipeline(pipeline);
            rpass.set_bind_group(0, &bind_group, &[]);
            rpass.set_viewport(vx, vy, vw, vh, 0.0, 1.0);
            rpass.set_scissor_rect(sx, sy, sw, sh);
            rpass.set_vertex_buffer(0, data.vertices.slice(..));

            match (kind, index_binding) {
                (DrawKind::Arrays { first, count }, _) => rpass.draw(first..first + count, 0..1),
                (DrawKind::Elements { count, .. }, Some((buffer, offset, format))) => {
                    rpass.set_index_buffer(buffer.slice(offset..), convert::index_format(format));
                    rpass.draw_indexed(0..count, 0, 0..1);
                }
                (DrawKind::Elements { .. }, None) => {}
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }

    /// Runs an empty pass if the current surface still has a pending clear.
    fn flush_clear(surface: &mut OffscreenSurface, device: &wgpu::Device, queue: &wgpu::Queue) {
        if surface.pending_clear.is_none() {
            return;
        }
        let load = surface.take_load_op();
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("strata clear encoder"),
        });
        {
            let _rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("strata clear pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
        }
        queue.submit(std::iter::once(encoder.finish()));
    }
}

/// Intersects a viewport with the surface; wgpu rejects viewports outside it.
fn fit_viewport(viewport: Viewport, width: u32, height: u32) -> Option<(f32, f32, f32, f32)> {
    let x0 = viewport.x.max(0) as i64;
    let y0 = viewport.y.max(0) as i64;
    let x1 = (viewport.x as i64 + viewport.width as i64).min(width as i64);
    let y1 = (viewport.y as i64 + viewport.height as i64).min(height as i64);
    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    Some((x0 as f32, y0 as f32, (x1 - x0) as f32, (y1 - y0) as f32))
}

fn upload_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    width: u32,
    height: u32,
    rgba: &[u8],
) -> GpuTexture {
    let size = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        rgba,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * width),
            rows_per_image: Some(height),
        },
        size,
    );
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    GpuTexture { _texture: texture, view }
}

impl Device for WgpuDevice {
    fn kind(&self) -> RendererKind {
        RendererKind::Wgpu
    }

    fn caps(&self) -> Caps {
        self.caps
    }

    fn begin_frame(&mut self, clear: ColorRgba) -> DeviceResult {
        self.state.target = None;
        self.framebuffer.pending_clear = Some(clear);
        Ok(())
    }

    fn end_frame(&mut self) -> DeviceResult {
        Self::flush_clear(&mut self.framebuffer, &self.device, &self.queue);
        for surface in self.targets.values_mut() {
            Self::flush_clear(surface, &self.device, &self.queue);
        }
        log::trace!("frame ended, {} pipelines cached", self.pipelines.len());
        Ok(())
    }

    fn resize_framebuffer(&mut self, width: u32, height: u32) -> DeviceResult {
        if width == self.framebuffer.width && height == self.framebuffer.height {
            return Ok(());
        }
        self.framebuffer = OffscreenSurface::new(&self.device, "strata framebuffer", width, height);
        Ok(())
    }

    fn set_color(&mut self, color: ColorRgba) -> DeviceResult {
        self.state.color = color;
        Ok(())
    }

    fn set_blend_func(&mut self, src: BlendFactor, dst: BlendFactor) -> DeviceResult {
        self.state.blend = (src, dst);
        Ok(())
    }

    fn set_capability(&mut self, cap: Capability, enabled: bool) -> DeviceResult {
        match cap {
            Capability::Texture2D => self.state.texturing[0] = enabled,
            Capability::Blend => self.state.blending = enabled,
            Capability::DepthTest => self.state.depth_test = enabled,
            Capability::AlphaTest => self.state.alpha_test = enabled,
            Capability::CullFace => self.state.culling = enabled,
        }
        Ok(())
    }

    fn set_depth_write(&mut self, _enabled: bool) -> DeviceResult {
        // No depth attachment to write to.
        Ok(())
    }

    fn set_alpha_func(&mut self, func: CompareFunc, reference: f32) -> DeviceResult {
        self.state.alpha_func = (func, reference);
        Ok(())
    }

    fn set_cull_face(&mut self, face: CullFace) -> DeviceResult {
        self.state.cull_face = face;
        Ok(())
    }

    fn set_vertex_stream(&mut self, stream: VertexStream, enabled: bool) -> DeviceResult {
        self.state.streams.set(stream, enabled);
        Ok(())
    }

    fn activate_texture_unit(&mut self, unit: usize) -> DeviceResult {
        // Bindings are per unit; there is no active-unit selector to track.
        self.check_unit(unit)
    }

    fn set_unit_texturing(&mut self, unit: usize, enabled: bool) -> DeviceResult {
        self.check_unit(unit)?;
        self.state.texturing[unit] = enabled;
        Ok(())
    }

    fn bind_texture(&mut self, unit: usize, texture: TextureHandle) -> DeviceResult {
        self.check_unit(unit)?;
        if !self.textures.contains_key(&texture) {
            return Err(DeviceError::UnknownTexture(texture));
        }
        self.state.textures[unit] = Some(texture);
        Ok(())
    }

    fn use_shader(&mut self, shader: Option<ShaderHandle>) -> DeviceResult {
        if let Some(handle) = shader {
            if !self.shaders.contains_key(&handle) {
                return Err(DeviceError::UnknownShader(handle));
            }
        }
        self.state.shader = shader;
        Ok(())
    }

    fn bind_render_data(&mut self, data: Option<RenderDataHandle>) -> DeviceResult {
        if let Some(handle) = data {
            if !self.render_data.contains_key(&handle) {
                return Err(DeviceError::UnknownRenderData(handle));
            }
        }
        self.state.render_data = data;
        Ok(())
    }

    fn set_uniform_matrix(&mut self, mvp: &Mat4) -> DeviceResult {
        self.state.mvp = *mvp;
        Ok(())
    }

    fn bind_render_target(&mut self, target: Option<TargetHandle>) -> DeviceResult {
        if let Some(handle) = target {
            if !self.targets.contains_key(&handle) {
                return Err(DeviceError::UnknownTarget(handle));
            }
        }
        self.state.target = target;
        Ok(())
    }

    fn set_viewport(&mut self, viewport: Viewport) -> DeviceResult {
        self.state.viewport = Some(viewport);
        Ok(())
    }

    fn set_scissor(&mut self, scissor: Option<ScissorRect>) -> DeviceResult {
        self.state.scissor = scissor;
        Ok(())
    }

    fn draw_arrays(&mut self, primitive: PrimitiveType, first: u32, count: u32) -> DeviceResult {
        self.draw(primitive, DrawKind::Arrays { first, count })
    }

    fn draw_elements(
        &mut self,
        primitive: PrimitiveType,
        count: u32,
        format: IndexFormat,
        indices: IndexSource<'_>,
    ) -> DeviceResult {
        self.draw(primitive, DrawKind::Elements { count, format, indices })
    }

    fn builtin_shader(&mut self, shader: BuiltinShader) -> Result<ShaderHandle> {
        if let Some(handle) = self.builtin.get(&shader) {
            return Ok(*handle);
        }
        let handle = ShaderHandle(self.allocate());
        self.shaders.insert(handle, shader);
        self.builtin.insert(shader, handle);
        Ok(handle)
    }

    fn create_texture(&mut self, width: u32, height: u32, rgba: &[u8]) -> Result<TextureHandle> {
        anyhow::ensure!(width > 0 && height > 0, "texture has zero size");
        anyhow::ensure!(
            rgba.len() as u64 == width as u64 * height as u64 * 4,
            "texture data is {} bytes, expected {}x{} RGBA8",
            rgba.len(),
            width,
            height
        );
        let texture =
            upload_texture(&self.device, &self.queue, "strata texture", width, height, rgba);
        let handle = TextureHandle(self.allocate());
        self.textures.insert(handle, texture);
        Ok(handle)
    }

    fn create_render_target(&mut self, width: u32, height: u32) -> Result<TargetHandle> {
        anyhow::ensure!(width > 0 && height > 0, "render target has zero size");
        let surface = OffscreenSurface::new(&self.device, "strata render target", width, height);
        let handle = TargetHandle(self.allocate());
        self.targets.insert(handle, surface);
        Ok(handle)
    }

    fn create_render_data(
        &mut self,
        format: VertexFormat,
        vertices: &[u8],
        indices: Option<(IndexFormat, &[u8])>,
    ) -> Result<RenderDataHandle> {
        let stride = format.stride();
        anyhow::ensure!(
            !vertices.is_empty() && vertices.len() as u64 % stride == 0,
            "vertex data is not a whole, non-zero number of {stride}-byte vertices"
        );

        let vertex_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("strata vbo"),
            contents: vertices,
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = match indices {
            Some((index_format, bytes)) => {
                anyhow::ensure!(
                    bytes.len() % index_format.size() == 0,
                    "index data is not a whole number of {:?} indices",
                    index_format
                );
                let buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("strata ibo"),
                    contents: bytes,
                    usage: wgpu::BufferUsages::INDEX,
                });
                Some((index_format, buffer, bytes.len() as u64))
            }
            None => None,
        };

        let handle = RenderDataHandle(self.allocate());
        self.render_data.insert(
            handle,
            GpuRenderData {
                format,
                vertices: vertex_buffer,
                vertex_count: vertices.len() as u64 / stride,
                indices: index_buffer,
            },
        );
        Ok(handle)
    }

    fn release_texture(&mut self, texture: TextureHandle) -> DeviceResult {
        self.textures
            .remove(&texture)
            .map(|_| ())
            .ok_or(DeviceError::UnknownTexture(texture))?;
        for slot in self.state.textures.iter_mut() {
            if *slot == Some(texture) {
                *slot = None;
            }
        }
        Ok(())
    }

    fn release_render_target(&mut self, target: TargetHandle) -> DeviceResult {
        self.targets
            .remove(&target)
            .map(|_| ())
            .ok_or(DeviceError::UnknownTarget(target))?;
        if self.state.target == Some(target) {
            self.state.target = None;
        }
        Ok(())
    }

    fn release_render_data(&mut self, data: RenderDataHandle) -> DeviceResult {
        self.render_data
            .remove(&data)
            .map(|_| ())
            .ok_or(DeviceError::UnknownRenderData(data))?;
        if self.state.render_data == Some(data) {
            self.state.render_data = None;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_is_clamped_to_surface() {
        let fit = fit_viewport(Viewport::new(-10, 5, 100, 100), 50, 60);
        assert_eq!(fit, Some((0.0, 5.0, 50.0, 55.0)));
    }

    #[test]
    fn viewport_outside_surface_is_dropped() {
        assert_eq!(fit_viewport(Viewport::new(80, 0, 10, 10), 50, 60), None);
    }

    #[test]
    fn backend_state_defaults_to_opaque_white() {
        let state = BackendState::default();
        assert_eq!(state.color, ColorRgba::white());
        assert!(!state.blending);
        assert_eq!(state.alpha_func.0, CompareFunc::Always);
    }
}
