use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};

use crate::device::caps::MAX_TEXTURE_UNITS;
use crate::device::types::{
    BlendFactor, BuiltinShader, CullFace, IndexFormat, VertexFormat, VertexStream,
};

use super::convert;
use super::surface::COLOR_FORMAT;

/// Texture unit `n` is bound at `TEXTURE_BINDING_BASE + n`.
pub(super) const TEXTURE_BINDING_BASE: u32 = 1;
pub(super) const SAMPLER_BINDING: u32 = TEXTURE_BINDING_BASE + MAX_TEXTURE_UNITS as u32;

/// Per-draw uniform block shared by every built-in shader.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct DrawUniforms {
    pub mvp: [[f32; 4]; 4],
    pub color: [f32; 4],
    pub alpha_ref: f32,
    pub alpha_func: u32,
    pub _pad: [u32; 2],
}

/// Vertex streams enabled on the device.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub(super) struct StreamMask {
    pub position: bool,
    pub texcoord: bool,
    pub color: bool,
}

impl StreamMask {
    pub fn get(self, stream: VertexStream) -> bool {
        match stream {
            VertexStream::Position => self.position,
            VertexStream::TexCoord => self.texcoord,
            VertexStream::Color => self.color,
        }
    }

    pub fn set(&mut self, stream: VertexStream, enabled: bool) {
        match stream {
            VertexStream::Position => self.position = enabled,
            VertexStream::TexCoord => self.texcoord = enabled,
            VertexStream::Color => self.color = enabled,
        }
    }
}

/// Everything baked into a wgpu render pipeline.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub(super) struct PipelineKey {
    pub shader: BuiltinShader,
    pub format: VertexFormat,
    pub streams: StreamMask,
    pub topology: wgpu::PrimitiveTopology,
    pub strip_index: Option<IndexFormat>,
    pub blend: Option<(BlendFactor, BlendFactor)>,
    pub cull: Option<CullFace>,
}

/// Vertex streams a built-in shader reads.
pub(super) fn required_streams(shader: BuiltinShader) -> &'static [VertexStream] {
    match shader {
        BuiltinShader::FlatColor => &[VertexStream::Position],
        BuiltinShader::TextureMulColor | BuiltinShader::TextureMulColorAlphaTest => {
            &[VertexStream::Position, VertexStream::TexCoord]
        }
    }
}

fn shader_source(shader: BuiltinShader) -> (&'static str, &'static str) {
    match shader {
        BuiltinShader::FlatColor => (
            "strata flat color shader",
            include_str!("shaders/flat_color.wgsl"),
        ),
        BuiltinShader::TextureMulColor => (
            "strata texture mul color shader",
            include_str!("shaders/texture_mul_color.wgsl"),
        ),
        BuiltinShader::TextureMulColorAlphaTest => (
            "strata texture mul color alpha test shader",
            include_str!("shaders/texture_mul_color_alpha_test.wgsl"),
        ),
    }
}

/// Shader modules, the shared layout, and every pipeline built so far.
pub(super) struct Pipelines {
    bind_group_layout: wgpu::BindGroupLayout,
    layout: wgpu::PipelineLayout,
    modules: HashMap<BuiltinShader, wgpu::ShaderModule>,
    cache: HashMap<PipelineKey, wgpu::RenderPipeline>,
}

impl Pipelines {
    pub fn new(device: &wgpu::Device) -> Self {
        let mut entries = Vec::with_capacity(MAX_TEXTURE_UNITS + 2);
        entries.push(wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<DrawUniforms>() as u64),
            },
            count: None,
        });
        for unit in 0..MAX_TEXTURE_UNITS as u32 {
            entries.push(wgpu::BindGroupLayoutEntry {
                binding: TEXTURE_BINDING_BASE + unit,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            });
        }
        entries.push(wgpu::BindGroupLayoutEntry {
            binding: SAMPLER_BINDING,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("strata draw bgl"),
            entries: &entries,
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("strata pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let modules = [
            BuiltinShader::FlatColor,
            BuiltinShader::TextureMulColor,
            BuiltinShader::TextureMulColorAlphaTest,
        ]
        .into_iter()
        .map(|shader| {
            let (label, src) = shader_source(shader);
            let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(label),
                source: wgpu::ShaderSource::Wgsl(src.into()),
            });
            (shader, module)
        })
        .collect();

        Self {
            bind_group_layout,
            layout,
            modules,
            cache: HashMap::new(),
        }
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Returns the pipeline for `key`, building it on first use.
    pub fn get_or_create(
        &mut self,
        device: &wgpu::Device,
        key: PipelineKey,
    ) -> Option<&wgpu::RenderPipeline> {
        if !self.cache.contains_key(&key) {
            let pipeline = self.build(device, &key)?;
            log::debug!("built pipeline #{} for {:?}", self.cache.len() + 1, key);
            self.cache.insert(key, pipeline);
        }
        self.cache.get(&key)
    }

    fn build(&self, device: &wgpu::Device, key: &PipelineKey) -> Option<wgpu::RenderPipeline> {
        let module = self.modules.get(&key.shader)?;

        let mut attributes = Vec::with_capacity(3);
        let streams = [
            (VertexStream::Position, 0, wgpu::VertexFormat::Float32x3),
            (VertexStream::TexCoord, 1, wgpu::VertexFormat::Float32x2),
            (VertexStream::Color, 2, wgpu::VertexFormat::Float32x4),
        ];
        for (stream, location, format) in streams {
            if !key.streams.get(stream) {
                continue;
            }
            if let Some(offset) = key.format.offset_of(stream) {
                attributes.push(wgpu::VertexAttribute {
                    format,
                    offset,
                    shader_location: location,
                });
            }
        }

        let vertex_layout = wgpu::VertexBufferLayout {
            array_stride: key.format.stride(),
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &attributes,
        };

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("strata pipeline"),
            layout: Some(&self.layout),

            vertex: wgpu::VertexState {
                module,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[vertex_layout],
            },

            fragment: Some(wgpu::FragmentState {
                module,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: COLOR_FORMAT,
                    blend: key.blend.map(|(src, dst)| convert::blend_state(src, dst)),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: key.topology,
                strip_index_format: key.strip_index.map(convert::index_format),
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: key.cull.and_then(convert::cull_mode),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        Some(pipeline)
    }
}
