//! Mapping of backend-agnostic state enums onto wgpu descriptors.

use crate::device::types::{BlendFactor, CompareFunc, CullFace, IndexFormat, PrimitiveType};

pub(super) fn blend_factor(factor: BlendFactor) -> wgpu::BlendFactor {
    match factor {
        BlendFactor::Zero => wgpu::BlendFactor::Zero,
        BlendFactor::One => wgpu::BlendFactor::One,
        BlendFactor::DstColor => wgpu::BlendFactor::Dst,
        BlendFactor::OneMinusDstColor => wgpu::BlendFactor::OneMinusDst,
        BlendFactor::SrcAlpha => wgpu::BlendFactor::SrcAlpha,
        BlendFactor::OneMinusSrcAlpha => wgpu::BlendFactor::OneMinusSrcAlpha,
        BlendFactor::DstAlpha => wgpu::BlendFactor::DstAlpha,
        BlendFactor::OneMinusDstAlpha => wgpu::BlendFactor::OneMinusDstAlpha,
        BlendFactor::SrcAlphaSaturate => wgpu::BlendFactor::SrcAlphaSaturated,
    }
}

pub(super) fn blend_state(src: BlendFactor, dst: BlendFactor) -> wgpu::BlendState {
    let component = wgpu::BlendComponent {
        src_factor: blend_factor(src),
        dst_factor: blend_factor(dst),
        operation: wgpu::BlendOperation::Add,
    };
    wgpu::BlendState {
        color: component,
        alpha: component,
    }
}

/// Cull mode for a single face; front-and-back is handled by skipping the draw.
pub(super) fn cull_mode(face: CullFace) -> Option<wgpu::Face> {
    match face {
        CullFace::Front => Some(wgpu::Face::Front),
        CullFace::Back => Some(wgpu::Face::Back),
        CullFace::FrontAndBack => None,
    }
}

/// `None` for topologies wgpu cannot express.
pub(super) fn topology(primitive: PrimitiveType) -> Option<wgpu::PrimitiveTopology> {
    match primitive {
        PrimitiveType::PointList => Some(wgpu::PrimitiveTopology::PointList),
        PrimitiveType::LineList => Some(wgpu::PrimitiveTopology::LineList),
        PrimitiveType::LineStrip => Some(wgpu::PrimitiveTopology::LineStrip),
        PrimitiveType::TriangleList => Some(wgpu::PrimitiveTopology::TriangleList),
        PrimitiveType::TriangleStrip => Some(wgpu::PrimitiveTopology::TriangleStrip),
        PrimitiveType::TriangleFan => None,
    }
}

pub(super) fn index_format(format: IndexFormat) -> wgpu::IndexFormat {
    match format {
        IndexFormat::U16 => wgpu::IndexFormat::Uint16,
        IndexFormat::U32 => wgpu::IndexFormat::Uint32,
    }
}

/// Encoding of the alpha-test comparison read by the WGSL shaders.
pub(super) fn alpha_func_code(func: CompareFunc) -> u32 {
    match func {
        CompareFunc::Never => 0,
        CompareFunc::Less => 1,
        CompareFunc::Equal => 2,
        CompareFunc::LessEqual => 3,
        CompareFunc::Greater => 4,
        CompareFunc::NotEqual => 5,
        CompareFunc::GreaterEqual => 6,
        CompareFunc::Always => 7,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fan_has_no_wgpu_topology() {
        assert!(topology(PrimitiveType::TriangleFan).is_none());
        assert_eq!(
            topology(PrimitiveType::TriangleStrip),
            Some(wgpu::PrimitiveTopology::TriangleStrip)
        );
    }

    #[test]
    fn alpha_codes_are_distinct() {
        let funcs = [
            CompareFunc::Never,
            CompareFunc::Less,
            CompareFunc::Equal,
            CompareFunc::LessEqual,
            CompareFunc::Greater,
            CompareFunc::NotEqual,
            CompareFunc::GreaterEqual,
            CompareFunc::Always,
        ];
        let mut codes: Vec<u32> = funcs.iter().map(|f| alpha_func_code(*f)).collect();
        codes.dedup();
        assert_eq!(codes.len(), funcs.len());
    }

    #[test]
    fn saturate_maps_to_saturated() {
        assert_eq!(
            blend_factor(BlendFactor::SrcAlphaSaturate),
            wgpu::BlendFactor::SrcAlphaSaturated
        );
    }
}
