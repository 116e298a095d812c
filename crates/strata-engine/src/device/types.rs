//! Handles and enums shared between the render manager and device backends.

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u32);

        impl $name {
            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }
        }
    };
}

handle!(
    /// Backend texture object.
    TextureHandle
);
handle!(
    /// Backend shader program.
    ShaderHandle
);
handle!(
    /// Backend vertex-data object (vertex streams plus optional index buffer).
    RenderDataHandle
);
handle!(
    /// Backend offscreen render target.
    TargetHandle
);

/// Backend family selected when the device is created.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum RendererKind {
    /// Journals device calls without touching a GPU.
    #[default]
    Headless,
    /// Headless wgpu device rendering into offscreen surfaces.
    Wgpu,
}

/// Source and destination blend factors.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    Zero,
    One,
    DstColor,
    OneMinusDstColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstAlpha,
    OneMinusDstAlpha,
    SrcAlphaSaturate,
}

/// Comparison used by the alpha test.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CompareFunc {
    Never,
    Less,
    Equal,
    LessEqual,
    Greater,
    NotEqual,
    GreaterEqual,
    Always,
}

impl CompareFunc {
    /// Evaluates `value <op> reference`.
    pub fn passes(self, value: f32, reference: f32) -> bool {
        match self {
            CompareFunc::Never => false,
            CompareFunc::Less => value < reference,
            CompareFunc::Equal => value == reference,
            CompareFunc::LessEqual => value <= reference,
            CompareFunc::Greater => value > reference,
            CompareFunc::NotEqual => value != reference,
            CompareFunc::GreaterEqual => value >= reference,
            CompareFunc::Always => true,
        }
    }
}

/// Faces discarded when culling is enabled.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CullFace {
    Front,
    Back,
    FrontAndBack,
}

/// Primitive topology of a draw call.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    PointList,
    LineList,
    LineStrip,
    TriangleList,
    TriangleStrip,
    TriangleFan,
}

impl PrimitiveType {
    pub const COUNT: usize = 6;

    pub const ALL: [PrimitiveType; Self::COUNT] = [
        PrimitiveType::PointList,
        PrimitiveType::LineList,
        PrimitiveType::LineStrip,
        PrimitiveType::TriangleList,
        PrimitiveType::TriangleStrip,
        PrimitiveType::TriangleFan,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Number of primitives assembled from `vertices` vertices.
    pub fn primitive_count(self, vertices: u32) -> u32 {
        match self {
            PrimitiveType::PointList => vertices,
            PrimitiveType::LineList => vertices / 2,
            PrimitiveType::LineStrip => vertices.saturating_sub(1),
            PrimitiveType::TriangleList => vertices / 3,
            PrimitiveType::TriangleStrip | PrimitiveType::TriangleFan => vertices.saturating_sub(2),
        }
    }

    #[inline]
    pub fn is_triangles(self) -> bool {
        matches!(
            self,
            PrimitiveType::TriangleList | PrimitiveType::TriangleStrip | PrimitiveType::TriangleFan
        )
    }

    #[inline]
    pub fn is_strip(self) -> bool {
        matches!(self, PrimitiveType::LineStrip | PrimitiveType::TriangleStrip)
    }
}

/// Width of one index in an indexed draw.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum IndexFormat {
    U16,
    U32,
}

impl IndexFormat {
    #[inline]
    pub const fn size(self) -> usize {
        match self {
            IndexFormat::U16 => 2,
            IndexFormat::U32 => 4,
        }
    }
}

/// Where the indices of an indexed draw come from.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum IndexSource<'a> {
    /// Indices supplied from client memory, tightly packed.
    Client(&'a [u8]),
    /// Indices read from the index buffer of the bound render data, at a byte offset.
    RenderData { offset: u64 },
}

/// Per-vertex attribute streams toggled by the state cache.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum VertexStream {
    Position,
    TexCoord,
    Color,
}

/// Device capability toggles owned by the state cache.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Texturing on unit 0; other units use [`super::Device::set_unit_texturing`].
    Texture2D,
    Blend,
    DepthTest,
    AlphaTest,
    CullFace,
}

/// Shaders every backend provides for the built-in effects.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BuiltinShader {
    FlatColor,
    TextureMulColor,
    TextureMulColorAlphaTest,
}

/// Vertex layout of a render-data object.
///
/// Position is always three floats; texcoord (two floats) and color (four floats)
/// follow it when present, in that order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct VertexFormat {
    pub texcoord: bool,
    pub color: bool,
}

impl VertexFormat {
    pub const POSITION: VertexFormat = VertexFormat { texcoord: false, color: false };
    pub const POSITION_TEXCOORD: VertexFormat = VertexFormat { texcoord: true, color: false };
    pub const POSITION_COLOR: VertexFormat = VertexFormat { texcoord: false, color: true };
    pub const POSITION_TEXCOORD_COLOR: VertexFormat = VertexFormat { texcoord: true, color: true };

    /// Size of one vertex in bytes.
    pub const fn stride(self) -> u64 {
        let mut floats = 3;
        if self.texcoord {
            floats += 2;
        }
        if self.color {
            floats += 4;
        }
        floats * 4
    }

    /// Byte offset of `stream` inside a vertex, `None` if absent.
    pub const fn offset_of(self, stream: VertexStream) -> Option<u64> {
        match stream {
            VertexStream::Position => Some(0),
            VertexStream::TexCoord => {
                if self.texcoord {
                    Some(12)
                } else {
                    None
                }
            }
            VertexStream::Color => {
                if !self.color {
                    None
                } else if self.texcoord {
                    Some(20)
                } else {
                    Some(12)
                }
            }
        }
    }

    #[inline]
    pub const fn has(self, stream: VertexStream) -> bool {
        self.offset_of(stream).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_counts() {
        assert_eq!(PrimitiveType::TriangleList.primitive_count(6), 2);
        assert_eq!(PrimitiveType::TriangleStrip.primitive_count(4), 2);
        assert_eq!(PrimitiveType::TriangleFan.primitive_count(1), 0);
        assert_eq!(PrimitiveType::LineStrip.primitive_count(5), 4);
        assert_eq!(PrimitiveType::LineList.primitive_count(5), 2);
        assert_eq!(PrimitiveType::PointList.primitive_count(7), 7);
    }

    #[test]
    fn vertex_format_layout() {
        let f = VertexFormat::POSITION_TEXCOORD_COLOR;
        assert_eq!(f.stride(), 36);
        assert_eq!(f.offset_of(VertexStream::TexCoord), Some(12));
        assert_eq!(f.offset_of(VertexStream::Color), Some(20));

        let c = VertexFormat::POSITION_COLOR;
        assert_eq!(c.stride(), 28);
        assert_eq!(c.offset_of(VertexStream::Color), Some(12));
        assert!(!c.has(VertexStream::TexCoord));
    }

    #[test]
    fn compare_func_semantics() {
        assert!(CompareFunc::Always.passes(0.0, 1.0));
        assert!(!CompareFunc::Never.passes(1.0, 0.0));
        assert!(CompareFunc::Greater.passes(0.6, 0.5));
        assert!(!CompareFunc::Greater.passes(0.5, 0.5));
        assert!(CompareFunc::GreaterEqual.passes(0.5, 0.5));
    }
}
