use super::types::{RenderDataHandle, ShaderHandle, TargetHandle, TextureHandle, VertexStream};

/// Failure reported by a device backend call.
///
/// The render manager logs these through [`verify`] and carries on.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("unknown texture {0:?}")]
    UnknownTexture(TextureHandle),

    #[error("unknown shader {0:?}")]
    UnknownShader(ShaderHandle),

    #[error("unknown render data {0:?}")]
    UnknownRenderData(RenderDataHandle),

    #[error("unknown render target {0:?}")]
    UnknownTarget(TargetHandle),

    #[error("texture unit {unit} exceeds the device limit of {limit}")]
    TextureUnitOutOfRange { unit: usize, limit: usize },

    #[error("draw issued without a bound shader")]
    NoShaderBound,

    #[error("draw issued without bound render data")]
    NoRenderDataBound,

    #[error("vertex stream {0:?} is enabled but missing from the bound render data")]
    MissingStream(VertexStream),

    #[error("index range exceeds the supplied data ({needed} bytes needed, {available} available)")]
    IndexRange { needed: u64, available: u64 },

    #[error("vertices {first}..{end} exceed the {available} in the bound render data")]
    VertexRange { first: u32, end: u64, available: u64 },

    #[error("index offset {offset} is not aligned to the index size {size}")]
    MisalignedIndices { offset: u64, size: u64 },

    #[error("bound render data has no index buffer")]
    NoIndexBuffer,

    #[error("unsupported by this backend: {0}")]
    Unsupported(&'static str),
}

pub type DeviceResult = Result<(), DeviceError>;

/// Logs a failed device call and carries on.
///
/// Returns whether the call succeeded so callers can skip dependent work.
pub fn verify(op: &str, result: DeviceResult) -> bool {
    match result {
        Ok(()) => true,
        Err(err) => {
            log::error!("device call {op} failed: {err}");
            false
        }
    }
}
