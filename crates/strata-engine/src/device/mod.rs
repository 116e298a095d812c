//! Graphics device seam.
//!
//! This module is responsible for:
//! - the [`Device`] trait the render manager drives
//! - handles, enums, caps and stats shared with backends
//! - the headless [`RecordingDevice`] and the wgpu backend
//! - backend selection at startup

mod backend;
mod caps;
mod error;
mod gpu;
mod recording;
mod types;

use anyhow::{Context, Result};

use crate::config::RenderConfig;

pub use backend::Device;
pub use caps::{Caps, MAX_TEXTURE_UNITS, Stats};
pub use error::{verify, DeviceError, DeviceResult};
pub use gpu::{WgpuDevice, WgpuInit};
pub use recording::{DeviceCall, Journal, RecordingDevice};
pub use types::{
    BlendFactor, BuiltinShader, Capability, CompareFunc, CullFace, IndexFormat, IndexSource,
    PrimitiveType, RenderDataHandle, RendererKind, ShaderHandle, TargetHandle, TextureHandle,
    VertexFormat, VertexStream,
};

/// Creates the backend selected by `kind`, sized for `config`'s framebuffer.
pub fn create_device(kind: RendererKind, config: &RenderConfig) -> Result<Box<dyn Device>> {
    match kind {
        RendererKind::Headless => Ok(Box::new(RecordingDevice::new())),
        RendererKind::Wgpu => {
            let device = WgpuDevice::new(
                &WgpuInit::default(),
                config.framebuffer_width,
                config.framebuffer_height,
            )
            .context("failed to create wgpu device")?;
            Ok(Box::new(device))
        }
    }
}
