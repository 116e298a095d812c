use anyhow::{Context, Result};

/// Initialization parameters for the wgpu backend.
///
/// Keep this structure small. Add flags only when a concrete adapter or
/// platform requirement exists.
#[derive(Debug, Clone)]
pub struct WgpuInit {
    /// Backends wgpu may pick an adapter from.
    pub backends: wgpu::Backends,

    /// Adapter preference; high performance is appropriate for a render loop.
    pub power_preference: wgpu::PowerPreference,

    /// Forces a software adapter (useful on CI machines without a GPU).
    pub force_fallback_adapter: bool,

    /// Limits requested from the device.
    ///
    /// Downlevel defaults keep the backend usable on GLES-class hardware.
    pub required_limits: wgpu::Limits,
}

impl Default for WgpuInit {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            power_preference: wgpu::PowerPreference::HighPerformance,
            force_fallback_adapter: false,
            required_limits: wgpu::Limits::downlevel_defaults(),
        }
    }
}

/// Requests an adapter and a device without a presentation surface.
pub(super) async fn request_device(
    init: &WgpuInit,
) -> Result<(wgpu::Adapter, wgpu::Device, wgpu::Queue)> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: init.backends,
        ..Default::default()
    });

    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: init.power_preference,
            compatible_surface: None,
            force_fallback_adapter: init.force_fallback_adapter,
        })
        .await
        .context("failed to find a suitable GPU adapter")?;

    let (device, queue) = adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: Some("strata device"),
            required_features: wgpu::Features::empty(),
            required_limits: init.required_limits.clone(),
            experimental_features: wgpu::ExperimentalFeatures::disabled(),
            memory_hints: wgpu::MemoryHints::Performance,
            trace: wgpu::Trace::Off,
        })
        .await
        .context("failed to create wgpu device/queue")?;

    let info = adapter.get_info();
    log::info!("wgpu adapter: {} ({:?})", info.name, info.backend);

    Ok((adapter, device, queue))
}
