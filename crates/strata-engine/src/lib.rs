//! Strata engine crate.
//!
//! This crate owns the render-state manager and the device backends it
//! drives, plus the logging and configuration pieces shared with the studio.

pub mod config;
pub mod coords;
pub mod core;
pub mod device;
pub mod logging;
pub mod render;
pub mod sync;

pub use config::RenderConfig;
pub use device::{Device, RendererKind};
pub use render::RenderManager;
