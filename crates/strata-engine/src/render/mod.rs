//! Render-state management.
//!
//! [`RenderManager`] sits between drawing code and a [`crate::device::Device`]:
//! it keeps the requested device state apart from the applied one and only
//! issues device calls for axes that changed, maintains the draw / mapping
//! transforms and the clip and render target stacks, and forwards draws to
//! the current [`RenderEffect`].
//!
//! Convention:
//! - draw coordinates are virtual pixels (top-left origin, +Y down)
//! - matrices are row-vector (`v' = v * M`)

mod cached;
mod clip;
mod effect;
mod manager;
pub mod matrix;
mod orientation;
mod shader;
mod state;
mod target;
mod transform;

pub use clip::ClipStack;
pub use effect::{
    BuiltinEffects, EffectCtx, FlatColorEffect, RenderEffect, TextureMulColorAlphaTestEffect,
    TextureMulColorEffect,
};
pub use manager::RenderManager;
pub use matrix::{MatrixCache, MatrixSlot, UniformMatrixSlot};
pub use orientation::{map_rect_to_viewport, orientation_matrix, RenderOrientation};
pub use shader::Shader;
pub use state::RenderState;
pub use target::{RenderTarget, RenderTargetEntry};
pub use transform::{DrawTransform, TransformStack};
