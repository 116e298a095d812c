//! Coordinate and geometry types shared by the render manager and backends.
//!
//! Canonical CPU space:
//! - virtual pixels (mapped to physical pixels by the view-mapping transform)
//! - origin top-left
//! - +X right, +Y down

mod color;
mod rect;
mod vec2;
mod viewport;

pub use color::ColorRgba;
pub use rect::Rect;
pub use vec2::Vec2;
pub use viewport::{ScissorRect, Viewport};
