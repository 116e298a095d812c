//! Platform-facing contracts.
//!
//! The render manager reads screen geometry and drives the hardware cursor
//! through these traits; the platform layer implements them.

mod cursor;
mod metrics;

pub use cursor::Cursor;
pub use metrics::{ScreenGeometry, ScreenMetrics};
