//! Serialization of render state between the render thread and workers.

mod render_lock;

pub use render_lock::{NonMainGuard, RenderLock, RenderLockGuard};
