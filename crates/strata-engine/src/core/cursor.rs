use std::fmt::Debug;

/// A platform cursor image the render manager can make current.
///
/// Held as `Arc<dyn Cursor>`; the manager releases its reference when a new
/// cursor replaces it.
pub trait Cursor: Debug + Send + Sync {
    /// Makes this cursor the hardware cursor.
    fn apply(&self);
}
