use crate::device::ShaderHandle;

/// A compiled backend program the manager can hold on to.
///
/// Compilation happens elsewhere; this only names the backend handle.
/// Shared as `Arc<Shader>`, released when the manager's reference is replaced.
#[derive(Debug, PartialEq, Eq)]
pub struct Shader {
    name: String,
    handle: ShaderHandle,
}

impl Shader {
    pub fn new(name: impl Into<String>, handle: ShaderHandle) -> Self {
        Self {
            name: name.into(),
            handle,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handle(&self) -> ShaderHandle {
        self.handle
    }
}
