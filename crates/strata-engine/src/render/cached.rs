/// Last value pushed to the device for one state axis.
///
/// `None` means unknown: the next request is always applied, whatever its
/// value. Invalidating every axis is how a full state re-sync is forced.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Cached<T>(Option<T>);

impl<T: PartialEq + Clone> Cached<T> {
    pub fn new(initial: T) -> Self {
        Cached(Some(initial))
    }

    pub fn invalid() -> Self {
        Cached(None)
    }

    pub fn invalidate(&mut self) {
        self.0 = None;
    }

    pub fn get(&self) -> Option<&T> {
        self.0.as_ref()
    }

    /// Whether pushing `value` would change the device.
    pub fn is_invalid(&self, value: &T) -> bool {
        self.0.as_ref() != Some(value)
    }

    /// Records `value` as applied; returns `true` if the device must be told.
    pub fn update(&mut self, value: &T) -> bool {
        if self.is_invalid(value) {
            self.0 = Some(value.clone());
            true
        } else {
            false
        }
    }
}
