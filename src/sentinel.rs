//! Reserved-key guard and the dedicated slot that stores its value.

/// The one key that never enters the ordinary store.
///
/// Prototype-based hosts treat this name as a link to shared ancestor
/// state. `SafeMap` keeps it in a slot of its own and always reports it
/// first during iteration.
pub const RESERVED_KEY: &str = "__proto__";

/// Returns true if `key` must be routed to the sentinel slot.
#[inline]
pub fn is_reserved(key: &str) -> bool {
    key == RESERVED_KEY
}

/// Presence flag and value for the reserved key. `Some` means set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Sentinel<V> {
    value: Option<V>,
}

impl<V> Sentinel<V> {
    pub(crate) const fn new() -> Self {
        Self { value: None }
    }

    #[inline]
    pub(crate) fn is_set(&self) -> bool {
        self.value.is_some()
    }

    #[inline]
    pub(crate) fn get(&self) -> Option<&V> {
        self.value.as_ref()
    }

    #[inline]
    pub(crate) fn get_mut(&mut self) -> Option<&mut V> {
        self.value.as_mut()
    }

    pub(crate) fn set(&mut self, value: V) -> Option<V> {
        self.value.replace(value)
    }

    /// Unset the slot, handing back the value it held.
    pub(crate) fn take(&mut self) -> Option<V> {
        self.value.take()
    }
}

impl<V> Default for Sentinel<V> {
    fn default() -> Self {
        Self::new()
    }
}
