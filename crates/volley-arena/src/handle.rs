//! Versioned handles into a [`SlotPool`](crate::SlotPool).
//!
//! A [`Handle`] encodes a slot index and the generation that slot had when
//! the handle was issued. Validity is an O(1) comparison against the
//! slot's current generation; no lookup table is involved.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Typed, generation-checked reference to a pooled `T`.
///
/// The type parameter only prevents mixing handles from different pools;
/// a handle never owns or borrows a `T`.
#[must_use]
pub struct Handle<T> {
    /// Slot index within the pool.
    pub(crate) index: u32,
    /// Slot generation when this handle was issued.
    pub(crate) generation: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self {
            index,
            generation,
            _marker: PhantomData,
        }
    }

    /// Slot index within the pool.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Generation this handle was issued with.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Rebuild a handle from its raw parts.
    ///
    /// Useful for callers that stored `(index, generation)` across an
    /// external boundary. The result is validated on every lookup like any
    /// other handle.
    pub fn from_raw_parts(index: u32, generation: u32) -> Self {
        Self::new(index, generation)
    }
}

// Manual impls so `T` needs no bounds.

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.generation.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("index", &self.index)
            .field("generation", &self.generation)
            .finish()
    }
}

impl<T> fmt::Display for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}
