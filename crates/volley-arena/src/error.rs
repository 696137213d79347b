//! Arena-specific error types.

use std::error::Error;
use std::fmt;

/// Errors that can occur while constructing a pool.
///
/// Pool construction is the only startup-fatal failure in the core;
/// exhaustion at runtime is reported as `None` from
/// [`SlotPool::allocate`](crate::SlotPool::allocate), not as an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// A pool was requested with zero slots.
    ZeroCapacity,
    /// More slots were requested than a handle index can address.
    CapacityTooLarge {
        /// Number of slots requested.
        requested: usize,
        /// Largest supported capacity.
        max: usize,
    },
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroCapacity => write!(f, "pool capacity must be at least 1"),
            Self::CapacityTooLarge { requested, max } => {
                write!(f, "pool capacity {requested} exceeds maximum {max}")
            }
        }
    }
}

impl Error for ArenaError {}
