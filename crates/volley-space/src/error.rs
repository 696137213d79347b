//! Error types for tile-grid construction.

use std::fmt;

/// Errors arising from tile-grid construction.
#[derive(Debug, Clone, PartialEq)]
pub enum SpaceError {
    /// Width or height is zero.
    EmptyGrid,
    /// Tile edge length is zero, negative, or not finite.
    InvalidTileSize {
        /// The rejected tile size.
        value: f32,
    },
    /// The flag buffer does not match `width * height`.
    FlagCountMismatch {
        /// `width * height`.
        expected: usize,
        /// Length of the supplied buffer.
        actual: usize,
    },
}

impl fmt::Display for SpaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyGrid => write!(f, "tile grid must have at least one tile"),
            Self::InvalidTileSize { value } => {
                write!(f, "tile size must be finite and positive, got {value}")
            }
            Self::FlagCountMismatch { expected, actual } => {
                write!(f, "expected {expected} tile flags, got {actual}")
            }
        }
    }
}

impl std::error::Error for SpaceError {}
