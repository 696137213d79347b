//! Error types shared across the Volley workspace.
//!
//! Everything here is a *soft* failure: the caller skips the operation
//! and the simulation keeps running.

use std::error::Error;
use std::fmt;

use crate::id::DefKey;

/// Which object pool a [`SpawnError::PoolExhausted`] refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PoolKind {
    /// The entity store.
    Entities,
    /// The projectile pool.
    Projectiles,
    /// The weapon-instance pool.
    Weapons,
}

impl fmt::Display for PoolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entities => write!(f, "entities"),
            Self::Projectiles => write!(f, "projectiles"),
            Self::Weapons => write!(f, "weapons"),
        }
    }
}

/// Errors from the programmatic spawn surface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SpawnError {
    /// Every slot of the pool is active.
    PoolExhausted {
        /// The pool that is full.
        pool: PoolKind,
    },
    /// The requested definition is not registered.
    UnknownDefinition {
        /// The missing definition.
        key: DefKey,
    },
    /// A handle passed in refers to a freed slot.
    StaleHandle {
        /// What the handle was supposed to name.
        what: PoolKind,
    },
}

impl fmt::Display for SpawnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PoolExhausted { pool } => write!(f, "{pool} pool exhausted"),
            Self::UnknownDefinition { key } => write!(f, "unknown definition {key}"),
            Self::StaleHandle { what } => write!(f, "stale handle into {what} pool"),
        }
    }
}

impl Error for SpawnError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::WeaponDefId;

    #[test]
    fn display_mentions_pool() {
        let e = SpawnError::PoolExhausted {
            pool: PoolKind::Projectiles,
        };
        assert_eq!(e.to_string(), "projectiles pool exhausted");
    }

    #[test]
    fn display_mentions_definition() {
        let e = SpawnError::UnknownDefinition {
            key: DefKey::Weapon(WeaponDefId(9)),
        };
        assert_eq!(e.to_string(), "unknown definition weapon:9");
    }
}
