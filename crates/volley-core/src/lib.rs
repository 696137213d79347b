//! Core types for the Volley combat core.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by every other Volley crate: definition IDs,
//! geometry, the read-only definitions supplied by the scripting layer,
//! per-tick control signals, notification events, and error types.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod command;
pub mod def;
pub mod error;
pub mod event;
pub mod geom;
pub mod id;
pub mod raw;
pub mod registry;

pub use command::ControlSignals;
pub use def::{AmmoDef, AmmoWeight, EntityKind, EntityTypeDef, FireMode, WeaponDef};
pub use error::{PoolKind, SpawnError};
pub use event::{
    EntitySnapshot, HookKind, ProjectileSnapshot, SimEvent, ThresholdKind, TickPhase,
    WeaponSnapshot,
};
pub use geom::{Aabb, Axis};
pub use id::{AmmoTypeId, DefKey, EntityTypeId, ProjectileKindId, TickId, WeaponDefId};
pub use raw::{DefValue, RawDef};
pub use registry::Definitions;

/// Re-exported so downstream crates agree on a single vector type.
pub use glam::Vec2;
