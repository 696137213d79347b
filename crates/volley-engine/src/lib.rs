//! Simulation context for the Volley combat core.
//!
//! [`SimulationContext`] owns the entity, projectile, and weapon pools, the
//! tile grid, and the hook table, and advances them with a fixed timestep.
//! The stage modules are usable on their own:
//!
//! - [`entity`]: the [`EntityStore`] of versioned entities
//! - [`movement`]: control-driven walking, dashing, and spread
//! - [`weapon`]: the per-weapon fire, reload, and jam state machine
//! - [`projectile`]: substepped projectile motion and hit detection
//! - [`damage`]: shield, plate, armor, and health resolution
//! - [`hooks`]: routing of [`SimEvent`](volley_core::SimEvent)s to callbacks

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod context;
pub mod damage;
pub mod entity;
pub mod hooks;
pub mod metrics;
pub mod movement;
pub mod projectile;
pub mod weapon;

pub use config::{ConfigError, SimConfig};
pub use context::{SimulationContext, StepReport};
pub use damage::{DamageOutcome, Hit};
pub use entity::{Entity, EntityHandle, EntityStore};
pub use hooks::{EventSink, HookFn, HookTable, Notifier};
pub use metrics::StepMetrics;
pub use movement::{DashState, MotionStats};
pub use projectile::{
    HitHandler, Projectile, ProjectileHandle, ProjectileSimulator, ProjectileSpawn,
    ProjectileStepStats,
};
pub use weapon::{
    ActiveReloadWindow, ReloadPhase, ReloadState, TriggerOutcome, WeaponHandle, WeaponInstance,
};
