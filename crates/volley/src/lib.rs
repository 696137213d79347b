//! Volley: a tile-based action combat and physics core.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! Volley sub-crates. For most users, adding `volley` as a single dependency is
//! sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use volley::prelude::*;
//!
//! let ball = AmmoTypeId(1);
//! let rifle = WeaponDefId(1);
//! let grunt = EntityTypeId(1);
//! let defs = Definitions::new()
//!     .with_ammo(ball, AmmoDef::default())
//!     .with_entity(grunt, EntityTypeDef::default())
//!     .with_weapon(
//!         rifle,
//!         WeaponDef {
//!             deviation: 0.0,
//!             recoil: 0.0,
//!             ammo: [AmmoWeight { ammo: ball, weight: 1.0 }].into_iter().collect(),
//!             ..WeaponDef::default()
//!         },
//!     );
//!
//! let grid = TileGrid::new(32, 8, 1.0).unwrap();
//! let config = SimConfig { seed: Some(42), ..SimConfig::default() };
//! let mut sim = SimulationContext::new(config, defs, grid).unwrap();
//!
//! let shooter = sim.spawn_entity(grunt, Vec2::new(2.5, 4.5)).unwrap();
//! let target = sim.spawn_entity(grunt, Vec2::new(8.5, 4.5)).unwrap();
//! let weapon = sim.spawn_weapon(rifle).unwrap();
//! sim.equip_weapon(shooter, weapon).unwrap();
//!
//! let report = sim.step(&[(shooter, ControlSignals::firing(Vec2::X))]);
//! assert_eq!(report.count(HookKind::OnShoot), 1);
//!
//! for _ in 0..30 {
//!     sim.step(&[]);
//! }
//! assert_eq!(sim.entity(target).unwrap().health, 90);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`arena`] | `volley-arena` | Versioned handles and the fixed-capacity slot pool |
//! | [`types`] | `volley-core` | IDs, definitions, control signals, events, errors |
//! | [`space`] | `volley-space` | Tile grid and swept axis collision |
//! | [`engine`] | `volley-engine` | Simulation context, weapons, projectiles, damage |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Versioned handles and slot pools (`volley-arena`).
pub use volley_arena as arena;

/// Core types (`volley-core`).
///
/// Definitions and their [`types::Definitions`] registry, per-tick
/// [`types::ControlSignals`], and the [`types::SimEvent`] notifications.
pub use volley_core as types;

/// Tile grid and collision (`volley-space`).
///
/// [`space::TileGrid`] holds the room; [`space::AxisCollisionResolver`]
/// moves entities and projectiles through it.
pub use volley_space as space;

/// The simulation (`volley-engine`).
///
/// [`engine::SimulationContext`] owns every pool and runs the fixed-step
/// tick. The stage modules ([`engine::weapon`], [`engine::projectile`],
/// [`engine::damage`]) are usable on their own.
pub use volley_engine as engine;

/// Common imports for typical Volley usage.
///
/// ```rust
/// use volley::prelude::*;
/// ```
pub mod prelude {
    // Handles
    pub use volley_arena::{Handle, SlotPool};

    // Definitions and inputs
    pub use volley_core::{
        AmmoDef, AmmoTypeId, AmmoWeight, ControlSignals, DefKey, Definitions, EntityKind,
        EntityTypeDef, EntityTypeId, FireMode, RawDef, Vec2, WeaponDef, WeaponDefId,
    };

    // Notifications and errors
    pub use volley_core::{HookKind, SimEvent, SpawnError, ThresholdKind};

    // Space
    pub use volley_space::{TileFlags, TileGrid};

    // Engine
    pub use volley_engine::{
        ConfigError, EntityHandle, ProjectileHandle, ProjectileSpawn, SimConfig,
        SimulationContext, StepMetrics, StepReport, WeaponHandle,
    };
}
