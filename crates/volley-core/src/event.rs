//! Outbound notifications and the plain-data snapshots they carry.
//!
//! Every observable state change produces a [`SimEvent`]. Events are
//! fire-and-forget: the core collects them for the caller and routes each
//! one to at most one hook, keyed by `(DefKey, HookKind)`. Snapshots are
//! copies, never references into the pools, so nothing handed across the
//! scripting boundary can dangle.

use glam::Vec2;

use crate::def::EntityKind;
use crate::id::{AmmoTypeId, DefKey, EntityTypeId, ProjectileKindId, WeaponDefId};

// ── snapshots ───────────────────────────────────────────────────

/// Copy of an entity's observable state.
#[derive(Clone, Debug, PartialEq)]
pub struct EntitySnapshot {
    /// Per-spawn serial, unique within a run.
    pub serial: u64,
    /// Entity-type definition.
    pub type_id: EntityTypeId,
    /// Player or NPC.
    pub kind: EntityKind,
    /// Centre of the AABB.
    pub position: Vec2,
    /// Velocity in world units per second.
    pub velocity: Vec2,
    /// Current health.
    pub health: i32,
    /// Maximum health.
    pub max_hp: i32,
    /// Current shield.
    pub shield: f32,
    /// Shield capacity.
    pub shield_max: f32,
    /// Armor percent.
    pub armor: f32,
    /// Remaining plates.
    pub plates: u32,
    /// Movement-spread accumulator in degrees.
    pub movement_spread: f32,
    /// Damage this entity has dealt so far.
    pub damage_dealt: f32,
}

/// Copy of a weapon instance's observable state.
#[derive(Clone, Debug, PartialEq)]
pub struct WeaponSnapshot {
    /// Per-spawn serial, unique within a run.
    pub serial: u64,
    /// Weapon definition.
    pub def: WeaponDefId,
    /// Ammo type currently loaded.
    pub ammo: AmmoTypeId,
    /// Rounds in the magazine.
    pub magazine: u32,
    /// Magazine capacity.
    pub magazine_size: u32,
    /// Reserve ammo.
    pub reserve: u32,
    /// Whether the weapon is jammed.
    pub jammed: bool,
    /// Whether a reload is in progress.
    pub reloading: bool,
    /// Fill progress of the current reload, `0..=1`.
    pub reload_progress: f32,
    /// Recoil-spread accumulator in degrees.
    pub recoil_spread: f32,
}

/// Copy of a projectile's observable state.
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Per-spawn serial, unique within a run.
    pub serial: u64,
    /// Ammo type.
    pub ammo: AmmoTypeId,
    /// Projectile kind named by the firing weapon.
    pub kind: ProjectileKindId,
    /// Centre of the AABB.
    pub position: Vec2,
    /// Velocity in world units per second.
    pub velocity: Vec2,
    /// Damage before mitigation.
    pub damage: f32,
    /// Distance travelled so far.
    pub distance_travelled: f32,
    /// Further entities this projectile may pass through.
    pub pierce_remaining: u32,
}

// ── thresholds ──────────────────────────────────────────────────

/// A one-shot ratio crossing on health or shield.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ThresholdKind {
    /// Health dropped below 50%.
    HpUnder50,
    /// Health dropped below 25%.
    HpUnder25,
    /// Health rose to 100%.
    HpFull,
    /// Shield dropped below 50%.
    ShieldUnder50,
    /// Shield dropped below 25%.
    ShieldUnder25,
    /// Shield rose to 100%.
    ShieldFull,
}

impl ThresholdKind {
    /// The hook this crossing is routed to.
    pub fn hook(self) -> HookKind {
        match self {
            Self::HpUnder50 => HookKind::OnHpUnder50,
            Self::HpUnder25 => HookKind::OnHpUnder25,
            Self::HpFull => HookKind::OnHpFull,
            Self::ShieldUnder50 => HookKind::OnShieldUnder50,
            Self::ShieldUnder25 => HookKind::OnShieldUnder25,
            Self::ShieldFull => HookKind::OnShieldFull,
        }
    }
}

/// Which end of the tick a [`SimEvent::Tick`] belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TickPhase {
    /// Before movement.
    Pre,
    /// After projectiles and damage.
    Post,
}

// ── HookKind ────────────────────────────────────────────────────

/// Every hook name the scripting layer may register against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HookKind {
    /// Per-entity call before movement.
    PreTick,
    /// Per-entity call after damage resolution.
    PostTick,
    /// A projectile left the muzzle.
    OnShoot,
    /// The weapon jammed.
    OnJam,
    /// A fire request found the magazine empty.
    OnOutOfAmmo,
    /// A reload began.
    OnReloadStart,
    /// A reload completed, timed or not.
    OnReloadFinish,
    /// An active reload succeeded.
    OnActiveReload,
    /// An active reload was attempted outside the window.
    OnActiveReloadFailed,
    /// Another active reload was attempted after a failure.
    OnActiveReloadTriedAfterFailed,
    /// The weapon was cleared.
    OnUnjam,
    /// The weapon was cleared but no reserve ammo was left to reload.
    OnUnjamNoAmmo,
    /// An entity took a hit.
    OnDamage,
    /// Health crossed below 50%.
    OnHpUnder50,
    /// Health crossed below 25%.
    OnHpUnder25,
    /// Health reached 100%.
    OnHpFull,
    /// Shield crossed below 50%.
    OnShieldUnder50,
    /// Shield crossed below 25%.
    OnShieldUnder25,
    /// Shield reached 100%.
    OnShieldFull,
    /// The last plate broke.
    OnPlatesDepleted,
    /// Health reached 0.
    OnEntityDeath,
    /// A projectile struck an entity.
    OnProjectileHitEntity,
    /// A projectile struck a tile.
    OnProjectileHitTile,
    /// An entity dashed.
    OnDash,
}

impl HookKind {
    /// All hook kinds.
    pub const ALL: [HookKind; 24] = [
        Self::PreTick,
        Self::PostTick,
        Self::OnShoot,
        Self::OnJam,
        Self::OnOutOfAmmo,
        Self::OnReloadStart,
        Self::OnReloadFinish,
        Self::OnActiveReload,
        Self::OnActiveReloadFailed,
        Self::OnActiveReloadTriedAfterFailed,
        Self::OnUnjam,
        Self::OnUnjamNoAmmo,
        Self::OnDamage,
        Self::OnHpUnder50,
        Self::OnHpUnder25,
        Self::OnHpFull,
        Self::OnShieldUnder50,
        Self::OnShieldUnder25,
        Self::OnShieldFull,
        Self::OnPlatesDepleted,
        Self::OnEntityDeath,
        Self::OnProjectileHitEntity,
        Self::OnProjectileHitTile,
        Self::OnDash,
    ];

    /// The snake_case name used by the scripting layer.
    pub fn name(self) -> &'static str {
        match self {
            Self::PreTick => "tick_pre",
            Self::PostTick => "tick_post",
            Self::OnShoot => "on_shoot",
            Self::OnJam => "on_jam",
            Self::OnOutOfAmmo => "on_out_of_ammo",
            Self::OnReloadStart => "on_reload_start",
            Self::OnReloadFinish => "on_reload_finish",
            Self::OnActiveReload => "on_active_reload",
            Self::OnActiveReloadFailed => "on_active_reload_failed",
            Self::OnActiveReloadTriedAfterFailed => "on_active_reload_tried_after_failed",
            Self::OnUnjam => "on_unjam",
            Self::OnUnjamNoAmmo => "on_unjam_no_ammo",
            Self::OnDamage => "on_damage",
            Self::OnHpUnder50 => "on_hp_under_50",
            Self::OnHpUnder25 => "on_hp_under_25",
            Self::OnHpFull => "on_hp_full",
            Self::OnShieldUnder50 => "on_shield_under_50",
            Self::OnShieldUnder25 => "on_shield_under_25",
            Self::OnShieldFull => "on_shield_full",
            Self::OnPlatesDepleted => "on_plates_depleted",
            Self::OnEntityDeath => "on_entity_death",
            Self::OnProjectileHitEntity => "on_projectile_hit_entity",
            Self::OnProjectileHitTile => "on_projectile_hit_tile",
            Self::OnDash => "on_dash",
        }
    }

    /// Inverse of [`name`](Self::name).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }
}

// ── SimEvent ────────────────────────────────────────────────────

/// A notification emitted by the core.
#[derive(Clone, Debug, PartialEq)]
pub enum SimEvent {
    /// Per-entity tick hook. Dispatched to hooks, never collected.
    Tick {
        /// Before or after the simulation body.
        phase: TickPhase,
        /// The ticking entity.
        entity: EntitySnapshot,
    },
    /// A weapon fired a projectile.
    Shoot {
        /// The weapon after the shot.
        weapon: WeaponSnapshot,
        /// The spawned projectile.
        projectile: ProjectileSnapshot,
    },
    /// A fire roll jammed the weapon.
    Jam {
        /// The weapon after jamming.
        weapon: WeaponSnapshot,
    },
    /// A fire request found the magazine empty.
    OutOfAmmo {
        /// The empty weapon.
        weapon: WeaponSnapshot,
    },
    /// A reload began; any rounds left in the magazine were dropped.
    ReloadStart {
        /// The weapon after ejecting.
        weapon: WeaponSnapshot,
        /// Rounds discarded from the magazine.
        dropped_rounds: u32,
    },
    /// A reload completed.
    ReloadFinish {
        /// The weapon after refilling.
        weapon: WeaponSnapshot,
        /// Whether the reload was completed by an active reload.
        active: bool,
    },
    /// An active reload landed inside the window.
    ActiveReload {
        /// The weapon before refilling.
        weapon: WeaponSnapshot,
    },
    /// An active reload missed the window.
    ActiveReloadFailed {
        /// The reloading weapon.
        weapon: WeaponSnapshot,
    },
    /// An active reload was attempted again after a miss.
    ActiveReloadTriedAfterFailed {
        /// The reloading weapon.
        weapon: WeaponSnapshot,
    },
    /// Unjam progress reached 1.
    Unjammed {
        /// The weapon after clearing, before any follow-up reload.
        weapon: WeaponSnapshot,
    },
    /// Unjam completed but there was no reserve to reload from.
    UnjamNoAmmo {
        /// The cleared weapon.
        weapon: WeaponSnapshot,
    },
    /// An entity took a hit.
    Damage {
        /// The target after mitigation.
        target: EntitySnapshot,
        /// Amount removed from the shield.
        shield_absorbed: f32,
        /// Whether a plate negated the remainder.
        plate_consumed: bool,
        /// Health removed.
        health_lost: i32,
    },
    /// A health or shield ratio crossed a threshold.
    Threshold {
        /// The entity after the change.
        entity: EntitySnapshot,
        /// Which threshold.
        kind: ThresholdKind,
    },
    /// The last plate broke.
    PlatesDepleted {
        /// The entity after losing the plate.
        entity: EntitySnapshot,
    },
    /// Health reached 0.
    Death {
        /// The entity at the moment of death.
        entity: EntitySnapshot,
    },
    /// A projectile struck an entity.
    ProjectileHitEntity {
        /// The projectile at impact.
        projectile: ProjectileSnapshot,
        /// The entity before damage was applied.
        entity: EntitySnapshot,
    },
    /// A projectile struck a blocking or out-of-bounds tile.
    ProjectileHitTile {
        /// The projectile at impact.
        projectile: ProjectileSnapshot,
        /// Column and row of the tile.
        tile: (i32, i32),
    },
    /// An entity started a dash.
    Dash {
        /// The entity at dash start.
        entity: EntitySnapshot,
    },
}

impl SimEvent {
    /// The hook this event is routed to.
    pub fn hook(&self) -> HookKind {
        match self {
            Self::Tick {
                phase: TickPhase::Pre,
                ..
            } => HookKind::PreTick,
            Self::Tick {
                phase: TickPhase::Post,
                ..
            } => HookKind::PostTick,
            Self::Shoot { .. } => HookKind::OnShoot,
            Self::Jam { .. } => HookKind::OnJam,
            Self::OutOfAmmo { .. } => HookKind::OnOutOfAmmo,
            Self::ReloadStart { .. } => HookKind::OnReloadStart,
            Self::ReloadFinish { .. } => HookKind::OnReloadFinish,
            Self::ActiveReload { .. } => HookKind::OnActiveReload,
            Self::ActiveReloadFailed { .. } => HookKind::OnActiveReloadFailed,
            Self::ActiveReloadTriedAfterFailed { .. } => HookKind::OnActiveReloadTriedAfterFailed,
            Self::Unjammed { .. } => HookKind::OnUnjam,
            Self::UnjamNoAmmo { .. } => HookKind::OnUnjamNoAmmo,
            Self::Damage { .. } => HookKind::OnDamage,
            Self::Threshold { kind, .. } => kind.hook(),
            Self::PlatesDepleted { .. } => HookKind::OnPlatesDepleted,
            Self::Death { .. } => HookKind::OnEntityDeath,
            Self::ProjectileHitEntity { .. } => HookKind::OnProjectileHitEntity,
            Self::ProjectileHitTile { .. } => HookKind::OnProjectileHitTile,
            Self::Dash { .. } => HookKind::OnDash,
        }
    }

    /// The definition whose hooks receive this event.
    pub fn def_key(&self) -> DefKey {
        match self {
            Self::Shoot { weapon, .. }
            | Self::Jam { weapon }
            | Self::OutOfAmmo { weapon }
            | Self::ReloadStart { weapon, .. }
            | Self::ReloadFinish { weapon, .. }
            | Self::ActiveReload { weapon }
            | Self::ActiveReloadFailed { weapon }
            | Self::ActiveReloadTriedAfterFailed { weapon }
            | Self::Unjammed { weapon }
            | Self::UnjamNoAmmo { weapon } => DefKey::Weapon(weapon.def),
            Self::Tick { entity, .. }
            | Self::Threshold { entity, .. }
            | Self::PlatesDepleted { entity }
            | Self::Death { entity }
            | Self::Dash { entity } => DefKey::Entity(entity.type_id),
            Self::Damage { target, .. } => DefKey::Entity(target.type_id),
            Self::ProjectileHitEntity { projectile, .. }
            | Self::ProjectileHitTile { projectile, .. } => DefKey::Ammo(projectile.ammo),
        }
    }
}
