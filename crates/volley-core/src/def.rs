//! Read-only definitions supplied by the external definition layer.
//!
//! Definitions are plain data. The core never mutates them after they are
//! registered; instances (weapons, entities, projectiles) copy what they
//! need at spawn time. Every definition has a [`Default`] and a
//! `sanitized()` pass that clamps each field into its legal range, so a
//! half-broken definition still yields a playable object.

use glam::Vec2;
use smallvec::SmallVec;

use crate::id::{AmmoTypeId, ProjectileKindId};

// ── FireMode ────────────────────────────────────────────────────

/// Trigger semantics for a weapon.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FireMode {
    /// Fires every tick the trigger is held (subject to rate of fire).
    #[default]
    Auto,
    /// Fires once per trigger press edge.
    Single,
    /// A press edge arms `burst_count` shots that fire on their own timer.
    Burst,
}

impl FireMode {
    /// Parse the lowercase name used by the definition layer.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "auto" => Some(Self::Auto),
            "single" | "semi" => Some(Self::Single),
            "burst" => Some(Self::Burst),
            _ => None,
        }
    }
}

// ── AmmoWeight ──────────────────────────────────────────────────

/// One entry of a weapon's compatible-ammo table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AmmoWeight {
    /// The compatible ammo type.
    pub ammo: AmmoTypeId,
    /// Relative selection weight. Non-positive weights are never picked.
    pub weight: f32,
}

// ── WeaponDef ───────────────────────────────────────────────────

/// A weapon definition.
///
/// Angles are in degrees, durations in seconds, and the active-reload
/// values are fractions of the fill phase.
#[derive(Clone, Debug, PartialEq)]
pub struct WeaponDef {
    /// Display name, used only in logs.
    pub name: String,
    /// Base damage per projectile before the ammo multiplier.
    pub damage: f32,
    /// Rate of fire. `0` disables the inter-shot cooldown.
    pub rounds_per_minute: f32,
    /// Base cone of fire.
    pub deviation: f32,
    /// Spread added per shot.
    pub recoil: f32,
    /// Upper bound of the recoil accumulator.
    pub recoil_max: f32,
    /// Recoil decay per second while not firing.
    pub control: f32,
    /// Rounds per magazine.
    pub magazine_size: u32,
    /// Maximum reserve ammo; new instances start full.
    pub reserve_capacity: u32,
    /// Trigger semantics.
    pub fire_mode: FireMode,
    /// Shots per burst in [`FireMode::Burst`].
    pub burst_count: u32,
    /// Cadence of burst shots.
    pub burst_rpm: f32,
    /// Full reload duration, eject phase included.
    pub reload_time: f32,
    /// Duration of the eject phase.
    pub eject_time: f32,
    /// Base centre of the active-reload window.
    pub active_reload_center: f32,
    /// Base half-size of the active-reload window.
    pub active_reload_size: f32,
    /// Symmetric jitter applied to centre and half-size per reload.
    pub active_reload_variance: f32,
    /// Probability in `[0, 1]` that a fire jams.
    pub jam_chance: f32,
    /// Compatible ammo types and their selection weights.
    pub ammo: SmallVec<[AmmoWeight; 4]>,
    /// Projectile kind passed through to snapshots.
    pub projectile_kind: ProjectileKindId,
}

impl Default for WeaponDef {
    fn default() -> Self {
        Self {
            name: String::from("weapon"),
            damage: 10.0,
            rounds_per_minute: 600.0,
            deviation: 2.0,
            recoil: 1.0,
            recoil_max: 10.0,
            control: 20.0,
            magazine_size: 30,
            reserve_capacity: 90,
            fire_mode: FireMode::Auto,
            burst_count: 3,
            burst_rpm: 900.0,
            reload_time: 2.0,
            eject_time: 0.3,
            active_reload_center: 0.5,
            active_reload_size: 0.08,
            active_reload_variance: 0.0,
            jam_chance: 0.0,
            ammo: SmallVec::new(),
            projectile_kind: ProjectileKindId(0),
        }
    }
}

impl WeaponDef {
    /// Seconds between consecutive shots, or `0` when unlimited.
    pub fn fire_interval(&self) -> f32 {
        if self.rounds_per_minute > 0.0 {
            60.0 / self.rounds_per_minute
        } else {
            0.0
        }
    }

    /// Seconds between consecutive burst shots.
    pub fn burst_interval(&self) -> f32 {
        if self.burst_rpm > 0.0 {
            60.0 / self.burst_rpm
        } else {
            0.0
        }
    }

    /// Clamp every field into its legal range.
    pub fn sanitized(mut self) -> Self {
        let d = Self::default();
        self.damage = finite_at_least(self.damage, 0.0, d.damage);
        self.rounds_per_minute = finite_at_least(self.rounds_per_minute, 0.0, d.rounds_per_minute);
        self.deviation = finite_at_least(self.deviation, 0.0, d.deviation);
        self.recoil = finite_at_least(self.recoil, 0.0, d.recoil);
        self.recoil_max = finite_at_least(self.recoil_max, 0.0, d.recoil_max);
        self.control = finite_at_least(self.control, 0.0, d.control);
        self.magazine_size = self.magazine_size.max(1);
        self.burst_count = self.burst_count.max(1);
        self.burst_rpm = finite_at_least(self.burst_rpm, 0.0, d.burst_rpm);
        self.reload_time = finite_at_least(self.reload_time, 0.0, d.reload_time);
        self.eject_time = finite_at_least(self.eject_time, 0.0, d.eject_time).min(self.reload_time);
        self.active_reload_center = unit_or(self.active_reload_center, d.active_reload_center);
        self.active_reload_size = unit_or(self.active_reload_size, d.active_reload_size).min(0.5);
        self.active_reload_variance = unit_or(self.active_reload_variance, 0.0);
        self.jam_chance = unit_or(self.jam_chance, 0.0);
        for entry in &mut self.ammo {
            entry.weight = finite_at_least(entry.weight, 0.0, 0.0);
        }
        self
    }
}

// ── AmmoDef ─────────────────────────────────────────────────────

/// An ammo definition: everything a projectile needs besides its owner.
#[derive(Clone, Debug, PartialEq)]
pub struct AmmoDef {
    /// Display name, used only in logs.
    pub name: String,
    /// Multiplier applied to the weapon's base damage.
    pub damage_mult: f32,
    /// Percent of target armor ignored, `0..=100`.
    pub armor_pen: f32,
    /// Multiplier applied to damage dealt against shields.
    pub shield_mult: f32,
    /// Maximum travel distance; `0` means unlimited.
    pub range: f32,
    /// Travel distance at which falloff begins.
    pub falloff_start: f32,
    /// Travel distance at which falloff bottoms out.
    pub falloff_end: f32,
    /// Lower bound of the falloff multiplier.
    pub falloff_min: f32,
    /// Additional entities a projectile may pass through.
    pub pierce: u32,
    /// Muzzle speed in world units per second.
    pub speed: f32,
    /// Edge length of the projectile's square AABB.
    pub size: f32,
    /// Collision substeps per tick; `0` uses the simulation default.
    pub substeps: u32,
}

impl Default for AmmoDef {
    fn default() -> Self {
        Self {
            name: String::from("ammo"),
            damage_mult: 1.0,
            armor_pen: 0.0,
            shield_mult: 1.0,
            range: 0.0,
            falloff_start: 0.0,
            falloff_end: 0.0,
            falloff_min: 1.0,
            pierce: 0,
            speed: 20.0,
            size: 0.2,
            substeps: 0,
        }
    }
}

impl AmmoDef {
    /// Clamp every field into its legal range.
    pub fn sanitized(mut self) -> Self {
        let d = Self::default();
        self.damage_mult = finite_at_least(self.damage_mult, 0.0, d.damage_mult);
        self.armor_pen = if self.armor_pen.is_finite() {
            self.armor_pen.clamp(0.0, 100.0)
        } else {
            d.armor_pen
        };
        self.shield_mult = finite_at_least(self.shield_mult, 0.0, d.shield_mult);
        self.range = finite_at_least(self.range, 0.0, d.range);
        self.falloff_start = finite_at_least(self.falloff_start, 0.0, d.falloff_start);
        self.falloff_end = finite_at_least(self.falloff_end, 0.0, d.falloff_end);
        self.falloff_min = unit_or(self.falloff_min, d.falloff_min);
        // A stationary round would never reach its range limit.
        self.speed = if self.speed.is_finite() && self.speed > 0.0 {
            self.speed
        } else {
            d.speed
        };
        self.size = finite_at_least(self.size, 0.0, d.size);
        self
    }
}

// ── EntityTypeDef ───────────────────────────────────────────────

/// Whether an entity is player-controlled.
///
/// Player entities are never deactivated by the damage pipeline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// Player-controlled; survives at 0 health.
    Player,
    /// Everything else; removed on death.
    #[default]
    Npc,
}

/// An entity-type definition.
#[derive(Clone, Debug, PartialEq)]
pub struct EntityTypeDef {
    /// Display name, used only in logs.
    pub name: String,
    /// Player or NPC.
    pub kind: EntityKind,
    /// Starting and maximum health.
    pub max_hp: i32,
    /// Shield capacity; `0` disables the shield stage.
    pub shield_max: f32,
    /// Shield regenerated per second once the delay has elapsed.
    pub shield_regen: f32,
    /// Seconds after the last hit before shield regen resumes.
    pub shield_regen_delay: f32,
    /// Armor percent.
    pub armor: f32,
    /// Starting plate count.
    pub plates: u32,
    /// AABB extent.
    pub size: Vec2,
    /// Walking speed in world units per second.
    pub move_speed: f32,
    /// Speed while dashing.
    pub dash_speed: f32,
    /// Length of a dash in seconds.
    pub dash_duration: f32,
    /// Seconds between dashes.
    pub dash_cooldown: f32,
    /// Movement spread gained per second at full speed.
    pub movement_spread_gain: f32,
    /// Upper bound of the movement-spread accumulator.
    pub movement_spread_max: f32,
    /// Movement spread lost per second while standing still.
    pub movement_spread_decay: f32,
}

impl Default for EntityTypeDef {
    fn default() -> Self {
        Self {
            name: String::from("entity"),
            kind: EntityKind::Npc,
            max_hp: 100,
            shield_max: 0.0,
            shield_regen: 0.0,
            shield_regen_delay: 3.0,
            armor: 0.0,
            plates: 0,
            size: Vec2::splat(0.8),
            move_speed: 5.0,
            dash_speed: 15.0,
            dash_duration: 0.15,
            dash_cooldown: 1.0,
            movement_spread_gain: 10.0,
            movement_spread_max: 8.0,
            movement_spread_decay: 20.0,
        }
    }
}

impl EntityTypeDef {
    /// Clamp every field into its legal range.
    pub fn sanitized(mut self) -> Self {
        let d = Self::default();
        self.max_hp = self.max_hp.max(1);
        self.shield_max = finite_at_least(self.shield_max, 0.0, d.shield_max);
        self.shield_regen = finite_at_least(self.shield_regen, 0.0, d.shield_regen);
        self.shield_regen_delay =
            finite_at_least(self.shield_regen_delay, 0.0, d.shield_regen_delay);
        self.armor = finite_at_least(self.armor, 0.0, d.armor);
        if !self.size.is_finite() || self.size.min_element() <= 0.0 {
            self.size = d.size;
        }
        self.move_speed = finite_at_least(self.move_speed, 0.0, d.move_speed);
        self.dash_speed = finite_at_least(self.dash_speed, 0.0, d.dash_speed);
        self.dash_duration = finite_at_least(self.dash_duration, 0.0, d.dash_duration);
        self.dash_cooldown = finite_at_least(self.dash_cooldown, 0.0, d.dash_cooldown);
        self.movement_spread_gain =
            finite_at_least(self.movement_spread_gain, 0.0, d.movement_spread_gain);
        self.movement_spread_max =
            finite_at_least(self.movement_spread_max, 0.0, d.movement_spread_max);
        self.movement_spread_decay =
            finite_at_least(self.movement_spread_decay, 0.0, d.movement_spread_decay);
        self
    }
}

// ── clamping helpers ────────────────────────────────────────────

fn finite_at_least(value: f32, min: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value.max(min)
    } else {
        fallback
    }
}

fn unit_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fire_interval_from_rpm() {
        let def = WeaponDef {
            rounds_per_minute: 600.0,
            ..WeaponDef::default()
        };
        assert!((def.fire_interval() - 0.1).abs() < 1e-6);

        let unlimited = WeaponDef {
            rounds_per_minute: 0.0,
            ..WeaponDef::default()
        };
        assert_eq!(unlimited.fire_interval(), 0.0);
    }

    #[test]
    fn sanitize_clamps_probabilities_and_windows() {
        let def = WeaponDef {
            jam_chance: 3.0,
            active_reload_center: -0.5,
            active_reload_size: 0.9,
            magazine_size: 0,
            eject_time: 5.0,
            reload_time: 1.0,
            ..WeaponDef::default()
        }
        .sanitized();
        assert_eq!(def.jam_chance, 1.0);
        assert_eq!(def.active_reload_center, 0.0);
        assert_eq!(def.active_reload_size, 0.5);
        assert_eq!(def.magazine_size, 1);
        assert_eq!(def.eject_time, 1.0);
    }

    #[test]
    fn sanitize_replaces_non_finite_values() {
        let ammo = AmmoDef {
            speed: f32::NAN,
            armor_pen: 250.0,
            ..AmmoDef::default()
        }
        .sanitized();
        assert_eq!(ammo.speed, AmmoDef::default().speed);
        assert_eq!(ammo.armor_pen, 100.0);
    }

    #[test]
    fn sanitize_rejects_stationary_ammo() {
        for speed in [0.0, -3.0] {
            let ammo = AmmoDef {
                speed,
                ..AmmoDef::default()
            }
            .sanitized();
            assert_eq!(ammo.speed, AmmoDef::default().speed);
        }
    }

    #[test]
    fn sanitize_rejects_degenerate_entity_size() {
        let def = EntityTypeDef {
            size: Vec2::new(0.0, 1.0),
            max_hp: -5,
            ..EntityTypeDef::default()
        }
        .sanitized();
        assert_eq!(def.size, EntityTypeDef::default().size);
        assert_eq!(def.max_hp, 1);
    }

    #[test]
    fn fire_mode_names() {
        assert_eq!(FireMode::from_name("auto"), Some(FireMode::Auto));
        assert_eq!(FireMode::from_name("semi"), Some(FireMode::Single));
        assert_eq!(FireMode::from_name("burst"), Some(FireMode::Burst));
        assert_eq!(FireMode::from_name("laser"), None);
    }

    #[cfg(not(miri))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn sanitized_weapon_is_always_usable(
                rpm in any::<f32>(),
                reload in any::<f32>(),
                eject in any::<f32>(),
                jam in any::<f32>(),
                window in any::<f32>(),
                magazine in any::<u32>(),
            ) {
                let def = WeaponDef {
                    rounds_per_minute: rpm,
                    reload_time: reload,
                    eject_time: eject,
                    jam_chance: jam,
                    active_reload_size: window,
                    magazine_size: magazine,
                    ..WeaponDef::default()
                }
                .sanitized();

                prop_assert!(def.rounds_per_minute.is_finite() && def.rounds_per_minute >= 0.0);
                prop_assert!(def.reload_time.is_finite() && def.reload_time >= 0.0);
                prop_assert!(def.eject_time <= def.reload_time);
                prop_assert!((0.0..=1.0).contains(&def.jam_chance));
                prop_assert!((0.0..=0.5).contains(&def.active_reload_size));
                prop_assert!(def.magazine_size >= 1);
            }
        }
    }
}
