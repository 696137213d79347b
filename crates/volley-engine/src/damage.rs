//! Damage resolution: shield → plates → armor → health.
//!
//! The stage order is fixed. Shield absorption is never reduced by armor;
//! a plate swallows whatever survives the shield regardless of size; only
//! damage that reaches the armor stage is rounded to whole health points.
//!
//! Threshold notifications compare the before/after ratio and fire only on
//! a crossing, so repeated hits on the same side stay silent.

use smallvec::SmallVec;
use tracing::debug;
use volley_core::{SimEvent, ThresholdKind};

use crate::entity::{Entity, EntityHandle, EntityStore};
use crate::hooks::EventSink;

/// Highest armor reduction, in percent.
pub const MAX_ARMOR_REDUCTION: f32 = 75.0;

/// Slack applied before rounding health damage up, so float noise such as
/// `20.000002` still rounds to 20. Any hit that reaches health still costs
/// at least one point.
const CEIL_TOLERANCE: f32 = 1e-4;

/// One incoming hit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    /// Raw damage before falloff.
    pub damage: f32,
    /// Percent of the target's armor ignored.
    pub armor_pen: f32,
    /// Multiplier applied to damage against shields.
    pub shield_mult: f32,
    /// Range falloff multiplier, see [`falloff_multiplier`].
    pub falloff: f32,
}

impl Hit {
    /// A plain hit: no penetration, neutral shield multiplier, no falloff.
    pub fn flat(damage: f32) -> Self {
        Self {
            damage,
            armor_pen: 0.0,
            shield_mult: 1.0,
            falloff: 1.0,
        }
    }
}

/// What a hit did to its target.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DamageOutcome {
    /// Shield removed.
    pub shield_absorbed: f32,
    /// A plate negated the remainder.
    pub plate_consumed: bool,
    /// The consumed plate was the last one.
    pub plates_depleted: bool,
    /// Health removed.
    pub health_lost: i32,
    /// Health went from positive to zero.
    pub died: bool,
    /// Threshold crossings caused by this hit.
    pub thresholds: SmallVec<[ThresholdKind; 4]>,
}

impl DamageOutcome {
    /// Damage credited to the attacker: shield absorbed plus health removed.
    pub fn dealt(&self) -> f32 {
        self.shield_absorbed + self.health_lost as f32
    }
}

/// Damage multiplier for a projectile that has travelled `distance`.
///
/// 1 up to `start`, then linear from 1 down to 0 at `end`, never below
/// `min`. A degenerate range (`end <= start`) means no falloff.
pub fn falloff_multiplier(distance: f32, start: f32, end: f32, min: f32) -> f32 {
    if end <= start || distance <= start {
        return 1.0;
    }
    let t = ((distance - start) / (end - start)).min(1.0);
    (1.0 - t).max(min).min(1.0)
}

/// Crossings of the 50%, 25%, and 100% marks between `before` and `after`.
///
/// Downward crossings of 50% and 25% and upward crossings into 100% count.
/// `hp` selects health or shield variants. A non-positive `max` yields none.
pub fn threshold_crossings(
    before: f32,
    after: f32,
    max: f32,
    hp: bool,
) -> SmallVec<[ThresholdKind; 2]> {
    let mut out = SmallVec::new();
    if max <= 0.0 {
        return out;
    }
    let (b, a) = (before / max, after / max);
    let (under50, under25, full) = if hp {
        (
            ThresholdKind::HpUnder50,
            ThresholdKind::HpUnder25,
            ThresholdKind::HpFull,
        )
    } else {
        (
            ThresholdKind::ShieldUnder50,
            ThresholdKind::ShieldUnder25,
            ThresholdKind::ShieldFull,
        )
    };
    if b >= 0.5 && a < 0.5 {
        out.push(under50);
    }
    if b >= 0.25 && a < 0.25 {
        out.push(under25);
    }
    if b < 1.0 && a >= 1.0 {
        out.push(full);
    }
    out
}

/// Run the mitigation stages for `hit` against one entity's defences.
///
/// Pure with respect to the store: neither frees nor notifies.
pub fn resolve(entity: &mut Entity, hit: &Hit) -> DamageOutcome {
    let mut outcome = DamageOutcome::default();
    let mut remaining = (hit.damage * hit.falloff).max(0.0);
    if !remaining.is_finite() || remaining <= 0.0 {
        return outcome;
    }
    entity.since_damage = 0.0;
    let shield_before = entity.shield;
    let health_before = entity.health;

    // Shield.
    if entity.shield_max > 0.0 && entity.shield > 0.0 && hit.shield_mult > 0.0 {
        let against_shield = remaining * hit.shield_mult;
        let absorbed = entity.shield.min(against_shield);
        entity.shield -= absorbed;
        outcome.shield_absorbed = absorbed;
        remaining = if against_shield <= absorbed {
            0.0
        } else {
            (remaining - absorbed / hit.shield_mult).max(0.0)
        };
    }

    if remaining > 0.0 && entity.plates > 0 {
        // Plate.
        entity.plates -= 1;
        outcome.plate_consumed = true;
        outcome.plates_depleted = entity.plates == 0;
    } else if remaining > 0.0 {
        // Armor, then health.
        let reduction = (entity.armor - hit.armor_pen).clamp(0.0, MAX_ARMOR_REDUCTION);
        let scaled = remaining * (1.0 - reduction / 100.0);
        let damage = (scaled - CEIL_TOLERANCE).ceil().max(1.0) as i32;
        entity.health = (entity.health - damage).max(0);
        outcome.health_lost = health_before - entity.health;
    }

    outcome.died = health_before > 0 && entity.health == 0;
    outcome.thresholds.extend(threshold_crossings(
        health_before as f32,
        entity.health as f32,
        entity.max_hp as f32,
        true,
    ));
    outcome.thresholds.extend(threshold_crossings(
        shield_before,
        entity.shield,
        entity.shield_max,
        false,
    ));
    outcome
}

/// Apply `hit` to `target`, notify, and free it if a non-player died.
///
/// Returns `None` for a stale handle.
pub fn apply(
    entities: &mut EntityStore,
    target: EntityHandle,
    hit: &Hit,
    events: &mut impl EventSink,
) -> Option<DamageOutcome> {
    let entity = entities.get_mut(target)?;
    let outcome = resolve(entity, hit);
    let snapshot = entity.snapshot();
    let player = entity.is_player();

    events.emit(SimEvent::Damage {
        target: snapshot.clone(),
        shield_absorbed: outcome.shield_absorbed,
        plate_consumed: outcome.plate_consumed,
        health_lost: outcome.health_lost,
    });
    for &kind in &outcome.thresholds {
        events.emit(SimEvent::Threshold {
            entity: snapshot.clone(),
            kind,
        });
    }
    if outcome.plates_depleted {
        events.emit(SimEvent::PlatesDepleted {
            entity: snapshot.clone(),
        });
    }
    if outcome.died {
        debug!(entity = snapshot.serial, player, "entity died");
        events.emit(SimEvent::Death { entity: snapshot });
        if !player {
            entities.free(target);
        }
    }
    Some(outcome)
}
