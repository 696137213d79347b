//! Control-driven entity movement: walking, dashing, and movement spread.
//!
//! This stage only sets velocity and timers. Collision against the tile
//! grid happens afterwards through
//! [`AxisCollisionResolver::move_entity`](volley_space::AxisCollisionResolver::move_entity).

use glam::Vec2;
use volley_core::{ControlSignals, EntityTypeDef};

use crate::entity::Entity;

/// Movement tuning copied from an [`EntityTypeDef`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionStats {
    /// Walking speed, units per second.
    pub move_speed: f32,
    /// Dash speed, units per second.
    pub dash_speed: f32,
    /// Dash length in seconds.
    pub dash_duration: f32,
    /// Seconds between dashes.
    pub dash_cooldown: f32,
    /// Spread gained per second at full walking speed, degrees.
    pub spread_gain: f32,
    /// Spread ceiling, degrees.
    pub spread_max: f32,
    /// Spread lost per second while still, degrees.
    pub spread_decay: f32,
}

impl From<&EntityTypeDef> for MotionStats {
    fn from(def: &EntityTypeDef) -> Self {
        Self {
            move_speed: def.move_speed,
            dash_speed: def.dash_speed,
            dash_duration: def.dash_duration,
            dash_cooldown: def.dash_cooldown,
            spread_gain: def.movement_spread_gain,
            spread_max: def.movement_spread_max,
            spread_decay: def.movement_spread_decay,
        }
    }
}

/// Dash timers.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DashState {
    /// Seconds of dash left; zero when not dashing.
    pub remaining: f32,
    /// Seconds until another dash is allowed.
    pub cooldown: f32,
    /// Unit direction of the current dash.
    pub direction: Vec2,
}

impl DashState {
    /// Whether a dash is in progress.
    pub fn active(&self) -> bool {
        self.remaining > 0.0
    }
}

/// Apply one tick of control signals to `entity`'s velocity, aim, dash
/// timers, and movement spread.
///
/// Returns `true` when a dash started this tick.
pub fn drive(entity: &mut Entity, signals: &ControlSignals, dt: f32) -> bool {
    if signals.aim.is_finite() && signals.aim != Vec2::ZERO {
        entity.aim = signals.aim.normalize_or_zero();
    }
    let walk = signals.clamped_move();
    let motion = entity.motion;

    entity.dash.cooldown = (entity.dash.cooldown - dt).max(0.0);
    let mut dash_started = false;
    if signals.dash && entity.dash.cooldown <= 0.0 && motion.dash_duration > 0.0 {
        let direction = if walk != Vec2::ZERO {
            walk.normalize_or_zero()
        } else {
            entity.aim
        };
        if direction != Vec2::ZERO {
            entity.dash = DashState {
                remaining: motion.dash_duration,
                cooldown: motion.dash_cooldown,
                direction,
            };
            dash_started = true;
        }
    }

    if entity.dash.active() {
        entity.velocity = entity.dash.direction * motion.dash_speed;
        entity.dash.remaining = (entity.dash.remaining - dt).max(0.0);
    } else {
        entity.velocity = walk * motion.move_speed;
    }

    let speed_fraction = if motion.move_speed > 0.0 {
        (entity.velocity.length() / motion.move_speed).min(1.0)
    } else {
        0.0
    };
    let spread = if speed_fraction > 0.0 {
        entity.movement_spread + motion.spread_gain * speed_fraction * dt
    } else {
        entity.movement_spread - motion.spread_decay * dt
    };
    entity.movement_spread = spread.clamp(0.0, motion.spread_max.max(0.0));

    dash_started
}
