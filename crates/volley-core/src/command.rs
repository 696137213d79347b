//! Per-tick control signals.
//!
//! Input devices, AI, and replays are all resolved outside the core into
//! the same flat set of booleans and analog axes.

use glam::Vec2;

/// What an entity wants to do this tick.
///
/// `reload`, `unjam`, and `dash` are edge signals: the caller sets them on
/// the tick the action happens. `trigger` is a level signal; the weapon
/// derives press edges from it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ControlSignals {
    /// Desired movement direction. Lengths above 1 are clamped.
    pub move_axis: Vec2,
    /// Aim direction. Zero keeps the previous aim.
    pub aim: Vec2,
    /// Trigger held.
    pub trigger: bool,
    /// Reload pressed this tick.
    pub reload: bool,
    /// Unjam action performed this tick.
    pub unjam: bool,
    /// Dash pressed this tick.
    pub dash: bool,
}

impl ControlSignals {
    /// Signals with only the trigger held.
    pub fn firing(aim: Vec2) -> Self {
        Self {
            aim,
            trigger: true,
            ..Self::default()
        }
    }

    /// Signals with only movement.
    pub fn moving(move_axis: Vec2) -> Self {
        Self {
            move_axis,
            ..Self::default()
        }
    }

    /// `move_axis` clamped to unit length.
    pub fn clamped_move(&self) -> Vec2 {
        if self.move_axis.is_finite() {
            self.move_axis.clamp_length_max(1.0)
        } else {
            Vec2::ZERO
        }
    }
}
