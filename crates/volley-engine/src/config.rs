//! Simulation configuration, validation, and error types.
//!
//! [`SimConfig`] is the input for constructing a
//! [`SimulationContext`](crate::SimulationContext).
//! [`validate()`](SimConfig::validate) checks the scalar invariants; pool
//! construction failures surface through [`ConfigError::Arena`].

use std::error::Error;
use std::fmt;

use volley_arena::ArenaError;

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while building a simulation context.
///
/// These are the only startup-fatal failures in the core.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// A pool could not be constructed.
    Arena(ArenaError),
    /// `dt` is NaN, infinite, zero, or negative.
    InvalidTimestep {
        /// The invalid value.
        value: f32,
    },
    /// `unjam_step` lies outside `(0, 1]`.
    InvalidUnjamStep {
        /// The invalid value.
        value: f32,
    },
    /// A substep count is zero.
    InvalidSubsteps,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Arena(e) => write!(f, "arena: {e}"),
            Self::InvalidTimestep { value } => {
                write!(f, "dt must be finite and positive, got {value}")
            }
            Self::InvalidUnjamStep { value } => {
                write!(f, "unjam_step must lie in (0, 1], got {value}")
            }
            Self::InvalidSubsteps => write!(f, "substep counts must be at least 1"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Arena(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ArenaError> for ConfigError {
    fn from(e: ArenaError) -> Self {
        Self::Arena(e)
    }
}

// ── SimConfig ──────────────────────────────────────────────────────

/// Fixed parameters of a simulation context.
#[derive(Clone, Debug, PartialEq)]
pub struct SimConfig {
    /// Entity pool capacity. Default: 256.
    pub max_entities: usize,
    /// Projectile pool capacity. Default: 2048.
    pub max_projectiles: usize,
    /// Weapon-instance pool capacity. Default: 256.
    pub max_weapons: usize,
    /// Fixed timestep in seconds. Default: 1/60.
    pub dt: f32,
    /// Unjam progress added per unjam action. Default: 0.25.
    pub unjam_step: f32,
    /// Projectile substeps used when the ammo definition asks for 0. Default: 4.
    pub default_substeps: u32,
    /// Substeps per tick for entity movement. Default: 1.
    pub movement_substeps: u32,
    /// RNG seed. `None` seeds from the process RNG.
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            max_entities: 256,
            max_projectiles: 2048,
            max_weapons: 256,
            dt: 1.0 / 60.0,
            unjam_step: 0.25,
            default_substeps: 4,
            movement_substeps: 1,
            seed: None,
        }
    }
}

impl SimConfig {
    /// Check scalar invariants.
    ///
    /// Pool capacities are checked when the pools are built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(ConfigError::InvalidTimestep { value: self.dt });
        }
        if !(self.unjam_step > 0.0 && self.unjam_step <= 1.0) {
            return Err(ConfigError::InvalidUnjamStep {
                value: self.unjam_step,
            });
        }
        if self.default_substeps == 0 || self.movement_substeps == 0 {
            return Err(ConfigError::InvalidSubsteps);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_bad_timestep() {
        for dt in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let cfg = SimConfig {
                dt,
                ..SimConfig::default()
            };
            assert!(matches!(
                cfg.validate(),
                Err(ConfigError::InvalidTimestep { .. })
            ));
        }
    }

    #[test]
    fn rejects_bad_unjam_step() {
        for unjam_step in [0.0, 1.5, f32::NAN] {
            let cfg = SimConfig {
                unjam_step,
                ..SimConfig::default()
            };
            assert!(matches!(
                cfg.validate(),
                Err(ConfigError::InvalidUnjamStep { .. })
            ));
        }
        let full = SimConfig {
            unjam_step: 1.0,
            ..SimConfig::default()
        };
        assert!(full.validate().is_ok());
    }

    #[test]
    fn rejects_zero_substeps() {
        let cfg = SimConfig {
            movement_substeps: 0,
            ..SimConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidSubsteps));
    }

    #[test]
    fn arena_errors_convert_and_chain() {
        let err: ConfigError = ArenaError::ZeroCapacity.into();
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("arena:"));
    }
}
