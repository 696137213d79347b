//! Axis-separated swept collision against a [`TileGrid`].
//!
//! Movement is resolved one axis at a time, X before Y. Each axis move is
//! tested by computing the candidate box and checking every tile it would
//! cover. Entities and projectiles share this primitive but test different
//! blocking bits and react differently to a block: an entity loses its
//! velocity on that axis and keeps sliding on the other, a projectile stops
//! and reports the tile it struck.

use glam::Vec2;
use volley_core::{Aabb, Axis};

use crate::tile::{TileFlags, TileGrid};

/// Which blocking bit a moving body is tested against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BodyKind {
    /// Walking bodies: blocked by walls, void and water.
    Entity,
    /// Projectiles: blocked by walls only.
    Projectile,
}

impl BodyKind {
    /// The tile bit that blocks this kind of body.
    pub fn mask(self) -> TileFlags {
        match self {
            BodyKind::Entity => TileFlags::BLOCKS_ENTITY,
            BodyKind::Projectile => TileFlags::BLOCKS_PROJECTILE,
        }
    }
}

/// Outcome of moving a box along one axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AxisStep {
    /// The move was clear; the box at its new position.
    Moved(Aabb),
    /// The candidate box would cover a blocking tile. The box did not move.
    Blocked {
        /// First blocking tile found, as `(col, row)`.
        tile: (i32, i32),
    },
}

/// Which axes blocked during [`AxisCollisionResolver::move_entity`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EntityMove {
    /// X motion hit a blocking tile at least once.
    pub blocked_x: bool,
    /// Y motion hit a blocking tile at least once.
    pub blocked_y: bool,
}

/// Outcome of one projectile substep.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ProjectileStep {
    /// Both axes were clear.
    Moved {
        /// Box after the substep.
        aabb: Aabb,
        /// Length of the displacement travelled.
        distance: f32,
    },
    /// An axis was blocked; the projectile should be deactivated.
    HitTile {
        /// Box at the moment of impact (any axis already resolved is applied).
        aabb: Aabb,
        /// Tile that blocked the move.
        tile: (i32, i32),
    },
}

/// Per-axis collision resolution over a borrowed tile grid.
#[derive(Clone, Copy, Debug)]
pub struct AxisCollisionResolver<'g> {
    grid: &'g TileGrid,
}

impl<'g> AxisCollisionResolver<'g> {
    /// Resolver over `grid`.
    pub fn new(grid: &'g TileGrid) -> Self {
        Self { grid }
    }

    /// The grid being resolved against.
    pub fn grid(&self) -> &'g TileGrid {
        self.grid
    }

    /// Attempt to move `aabb` by `delta` along `axis`.
    ///
    /// A zero or non-finite delta is treated as no motion and never blocks.
    pub fn resolve_axis(&self, aabb: Aabb, axis: Axis, delta: f32, kind: BodyKind) -> AxisStep {
        if delta == 0.0 || !delta.is_finite() {
            return AxisStep::Moved(aabb);
        }
        let candidate = aabb.translated(axis.unit(delta));
        let mask = kind.mask();
        match self
            .grid
            .covered(&candidate)
            .iter()
            .find(|&(col, row)| self.grid.blocks(col, row, mask))
        {
            Some(tile) => AxisStep::Blocked { tile },
            None => AxisStep::Moved(candidate),
        }
    }

    /// Move an entity box by `velocity * dt`, split into `substeps` equal parts.
    ///
    /// Each substep resolves X then Y. A blocked axis has its velocity
    /// component zeroed, so later substeps (and later ticks) only continue
    /// along the free axis.
    pub fn move_entity(
        &self,
        aabb: &mut Aabb,
        velocity: &mut Vec2,
        dt: f32,
        substeps: u32,
    ) -> EntityMove {
        let substeps = substeps.max(1);
        let sub_dt = dt / substeps as f32;
        let mut result = EntityMove::default();
        for _ in 0..substeps {
            for axis in Axis::ORDER {
                let delta = axis.of(*velocity) * sub_dt;
                match self.resolve_axis(*aabb, axis, delta, BodyKind::Entity) {
                    AxisStep::Moved(next) => *aabb = next,
                    AxisStep::Blocked { .. } => {
                        *axis.of_mut(velocity) = 0.0;
                        match axis {
                            Axis::X => result.blocked_x = true,
                            Axis::Y => result.blocked_y = true,
                        }
                    }
                }
            }
            if *velocity == Vec2::ZERO {
                break;
            }
        }
        result
    }

    /// Advance a projectile box by one substep's `displacement`.
    pub fn sweep_projectile_substep(&self, aabb: Aabb, displacement: Vec2) -> ProjectileStep {
        let mut current = aabb;
        for axis in Axis::ORDER {
            match self.resolve_axis(current, axis, axis.of(displacement), BodyKind::Projectile) {
                AxisStep::Moved(next) => current = next,
                AxisStep::Blocked { tile } => {
                    return ProjectileStep::HitTile {
                        aabb: current,
                        tile,
                    };
                }
            }
        }
        ProjectileStep::Moved {
            aabb: current,
            distance: displacement.length(),
        }
    }
}
