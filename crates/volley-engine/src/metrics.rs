//! Per-tick counters for the simulation context.
//!
//! [`StepMetrics`] is filled in by
//! [`SimulationContext::step`](crate::SimulationContext::step) and returned
//! in the [`StepReport`](crate::StepReport).

/// Counters and timing collected during a single tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepMetrics {
    /// Wall-clock time for the entire tick, in microseconds.
    pub total_us: u64,
    /// Projectiles spawned by weapons this tick.
    pub projectiles_spawned: u32,
    /// Projectiles that ran out of range this tick.
    pub projectiles_expired: u32,
    /// Projectile-entity hits this tick.
    pub projectile_hits: u32,
    /// Projectiles stopped by a tile this tick.
    pub tile_hits: u32,
    /// Spawns skipped because a pool was full.
    pub spawn_failures: u32,
    /// Entities whose health reached zero this tick.
    pub kills: u32,
    /// Rounds fired (including rounds lost to jams).
    pub shots_fired: u32,
    /// Fire rolls that jammed.
    pub jams: u32,
}

impl StepMetrics {
    /// Whether nothing combat-related happened this tick.
    pub fn is_quiet(&self) -> bool {
        self.shots_fired == 0
            && self.projectile_hits == 0
            && self.tile_hits == 0
            && self.projectiles_expired == 0
    }
}
