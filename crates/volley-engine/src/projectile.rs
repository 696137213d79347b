//! Projectile pool and per-tick stepping.
//!
//! Each tick, every active projectile advances through its substeps. A
//! substep either moves the box or strikes a tile. After each clean move
//! the travelled distance is checked against range, then overlapping
//! entities are offered to the [`HitHandler`] in slot order. Pierce decides
//! how many entities a projectile may pass through; an entity is never hit
//! twice by the same projectile.

use glam::Vec2;
use smallvec::SmallVec;
use volley_arena::{ArenaError, Handle, SlotPool};
use volley_core::{Aabb, AmmoDef, AmmoTypeId, ProjectileKindId, ProjectileSnapshot};
use volley_space::{AxisCollisionResolver, ProjectileStep, TileGrid};

use crate::damage::{falloff_multiplier, Hit};
use crate::entity::{EntityHandle, EntityStore};

/// Handle to a [`Projectile`].
pub type ProjectileHandle = Handle<Projectile>;

/// A projectile in flight.
#[derive(Clone, Debug, PartialEq)]
pub struct Projectile {
    /// Spawn serial, unique within a context.
    pub serial: u64,
    /// Ammo type, used to route notifications.
    pub ammo: AmmoTypeId,
    /// Visual kind, opaque to the core.
    pub kind: ProjectileKindId,
    /// World-space bounds.
    pub aabb: Aabb,
    /// Velocity in units per second.
    pub velocity: Vec2,
    /// Collision substeps per tick, at least 1.
    pub substeps: u32,
    /// Entity that fired it. Never hit by its own projectile.
    pub owner: Option<EntityHandle>,
    /// Damage per hit before mitigation.
    pub damage: f32,
    /// Percent of armor ignored.
    pub armor_pen: f32,
    /// Multiplier against shields.
    pub shield_mult: f32,
    /// Distance covered so far.
    pub distance_travelled: f32,
    /// Maximum range; 0 means unlimited.
    pub range: f32,
    /// Distance where falloff begins.
    pub falloff_start: f32,
    /// Distance where falloff bottoms out.
    pub falloff_end: f32,
    /// Falloff floor.
    pub falloff_min: f32,
    /// Further entities this projectile may pass through.
    pub pierce_remaining: u32,
    /// Entities already struck.
    pub hits: SmallVec<[EntityHandle; 4]>,
}

impl Projectile {
    /// Range falloff multiplier at the current travelled distance.
    pub fn falloff(&self) -> f32 {
        falloff_multiplier(
            self.distance_travelled,
            self.falloff_start,
            self.falloff_end,
            self.falloff_min,
        )
    }

    /// The hit this projectile delivers right now.
    pub fn hit(&self) -> Hit {
        Hit {
            damage: self.damage,
            armor_pen: self.armor_pen,
            shield_mult: self.shield_mult,
            falloff: self.falloff(),
        }
    }

    /// Whether travelled distance exceeds a configured range.
    pub fn out_of_range(&self) -> bool {
        self.range > 0.0 && self.distance_travelled > self.range
    }

    /// Plain-data view for notifications.
    pub fn snapshot(&self) -> ProjectileSnapshot {
        ProjectileSnapshot {
            serial: self.serial,
            ammo: self.ammo,
            kind: self.kind,
            position: self.aabb.center(),
            velocity: self.velocity,
            damage: self.damage,
            distance_travelled: self.distance_travelled,
            pierce_remaining: self.pierce_remaining,
        }
    }
}

/// Parameters for spawning a projectile.
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectileSpawn {
    /// Centre of the projectile.
    pub position: Vec2,
    /// Velocity in units per second.
    pub velocity: Vec2,
    /// Edge length of the square bounds.
    pub size: f32,
    /// Collision substeps; 0 takes the configured default.
    pub substeps: u32,
    /// Ammo type supplying the ballistic stats.
    pub ammo: AmmoTypeId,
    /// Firing entity.
    pub owner: Option<EntityHandle>,
    /// Base damage, multiplied by the ammo's damage multiplier.
    pub base_damage: f32,
    /// Visual kind.
    pub kind: ProjectileKindId,
}

impl ProjectileSpawn {
    /// An ownerless projectile with base damage 1.
    pub fn new(position: Vec2, velocity: Vec2, size: f32, substeps: u32, ammo: AmmoTypeId) -> Self {
        Self {
            position,
            velocity,
            size,
            substeps,
            ammo,
            owner: None,
            base_damage: 1.0,
            kind: ProjectileKindId::default(),
        }
    }

    /// Set the firing entity.
    pub fn with_owner(mut self, owner: EntityHandle) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Set the base damage.
    pub fn with_damage(mut self, base_damage: f32) -> Self {
        self.base_damage = base_damage;
        self
    }

    /// Set the visual kind.
    pub fn with_kind(mut self, kind: ProjectileKindId) -> Self {
        self.kind = kind;
        self
    }

    /// Build the projectile using `ammo`'s stats.
    pub fn build(self, serial: u64, ammo: &AmmoDef, default_substeps: u32) -> Projectile {
        let substeps = match self.substeps {
            0 if ammo.substeps > 0 => ammo.substeps,
            0 => default_substeps.max(1),
            n => n,
        };
        Projectile {
            serial,
            ammo: self.ammo,
            kind: self.kind,
            aabb: Aabb::from_center(self.position, Vec2::splat(self.size)),
            velocity: self.velocity,
            substeps,
            owner: self.owner,
            damage: self.base_damage * ammo.damage_mult,
            armor_pen: ammo.armor_pen,
            shield_mult: ammo.shield_mult,
            distance_travelled: 0.0,
            range: ammo.range,
            falloff_start: ammo.falloff_start,
            falloff_end: ammo.falloff_end,
            falloff_min: ammo.falloff_min,
            pierce_remaining: ammo.pierce,
            hits: SmallVec::new(),
        }
    }
}

/// Receives projectile impacts during [`ProjectileSimulator::step`].
pub trait HitHandler {
    /// `projectile` overlaps `target`. Return `true` to stop the projectile
    /// regardless of pierce.
    fn on_hit_entity(
        &mut self,
        projectile: &Projectile,
        target: EntityHandle,
        entities: &mut EntityStore,
    ) -> bool;

    /// `projectile` struck the blocking tile `tile`. It is deactivated
    /// after this returns.
    fn on_hit_tile(&mut self, projectile: &Projectile, tile: (i32, i32));
}

/// A pair of closures `(on_hit_entity, on_hit_tile)`.
impl<E, T> HitHandler for (E, T)
where
    E: FnMut(&Projectile, EntityHandle, &mut EntityStore) -> bool,
    T: FnMut(&Projectile, (i32, i32)),
{
    fn on_hit_entity(
        &mut self,
        projectile: &Projectile,
        target: EntityHandle,
        entities: &mut EntityStore,
    ) -> bool {
        (self.0)(projectile, target, entities)
    }

    fn on_hit_tile(&mut self, projectile: &Projectile, tile: (i32, i32)) {
        (self.1)(projectile, tile)
    }
}

/// Counts from one [`ProjectileSimulator::step`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProjectileStepStats {
    /// Deactivated by range.
    pub expired: u32,
    /// Entity hits delivered.
    pub entity_hits: u32,
    /// Deactivated by a tile.
    pub tile_hits: u32,
    /// Deactivated after spending their pierce.
    pub spent: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Fate {
    Flying,
    Expired,
    HitTile,
    Spent,
}

/// Owns every projectile and steps them.
#[derive(Clone, Debug)]
pub struct ProjectileSimulator {
    pool: SlotPool<Projectile>,
    next_serial: u64,
}

impl ProjectileSimulator {
    /// A simulator with room for `capacity` projectiles.
    pub fn with_capacity(capacity: usize) -> Result<Self, ArenaError> {
        Ok(Self {
            pool: SlotPool::with_capacity(capacity)?,
            next_serial: 1,
        })
    }

    /// Spawn a projectile from `spawn` with `ammo`'s stats.
    ///
    /// Returns `None` when the pool is full.
    pub fn spawn(
        &mut self,
        spawn: ProjectileSpawn,
        ammo: &AmmoDef,
        default_substeps: u32,
    ) -> Option<ProjectileHandle> {
        if self.pool.is_full() {
            return None;
        }
        let serial = self.next_serial;
        let handle = self
            .pool
            .allocate(spawn.build(serial, ammo, default_substeps))?;
        self.next_serial += 1;
        Some(handle)
    }

    /// Borrow a live projectile.
    pub fn get(&self, handle: ProjectileHandle) -> Option<&Projectile> {
        self.pool.get(handle)
    }

    /// Mutably borrow a live projectile.
    pub fn get_mut(&mut self, handle: ProjectileHandle) -> Option<&mut Projectile> {
        self.pool.get_mut(handle)
    }

    /// Remove a projectile.
    pub fn despawn(&mut self, handle: ProjectileHandle) -> Option<Projectile> {
        self.pool.free(handle)
    }

    /// Iterate over live projectiles in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (ProjectileHandle, &Projectile)> + '_ {
        self.pool.iter()
    }

    /// Number of live projectiles.
    pub fn len(&self) -> usize {
        self.pool.len()
    }

    /// Whether no projectile is live.
    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    /// Remove every projectile.
    pub fn clear(&mut self) {
        self.pool.clear();
    }

    /// Advance every projectile by `dt`.
    pub fn step(
        &mut self,
        dt: f32,
        grid: &TileGrid,
        entities: &mut EntityStore,
        handler: &mut impl HitHandler,
    ) -> ProjectileStepStats {
        let resolver = AxisCollisionResolver::new(grid);
        let mut stats = ProjectileStepStats::default();
        for handle in self.pool.handles() {
            let Some(projectile) = self.pool.get_mut(handle) else {
                continue;
            };
            let fate = advance(projectile, dt, &resolver, entities, handler, &mut stats);
            match fate {
                Fate::Flying => continue,
                Fate::Expired => stats.expired += 1,
                Fate::HitTile => stats.tile_hits += 1,
                Fate::Spent => stats.spent += 1,
            }
            self.pool.free(handle);
        }
        stats
    }
}

fn advance(
    projectile: &mut Projectile,
    dt: f32,
    resolver: &AxisCollisionResolver<'_>,
    entities: &mut EntityStore,
    handler: &mut impl HitHandler,
    stats: &mut ProjectileStepStats,
) -> Fate {
    let substeps = projectile.substeps.max(1);
    let displacement = projectile.velocity * (dt / substeps as f32);
    for _ in 0..substeps {
        match resolver.sweep_projectile_substep(projectile.aabb, displacement) {
            ProjectileStep::HitTile { aabb, tile } => {
                projectile.aabb = aabb;
                handler.on_hit_tile(projectile, tile);
                return Fate::HitTile;
            }
            ProjectileStep::Moved { aabb, distance } => {
                projectile.aabb = aabb;
                projectile.distance_travelled += distance;
            }
        }
        if projectile.out_of_range() {
            return Fate::Expired;
        }
        if scan_entities(projectile, entities, handler, stats) {
            return Fate::Spent;
        }
    }
    Fate::Flying
}

/// Offer every overlapping entity to the handler. Returns `true` once the
/// projectile is spent.
fn scan_entities(
    projectile: &mut Projectile,
    entities: &mut EntityStore,
    handler: &mut impl HitHandler,
    stats: &mut ProjectileStepStats,
) -> bool {
    let candidates: SmallVec<[EntityHandle; 8]> = entities
        .iter()
        .filter(|(h, e)| {
            Some(*h) != projectile.owner
                && !projectile.hits.contains(h)
                && e.aabb.overlaps(&projectile.aabb)
        })
        .map(|(h, _)| h)
        .collect();
    for target in candidates {
        // An earlier hit in this scan may have killed it.
        if !entities.contains(target) {
            continue;
        }
        projectile.hits.push(target);
        stats.entity_hits += 1;
        let stop = handler.on_hit_entity(projectile, target, entities);
        if stop || projectile.pierce_remaining == 0 {
            return true;
        }
        projectile.pierce_remaining -= 1;
    }
    false
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use volley_core::{EntityTypeDef, EntityTypeId};
    use volley_space::TileFlags;

    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn open(w: u32, h: u32) -> TileGrid {
        TileGrid::new(w, h, 1.0).unwrap()
    }

    fn ammo(pierce: u32, range: f32) -> AmmoDef {
        AmmoDef {
            pierce,
            range,
            ..AmmoDef::default()
        }
    }

    fn spawn_at(sim: &mut ProjectileSimulator, pos: Vec2, vel: Vec2, ammo_def: &AmmoDef) -> ProjectileHandle {
        sim.spawn(
            ProjectileSpawn::new(pos, vel, 0.2, 1, AmmoTypeId(1)).with_damage(10.0),
            ammo_def,
            4,
        )
        .unwrap()
    }

    fn row_of_entities(store: &mut EntityStore, xs: &[f32]) -> Vec<EntityHandle> {
        let def = EntityTypeDef::default();
        xs.iter()
            .map(|&x| store.new_entity(EntityTypeId(1), &def, Vec2::new(x, 2.0)).unwrap())
            .collect()
    }

    #[test]
    fn pierce_two_hits_three_then_deactivates() {
        let grid = open(20, 5);
        let mut store = EntityStore::with_capacity(8).unwrap();
        let targets = row_of_entities(&mut store, &[5.0, 6.0, 7.0, 8.0]);
        let mut sim = ProjectileSimulator::with_capacity(4).unwrap();
        let shot = spawn_at(&mut sim, Vec2::new(3.0, 2.0), Vec2::new(30.0, 0.0), &ammo(2, 0.0));

        let mut hits: Vec<EntityHandle> = Vec::new();
        let mut tiles = 0;
        let mut handler = (
            |_: &Projectile, h: EntityHandle, _: &mut EntityStore| {
                hits.push(h);
                false
            },
            |_: &Projectile, _: (i32, i32)| tiles += 1,
        );
        for _ in 0..30 {
            sim.step(DT, &grid, &mut store, &mut handler);
        }
        drop(handler);
        assert_eq!(hits, targets[..3].to_vec());
        assert_eq!(tiles, 0);
        assert!(sim.get(shot).is_none());
    }

    #[test]
    fn overlapping_entities_in_one_substep_all_counted() {
        let grid = open(20, 5);
        let mut store = EntityStore::with_capacity(8).unwrap();
        // Three boxes stacked on the same spot.
        let targets = row_of_entities(&mut store, &[6.0, 6.0, 6.0]);
        let mut sim = ProjectileSimulator::with_capacity(4).unwrap();
        spawn_at(&mut sim, Vec2::new(6.0, 2.0), Vec2::ZERO, &ammo(2, 0.0));

        let mut hits = Vec::new();
        let mut handler = (
            |_: &Projectile, h: EntityHandle, _: &mut EntityStore| {
                hits.push(h);
                false
            },
            |_: &Projectile, _: (i32, i32)| {},
        );
        let stats = sim.step(DT, &grid, &mut store, &mut handler);
        drop(handler);
        assert_eq!(hits, targets);
        assert_eq!(stats.spent, 1);
        assert!(sim.is_empty());
    }

    #[test]
    fn never_hits_owner() {
        let grid = open(10, 5);
        let mut store = EntityStore::with_capacity(2).unwrap();
        let owner = row_of_entities(&mut store, &[3.0])[0];
        let mut sim = ProjectileSimulator::with_capacity(2).unwrap();
        let shot = sim
            .spawn(
                ProjectileSpawn::new(Vec2::new(3.0, 2.0), Vec2::ZERO, 0.2, 1, AmmoTypeId(1))
                    .with_owner(owner),
                &ammo(0, 0.0),
                4,
            )
            .unwrap();
        let mut handler = (
            |_: &Projectile, _: EntityHandle, _: &mut EntityStore| -> bool {
                panic!("owner was hit")
            },
            |_: &Projectile, _: (i32, i32)| {},
        );
        sim.step(DT, &grid, &mut store, &mut handler);
        assert!(sim.get(shot).is_some());
    }

    #[test]
    fn wall_hit_reports_tile_and_deactivates() {
        let mut grid = open(10, 5);
        grid.set(6, 2, TileFlags::WALL);
        let mut store = EntityStore::with_capacity(1).unwrap();
        let mut sim = ProjectileSimulator::with_capacity(2).unwrap();
        let shot = spawn_at(&mut sim, Vec2::new(3.0, 2.5), Vec2::new(60.0, 0.0), &ammo(0, 0.0));

        let mut tiles = Vec::new();
        let mut handler = (
            |_: &Projectile, _: EntityHandle, _: &mut EntityStore| false,
            |_: &Projectile, t: (i32, i32)| tiles.push(t),
        );
        let mut total = ProjectileStepStats::default();
        for _ in 0..10 {
            let s = sim.step(DT, &grid, &mut store, &mut handler);
            total.tile_hits += s.tile_hits;
        }
        drop(handler);
        assert_eq!(tiles, vec![(6, 2)]);
        assert_eq!(total.tile_hits, 1);
        assert!(sim.get(shot).is_none());
    }

    #[test]
    fn water_does_not_stop_projectiles() {
        let mut grid = open(10, 5);
        grid.set(5, 2, TileFlags::WATER);
        let mut store = EntityStore::with_capacity(1).unwrap();
        let mut sim = ProjectileSimulator::with_capacity(2).unwrap();
        let shot = spawn_at(&mut sim, Vec2::new(3.0, 2.5), Vec2::new(60.0, 0.0), &ammo(0, 0.0));
        let mut handler = (
            |_: &Projectile, _: EntityHandle, _: &mut EntityStore| false,
            |_: &Projectile, _: (i32, i32)| {},
        );
        for _ in 0..3 {
            sim.step(DT, &grid, &mut store, &mut handler);
        }
        let p = sim.get(shot).unwrap();
        assert!(p.aabb.center().x > 5.5);
    }

    #[test]
    fn range_expiry_is_silent() {
        let grid = open(40, 5);
        let mut store = EntityStore::with_capacity(2).unwrap();
        // Beyond range.
        row_of_entities(&mut store, &[20.0]);
        let mut sim = ProjectileSimulator::with_capacity(2).unwrap();
        let shot = spawn_at(&mut sim, Vec2::new(2.0, 2.0), Vec2::new(60.0, 0.0), &ammo(0, 5.0));

        let calls = Cell::new(0u32);
        let mut handler = (
            |_: &Projectile, _: EntityHandle, _: &mut EntityStore| {
                calls.set(calls.get() + 1);
                false
            },
            |_: &Projectile, _: (i32, i32)| calls.set(calls.get() + 1),
        );
        let mut expired = 0;
        for _ in 0..20 {
            expired += sim.step(DT, &grid, &mut store, &mut handler).expired;
        }
        assert_eq!(calls.get(), 0);
        assert_eq!(expired, 1);
        assert!(sim.get(shot).is_none());
    }

    #[test]
    fn handler_can_stop_a_piercing_round() {
        let grid = open(20, 5);
        let mut store = EntityStore::with_capacity(4).unwrap();
        row_of_entities(&mut store, &[6.0, 6.0]);
        let mut sim = ProjectileSimulator::with_capacity(2).unwrap();
        spawn_at(&mut sim, Vec2::new(6.0, 2.0), Vec2::ZERO, &ammo(5, 0.0));
        let mut calls = 0;
        let mut handler = (
            |_: &Projectile, _: EntityHandle, _: &mut EntityStore| {
                calls += 1;
                true
            },
            |_: &Projectile, _: (i32, i32)| {},
        );
        sim.step(DT, &grid, &mut store, &mut handler);
        drop(handler);
        assert_eq!(calls, 1);
        assert!(sim.is_empty());
    }

    #[test]
    fn full_pool_refuses_spawn() {
        let mut sim = ProjectileSimulator::with_capacity(1).unwrap();
        let def = ammo(0, 0.0);
        assert!(sim
            .spawn(ProjectileSpawn::new(Vec2::ZERO, Vec2::X, 0.1, 0, AmmoTypeId(1)), &def, 4)
            .is_some());
        assert!(sim
            .spawn(ProjectileSpawn::new(Vec2::ZERO, Vec2::X, 0.1, 0, AmmoTypeId(1)), &def, 4)
            .is_none());
        assert_eq!(sim.len(), 1);
    }

    #[test]
    fn build_takes_damage_and_substeps_from_ammo() {
        let def = AmmoDef {
            damage_mult: 1.5,
            substeps: 6,
            pierce: 2,
            ..AmmoDef::default()
        };
        let p = ProjectileSpawn::new(Vec2::ONE, Vec2::X, 0.2, 0, AmmoTypeId(3))
            .with_damage(20.0)
            .build(9, &def, 4);
        assert_eq!(p.damage, 30.0);
        assert_eq!(p.substeps, 6);
        assert_eq!(p.pierce_remaining, 2);
        let fallback = ProjectileSpawn::new(Vec2::ONE, Vec2::X, 0.2, 0, AmmoTypeId(3))
            .build(9, &AmmoDef::default(), 4);
        assert_eq!(fallback.substeps, 4);
    }
}
