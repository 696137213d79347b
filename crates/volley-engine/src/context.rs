//! The simulation context: owner of every pool and the fixed-timestep loop.
//!
//! One [`SimulationContext::step`] runs the stages in a fixed order:
//!
//! ```text
//! pre-tick hooks
//!   → movement & collision
//!   → shield regen & weapon timers
//!   → pickups & inventory
//!   → reload presses → trigger pulls → unjam actions
//!   → projectiles & damage
//! post-tick hooks
//! ```
//!
//! External readers observe state only between steps.

use std::time::Instant;

use glam::Vec2;
use indexmap::IndexMap;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace, warn};
use volley_arena::SlotPool;
use volley_core::{
    AmmoDef, AmmoTypeId, ControlSignals, DefKey, Definitions, EntityTypeId, HookKind, PoolKind,
    SimEvent, SpawnError, TickId, TickPhase, WeaponDef, WeaponDefId,
};
use volley_space::{AxisCollisionResolver, TileGrid};

use crate::config::{ConfigError, SimConfig};
use crate::damage::{self, threshold_crossings};
use crate::entity::{Entity, EntityHandle, EntityStore};
use crate::hooks::{EventSink, HookFn, HookTable, Notifier};
use crate::metrics::StepMetrics;
use crate::movement;
use crate::projectile::{
    HitHandler, Projectile, ProjectileHandle, ProjectileSimulator, ProjectileSpawn,
};
use crate::weapon::{TriggerOutcome, WeaponHandle, WeaponInstance};

/// Everything one [`SimulationContext::step`] produced.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StepReport {
    /// Tick that was just simulated.
    pub tick: TickId,
    /// Notifications in emission order. Tick hooks are not included.
    pub events: Vec<SimEvent>,
    /// Counters for this tick.
    pub metrics: StepMetrics,
}

impl StepReport {
    /// Events routed to `hook`.
    pub fn of(&self, hook: HookKind) -> impl Iterator<Item = &SimEvent> + '_ {
        self.events.iter().filter(move |e| e.hook() == hook)
    }

    /// Number of events routed to `hook`.
    pub fn count(&self, hook: HookKind) -> usize {
        self.of(hook).count()
    }
}

/// A queued inventory change, applied in the pickups stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum InventoryOp {
    Ammo { entity: EntityHandle, rounds: u32 },
    Equip { entity: EntityHandle, weapon: WeaponHandle },
}

/// Owns every pool, the tile grid, the definitions, and the hook table.
pub struct SimulationContext {
    config: SimConfig,
    defs: Definitions,
    grid: TileGrid,
    entities: EntityStore,
    projectiles: ProjectileSimulator,
    weapons: SlotPool<WeaponInstance>,
    hooks: HookTable,
    rng: ChaCha8Rng,
    tick: TickId,
    pending: Vec<InventoryOp>,
    next_weapon_serial: u64,
    fallback_ammo: AmmoDef,
}

impl SimulationContext {
    /// Build a context, allocating every pool up front.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration is invalid or a pool
    /// cannot be constructed. Nothing else is fatal.
    pub fn new(config: SimConfig, defs: Definitions, grid: TileGrid) -> Result<Self, ConfigError> {
        config.validate()?;
        let entities = EntityStore::with_capacity(config.max_entities)?;
        let projectiles = ProjectileSimulator::with_capacity(config.max_projectiles)?;
        let weapons = SlotPool::with_capacity(config.max_weapons)?;
        let seed = config.seed.unwrap_or_else(rand::random);
        Ok(Self {
            config,
            defs,
            grid,
            entities,
            projectiles,
            weapons,
            hooks: HookTable::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            tick: TickId::default(),
            pending: Vec::new(),
            next_weapon_serial: 1,
            fallback_ammo: AmmoDef::default(),
        })
    }

    // ── accessors ───────────────────────────────────────────────

    /// The configuration.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// The definitions.
    pub fn definitions(&self) -> &Definitions {
        &self.defs
    }

    /// The tile grid.
    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    /// Number of completed ticks.
    pub fn tick(&self) -> TickId {
        self.tick
    }

    /// The entity store.
    pub fn entities(&self) -> &EntityStore {
        &self.entities
    }

    /// Borrow a live entity.
    pub fn entity(&self, handle: EntityHandle) -> Option<&Entity> {
        self.entities.get(handle)
    }

    /// Mutably borrow a live entity.
    pub fn entity_mut(&mut self, handle: EntityHandle) -> Option<&mut Entity> {
        self.entities.get_mut(handle)
    }

    /// Borrow a live weapon.
    pub fn weapon(&self, handle: WeaponHandle) -> Option<&WeaponInstance> {
        self.weapons.get(handle)
    }

    /// Mutably borrow a live weapon.
    pub fn weapon_mut(&mut self, handle: WeaponHandle) -> Option<&mut WeaponInstance> {
        self.weapons.get_mut(handle)
    }

    /// Number of live weapons.
    pub fn weapon_count(&self) -> usize {
        self.weapons.len()
    }

    /// The projectile pool.
    pub fn projectiles(&self) -> &ProjectileSimulator {
        &self.projectiles
    }

    /// Borrow a live projectile.
    pub fn projectile(&self, handle: ProjectileHandle) -> Option<&Projectile> {
        self.projectiles.get(handle)
    }

    /// Register a hook for `(key, kind)`, replacing any existing one.
    pub fn register_hook(&mut self, key: DefKey, kind: HookKind, hook: HookFn) -> Option<HookFn> {
        self.hooks.register(key, kind, hook)
    }

    /// The hook table.
    pub fn hooks_mut(&mut self) -> &mut HookTable {
        &mut self.hooks
    }

    // ── spawn surface ───────────────────────────────────────────

    /// Spawn an entity of `type_id` centred on `position`.
    pub fn spawn_entity(
        &mut self,
        type_id: EntityTypeId,
        position: Vec2,
    ) -> Result<EntityHandle, SpawnError> {
        let Some(def) = self.defs.entity(type_id) else {
            warn!(%type_id, "spawn of unknown entity type");
            return Err(SpawnError::UnknownDefinition {
                key: DefKey::Entity(type_id),
            });
        };
        self.entities
            .new_entity(type_id, def, position)
            .ok_or_else(|| exhausted(PoolKind::Entities))
    }

    /// Spawn an unequipped weapon of `def_id`, loaded with a weighted
    /// choice of its compatible ammo.
    pub fn spawn_weapon(&mut self, def_id: WeaponDefId) -> Result<WeaponHandle, SpawnError> {
        let Some(def) = self.defs.weapon(def_id) else {
            warn!(weapon = %def_id, "spawn of unknown weapon");
            return Err(SpawnError::UnknownDefinition {
                key: DefKey::Weapon(def_id),
            });
        };
        if self.weapons.is_full() {
            return Err(exhausted(PoolKind::Weapons));
        }
        let ammo = WeaponInstance::pick_ammo(def, &mut self.rng).unwrap_or_else(|| {
            warn!(weapon = %def_id, "weapon lists no ammo, loading the fallback type");
            AmmoTypeId(0)
        });
        let instance = WeaponInstance::new(self.next_weapon_serial, def_id, def, ammo);
        let handle = self
            .weapons
            .allocate(instance)
            .ok_or_else(|| exhausted(PoolKind::Weapons))?;
        self.next_weapon_serial += 1;
        Ok(handle)
    }

    /// Spawn a projectile. Stats come from the ammo definition.
    pub fn spawn_projectile(
        &mut self,
        spawn: ProjectileSpawn,
    ) -> Result<ProjectileHandle, SpawnError> {
        let Some(ammo) = self.defs.ammo(spawn.ammo) else {
            warn!(ammo = %spawn.ammo, "spawn of unknown ammo type");
            return Err(SpawnError::UnknownDefinition {
                key: DefKey::Ammo(spawn.ammo),
            });
        };
        self.projectiles
            .spawn(spawn, ammo, self.config.default_substeps)
            .ok_or_else(|| exhausted(PoolKind::Projectiles))
    }

    /// Equip `weapon` on `entity`, taking it from any previous holder.
    pub fn equip_weapon(
        &mut self,
        entity: EntityHandle,
        weapon: WeaponHandle,
    ) -> Result<(), SpawnError> {
        equip(&mut self.entities, &self.weapons, entity, weapon)
    }

    /// Queue rounds to add to `entity`'s equipped weapon's reserve.
    pub fn queue_ammo_pickup(&mut self, entity: EntityHandle, rounds: u32) {
        self.pending.push(InventoryOp::Ammo { entity, rounds });
    }

    /// Queue an equip to apply in the next pickups stage.
    pub fn queue_equip(&mut self, entity: EntityHandle, weapon: WeaponHandle) {
        self.pending.push(InventoryOp::Equip { entity, weapon });
    }

    /// Remove an entity. Its weapon stays in the pool, unequipped.
    pub fn despawn_entity(&mut self, entity: EntityHandle) -> Option<Entity> {
        self.entities.free(entity)
    }

    /// Remove a weapon, unequipping it first.
    pub fn despawn_weapon(&mut self, weapon: WeaponHandle) -> Option<WeaponInstance> {
        let removed = self.weapons.free(weapon)?;
        for handle in self.entities.active_handles() {
            if let Some(e) = self.entities.get_mut(handle) {
                if e.weapon == Some(weapon) {
                    e.weapon = None;
                }
            }
        }
        Some(removed)
    }

    // ── room lifecycle ──────────────────────────────────────────

    /// Free every entity, projectile, and weapon and drop queued
    /// inventory changes. All outstanding handles become invalid.
    pub fn clear_room(&mut self) {
        debug!(
            entities = self.entities.len(),
            projectiles = self.projectiles.len(),
            weapons = self.weapons.len(),
            "clearing room"
        );
        self.entities.clear();
        self.projectiles.clear();
        self.weapons.clear();
        self.pending.clear();
    }

    /// Swap in a newly generated tile grid, returning the old one.
    pub fn set_tile_grid(&mut self, grid: TileGrid) -> TileGrid {
        std::mem::replace(&mut self.grid, grid)
    }

    // ── step ────────────────────────────────────────────────────

    /// Advance the simulation by one fixed timestep.
    ///
    /// `signals` maps entities to this tick's controls; entities not listed
    /// get default (idle) signals. Later duplicates override earlier ones.
    pub fn step(&mut self, signals: &[(EntityHandle, ControlSignals)]) -> StepReport {
        let started = Instant::now();
        let dt = self.config.dt;
        let controls: IndexMap<EntityHandle, ControlSignals> = signals.iter().copied().collect();
        let mut metrics = StepMetrics::default();
        let mut events = Vec::new();

        let Self {
            config,
            defs,
            grid,
            entities,
            projectiles,
            weapons,
            hooks,
            rng,
            pending,
            fallback_ammo,
            ..
        } = self;
        let mut notifier = Notifier::new(hooks, &mut events);
        let signals_for = |h: EntityHandle| controls.get(&h).copied().unwrap_or_default();

        tick_hooks(entities, TickPhase::Pre, &mut notifier);

        // Movement and collision.
        let resolver = AxisCollisionResolver::new(grid);
        for handle in entities.active_handles() {
            let Some(entity) = entities.get_mut(handle) else {
                continue;
            };
            if movement::drive(entity, &signals_for(handle), dt) {
                notifier.emit(SimEvent::Dash {
                    entity: entity.snapshot(),
                });
            }
            let mut velocity = entity.velocity;
            resolver.move_entity(&mut entity.aabb, &mut velocity, dt, config.movement_substeps);
            entity.velocity = velocity;
        }

        // Shield regen and weapon timers.
        for handle in entities.active_handles() {
            let Some(entity) = entities.get_mut(handle) else {
                continue;
            };
            if let Some((before, after)) = entity.regen_shield(dt) {
                for kind in threshold_crossings(before, after, entity.shield_max, false) {
                    notifier.emit(SimEvent::Threshold {
                        entity: entity.snapshot(),
                        kind,
                    });
                }
            }
            if let Some((weapon, def)) = equipped(entity, weapons, defs) {
                weapon.advance(def, dt, &mut notifier);
            }
        }

        // Pickups and inventory.
        for op in pending.drain(..) {
            match op {
                InventoryOp::Ammo { entity, rounds } => {
                    let weapon = entities
                        .get(entity)
                        .and_then(|e| e.weapon)
                        .and_then(|w| weapons.get_mut(w));
                    match weapon {
                        Some(w) => {
                            let added = w.add_reserve(rounds);
                            trace!(weapon = w.serial, rounds, added, "ammo picked up");
                        }
                        None => debug!(%entity, "ammo pickup without a weapon dropped"),
                    }
                }
                InventoryOp::Equip { entity, weapon } => {
                    if let Err(err) = equip(entities, weapons, entity, weapon) {
                        debug!(%entity, %weapon, %err, "queued equip dropped");
                    }
                }
            }
        }

        // Reload presses.
        for handle in entities.active_handles() {
            if !signals_for(handle).reload {
                continue;
            }
            if let Some((weapon, def)) = entities.get(handle).and_then(|e| equipped(e, weapons, defs)) {
                weapon.press_reload(def, rng, &mut notifier);
            }
        }

        // Trigger pulls.
        for handle in entities.active_handles() {
            let trigger = signals_for(handle).trigger;
            let Some(entity) = entities.get(handle) else {
                continue;
            };
            let Some(weapon_handle) = entity.weapon else {
                continue;
            };
            let Some((weapon, def)) = equipped(entity, weapons, defs) else {
                continue;
            };
            match weapon.pull_trigger(def, trigger, rng, &mut notifier) {
                TriggerOutcome::Idle | TriggerOutcome::Empty => {}
                TriggerOutcome::Jammed => {
                    metrics.shots_fired += 1;
                    metrics.jams += 1;
                }
                TriggerOutcome::Fired { spread } => {
                    metrics.shots_fired += 1;
                    let ammo = defs.ammo(weapon.ammo).unwrap_or(&*fallback_ammo);
                    let direction = spread_direction(entity.aim, spread + entity.movement_spread, rng);
                    let spawn = ProjectileSpawn::new(
                        entity.position(),
                        direction * ammo.speed,
                        ammo.size,
                        0,
                        weapon.ammo,
                    )
                    .with_owner(handle)
                    .with_damage(def.damage)
                    .with_kind(def.projectile_kind);
                    let weapon_snapshot = weapon.snapshot();
                    match projectiles.spawn(spawn, ammo, config.default_substeps) {
                        Some(shot) => {
                            metrics.projectiles_spawned += 1;
                            if let Some(p) = projectiles.get(shot) {
                                notifier.emit(SimEvent::Shoot {
                                    weapon: weapon_snapshot,
                                    projectile: p.snapshot(),
                                });
                            }
                        }
                        None => {
                            metrics.spawn_failures += 1;
                            warn!(weapon = %weapon_handle, "projectile pool exhausted, shot skipped");
                        }
                    }
                }
            }
        }

        // Unjam actions.
        for handle in entities.active_handles() {
            if !signals_for(handle).unjam {
                continue;
            }
            if let Some((weapon, def)) = entities.get(handle).and_then(|e| equipped(e, weapons, defs)) {
                weapon.unjam(def, config.unjam_step, rng, &mut notifier);
            }
        }

        // Projectiles and damage.
        let mut hits = CombatHits {
            sink: &mut notifier,
            metrics: &mut metrics,
            weapons: &mut *weapons,
        };
        let stats = projectiles.step(dt, grid, entities, &mut hits);
        metrics.projectiles_expired += stats.expired;
        metrics.tile_hits += stats.tile_hits;

        tick_hooks(entities, TickPhase::Post, &mut notifier);
        drop(notifier);

        let tick = self.tick;
        self.tick = TickId(tick.0 + 1);
        metrics.total_us = started.elapsed().as_micros() as u64;
        StepReport {
            tick,
            events,
            metrics,
        }
    }
}

impl std::fmt::Debug for SimulationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationContext")
            .field("tick", &self.tick)
            .field("entities", &self.entities.len())
            .field("projectiles", &self.projectiles.len())
            .field("weapons", &self.weapons.len())
            .field("hooks", &self.hooks)
            .finish()
    }
}

// ── stage helpers ──────────────────────────────────────────────────

fn exhausted(pool: PoolKind) -> SpawnError {
    warn!(%pool, "pool exhausted, spawn skipped");
    SpawnError::PoolExhausted { pool }
}

/// The entity's weapon and its definition, if both are live.
fn equipped<'w, 'd>(
    entity: &Entity,
    weapons: &'w mut SlotPool<WeaponInstance>,
    defs: &'d Definitions,
) -> Option<(&'w mut WeaponInstance, &'d WeaponDef)> {
    let weapon = weapons.get_mut(entity.weapon?)?;
    let def = defs.weapon(weapon.def)?;
    Some((weapon, def))
}

fn equip(
    entities: &mut EntityStore,
    weapons: &SlotPool<WeaponInstance>,
    entity: EntityHandle,
    weapon: WeaponHandle,
) -> Result<(), SpawnError> {
    if !weapons.contains(weapon) {
        return Err(SpawnError::StaleHandle {
            what: PoolKind::Weapons,
        });
    }
    if !entities.contains(entity) {
        return Err(SpawnError::StaleHandle {
            what: PoolKind::Entities,
        });
    }
    for other in entities.active_handles() {
        if let Some(e) = entities.get_mut(other) {
            if e.weapon == Some(weapon) {
                e.weapon = None;
            }
        }
    }
    if let Some(e) = entities.get_mut(entity) {
        e.weapon = Some(weapon);
    }
    Ok(())
}

fn tick_hooks(entities: &EntityStore, phase: TickPhase, notifier: &mut Notifier<'_>) {
    let kind = match phase {
        TickPhase::Pre => HookKind::PreTick,
        TickPhase::Post => HookKind::PostTick,
    };
    for (_, entity) in entities.iter() {
        if notifier.wants(DefKey::Entity(entity.type_id), kind) {
            notifier.emit(SimEvent::Tick {
                phase,
                entity: entity.snapshot(),
            });
        }
    }
}

/// `aim` rotated by a uniform random angle within ±`spread / 2` degrees.
fn spread_direction<R: Rng + ?Sized>(aim: Vec2, spread: f32, rng: &mut R) -> Vec2 {
    let aim = aim.try_normalize().unwrap_or(Vec2::X);
    let half = spread * 0.5;
    if !half.is_finite() || half <= 0.0 {
        return aim;
    }
    let angle = rng.random_range(-half..=half).to_radians();
    Vec2::from_angle(angle).rotate(aim)
}

/// Routes projectile impacts into the damage pipeline.
///
/// A freed casualty takes its equipped weapon with it.
struct CombatHits<'a, S: EventSink> {
    sink: &'a mut S,
    metrics: &'a mut StepMetrics,
    weapons: &'a mut SlotPool<WeaponInstance>,
}

impl<S: EventSink> HitHandler for CombatHits<'_, S> {
    fn on_hit_entity(
        &mut self,
        projectile: &Projectile,
        target: EntityHandle,
        entities: &mut EntityStore,
    ) -> bool {
        let Some(entity) = entities.get(target) else {
            return false;
        };
        trace!(projectile = projectile.serial, entity = entity.serial, "projectile hit entity");
        self.sink.emit(SimEvent::ProjectileHitEntity {
            projectile: projectile.snapshot(),
            entity: entity.snapshot(),
        });
        self.metrics.projectile_hits += 1;
        let carried = entity.weapon;
        if let Some(outcome) = damage::apply(entities, target, &projectile.hit(), &mut *self.sink) {
            if outcome.died {
                self.metrics.kills += 1;
                if !entities.contains(target) {
                    if let Some(weapon) = carried {
                        self.weapons.free(weapon);
                    }
                }
            }
            if let Some(attacker) = projectile.owner.and_then(|o| entities.get_mut(o)) {
                attacker.damage_dealt += outcome.dealt();
            }
        }
        false
    }

    fn on_hit_tile(&mut self, projectile: &Projectile, tile: (i32, i32)) {
        trace!(projectile = projectile.serial, ?tile, "projectile hit tile");
        self.sink.emit(SimEvent::ProjectileHitTile {
            projectile: projectile.snapshot(),
            tile,
        });
    }
}
