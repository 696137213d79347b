//! Simulation entities and the store that owns them.

use glam::Vec2;
use volley_arena::{ArenaError, Handle, SlotPool};
use volley_core::{Aabb, EntityKind, EntitySnapshot, EntityTypeDef, EntityTypeId};

use crate::movement::{DashState, MotionStats};
use crate::weapon::WeaponHandle;

/// Handle to an [`Entity`] in the [`EntityStore`].
pub type EntityHandle = Handle<Entity>;

/// A live actor: player or NPC.
///
/// Stats are copied from the [`EntityTypeDef`] at spawn, so an entity
/// never looks its definition up again. `type_id` is kept only to route
/// notifications.
#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    /// Spawn serial, unique within a context.
    pub serial: u64,
    /// Definition the entity was spawned from.
    pub type_id: EntityTypeId,
    /// Player or NPC.
    pub kind: EntityKind,
    /// World-space bounds.
    pub aabb: Aabb,
    /// Velocity for the current tick.
    pub velocity: Vec2,
    /// Last non-zero aim direction.
    pub aim: Vec2,
    /// Current health, `0..=max_hp`.
    pub health: i32,
    /// Maximum health.
    pub max_hp: i32,
    /// Current shield, `0..=shield_max`.
    pub shield: f32,
    /// Shield capacity.
    pub shield_max: f32,
    /// Shield regenerated per second.
    pub shield_regen: f32,
    /// Seconds without damage before shield regen starts.
    pub shield_regen_delay: f32,
    /// Seconds since the entity last took damage.
    pub since_damage: f32,
    /// Armor percent.
    pub armor: f32,
    /// One-hit negation tokens.
    pub plates: u32,
    /// Movement spread accumulator in degrees.
    pub movement_spread: f32,
    /// Equipped weapon, if any.
    pub weapon: Option<WeaponHandle>,
    /// Shield and health damage this entity's projectiles have dealt.
    pub damage_dealt: f32,
    /// Movement tuning.
    pub motion: MotionStats,
    /// Dash timers.
    pub dash: DashState,
}

impl Entity {
    /// A fresh entity of type `type_id` centred on `center`.
    pub fn from_def(serial: u64, type_id: EntityTypeId, def: &EntityTypeDef, center: Vec2) -> Self {
        Self {
            serial,
            type_id,
            kind: def.kind,
            aabb: Aabb::from_center(center, def.size),
            velocity: Vec2::ZERO,
            aim: Vec2::X,
            health: def.max_hp,
            max_hp: def.max_hp,
            shield: def.shield_max,
            shield_max: def.shield_max,
            shield_regen: def.shield_regen,
            shield_regen_delay: def.shield_regen_delay,
            since_damage: 0.0,
            armor: def.armor,
            plates: def.plates,
            movement_spread: 0.0,
            weapon: None,
            damage_dealt: 0.0,
            motion: MotionStats::from(def),
            dash: DashState::default(),
        }
    }

    /// Centre of the bounds.
    pub fn position(&self) -> Vec2 {
        self.aabb.center()
    }

    /// Whether this is a player entity.
    pub fn is_player(&self) -> bool {
        self.kind == EntityKind::Player
    }

    /// Whether health is above zero.
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Advance the shield regen timer and regenerate if the delay has passed.
    ///
    /// Returns `(before, after)` when the shield changed.
    pub fn regen_shield(&mut self, dt: f32) -> Option<(f32, f32)> {
        self.since_damage += dt;
        if self.shield_max <= 0.0
            || self.shield_regen <= 0.0
            || self.shield >= self.shield_max
            || self.since_damage < self.shield_regen_delay
        {
            return None;
        }
        let before = self.shield;
        self.shield = (self.shield + self.shield_regen * dt).min(self.shield_max);
        Some((before, self.shield))
    }

    /// Plain-data view for notifications.
    pub fn snapshot(&self) -> EntitySnapshot {
        EntitySnapshot {
            serial: self.serial,
            type_id: self.type_id,
            kind: self.kind,
            position: self.position(),
            velocity: self.velocity,
            health: self.health,
            max_hp: self.max_hp,
            shield: self.shield,
            shield_max: self.shield_max,
            armor: self.armor,
            plates: self.plates,
            movement_spread: self.movement_spread,
            damage_dealt: self.damage_dealt,
        }
    }
}

/// Fixed-capacity store of entities.
#[derive(Clone, Debug)]
pub struct EntityStore {
    pool: SlotPool<Entity>,
    next_serial: u64,
}

impl EntityStore {
    /// A store with room for `capacity` entities.
    pub fn with_capacity(capacity: usize) -> Result<Self, ArenaError> {
        Ok(Self {
            pool: SlotPool::with_capacity(capacity)?,
            next_serial: 1,
        })
    }

    /// Spawn an entity of `type_id` centred on `center`.
    ///
    /// Returns `None` when the store is full.
    pub fn new_entity(
        &mut self,
        type_id: EntityTypeId,
        def: &EntityTypeDef,
        center: Vec2,
    ) -> Option<EntityHandle> {
        if self.pool.is_full() {
            return None;
        }
        let serial = self.next_serial;
        let handle = self
            .pool
            .allocate(Entity::from_def(serial, type_id, def, center))?;
        self.next_serial += 1;
        Some(handle)
    }

    /// Handles of every active entity, in slot order.
    pub fn active_handles(&self) -> Vec<EntityHandle> {
        self.pool.handles()
    }

    /// Borrow a live entity.
    pub fn get(&self, handle: EntityHandle) -> Option<&Entity> {
        self.pool.get(handle)
    }

    /// Mutably borrow a live entity.
    pub fn get_mut(&mut self, handle: EntityHandle) -> Option<&mut Entity> {
        self.pool.get_mut(handle)
    }

    /// Whether `handle` names a live entity.
    pub fn contains(&self, handle: EntityHandle) -> bool {
        self.pool.contains(handle)
    }

    /// Remove an entity, invalidating its handle.
    pub fn free(&mut self, handle: EntityHandle) -> Option<Entity> {
        self.pool.free(handle)
    }

    /// Iterate over live entities in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityHandle, &Entity)> + '_ {
        self.pool.iter()
    }

    /// Number of live entities.
    pub fn len(&self) -> usize {
        self.pool.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    /// Maximum number of live entities.
    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    /// Remove every entity.
    pub fn clear(&mut self) {
        self.pool.clear();
    }
}
