//! The definition registry.
//!
//! Holds every weapon, ammo, and entity-type definition the simulation
//! may spawn. Definitions are sanitized on registration, so lookups
//! always return data inside its legal range.

use indexmap::IndexMap;

use crate::def::{AmmoDef, EntityTypeDef, WeaponDef};
use crate::id::{AmmoTypeId, EntityTypeId, WeaponDefId};
use crate::raw::RawDef;

/// Registry of read-only definitions, iterated in registration order.
#[derive(Clone, Debug, Default)]
pub struct Definitions {
    weapons: IndexMap<WeaponDefId, WeaponDef>,
    ammo: IndexMap<AmmoTypeId, AmmoDef>,
    entities: IndexMap<EntityTypeId, EntityTypeDef>,
}

impl Definitions {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a weapon definition.
    pub fn insert_weapon(&mut self, id: WeaponDefId, def: WeaponDef) {
        self.weapons.insert(id, def.sanitized());
    }

    /// Register (or replace) an ammo definition.
    pub fn insert_ammo(&mut self, id: AmmoTypeId, def: AmmoDef) {
        self.ammo.insert(id, def.sanitized());
    }

    /// Register (or replace) an entity-type definition.
    pub fn insert_entity(&mut self, id: EntityTypeId, def: EntityTypeDef) {
        self.entities.insert(id, def.sanitized());
    }

    /// Register a weapon from a loose record.
    pub fn insert_weapon_raw(&mut self, id: WeaponDefId, raw: &RawDef) {
        self.insert_weapon(id, WeaponDef::from_raw(raw));
    }

    /// Register an ammo type from a loose record.
    pub fn insert_ammo_raw(&mut self, id: AmmoTypeId, raw: &RawDef) {
        self.insert_ammo(id, AmmoDef::from_raw(raw));
    }

    /// Register an entity type from a loose record.
    pub fn insert_entity_raw(&mut self, id: EntityTypeId, raw: &RawDef) {
        self.insert_entity(id, EntityTypeDef::from_raw(raw));
    }

    /// Builder-style [`insert_weapon`](Self::insert_weapon).
    pub fn with_weapon(mut self, id: WeaponDefId, def: WeaponDef) -> Self {
        self.insert_weapon(id, def);
        self
    }

    /// Builder-style [`insert_ammo`](Self::insert_ammo).
    pub fn with_ammo(mut self, id: AmmoTypeId, def: AmmoDef) -> Self {
        self.insert_ammo(id, def);
        self
    }

    /// Builder-style [`insert_entity`](Self::insert_entity).
    pub fn with_entity(mut self, id: EntityTypeId, def: EntityTypeDef) -> Self {
        self.insert_entity(id, def);
        self
    }

    /// Look up a weapon definition.
    pub fn weapon(&self, id: WeaponDefId) -> Option<&WeaponDef> {
        self.weapons.get(&id)
    }

    /// Look up an ammo definition.
    pub fn ammo(&self, id: AmmoTypeId) -> Option<&AmmoDef> {
        self.ammo.get(&id)
    }

    /// Look up an entity-type definition.
    pub fn entity(&self, id: EntityTypeId) -> Option<&EntityTypeDef> {
        self.entities.get(&id)
    }

    /// Iterate over weapon definitions in registration order.
    pub fn weapons(&self) -> impl Iterator<Item = (&WeaponDefId, &WeaponDef)> {
        self.weapons.iter()
    }

    /// Iterate over entity-type definitions in registration order.
    pub fn entities(&self) -> impl Iterator<Item = (&EntityTypeId, &EntityTypeDef)> {
        self.entities.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_sanitizes() {
        let defs = Definitions::new().with_weapon(
            WeaponDefId(1),
            WeaponDef {
                jam_chance: 2.0,
                ..WeaponDef::default()
            },
        );
        assert_eq!(defs.weapon(WeaponDefId(1)).unwrap().jam_chance, 1.0);
    }

    #[test]
    fn unknown_ids_are_none() {
        let defs = Definitions::new();
        assert!(defs.weapon(WeaponDefId(0)).is_none());
        assert!(defs.ammo(AmmoTypeId(0)).is_none());
        assert!(defs.entity(EntityTypeId(0)).is_none());
    }

    #[test]
    fn raw_registration_round_trips_name() {
        let mut defs = Definitions::new();
        defs.insert_entity_raw(EntityTypeId(2), &RawDef::new().with("name", "grunt"));
        assert_eq!(defs.entity(EntityTypeId(2)).unwrap().name, "grunt");
    }

    #[test]
    fn iteration_follows_registration_order() {
        let defs = Definitions::new()
            .with_entity(EntityTypeId(5), EntityTypeDef::default())
            .with_entity(EntityTypeId(1), EntityTypeDef::default());
        let ids: Vec<u32> = defs.entities().map(|(id, _)| id.0).collect();
        assert_eq!(ids, vec![5, 1]);
    }
}
