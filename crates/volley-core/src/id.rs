//! Strongly-typed definition identifiers and the tick counter.
//!
//! Definition IDs are opaque to the core: they select a definition from
//! the [`Definitions`](crate::Definitions) registry and route hook calls,
//! nothing more.

use std::fmt;

/// Identifies an entity-type definition (player, grunt, turret, ...).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityTypeId(pub u32);

impl fmt::Display for EntityTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for EntityTypeId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Identifies a weapon definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WeaponDefId(pub u32);

impl fmt::Display for WeaponDefId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for WeaponDefId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Identifies an ammo definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AmmoTypeId(pub u32);

impl fmt::Display for AmmoTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for AmmoTypeId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Visual/behavioural projectile kind named by a weapon definition.
///
/// The core carries it through to snapshots untouched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectileKindId(pub u32);

impl fmt::Display for ProjectileKindId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonically increasing tick counter.
///
/// Incremented each time the simulation advances one fixed step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TickId(pub u64);

impl fmt::Display for TickId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TickId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// The definition an event or hook belongs to.
///
/// Entity notifications route by entity type, weapon notifications by
/// weapon definition, and projectile notifications by ammo type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DefKey {
    /// An entity-type definition.
    Entity(EntityTypeId),
    /// A weapon definition.
    Weapon(WeaponDefId),
    /// An ammo definition.
    Ammo(AmmoTypeId),
}

impl fmt::Display for DefKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entity(id) => write!(f, "entity:{id}"),
            Self::Weapon(id) => write!(f, "weapon:{id}"),
            Self::Ammo(id) => write!(f, "ammo:{id}"),
        }
    }
}

impl From<EntityTypeId> for DefKey {
    fn from(v: EntityTypeId) -> Self {
        Self::Entity(v)
    }
}

impl From<WeaponDefId> for DefKey {
    fn from(v: WeaponDefId) -> Self {
        Self::Weapon(v)
    }
}

impl From<AmmoTypeId> for DefKey {
    fn from(v: AmmoTypeId) -> Self {
        Self::Ammo(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn def_key_display_names_the_namespace() {
        assert_eq!(DefKey::from(EntityTypeId(3)).to_string(), "entity:3");
        assert_eq!(DefKey::from(WeaponDefId(7)).to_string(), "weapon:7");
        assert_eq!(DefKey::from(AmmoTypeId(0)).to_string(), "ammo:0");
    }

    #[test]
    fn def_keys_in_different_namespaces_differ() {
        assert_ne!(
            DefKey::from(EntityTypeId(1)),
            DefKey::from(WeaponDefId(1))
        );
    }
}
