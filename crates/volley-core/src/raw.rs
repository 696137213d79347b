//! Loose definition records and field-by-field defaulting.
//!
//! The definition layer hands over untyped records. Each field is read
//! independently: a missing field silently takes its default, a field of
//! the wrong type or outside its legal range takes its default and logs a
//! warning. A record is never rejected as a whole.

use glam::Vec2;
use indexmap::IndexMap;
use smallvec::SmallVec;
use tracing::warn;

use crate::def::{AmmoDef, AmmoWeight, EntityKind, EntityTypeDef, FireMode, WeaponDef};
use crate::id::{AmmoTypeId, ProjectileKindId};

/// A single untyped definition value.
#[derive(Clone, Debug, PartialEq)]
pub enum DefValue {
    /// A floating-point number.
    Number(f64),
    /// An integer.
    Integer(i64),
    /// A boolean.
    Bool(bool),
    /// A string.
    Text(String),
    /// An ordered list of values.
    List(Vec<DefValue>),
}

impl DefValue {
    fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            Self::Number(v) if v.fract() == 0.0 && v.is_finite() => Some(*v as i64),
            _ => None,
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::Integer(_) => "integer",
            Self::Bool(_) => "bool",
            Self::Text(_) => "text",
            Self::List(_) => "list",
        }
    }
}

impl From<f64> for DefValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<i64> for DefValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<bool> for DefValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for DefValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

/// An untyped definition record: field name → value, in insertion order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawDef {
    fields: IndexMap<String, DefValue>,
}

impl RawDef {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: &str, value: impl Into<DefValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace a field.
    pub fn insert(&mut self, key: &str, value: impl Into<DefValue>) {
        self.fields.insert(key.to_owned(), value.into());
    }

    /// Look up a field.
    pub fn get(&self, key: &str) -> Option<&DefValue> {
        self.fields.get(key)
    }

    /// Number of fields present.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Reads typed fields out of a [`RawDef`], logging every fallback.
struct FieldReader<'a> {
    def: &'a str,
    raw: &'a RawDef,
}

impl<'a> FieldReader<'a> {
    fn new(def: &'a str, raw: &'a RawDef) -> Self {
        Self { def, raw }
    }

    fn fallback<T: std::fmt::Debug>(&self, field: &str, found: &DefValue, default: T) -> T {
        warn!(
            definition = self.def,
            field,
            found = found.type_name(),
            ?default,
            "malformed definition field, using default"
        );
        default
    }

    fn f32_where(&self, field: &str, default: f32, legal: impl Fn(f32) -> bool) -> f32 {
        let Some(value) = self.raw.get(field) else {
            return default;
        };
        match value.as_f64().map(|v| v as f32) {
            Some(v) if v.is_finite() && legal(v) => v,
            _ => self.fallback(field, value, default),
        }
    }

    fn non_negative(&self, field: &str, default: f32) -> f32 {
        self.f32_where(field, default, |v| v >= 0.0)
    }

    fn unit(&self, field: &str, default: f32) -> f32 {
        self.f32_where(field, default, |v| (0.0..=1.0).contains(&v))
    }

    fn u32(&self, field: &str, default: u32) -> u32 {
        let Some(value) = self.raw.get(field) else {
            return default;
        };
        match value.as_i64().and_then(|v| u32::try_from(v).ok()) {
            Some(v) => v,
            None => self.fallback(field, value, default),
        }
    }

    fn i32_where(&self, field: &str, default: i32, legal: impl Fn(i32) -> bool) -> i32 {
        let Some(value) = self.raw.get(field) else {
            return default;
        };
        match value.as_i64().and_then(|v| i32::try_from(v).ok()) {
            Some(v) if legal(v) => v,
            _ => self.fallback(field, value, default),
        }
    }

    fn bool(&self, field: &str, default: bool) -> bool {
        match self.raw.get(field) {
            None => default,
            Some(DefValue::Bool(b)) => *b,
            Some(other) => self.fallback(field, other, default),
        }
    }

    fn text(&self, field: &str, default: &str) -> String {
        match self.raw.get(field) {
            None => default.to_owned(),
            Some(DefValue::Text(s)) => s.clone(),
            Some(other) => self.fallback(field, other, default.to_owned()),
        }
    }

    fn fire_mode(&self, field: &str, default: FireMode) -> FireMode {
        match self.raw.get(field) {
            None => default,
            Some(DefValue::Text(s)) => match FireMode::from_name(s) {
                Some(mode) => mode,
                None => {
                    warn!(
                        definition = self.def,
                        field,
                        value = s.as_str(),
                        "unknown fire mode, using default"
                    );
                    default
                }
            },
            Some(other) => self.fallback(field, other, default),
        }
    }

    /// Reads `[[ammo_id, weight], ...]`, dropping malformed entries one by one.
    fn ammo_weights(&self, field: &str) -> SmallVec<[AmmoWeight; 4]> {
        let mut out = SmallVec::new();
        let Some(value) = self.raw.get(field) else {
            return out;
        };
        let DefValue::List(entries) = value else {
            return self.fallback(field, value, out);
        };
        for entry in entries {
            let parsed = match entry {
                DefValue::List(pair) if pair.len() == 2 => pair[0]
                    .as_i64()
                    .and_then(|id| u32::try_from(id).ok())
                    .zip(pair[1].as_f64())
                    .filter(|(_, w)| w.is_finite() && *w >= 0.0),
                // A bare id means weight 1.
                DefValue::Integer(id) => u32::try_from(*id).ok().map(|id| (id, 1.0)),
                _ => None,
            };
            match parsed {
                Some((id, weight)) => out.push(AmmoWeight {
                    ammo: AmmoTypeId(id),
                    weight: weight as f32,
                }),
                None => {
                    warn!(
                        definition = self.def,
                        field,
                        "malformed ammo weight entry dropped"
                    );
                }
            }
        }
        out
    }
}

impl WeaponDef {
    /// Build a weapon definition from a loose record, defaulting field by field.
    pub fn from_raw(raw: &RawDef) -> Self {
        let d = WeaponDef::default();
        let name = FieldReader::new("weapon", raw).text("name", &d.name);
        let r = FieldReader::new(&name, raw);
        let reload_time = r.non_negative("reload_time", d.reload_time);
        WeaponDef {
            damage: r.non_negative("damage", d.damage),
            rounds_per_minute: r.non_negative("rounds_per_minute", d.rounds_per_minute),
            deviation: r.non_negative("deviation", d.deviation),
            recoil: r.non_negative("recoil", d.recoil),
            recoil_max: r.non_negative("recoil_max", d.recoil_max),
            control: r.non_negative("control", d.control),
            magazine_size: r.u32("magazine_size", d.magazine_size).max(1),
            reserve_capacity: r.u32("reserve_capacity", d.reserve_capacity),
            fire_mode: r.fire_mode("fire_mode", d.fire_mode),
            burst_count: r.u32("burst_count", d.burst_count).max(1),
            burst_rpm: r.non_negative("burst_rpm", d.burst_rpm),
            reload_time,
            eject_time: r
                .non_negative("eject_time", d.eject_time)
                .min(reload_time),
            active_reload_center: r.unit("active_reload_center", d.active_reload_center),
            active_reload_size: r.f32_where("active_reload_size", d.active_reload_size, |v| {
                (0.0..=0.5).contains(&v)
            }),
            active_reload_variance: r.unit("active_reload_variance", d.active_reload_variance),
            jam_chance: r.unit("jam_chance", d.jam_chance),
            ammo: r.ammo_weights("ammo"),
            projectile_kind: ProjectileKindId(r.u32("projectile_kind", d.projectile_kind.0)),
            name,
        }
    }
}

impl AmmoDef {
    /// Build an ammo definition from a loose record, defaulting field by field.
    pub fn from_raw(raw: &RawDef) -> Self {
        let d = AmmoDef::default();
        let name = FieldReader::new("ammo", raw).text("name", &d.name);
        let r = FieldReader::new(&name, raw);
        AmmoDef {
            damage_mult: r.non_negative("damage_mult", d.damage_mult),
            armor_pen: r.f32_where("armor_pen", d.armor_pen, |v| (0.0..=100.0).contains(&v)),
            shield_mult: r.non_negative("shield_mult", d.shield_mult),
            range: r.non_negative("range", d.range),
            falloff_start: r.non_negative("falloff_start", d.falloff_start),
            falloff_end: r.non_negative("falloff_end", d.falloff_end),
            falloff_min: r.unit("falloff_min", d.falloff_min),
            pierce: r.u32("pierce", d.pierce),
            speed: r.non_negative("speed", d.speed),
            size: r.non_negative("size", d.size),
            substeps: r.u32("substeps", d.substeps),
            name,
        }
    }
}

impl EntityTypeDef {
    /// Build an entity-type definition from a loose record, defaulting field by field.
    pub fn from_raw(raw: &RawDef) -> Self {
        let d = EntityTypeDef::default();
        let name = FieldReader::new("entity", raw).text("name", &d.name);
        let r = FieldReader::new(&name, raw);
        let kind = if r.bool("player", d.kind == EntityKind::Player) {
            EntityKind::Player
        } else {
            EntityKind::Npc
        };
        let width = r.f32_where("width", d.size.x, |v| v > 0.0);
        let height = r.f32_where("height", d.size.y, |v| v > 0.0);
        EntityTypeDef {
            kind,
            max_hp: r.i32_where("max_hp", d.max_hp, |v| v > 0),
            shield_max: r.non_negative("shield_max", d.shield_max),
            shield_regen: r.non_negative("shield_regen", d.shield_regen),
            shield_regen_delay: r.non_negative("shield_regen_delay", d.shield_regen_delay),
            armor: r.non_negative("armor", d.armor),
            plates: r.u32("plates", d.plates),
            size: Vec2::new(width, height),
            move_speed: r.non_negative("move_speed", d.move_speed),
            dash_speed: r.non_negative("dash_speed", d.dash_speed),
            dash_duration: r.non_negative("dash_duration", d.dash_duration),
            dash_cooldown: r.non_negative("dash_cooldown", d.dash_cooldown),
            movement_spread_gain: r.non_negative("movement_spread_gain", d.movement_spread_gain),
            movement_spread_max: r.non_negative("movement_spread_max", d.movement_spread_max),
            movement_spread_decay: r
                .non_negative("movement_spread_decay", d.movement_spread_decay),
            name,
        }
    }
}
