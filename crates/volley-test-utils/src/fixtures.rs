//! Canned definitions and rooms.
//!
//! Weapons here have zero deviation and recoil so shots travel exactly
//! along the aim; tests that need spread set it explicitly.
//!
//! - [`rifle`]: automatic, 30 rounds, 600 rpm
//! - [`pistol`]: semi-automatic, 12 rounds
//! - [`burst_carbine`]: three-round burst
//! - [`grunt`] / [`player`]: a plain NPC and a shielded, plated player

use glam::Vec2;
use smallvec::smallvec;
use volley_core::{
    AmmoDef, AmmoTypeId, AmmoWeight, Definitions, EntityKind, EntityTypeDef, EntityTypeId,
    FireMode, WeaponDef, WeaponDefId,
};
use volley_space::{TileFlags, TileGrid};

pub const RIFLE: WeaponDefId = WeaponDefId(1);
pub const PISTOL: WeaponDefId = WeaponDefId(2);
pub const BURST_CARBINE: WeaponDefId = WeaponDefId(3);

pub const BALL: AmmoTypeId = AmmoTypeId(1);
pub const PIERCING: AmmoTypeId = AmmoTypeId(2);

pub const GRUNT: EntityTypeId = EntityTypeId(1);
pub const PLAYER: EntityTypeId = EntityTypeId(2);

/// Fixed timestep used by the fixtures' configs.
pub const DT: f32 = 1.0 / 60.0;

fn accurate(name: &str) -> WeaponDef {
    WeaponDef {
        name: name.to_string(),
        deviation: 0.0,
        recoil: 0.0,
        ammo: smallvec![AmmoWeight {
            ammo: BALL,
            weight: 1.0,
        }],
        ..WeaponDef::default()
    }
}

pub fn rifle() -> WeaponDef {
    WeaponDef {
        damage: 10.0,
        rounds_per_minute: 600.0,
        fire_mode: FireMode::Auto,
        magazine_size: 30,
        reserve_capacity: 90,
        reload_time: 2.0,
        eject_time: 0.3,
        active_reload_center: 0.5,
        active_reload_size: 0.08,
        ..accurate("rifle")
    }
}

pub fn pistol() -> WeaponDef {
    WeaponDef {
        damage: 25.0,
        rounds_per_minute: 0.0,
        fire_mode: FireMode::Single,
        magazine_size: 12,
        reserve_capacity: 36,
        reload_time: 1.0,
        eject_time: 0.2,
        ..accurate("pistol")
    }
}

pub fn burst_carbine() -> WeaponDef {
    WeaponDef {
        damage: 15.0,
        rounds_per_minute: 120.0,
        fire_mode: FireMode::Burst,
        burst_count: 3,
        burst_rpm: 900.0,
        magazine_size: 24,
        reserve_capacity: 48,
        ..accurate("burst carbine")
    }
}

pub fn ball_ammo() -> AmmoDef {
    AmmoDef {
        name: "ball".to_string(),
        speed: 30.0,
        size: 0.2,
        ..AmmoDef::default()
    }
}

pub fn piercing_ammo() -> AmmoDef {
    AmmoDef {
        name: "piercing".to_string(),
        speed: 30.0,
        size: 0.2,
        pierce: 2,
        armor_pen: 50.0,
        ..AmmoDef::default()
    }
}

pub fn grunt() -> EntityTypeDef {
    EntityTypeDef {
        name: "grunt".to_string(),
        kind: EntityKind::Npc,
        max_hp: 100,
        ..EntityTypeDef::default()
    }
}

pub fn player() -> EntityTypeDef {
    EntityTypeDef {
        name: "player".to_string(),
        kind: EntityKind::Player,
        max_hp: 100,
        shield_max: 50.0,
        shield_regen: 10.0,
        shield_regen_delay: 2.0,
        plates: 1,
        ..EntityTypeDef::default()
    }
}

/// Every fixture definition under its constant id.
pub fn definitions() -> Definitions {
    Definitions::new()
        .with_weapon(RIFLE, rifle())
        .with_weapon(PISTOL, pistol())
        .with_weapon(BURST_CARBINE, burst_carbine())
        .with_ammo(BALL, ball_ammo())
        .with_ammo(PIERCING, piercing_ammo())
        .with_entity(GRUNT, grunt())
        .with_entity(PLAYER, player())
}

/// An empty room with unit tiles.
pub fn open_grid(width: u32, height: u32) -> TileGrid {
    TileGrid::new(width, height, 1.0).expect("fixture grid dimensions are non-zero")
}

/// A unit-tile room drawn in ASCII, one line per row starting at row 0.
///
/// `#` wall, `~` water, `_` void, anything else empty. Short lines are
/// padded with empty tiles.
pub fn grid_from_ascii(rows: &[&str]) -> TileGrid {
    let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
    let mut flags = Vec::with_capacity(width * rows.len());
    for row in rows {
        let mut line: Vec<TileFlags> = row
            .chars()
            .map(|c| match c {
                '#' => TileFlags::WALL,
                '~' => TileFlags::WATER,
                '_' => TileFlags::VOID,
                _ => TileFlags::EMPTY,
            })
            .collect();
        line.resize(width, TileFlags::EMPTY);
        flags.extend(line);
    }
    TileGrid::from_flags(width as u32, rows.len() as u32, 1.0, flags)
        .expect("fixture grid must be non-empty")
}

/// Centre of tile `(col, row)` on a unit grid.
pub fn tile_center(col: i32, row: i32) -> Vec2 {
    Vec2::new(col as f32 + 0.5, row as f32 + 0.5)
}
