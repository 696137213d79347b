//! Benchmark profiles for the Volley combat core.
//!
//! - [`skirmish_definitions`]: two weapons, one ammo type, one fighter type
//! - [`pillar_room`]: a walled room with seeded pillars
//! - [`skirmish_profile`]: a populated [`SimulationContext`] with every
//!   fighter armed, plus [`Skirmish::signals`] to drive it

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use volley_core::{
    AmmoDef, AmmoTypeId, AmmoWeight, ControlSignals, Definitions, EntityTypeDef, EntityTypeId,
    FireMode, Vec2, WeaponDef, WeaponDefId,
};
use volley_engine::{EntityHandle, SimConfig, SimulationContext};
use volley_space::{TileFlags, TileGrid};

/// Fighter entity type.
pub const FIGHTER: EntityTypeId = EntityTypeId(1);
/// Automatic weapon.
pub const SMG: WeaponDefId = WeaponDefId(1);
/// Burst weapon.
pub const CARBINE: WeaponDefId = WeaponDefId(2);
/// The only ammo type.
pub const ROUND: AmmoTypeId = AmmoTypeId(1);

/// Definitions used by every profile.
pub fn skirmish_definitions() -> Definitions {
    let round = AmmoWeight {
        ammo: ROUND,
        weight: 1.0,
    };
    Definitions::new()
        .with_weapon(
            SMG,
            WeaponDef {
                name: "smg".into(),
                damage: 8.0,
                rounds_per_minute: 900.0,
                fire_mode: FireMode::Auto,
                magazine_size: 40,
                reserve_capacity: 400,
                jam_chance: 0.01,
                ammo: [round].into_iter().collect(),
                ..WeaponDef::default()
            },
        )
        .with_weapon(
            CARBINE,
            WeaponDef {
                name: "carbine".into(),
                damage: 20.0,
                rounds_per_minute: 240.0,
                fire_mode: FireMode::Burst,
                magazine_size: 30,
                reserve_capacity: 300,
                ammo: [round].into_iter().collect(),
                ..WeaponDef::default()
            },
        )
        .with_ammo(
            ROUND,
            AmmoDef {
                name: "round".into(),
                speed: 40.0,
                range: 60.0,
                falloff_start: 10.0,
                falloff_end: 40.0,
                falloff_min: 0.5,
                ..AmmoDef::default()
            },
        )
        .with_entity(
            FIGHTER,
            EntityTypeDef {
                name: "fighter".into(),
                max_hp: 400,
                shield_max: 100.0,
                shield_regen: 25.0,
                armor: 20.0,
                ..EntityTypeDef::default()
            },
        )
}

/// A `size × size` room walled on every edge, with roughly one tile in
/// twenty turned into a pillar.
pub fn pillar_room(size: u32, seed: u64) -> TileGrid {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut flags = Vec::with_capacity((size * size) as usize);
    for row in 0..size {
        for col in 0..size {
            let edge = row == 0 || col == 0 || row == size - 1 || col == size - 1;
            let pillar = rng.random_ratio(1, 20);
            flags.push(if edge || pillar {
                TileFlags::WALL
            } else {
                TileFlags::EMPTY
            });
        }
    }
    TileGrid::from_flags(size, size, 1.0, flags).unwrap()
}

/// A populated context and its fighters.
pub struct Skirmish {
    /// The simulation.
    pub context: SimulationContext,
    /// Every spawned fighter, armed.
    pub fighters: Vec<EntityHandle>,
}

/// Build a skirmish: a 64×64 pillar room with `fighters` armed fighters
/// placed on free tiles.
pub fn skirmish_profile(seed: u64, fighters: usize) -> Skirmish {
    let grid = pillar_room(64, seed);
    let config = SimConfig {
        max_entities: fighters.max(1),
        max_weapons: fighters.max(1),
        max_projectiles: 4096,
        seed: Some(seed),
        ..SimConfig::default()
    };
    let mut placement = ChaCha8Rng::seed_from_u64(seed ^ 0x5eed);
    let free: Vec<(i32, i32)> = (0..64)
        .flat_map(|row| (0..64).map(move |col| (col, row)))
        .filter(|&(col, row)| grid.get(col, row) == Some(TileFlags::EMPTY))
        .collect();

    let mut context = SimulationContext::new(config, skirmish_definitions(), grid).unwrap();
    let mut handles = Vec::with_capacity(fighters);
    for i in 0..fighters {
        let (col, row) = free[placement.random_range(0..free.len())];
        let center = Vec2::new(col as f32 + 0.5, row as f32 + 0.5);
        let Ok(fighter) = context.spawn_entity(FIGHTER, center) else {
            break;
        };
        let def = if i % 2 == 0 { SMG } else { CARBINE };
        if let Ok(weapon) = context.spawn_weapon(def) {
            let _ = context.equip_weapon(fighter, weapon);
        }
        handles.push(fighter);
    }
    Skirmish {
        context,
        fighters: handles,
    }
}

impl Skirmish {
    /// Controls for `tick`: every live fighter strafes, sweeps its aim, and
    /// holds the trigger, reloading when its magazine runs dry.
    pub fn signals(&self, tick: u64) -> Vec<(EntityHandle, ControlSignals)> {
        self.fighters
            .iter()
            .enumerate()
            .filter_map(|(i, &h)| {
                let entity = self.context.entity(h)?;
                let empty = entity
                    .weapon
                    .and_then(|w| self.context.weapon(w))
                    .is_some_and(|w| w.magazine == 0 && !w.is_reloading());
                let phase = (tick as f32 * 0.05) + i as f32;
                Some((
                    h,
                    ControlSignals {
                        move_axis: Vec2::from_angle(phase * 0.3),
                        aim: Vec2::from_angle(phase),
                        trigger: !empty,
                        reload: empty,
                        unjam: true,
                        dash: tick % 120 == i as u64 % 120,
                    },
                ))
            })
            .collect()
    }

    /// Signals for `tick`, then one step.
    pub fn tick(&mut self, tick: u64) -> volley_engine::StepReport {
        let signals = self.signals(tick);
        self.context.step(&signals)
    }
}
