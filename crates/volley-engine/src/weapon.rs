//! Per-instance weapon state machine.
//!
//! ```text
//!             trigger (mode-gated)          jam roll
//!   Idle/Firing ─────────────────▶ shot ───────────▶ Jammed
//!      ▲   │ reload press                               │ unjam × N
//!      │   ▼                                            ▼
//!      │ Reloading{Ejecting → Filling} ◀──── reserve > 0 ┤
//!      └──────── fill reaches 1 / active reload          └─ reserve = 0: UnjamNoAmmo
//! ```
//!
//! Bursting is orthogonal: a burst press arms `burst_count` shots that fire
//! on the burst timer regardless of the trigger until the burst runs out,
//! the magazine empties, or the weapon jams.
//!
//! The machine never spawns projectiles itself. [`WeaponInstance::pull_trigger`]
//! returns a [`TriggerOutcome`] and the caller turns a shot into a projectile.

use rand::seq::IndexedRandom;
use rand::Rng;
use tracing::debug;
use volley_arena::Handle;
use volley_core::{AmmoTypeId, FireMode, SimEvent, WeaponDef, WeaponDefId, WeaponSnapshot};

use crate::hooks::EventSink;

/// Handle to a [`WeaponInstance`].
pub type WeaponHandle = Handle<WeaponInstance>;

/// The active-reload window, as fill progress in `[0, 1]`.
///
/// Membership is closed on both ends.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActiveReloadWindow {
    /// First progress value inside the window.
    pub start: f32,
    /// Last progress value inside the window.
    pub end: f32,
}

impl ActiveReloadWindow {
    /// Window of half-size `half` around `center`, clamped to lie in `[0, 1]`.
    pub fn around(center: f32, half: f32) -> Self {
        let half = half.clamp(0.0, 0.5);
        let center = center.clamp(half, 1.0 - half);
        Self {
            start: center - half,
            end: center + half,
        }
    }

    /// Whether `progress` lies inside the window.
    pub fn contains(&self, progress: f32) -> bool {
        progress >= self.start && progress <= self.end
    }

    /// Draw a window from the definition's base values plus symmetric
    /// variance on both centre and half-size.
    pub fn roll<R: Rng + ?Sized>(def: &WeaponDef, rng: &mut R) -> Self {
        let variance = def.active_reload_variance;
        let mut jitter = || {
            if variance > 0.0 {
                rng.random_range(-variance..=variance)
            } else {
                0.0
            }
        };
        let center = def.active_reload_center + jitter();
        let half = def.active_reload_size + jitter();
        Self::around(center, half)
    }
}

/// Sub-state of a reload.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ReloadPhase {
    /// Magazine out; `remaining` seconds until filling starts.
    Ejecting {
        /// Seconds left.
        remaining: f32,
    },
    /// Rounds going in.
    Filling,
}

/// An in-progress reload.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReloadState {
    /// Eject or fill.
    pub phase: ReloadPhase,
    /// Fill progress in `[0, 1]`.
    pub progress: f32,
    /// Seconds the fill phase lasts.
    pub fill_time: f32,
    /// Total reload time (eject + fill).
    pub total_time: f32,
    /// Active-reload window for this reload.
    pub window: ActiveReloadWindow,
    /// An active reload has been attempted.
    pub consumed: bool,
    /// The attempt missed the window.
    pub failed: bool,
}

/// What a trigger pull produced.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TriggerOutcome {
    /// Nothing attempted.
    Idle,
    /// A round left the barrel. `spread` is the weapon's total cone in degrees.
    Fired {
        /// Deviation plus recoil spread at the moment of the shot.
        spread: f32,
    },
    /// The round jammed.
    Jammed,
    /// The magazine was empty.
    Empty,
}

/// A weapon in the world: ammo counts and timers.
#[derive(Clone, Debug, PartialEq)]
pub struct WeaponInstance {
    /// Spawn serial, unique within a context.
    pub serial: u64,
    /// Definition this instance was spawned from.
    pub def: WeaponDefId,
    /// Loaded ammo type.
    pub ammo: AmmoTypeId,
    /// Rounds in the magazine.
    pub magazine: u32,
    /// Magazine capacity.
    pub magazine_size: u32,
    /// Rounds in reserve.
    pub reserve: u32,
    /// Reserve capacity.
    pub reserve_capacity: u32,
    /// Jammed flag.
    pub jammed: bool,
    /// Unjam progress in `[0, 1)`.
    pub unjam_progress: f32,
    /// Current reload, if any.
    pub reload: Option<ReloadState>,
    /// Burst shots still to fire.
    pub burst_remaining: u32,
    /// Seconds until the next burst shot.
    pub burst_timer: f32,
    /// Seconds until the next trigger shot.
    pub cooldown: f32,
    /// Recoil spread accumulator in degrees.
    pub recoil_spread: f32,
    trigger_held: bool,
    out_of_ammo_reported: bool,
    fired_last_tick: bool,
}

impl WeaponInstance {
    /// A full weapon of definition `def_id` loaded with `ammo`.
    pub fn new(serial: u64, def_id: WeaponDefId, def: &WeaponDef, ammo: AmmoTypeId) -> Self {
        Self {
            serial,
            def: def_id,
            ammo,
            magazine: def.magazine_size,
            magazine_size: def.magazine_size,
            reserve: def.reserve_capacity,
            reserve_capacity: def.reserve_capacity,
            jammed: false,
            unjam_progress: 0.0,
            reload: None,
            burst_remaining: 0,
            burst_timer: 0.0,
            cooldown: 0.0,
            recoil_spread: 0.0,
            trigger_held: false,
            out_of_ammo_reported: false,
            fired_last_tick: false,
        }
    }

    /// Pick the loaded ammo type by weight, falling back to the first entry
    /// when every weight is zero. `None` if the weapon lists no ammo.
    pub fn pick_ammo<R: Rng + ?Sized>(def: &WeaponDef, rng: &mut R) -> Option<AmmoTypeId> {
        def.ammo
            .choose_weighted(rng, |entry| entry.weight)
            .ok()
            .or_else(|| def.ammo.first())
            .map(|entry| entry.ammo)
    }

    /// Whether a reload is in progress.
    pub fn is_reloading(&self) -> bool {
        self.reload.is_some()
    }

    /// Fill progress of the current reload, or 0.
    pub fn reload_progress(&self) -> f32 {
        self.reload.map_or(0.0, |r| r.progress)
    }

    /// Add picked-up rounds to the reserve, capped at capacity.
    /// Returns the number actually added.
    pub fn add_reserve(&mut self, rounds: u32) -> u32 {
        let room = self.reserve_capacity.saturating_sub(self.reserve);
        let added = rounds.min(room);
        self.reserve += added;
        added
    }

    /// Plain-data view for notifications.
    pub fn snapshot(&self) -> WeaponSnapshot {
        WeaponSnapshot {
            serial: self.serial,
            def: self.def,
            ammo: self.ammo,
            magazine: self.magazine,
            magazine_size: self.magazine_size,
            reserve: self.reserve,
            jammed: self.jammed,
            reloading: self.is_reloading(),
            reload_progress: self.reload_progress(),
            recoil_spread: self.recoil_spread,
        }
    }

    // ── timers ──────────────────────────────────────────────────

    /// Advance timers by `dt`: cooldowns, recoil decay, and reload progress.
    pub fn advance(&mut self, def: &WeaponDef, dt: f32, events: &mut impl EventSink) {
        self.cooldown = (self.cooldown - dt).max(0.0);
        self.burst_timer = (self.burst_timer - dt).max(0.0);
        if !self.fired_last_tick {
            self.recoil_spread = (self.recoil_spread - def.control * dt).max(0.0);
        }
        self.fired_last_tick = false;

        let Some(reload) = self.reload.as_mut() else {
            return;
        };
        let mut fill_dt = dt;
        if let ReloadPhase::Ejecting { remaining } = reload.phase {
            let left = remaining - dt;
            if left > 0.0 {
                reload.phase = ReloadPhase::Ejecting { remaining: left };
                return;
            }
            reload.phase = ReloadPhase::Filling;
            fill_dt = -left;
        }
        reload.progress = if reload.fill_time > 0.0 {
            (reload.progress + fill_dt / reload.fill_time).min(1.0)
        } else {
            1.0
        };
        if reload.progress >= 1.0 {
            self.finish_reload(false, events);
        }
    }

    // ── reload ──────────────────────────────────────────────────

    /// Handle a reload press.
    ///
    /// While reloading this is an active-reload attempt; otherwise it starts
    /// a reload when the magazine is not full and reserve remains. Ignored
    /// while jammed.
    pub fn press_reload<R: Rng + ?Sized>(
        &mut self,
        def: &WeaponDef,
        rng: &mut R,
        events: &mut impl EventSink,
    ) {
        if self.jammed {
            return;
        }
        let Some(reload) = self.reload.as_mut() else {
            if self.magazine < self.magazine_size && self.reserve > 0 {
                self.start_reload(def, rng, events);
            }
            return;
        };
        if reload.failed {
            events.emit(SimEvent::ActiveReloadTriedAfterFailed {
                weapon: self.snapshot(),
            });
        } else if !reload.consumed
            && reload.phase == ReloadPhase::Filling
            && reload.window.contains(reload.progress)
        {
            reload.consumed = true;
            events.emit(SimEvent::ActiveReload {
                weapon: self.snapshot(),
            });
            self.finish_reload(true, events);
        } else {
            reload.consumed = true;
            reload.failed = true;
            events.emit(SimEvent::ActiveReloadFailed {
                weapon: self.snapshot(),
            });
        }
    }

    /// Drop the magazine and begin ejecting.
    fn start_reload<R: Rng + ?Sized>(
        &mut self,
        def: &WeaponDef,
        rng: &mut R,
        events: &mut impl EventSink,
    ) {
        let dropped = std::mem::take(&mut self.magazine);
        let fill_time = (def.reload_time - def.eject_time).max(0.0);
        let phase = if def.eject_time > 0.0 {
            ReloadPhase::Ejecting {
                remaining: def.eject_time,
            }
        } else {
            ReloadPhase::Filling
        };
        self.reload = Some(ReloadState {
            phase,
            progress: 0.0,
            fill_time,
            total_time: def.reload_time,
            window: ActiveReloadWindow::roll(def, rng),
            consumed: false,
            failed: false,
        });
        self.burst_remaining = 0;
        debug!(weapon = self.serial, dropped, "reload started");
        events.emit(SimEvent::ReloadStart {
            weapon: self.snapshot(),
            dropped_rounds: dropped,
        });
    }

    fn finish_reload(&mut self, active: bool, events: &mut impl EventSink) {
        let loaded = self.magazine_size.min(self.reserve);
        self.magazine = loaded;
        self.reserve -= loaded;
        self.reload = None;
        self.burst_remaining = 0;
        self.burst_timer = 0.0;
        self.out_of_ammo_reported = false;
        debug!(weapon = self.serial, loaded, active, "reload finished");
        events.emit(SimEvent::ReloadFinish {
            weapon: self.snapshot(),
            active,
        });
    }

    // ── firing ──────────────────────────────────────────────────

    /// Apply this tick's trigger level.
    ///
    /// Must be called every tick, trigger held or not, so press edges and
    /// releases are seen.
    pub fn pull_trigger<R: Rng + ?Sized>(
        &mut self,
        def: &WeaponDef,
        trigger: bool,
        rng: &mut R,
        events: &mut impl EventSink,
    ) -> TriggerOutcome {
        let pressed = trigger && !self.trigger_held;
        self.trigger_held = trigger;
        if !trigger {
            self.out_of_ammo_reported = false;
        }
        if self.jammed || self.is_reloading() {
            return TriggerOutcome::Idle;
        }

        let wants = match def.fire_mode {
            FireMode::Auto => trigger && self.cooldown <= 0.0,
            FireMode::Single => pressed && self.cooldown <= 0.0,
            FireMode::Burst => {
                if pressed && self.burst_remaining == 0 && self.cooldown <= 0.0 {
                    self.burst_remaining = def.burst_count.max(1);
                    self.burst_timer = 0.0;
                }
                self.burst_remaining > 0 && self.burst_timer <= 0.0
            }
        };
        if !wants {
            return TriggerOutcome::Idle;
        }

        if self.magazine == 0 {
            self.burst_remaining = 0;
            if !self.out_of_ammo_reported {
                self.out_of_ammo_reported = true;
                events.emit(SimEvent::OutOfAmmo {
                    weapon: self.snapshot(),
                });
            }
            return TriggerOutcome::Empty;
        }

        self.magazine -= 1;
        self.fired_last_tick = true;
        self.cooldown = def.fire_interval();
        if def.fire_mode == FireMode::Burst {
            self.burst_remaining -= 1;
            self.burst_timer = def.burst_interval();
        }

        if def.jam_chance > 0.0 && rng.random::<f32>() < def.jam_chance {
            self.jammed = true;
            self.unjam_progress = 0.0;
            self.burst_remaining = 0;
            debug!(weapon = self.serial, "jammed");
            events.emit(SimEvent::Jam {
                weapon: self.snapshot(),
            });
            return TriggerOutcome::Jammed;
        }

        let spread = def.deviation + self.recoil_spread;
        self.recoil_spread = (self.recoil_spread + def.recoil).min(def.recoil_max);
        TriggerOutcome::Fired { spread }
    }

    // ── unjam ───────────────────────────────────────────────────

    /// Perform one unjam action.
    ///
    /// Once progress reaches 1 the weapon clears and, if reserve remains,
    /// starts a fresh reload.
    pub fn unjam<R: Rng + ?Sized>(
        &mut self,
        def: &WeaponDef,
        step: f32,
        rng: &mut R,
        events: &mut impl EventSink,
    ) {
        if !self.jammed {
            return;
        }
        self.unjam_progress += step;
        if self.unjam_progress < 1.0 {
            return;
        }
        self.jammed = false;
        self.unjam_progress = 0.0;
        debug!(weapon = self.serial, reserve = self.reserve, "unjammed");
        events.emit(SimEvent::Unjammed {
            weapon: self.snapshot(),
        });
        if self.reserve > 0 {
            self.start_reload(def, rng, events);
        } else {
            events.emit(SimEvent::UnjamNoAmmo {
                weapon: self.snapshot(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use smallvec::smallvec;
    use volley_core::{AmmoWeight, HookKind};

    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    fn rifle() -> WeaponDef {
        WeaponDef {
            rounds_per_minute: 0.0,
            magazine_size: 30,
            reserve_capacity: 90,
            reload_time: 1.0,
            eject_time: 0.0,
            active_reload_center: 0.475,
            active_reload_size: 0.075,
            ammo: smallvec![AmmoWeight {
                ammo: AmmoTypeId(1),
                weight: 1.0
            }],
            ..WeaponDef::default()
        }
    }

    fn instance(def: &WeaponDef) -> WeaponInstance {
        WeaponInstance::new(1, WeaponDefId(1), def, AmmoTypeId(1))
    }

    fn hooks(events: &[SimEvent]) -> Vec<HookKind> {
        events.iter().map(SimEvent::hook).collect()
    }

    fn fill_to(w: &mut WeaponInstance, def: &WeaponDef, progress: f32, events: &mut Vec<SimEvent>) {
        while w.is_reloading() && w.reload_progress() < progress {
            w.advance(def, DT, events);
        }
    }

    #[test]
    fn window_is_closed_and_clamped() {
        let w = ActiveReloadWindow::around(0.475, 0.075);
        assert!(w.contains(w.start));
        assert!(w.contains(w.end));
        assert!(w.contains(0.5));
        assert!(!w.contains(0.39));

        let edge = ActiveReloadWindow::around(0.98, 0.1);
        assert!(edge.start >= 0.0 && edge.end <= 1.0);
        assert!((edge.end - 1.0).abs() < 1e-6);

        let huge = ActiveReloadWindow::around(0.5, 3.0);
        assert_eq!((huge.start, huge.end), (0.0, 1.0));
    }

    #[test]
    fn rolled_window_stays_in_unit_interval() {
        let def = WeaponDef {
            active_reload_center: 0.9,
            active_reload_size: 0.2,
            active_reload_variance: 0.3,
            ..rifle()
        };
        let mut rng = rng();
        for _ in 0..200 {
            let w = ActiveReloadWindow::roll(&def, &mut rng);
            assert!(w.start >= 0.0 && w.end <= 1.0 && w.start <= w.end);
        }
    }

    #[test]
    fn auto_fires_every_held_tick_until_empty() {
        let def = rifle();
        let mut w = instance(&def);
        let mut rng = rng();
        let mut events = Vec::new();
        let mut fired = 0;
        for _ in 0..30 {
            w.advance(&def, DT, &mut events);
            if let TriggerOutcome::Fired { .. } = w.pull_trigger(&def, true, &mut rng, &mut events) {
                fired += 1;
            }
        }
        assert_eq!(fired, 30);
        assert_eq!(w.magazine, 0);
        assert_eq!(
            w.pull_trigger(&def, true, &mut rng, &mut events),
            TriggerOutcome::Empty
        );
        assert_eq!(w.reserve, 90);
        // Held trigger reports out-of-ammo once.
        w.pull_trigger(&def, true, &mut rng, &mut events);
        assert_eq!(hooks(&events), vec![HookKind::OnOutOfAmmo]);
        // Release re-arms it.
        w.pull_trigger(&def, false, &mut rng, &mut events);
        w.pull_trigger(&def, true, &mut rng, &mut events);
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn single_fires_on_press_edge_only() {
        let def = WeaponDef {
            fire_mode: FireMode::Single,
            ..rifle()
        };
        let mut w = instance(&def);
        let mut rng = rng();
        let mut events = Vec::new();
        let held: Vec<_> = (0..5)
            .map(|_| w.pull_trigger(&def, true, &mut rng, &mut events))
            .collect();
        assert!(matches!(held[0], TriggerOutcome::Fired { .. }));
        assert!(held[1..].iter().all(|o| *o == TriggerOutcome::Idle));
        w.pull_trigger(&def, false, &mut rng, &mut events);
        assert!(matches!(
            w.pull_trigger(&def, true, &mut rng, &mut events),
            TriggerOutcome::Fired { .. }
        ));
        assert_eq!(w.magazine, 28);
    }

    #[test]
    fn burst_fires_on_its_own_timer() {
        let def = WeaponDef {
            fire_mode: FireMode::Burst,
            burst_count: 3,
            burst_rpm: 600.0,
            ..rifle()
        };
        let mut w = instance(&def);
        let mut rng = rng();
        let mut events = Vec::new();
        let mut fired = 0;
        // One press, then release: the burst keeps going.
        for tick in 0..60 {
            w.advance(&def, DT, &mut events);
            if let TriggerOutcome::Fired { .. } =
                w.pull_trigger(&def, tick == 0, &mut rng, &mut events)
            {
                fired += 1;
            }
        }
        assert_eq!(fired, 3);
        assert_eq!(w.magazine, 27);
        assert_eq!(w.burst_remaining, 0);
    }

    #[test]
    fn rate_of_fire_limits_auto() {
        let def = WeaponDef {
            rounds_per_minute: 600.0,
            ..rifle()
        };
        let mut w = instance(&def);
        let mut rng = rng();
        let mut events = Vec::new();
        let mut fired = 0;
        for _ in 0..60 {
            w.advance(&def, DT, &mut events);
            if let TriggerOutcome::Fired { .. } = w.pull_trigger(&def, true, &mut rng, &mut events) {
                fired += 1;
            }
        }
        // 0.1 s between shots over one second.
        assert!((9..=11).contains(&fired), "fired {fired}");
    }

    #[test]
    fn recoil_accumulates_to_cap_and_decays() {
        let def = WeaponDef {
            deviation: 1.0,
            recoil: 4.0,
            recoil_max: 10.0,
            control: 60.0,
            ..rifle()
        };
        let mut w = instance(&def);
        let mut rng = rng();
        let mut events = Vec::new();
        let spreads: Vec<f32> = (0..4)
            .filter_map(|_| {
                w.advance(&def, DT, &mut events);
                match w.pull_trigger(&def, true, &mut rng, &mut events) {
                    TriggerOutcome::Fired { spread } => Some(spread),
                    _ => None,
                }
            })
            .collect();
        assert_eq!(spreads, vec![1.0, 5.0, 9.0, 11.0]);
        assert_eq!(w.recoil_spread, 10.0);
        // The tick after the last shot still counts as firing.
        w.advance(&def, DT, &mut events);
        assert_eq!(w.recoil_spread, 10.0);
        w.advance(&def, DT, &mut events);
        assert!((w.recoil_spread - 9.0).abs() < 1e-4);
    }

    #[test]
    fn jam_consumes_round_and_blocks_fire_and_reload() {
        let def = WeaponDef {
            jam_chance: 1.0,
            ..rifle()
        };
        let mut w = instance(&def);
        let mut rng = rng();
        let mut events = Vec::new();
        assert_eq!(
            w.pull_trigger(&def, true, &mut rng, &mut events),
            TriggerOutcome::Jammed
        );
        assert!(w.jammed);
        assert_eq!(w.magazine, 29);
        assert_eq!(
            w.pull_trigger(&def, true, &mut rng, &mut events),
            TriggerOutcome::Idle
        );
        w.press_reload(&def, &mut rng, &mut events);
        assert!(!w.is_reloading());
        assert_eq!(hooks(&events), vec![HookKind::OnJam]);
    }

    #[test]
    fn unjam_then_reloads_when_reserve_remains() {
        let def = WeaponDef {
            jam_chance: 1.0,
            ..rifle()
        };
        let mut w = instance(&def);
        let mut rng = rng();
        let mut events = Vec::new();
        w.pull_trigger(&def, true, &mut rng, &mut events);
        events.clear();
        for _ in 0..3 {
            w.unjam(&def, 0.25, &mut rng, &mut events);
        }
        assert!(w.jammed);
        assert!((w.unjam_progress - 0.75).abs() < 1e-6);
        w.unjam(&def, 0.25, &mut rng, &mut events);
        assert!(!w.jammed);
        assert!(w.is_reloading());
        assert_eq!(w.magazine, 0);
        assert_eq!(
            hooks(&events),
            vec![HookKind::OnUnjam, HookKind::OnReloadStart]
        );
    }

    #[test]
    fn unjam_without_reserve_reports_no_ammo() {
        let def = WeaponDef {
            jam_chance: 1.0,
            reserve_capacity: 0,
            ..rifle()
        };
        let mut w = instance(&def);
        let mut rng = rng();
        let mut events = Vec::new();
        w.pull_trigger(&def, true, &mut rng, &mut events);
        events.clear();
        w.unjam(&def, 1.0, &mut rng, &mut events);
        assert!(!w.jammed);
        assert!(!w.is_reloading());
        assert_eq!(
            hooks(&events),
            vec![HookKind::OnUnjam, HookKind::OnUnjamNoAmmo]
        );
    }

    #[test]
    fn reload_drops_magazine_and_refills_from_reserve() {
        let def = WeaponDef {
            eject_time: 0.25,
            ..rifle()
        };
        let mut w = instance(&def);
        let mut rng = rng();
        let mut events = Vec::new();
        w.magazine = 12;
        w.press_reload(&def, &mut rng, &mut events);
        assert_eq!(w.magazine, 0);
        assert!(matches!(
            w.reload.map(|r| r.phase),
            Some(ReloadPhase::Ejecting { .. })
        ));
        assert!(matches!(
            events[0],
            SimEvent::ReloadStart {
                dropped_rounds: 12,
                ..
            }
        ));
        for _ in 0..120 {
            w.advance(&def, DT, &mut events);
        }
        assert!(!w.is_reloading());
        assert_eq!(w.magazine, 30);
        assert_eq!(w.reserve, 60);
        assert!(matches!(
            events.last(),
            Some(SimEvent::ReloadFinish { active: false, .. })
        ));
    }

    #[test]
    fn reload_ignored_when_full_or_no_reserve() {
        let def = rifle();
        let mut w = instance(&def);
        let mut rng = rng();
        let mut events = Vec::new();
        w.press_reload(&def, &mut rng, &mut events);
        assert!(!w.is_reloading());
        w.magazine = 3;
        w.reserve = 0;
        w.press_reload(&def, &mut rng, &mut events);
        assert!(!w.is_reloading());
        assert!(events.is_empty());
    }

    #[test]
    fn short_reserve_partially_fills() {
        let def = rifle();
        let mut w = instance(&def);
        let mut rng = rng();
        let mut events = Vec::new();
        w.magazine = 0;
        w.reserve = 7;
        w.press_reload(&def, &mut rng, &mut events);
        for _ in 0..120 {
            w.advance(&def, DT, &mut events);
        }
        assert_eq!((w.magazine, w.reserve), (7, 0));
    }

    #[test]
    fn active_reload_inside_window_succeeds_once() {
        let def = rifle();
        let mut w = instance(&def);
        let mut rng = rng();
        let mut events = Vec::new();
        w.magazine = 0;
        w.press_reload(&def, &mut rng, &mut events);
        let window = w.reload.map(|r| r.window).unwrap();
        assert!((window.start - 0.40).abs() < 1e-5);
        assert!((window.end - 0.55).abs() < 1e-5);

        fill_to(&mut w, &def, 0.5, &mut events);
        assert!(w.reload_progress() <= 0.55);
        w.press_reload(&def, &mut rng, &mut events);
        assert!(!w.is_reloading());
        assert_eq!(w.magazine, 30);

        // The second press lands on a full magazine: no new reload, no success.
        w.press_reload(&def, &mut rng, &mut events);
        let successes = events
            .iter()
            .filter(|e| matches!(e, SimEvent::ActiveReload { .. }))
            .count();
        assert_eq!(successes, 1);
        assert!(matches!(
            events.last(),
            Some(SimEvent::ReloadFinish { active: true, .. })
        ));
    }

    #[test]
    fn missed_window_fails_once_then_reports_retries() {
        let def = rifle();
        let mut w = instance(&def);
        let mut rng = rng();
        let mut events = Vec::new();
        w.magazine = 0;
        w.press_reload(&def, &mut rng, &mut events);
        fill_to(&mut w, &def, 0.2, &mut events);
        events.clear();

        w.press_reload(&def, &mut rng, &mut events);
        fill_to(&mut w, &def, 0.5, &mut events);
        // Inside the window now, but the attempt was already spent.
        w.press_reload(&def, &mut rng, &mut events);
        w.press_reload(&def, &mut rng, &mut events);
        assert!(w.is_reloading());
        assert_eq!(
            hooks(&events),
            vec![
                HookKind::OnActiveReloadFailed,
                HookKind::OnActiveReloadTriedAfterFailed,
                HookKind::OnActiveReloadTriedAfterFailed,
            ]
        );
        // The reload still finishes on its own.
        fill_to(&mut w, &def, 1.0, &mut events);
        assert_eq!(w.magazine, 30);
    }

    #[test]
    fn press_during_eject_misses_a_window_at_zero() {
        let def = WeaponDef {
            eject_time: 0.3,
            active_reload_center: 0.0,
            active_reload_size: 0.1,
            ..rifle()
        };
        let mut w = instance(&def);
        let mut rng = rng();
        let mut events = Vec::new();
        w.magazine = 0;
        w.press_reload(&def, &mut rng, &mut events);
        let reload = w.reload.unwrap();
        assert_eq!(reload.window.start, 0.0);
        assert!(matches!(reload.phase, ReloadPhase::Ejecting { .. }));
        events.clear();

        w.press_reload(&def, &mut rng, &mut events);
        assert!(w.is_reloading());
        assert_eq!(w.magazine, 0);
        assert_eq!(hooks(&events), vec![HookKind::OnActiveReloadFailed]);
    }

    #[test]
    fn pick_ammo_by_weight_with_zero_weight_fallback() {
        let mut rng = rng();
        let weighted = WeaponDef {
            ammo: smallvec![
                AmmoWeight {
                    ammo: AmmoTypeId(1),
                    weight: 0.0
                },
                AmmoWeight {
                    ammo: AmmoTypeId(2),
                    weight: 5.0
                },
            ],
            ..rifle()
        };
        for _ in 0..20 {
            assert_eq!(
                WeaponInstance::pick_ammo(&weighted, &mut rng),
                Some(AmmoTypeId(2))
            );
        }
        let zeros = WeaponDef {
            ammo: smallvec![
                AmmoWeight {
                    ammo: AmmoTypeId(4),
                    weight: 0.0
                },
                AmmoWeight {
                    ammo: AmmoTypeId(5),
                    weight: 0.0
                },
            ],
            ..rifle()
        };
        assert_eq!(
            WeaponInstance::pick_ammo(&zeros, &mut rng),
            Some(AmmoTypeId(4))
        );
        let none = WeaponDef {
            ammo: smallvec![],
            ..rifle()
        };
        assert_eq!(WeaponInstance::pick_ammo(&none, &mut rng), None);
    }

    #[test]
    fn pickups_cap_at_reserve_capacity() {
        let def = rifle();
        let mut w = instance(&def);
        w.reserve = 80;
        assert_eq!(w.add_reserve(25), 10);
        assert_eq!(w.reserve, 90);
    }
}
