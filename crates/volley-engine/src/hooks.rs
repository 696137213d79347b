//! Notification routing to the scripting layer.
//!
//! Hooks are fire-and-forget callbacks keyed by `(definition, hook)`.
//! They receive plain [`SimEvent`] snapshots and cannot reach back into
//! the pools. [`EventSink`] is the seam the simulation stages write
//! through: a bare `Vec<SimEvent>` in unit tests, a [`Notifier`] inside
//! [`SimulationContext::step`](crate::SimulationContext::step).

use indexmap::IndexMap;
use volley_core::{DefKey, HookKind, SimEvent};

/// A registered hook callback. Return values do not exist; hooks only observe.
pub type HookFn = Box<dyn FnMut(&SimEvent)>;

/// Capability table mapping `(definition, hook)` to a callback.
#[derive(Default)]
pub struct HookTable {
    hooks: IndexMap<(DefKey, HookKind), HookFn>,
}

impl HookTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `hook` for `(key, kind)`, returning any callback it replaces.
    pub fn register(&mut self, key: DefKey, kind: HookKind, hook: HookFn) -> Option<HookFn> {
        self.hooks.insert((key, kind), hook)
    }

    /// Remove the callback for `(key, kind)`.
    pub fn unregister(&mut self, key: DefKey, kind: HookKind) -> Option<HookFn> {
        self.hooks.shift_remove(&(key, kind))
    }

    /// Whether a callback is registered for `(key, kind)`.
    pub fn contains(&self, key: DefKey, kind: HookKind) -> bool {
        self.hooks.contains_key(&(key, kind))
    }

    /// Number of registered callbacks.
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Whether no callback is registered.
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Invoke the callback routed for `event`, if any.
    ///
    /// Returns whether a callback ran.
    pub fn dispatch(&mut self, event: &SimEvent) -> bool {
        match self.hooks.get_mut(&(event.def_key(), event.hook())) {
            Some(hook) => {
                hook(event);
                true
            }
            None => false,
        }
    }
}

impl std::fmt::Debug for HookTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookTable")
            .field("routes", &self.hooks.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Destination for events produced by the simulation stages.
pub trait EventSink {
    /// Accept one event.
    fn emit(&mut self, event: SimEvent);
}

impl EventSink for Vec<SimEvent> {
    fn emit(&mut self, event: SimEvent) {
        self.push(event);
    }
}

/// Dispatches each event to its hook and records it for the step report.
///
/// Tick events are dispatched but never recorded.
pub struct Notifier<'a> {
    hooks: &'a mut HookTable,
    log: &'a mut Vec<SimEvent>,
}

impl<'a> Notifier<'a> {
    /// Wrap a hook table and an event log.
    pub fn new(hooks: &'a mut HookTable, log: &'a mut Vec<SimEvent>) -> Self {
        Self { hooks, log }
    }

    /// Whether anything would receive events of `kind` for `key`.
    pub fn wants(&self, key: DefKey, kind: HookKind) -> bool {
        self.hooks.contains(key, kind)
    }
}

impl EventSink for Notifier<'_> {
    fn emit(&mut self, event: SimEvent) {
        self.hooks.dispatch(&event);
        if !matches!(event, SimEvent::Tick { .. }) {
            self.log.push(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use volley_core::{EntityKind, EntitySnapshot, EntityTypeId, TickPhase, Vec2};

    use super::*;

    fn snapshot(type_id: u32) -> EntitySnapshot {
        EntitySnapshot {
            serial: 1,
            type_id: EntityTypeId(type_id),
            kind: EntityKind::Npc,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            health: 10,
            max_hp: 10,
            shield: 0.0,
            shield_max: 0.0,
            armor: 0.0,
            plates: 0,
            movement_spread: 0.0,
            damage_dealt: 0.0,
        }
    }

    #[test]
    fn dispatch_routes_by_definition_and_hook() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut table = HookTable::new();
        let sink = Rc::clone(&seen);
        table.register(
            DefKey::Entity(EntityTypeId(2)),
            HookKind::OnEntityDeath,
            Box::new(move |e| sink.borrow_mut().push(e.clone())),
        );

        let other = SimEvent::Death {
            entity: snapshot(3),
        };
        assert!(!table.dispatch(&other));

        let mine = SimEvent::Death {
            entity: snapshot(2),
        };
        assert!(table.dispatch(&mine));
        assert_eq!(seen.borrow().as_slice(), &[mine]);
    }

    #[test]
    fn register_replaces_and_unregister_removes() {
        let mut table = HookTable::new();
        let key = DefKey::Entity(EntityTypeId(1));
        assert!(table.register(key, HookKind::OnDash, Box::new(|_| {})).is_none());
        assert!(table.register(key, HookKind::OnDash, Box::new(|_| {})).is_some());
        assert_eq!(table.len(), 1);
        assert!(table.unregister(key, HookKind::OnDash).is_some());
        assert!(table.is_empty());
    }

    #[test]
    fn notifier_dispatches_ticks_without_recording() {
        let calls = Rc::new(RefCell::new(0));
        let mut table = HookTable::new();
        let counter = Rc::clone(&calls);
        table.register(
            DefKey::Entity(EntityTypeId(1)),
            HookKind::PreTick,
            Box::new(move |_| *counter.borrow_mut() += 1),
        );
        let mut log = Vec::new();
        {
            let mut notifier = Notifier::new(&mut table, &mut log);
            notifier.emit(SimEvent::Tick {
                phase: TickPhase::Pre,
                entity: snapshot(1),
            });
            notifier.emit(SimEvent::Dash {
                entity: snapshot(1),
            });
        }
        assert_eq!(*calls.borrow(), 1);
        assert_eq!(log.len(), 1);
        assert!(matches!(log[0], SimEvent::Dash { .. }));
    }
}
