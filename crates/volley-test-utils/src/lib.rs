//! Test utilities for Volley development.
//!
//! Provides canned definitions, ASCII tile grids, and an
//! [`EventRecorder`] that can be registered as a hook to capture
//! notifications for assertions.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::cell::RefCell;
use std::rc::Rc;

use volley_core::{HookKind, SimEvent};

pub use fixtures::*;

/// Shared log of events seen by one or more hook callbacks.
///
/// Clones share the same log, so a recorder can hand out callbacks for
/// several `(definition, hook)` pairs and read everything back in one place.
#[derive(Clone, Debug, Default)]
pub struct EventRecorder {
    log: Rc<RefCell<Vec<SimEvent>>>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A boxed hook callback that appends to this recorder.
    pub fn callback(&self) -> Box<dyn FnMut(&SimEvent)> {
        let log = Rc::clone(&self.log);
        Box::new(move |event| log.borrow_mut().push(event.clone()))
    }

    /// Everything recorded so far.
    pub fn events(&self) -> Vec<SimEvent> {
        self.log.borrow().clone()
    }

    /// Recorded events routed to `hook`.
    pub fn count(&self, hook: HookKind) -> usize {
        self.log.borrow().iter().filter(|e| e.hook() == hook).count()
    }

    pub fn len(&self) -> usize {
        self.log.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.log.borrow_mut().clear();
    }
}
