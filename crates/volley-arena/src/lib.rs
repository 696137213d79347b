//! Fixed-capacity generational slot pools for the Volley combat core.
//!
//! Every gameplay object (entity, projectile, weapon instance) lives in a
//! [`SlotPool`] sized once at startup. Objects are referenced through
//! [`Handle`]s, which pair a slot index with the slot's generation at
//! allocation time.
//!
//! # Generation contract
//!
//! - A slot's generation only ever increases.
//! - Freeing a slot bumps its generation, so every handle issued before
//!   the free is permanently invalid, even after the slot is reused.
//! - A slot whose generation would overflow is retired instead of reused.
//!
//! Stale or out-of-range handles resolve to `None`; there is no other
//! failure mode on lookup.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod handle;
pub mod pool;

pub use error::ArenaError;
pub use handle::Handle;
pub use pool::SlotPool;
