//! Tile grid and swept axis collision for the Volley combat core.
//!
//! The room generator (outside the core) produces a [`TileGrid`] of
//! per-tile blocking flags. Everything that moves goes through the
//! [`AxisCollisionResolver`], which resolves displacement one axis at a
//! time in fixed substeps:
//!
//! ```text
//! per tick: displacement / substeps
//! └── per substep: resolve X → resolve Y
//!     └── candidate AABB → covered tile range → any tile blocks BodyKind?
//! ```
//!
//! Entities slide (the blocked axis loses its velocity); projectiles stop
//! and report the tile they struck.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod collision;
pub mod error;
pub mod tile;

pub use collision::{AxisCollisionResolver, AxisStep, BodyKind, EntityMove, ProjectileStep};
pub use error::SpaceError;
pub use tile::{TileFlags, TileGrid, TileRange};
