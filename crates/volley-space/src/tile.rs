//! Tile grid of blocking flags.

use std::ops::{BitOr, BitOrAssign};

use glam::Vec2;
use volley_core::Aabb;

use crate::error::SpaceError;

/// Per-tile blocking flags.
///
/// The room generator decides which body kinds a tile blocks; the core
/// only tests the bits. Walls block everything, while void and water
/// block walking entities but let projectiles fly over.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TileFlags(u8);

impl TileFlags {
    /// Blocks nothing.
    pub const EMPTY: Self = Self(0);
    /// Blocks entity movement.
    pub const BLOCKS_ENTITY: Self = Self(1 << 0);
    /// Blocks projectile motion.
    pub const BLOCKS_PROJECTILE: Self = Self(1 << 1);
    /// Solid wall.
    pub const WALL: Self = Self(Self::BLOCKS_ENTITY.0 | Self::BLOCKS_PROJECTILE.0);
    /// Pit.
    pub const VOID: Self = Self::BLOCKS_ENTITY;
    /// Deep water.
    pub const WATER: Self = Self::BLOCKS_ENTITY;

    /// Raw bits.
    pub fn bits(self) -> u8 {
        self.0
    }

    /// Build from raw bits; unknown bits are kept but never tested.
    pub fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Whether any bit of `mask` is set.
    pub fn intersects(self, mask: TileFlags) -> bool {
        self.0 & mask.0 != 0
    }
}

impl BitOr for TileFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for TileFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Inclusive range of tiles covered by an AABB.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileRange {
    /// First covered column.
    pub col_min: i32,
    /// Last covered column.
    pub col_max: i32,
    /// First covered row.
    pub row_min: i32,
    /// Last covered row.
    pub row_max: i32,
}

impl TileRange {
    /// Iterate `(col, row)` over the range, row-major.
    pub fn iter(self) -> impl Iterator<Item = (i32, i32)> {
        (self.row_min..=self.row_max)
            .flat_map(move |row| (self.col_min..=self.col_max).map(move |col| (col, row)))
    }
}

/// A room's tile grid.
///
/// Tile `(col, row)` covers world space
/// `[col * tile_size, (col + 1) * tile_size) × [row * tile_size, (row + 1) * tile_size)`.
#[derive(Clone, Debug, PartialEq)]
pub struct TileGrid {
    width: u32,
    height: u32,
    tile_size: f32,
    tiles: Vec<TileFlags>,
}

impl TileGrid {
    /// A grid of `width × height` empty tiles.
    ///
    /// # Errors
    ///
    /// [`SpaceError::EmptyGrid`] if either dimension is zero, and
    /// [`SpaceError::InvalidTileSize`] for a non-positive tile size.
    pub fn new(width: u32, height: u32, tile_size: f32) -> Result<Self, SpaceError> {
        let count = Self::checked_count(width, height, tile_size)?;
        Ok(Self {
            width,
            height,
            tile_size,
            tiles: vec![TileFlags::EMPTY; count],
        })
    }

    /// A grid from a row-major flag buffer.
    ///
    /// # Errors
    ///
    /// As [`new`](Self::new), plus [`SpaceError::FlagCountMismatch`] when
    /// `tiles.len() != width * height`.
    pub fn from_flags(
        width: u32,
        height: u32,
        tile_size: f32,
        tiles: Vec<TileFlags>,
    ) -> Result<Self, SpaceError> {
        let count = Self::checked_count(width, height, tile_size)?;
        if tiles.len() != count {
            return Err(SpaceError::FlagCountMismatch {
                expected: count,
                actual: tiles.len(),
            });
        }
        Ok(Self {
            width,
            height,
            tile_size,
            tiles,
        })
    }

    fn checked_count(width: u32, height: u32, tile_size: f32) -> Result<usize, SpaceError> {
        if width == 0 || height == 0 {
            return Err(SpaceError::EmptyGrid);
        }
        if !tile_size.is_finite() || tile_size <= 0.0 {
            return Err(SpaceError::InvalidTileSize { value: tile_size });
        }
        Ok(width as usize * height as usize)
    }

    /// Columns.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Rows.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Edge length of one tile in world units.
    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// World-space extent of the grid.
    pub fn world_size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32) * self.tile_size
    }

    fn index(&self, col: i32, row: i32) -> Option<usize> {
        if col < 0 || row < 0 || col >= self.width as i32 || row >= self.height as i32 {
            return None;
        }
        Some(row as usize * self.width as usize + col as usize)
    }

    /// Flags of tile `(col, row)`, or `None` when out of bounds.
    pub fn get(&self, col: i32, row: i32) -> Option<TileFlags> {
        self.index(col, row).map(|i| self.tiles[i])
    }

    /// Overwrite tile `(col, row)`. Returns `false` when out of bounds.
    pub fn set(&mut self, col: i32, row: i32, flags: TileFlags) -> bool {
        match self.index(col, row) {
            Some(i) => {
                self.tiles[i] = flags;
                true
            }
            None => false,
        }
    }

    /// Whether tile `(col, row)` blocks bodies tested against `mask`.
    /// Out-of-bounds tiles always block.
    pub fn blocks(&self, col: i32, row: i32, mask: TileFlags) -> bool {
        self.get(col, row).is_none_or(|flags| flags.intersects(mask))
    }

    /// Tile coordinate containing world coordinate `v` on one axis.
    pub fn tile_of(&self, v: f32) -> i32 {
        (v / self.tile_size).floor() as i32
    }

    /// Tiles covered by `aabb`.
    ///
    /// The max edge is pulled in by a small epsilon so that a box resting
    /// flush against a tile boundary does not count the neighbouring tile.
    pub fn covered(&self, aabb: &Aabb) -> TileRange {
        let eps = self.tile_size * 1e-4;
        let max = aabb.max();
        let col_min = self.tile_of(aabb.min.x);
        let row_min = self.tile_of(aabb.min.y);
        TileRange {
            col_min,
            col_max: self.tile_of(max.x - eps).max(col_min),
            row_min,
            row_max: self.tile_of(max.y - eps).max(row_min),
        }
    }

    /// Centre of tile `(col, row)` in world space.
    pub fn tile_center(&self, col: i32, row: i32) -> Vec2 {
        (Vec2::new(col as f32, row as f32) + 0.5) * self.tile_size
    }
}
