// Copyright 2026 the Tessella Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-tile dirty flags covering the viewport.

use alloc::{vec, vec::Vec};

use crate::rect::PixelRect;

/// Side length of one dirty tile, in pixels.
///
/// A rectangle that touches any part of a tile dirties the whole tile.
/// This coarseness is intentional: it bounds the number of discrete paint
/// chunks one redraw cycle can produce.
pub const TILE_SIZE: i32 = 16;

const DIRTY: u8 = 1;

/// A dense grid of dirty flags at [`TILE_SIZE`] granularity.
///
/// The grid covers the current viewport: its origin is the viewport origin
/// rounded down to a tile boundary, and its extent is however many tiles
/// are needed to cover the viewport's far edge. A freshly created or
/// [`reset`](Self::reset) map starts with newly exposed tiles dirty, so
/// the first paint cycle after a resize or scroll repaints what actually
/// changed and nothing more.
#[derive(Clone)]
pub struct TileMap {
    /// Pixel coordinate of the left/top edge of tile (0, 0). Tile-aligned.
    origin_x: i32,
    origin_y: i32,
    /// Extent in tiles.
    cols: i32,
    rows: i32,
    flags: Vec<u8>,
}

impl core::fmt::Debug for TileMap {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TileMap")
            .field("origin", &(self.origin_x, self.origin_y))
            .field("cols", &self.cols)
            .field("rows", &self.rows)
            .field("dirty_tiles", &self.dirty_tile_count())
            .finish_non_exhaustive()
    }
}

/// Round down to the containing tile index. Euclidean division rounds
/// toward negative infinity, which matches floor for all integer inputs.
#[inline]
fn tile_floor(px: i32) -> i32 {
    px.div_euclid(TILE_SIZE)
}

/// Round up to the first tile index past `px`.
#[inline]
fn tile_ceil(px: i32) -> i32 {
    // div_euclid floors; bump by one unless already aligned.
    let q = px.div_euclid(TILE_SIZE);
    if px.rem_euclid(TILE_SIZE) == 0 { q } else { q + 1 }
}

impl TileMap {
    /// Create a map covering `viewport`, with every tile dirty.
    ///
    /// An empty viewport yields a zero-tile map on which every operation
    /// is a no-op.
    pub fn new(viewport: PixelRect) -> Self {
        let (origin_x, origin_y, cols, rows) = Self::geometry(viewport);
        Self {
            origin_x,
            origin_y,
            cols,
            rows,
            flags: vec![DIRTY; (cols as usize) * (rows as usize)],
        }
    }

    fn geometry(viewport: PixelRect) -> (i32, i32, i32, i32) {
        if viewport.is_empty() {
            return (viewport.x0, viewport.y0, 0, 0);
        }
        let tx0 = tile_floor(viewport.x0);
        let ty0 = tile_floor(viewport.y0);
        let tx1 = tile_ceil(viewport.x1);
        let ty1 = tile_ceil(viewport.y1);
        (tx0 * TILE_SIZE, ty0 * TILE_SIZE, tx1 - tx0, ty1 - ty0)
    }

    /// The tile-aligned pixel rectangle this map covers.
    pub fn pixel_bounds(&self) -> PixelRect {
        PixelRect::new(
            self.origin_x,
            self.origin_y,
            self.origin_x + self.cols * TILE_SIZE,
            self.origin_y + self.rows * TILE_SIZE,
        )
    }

    /// Extent of the map in tiles, as `(cols, rows)`.
    pub fn tile_extent(&self) -> (i32, i32) {
        (self.cols, self.rows)
    }

    /// Number of tiles currently marked dirty.
    pub fn dirty_tile_count(&self) -> usize {
        self.flags.iter().filter(|&&t| t == DIRTY).count()
    }

    /// Whether any tile is dirty.
    pub fn any_dirty(&self) -> bool {
        self.flags.iter().any(|&t| t == DIRTY)
    }

    #[inline]
    fn idx(&self, tx: i32, ty: i32) -> usize {
        debug_assert!(
            tx >= 0 && tx < self.cols && ty >= 0 && ty < self.rows,
            "tile index out of bounds"
        );
        (ty as usize) * (self.cols as usize) + tx as usize
    }

    /// Tile index range `(tx0, ty0, tx1, ty1)` touched by a pixel rect,
    /// clipped to the map. Empty ranges have `tx1 <= tx0` or `ty1 <= ty0`.
    fn tile_range(&self, r: PixelRect) -> (i32, i32, i32, i32) {
        let r = r.intersect(self.pixel_bounds());
        if r.is_empty() {
            return (0, 0, 0, 0);
        }
        (
            tile_floor(r.x0 - self.origin_x),
            tile_floor(r.y0 - self.origin_y),
            tile_ceil(r.x1 - self.origin_x),
            tile_ceil(r.y1 - self.origin_y),
        )
    }

    /// Mark every tile touched by `rect` dirty.
    ///
    /// The rectangle is clipped to the map; empty or fully off-map input
    /// is a no-op. Returns true if at least one previously clean tile was
    /// marked.
    pub fn mark_rect(&mut self, rect: PixelRect) -> bool {
        let (tx0, ty0, tx1, ty1) = self.tile_range(rect);
        let mut newly = false;
        for ty in ty0..ty1 {
            for tx in tx0..tx1 {
                let i = self.idx(tx, ty);
                newly |= self.flags[i] != DIRTY;
                self.flags[i] = DIRTY;
            }
        }
        newly
    }

    /// Mark the whole map dirty.
    pub fn mark_all(&mut self) {
        self.flags.fill(DIRTY);
    }

    /// Mark every tile touched by `rect` clean.
    ///
    /// Callers clear a rectangle only after the chunk covering it was
    /// fully painted; tiles of interrupted chunks must stay dirty.
    pub fn clear_rect(&mut self, rect: PixelRect) {
        let (tx0, ty0, tx1, ty1) = self.tile_range(rect);
        for ty in ty0..ty1 {
            for tx in tx0..tx1 {
                let i = self.idx(tx, ty);
                self.flags[i] = 0;
            }
        }
    }

    /// Whether any tile touched by `rect` is dirty.
    pub fn is_dirty_rect(&self, rect: PixelRect) -> bool {
        let (tx0, ty0, tx1, ty1) = self.tile_range(rect);
        for ty in ty0..ty1 {
            for tx in tx0..tx1 {
                if self.flags[self.idx(tx, ty)] == DIRTY {
                    return true;
                }
            }
        }
        false
    }

    /// Find the next dirty region in row-major tile order.
    ///
    /// Starting from the first dirty tile, the run extends right through
    /// consecutive dirty tiles, then down through following rows whose
    /// tiles over the same column span are all dirty. The result is a
    /// tile-aligned pixel rectangle; the caller paints it (possibly in
    /// pieces) and calls [`clear_rect`](Self::clear_rect) for the parts
    /// that completed.
    pub fn next_dirty_rect(&self) -> Option<PixelRect> {
        let (tx0, ty0) = self.first_dirty_tile()?;

        // Extend right along the row.
        let mut tx1 = tx0 + 1;
        while tx1 < self.cols && self.flags[self.idx(tx1, ty0)] == DIRTY {
            tx1 += 1;
        }

        // Extend down while the whole column span stays dirty.
        let mut ty1 = ty0 + 1;
        'rows: while ty1 < self.rows {
            for tx in tx0..tx1 {
                if self.flags[self.idx(tx, ty1)] != DIRTY {
                    break 'rows;
                }
            }
            ty1 += 1;
        }

        Some(PixelRect::new(
            self.origin_x + tx0 * TILE_SIZE,
            self.origin_y + ty0 * TILE_SIZE,
            self.origin_x + tx1 * TILE_SIZE,
            self.origin_y + ty1 * TILE_SIZE,
        ))
    }

    fn first_dirty_tile(&self) -> Option<(i32, i32)> {
        let i = self.flags.iter().position(|&t| t == DIRTY)?;
        let cols = self.cols as usize;
        #[allow(
            clippy::cast_possible_truncation,
            reason = "tile extents fit in i32 by construction"
        )]
        Some(((i % cols) as i32, (i / cols) as i32))
    }

    /// Reallocate the map for a new viewport.
    ///
    /// Tiles that remain visible keep their flags; newly exposed tiles
    /// start dirty so the next paint cycle fills them in.
    pub fn reset(&mut self, viewport: PixelRect) {
        let (origin_x, origin_y, cols, rows) = Self::geometry(viewport);
        let mut flags = vec![DIRTY; (cols as usize) * (rows as usize)];

        // Copy flags for tiles present in both grids, matching on absolute
        // tile indices.
        let old_tx = self.origin_x / TILE_SIZE;
        let old_ty = self.origin_y / TILE_SIZE;
        let new_tx = origin_x / TILE_SIZE;
        let new_ty = origin_y / TILE_SIZE;
        for ty in 0..rows {
            let oy = ty + new_ty - old_ty;
            if oy < 0 || oy >= self.rows {
                continue;
            }
            for tx in 0..cols {
                let ox = tx + new_tx - old_tx;
                if ox < 0 || ox >= self.cols {
                    continue;
                }
                flags[(ty as usize) * (cols as usize) + tx as usize] =
                    self.flags[self.idx(ox, oy)];
            }
        }

        self.origin_x = origin_x;
        self.origin_y = origin_y;
        self.cols = cols;
        self.rows = rows;
        self.flags = flags;
    }
}
