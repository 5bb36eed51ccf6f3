// Copyright 2026 the Tessella Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tessella Tiles: integer pixel rectangles and a viewport tile dirty-map.
//!
//! A canvas that repaints incrementally needs to remember *which* parts of
//! the screen are stale. This crate tracks that at a deliberately coarse,
//! fixed tile granularity ([`TILE_SIZE`] pixels square): a rectangle that
//! touches a tile dirties the whole tile. Coarseness bounds the number of
//! discrete paint operations a redraw cycle can produce, which matters more
//! for interactive latency than saving a few pixels of overdraw.
//!
//! ## API overview
//!
//! - [`PixelRect`]: an integer, device-space rectangle. Empty/inverted
//!   rectangles (`x1 <= x0` or `y1 <= y0`) are routinely produced by
//!   clipping and are treated as no-ops everywhere.
//! - [`TileMap`]: a dense grid of per-tile dirty flags covering the current
//!   viewport.
//!   - [`TileMap::mark_rect`] dirties every tile a rectangle touches.
//!   - [`TileMap::clear_rect`] marks tiles clean once their chunk painted.
//!   - [`TileMap::next_dirty_rect`] enumerates dirty runs in row-major
//!     order as tile-aligned rectangles for the paint loop.
//!   - [`TileMap::reset`] reallocates the grid on scroll/resize, copying
//!     flags for tiles that remain visible and starting newly exposed
//!     tiles dirty.
//!
//! Tiles stay dirty until explicitly cleared, so a paint pass that is
//! interrupted partway simply resumes from the remaining dirty runs on its
//! next invocation.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod map;
mod rect;

pub use map::{TILE_SIZE, TileMap};
pub use rect::PixelRect;
