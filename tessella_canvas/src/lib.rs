// Copyright 2026 the Tessella Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tessella Canvas: the incremental repaint and input-routing engine.
//!
//! [`Canvas`] ties the scene tree, the tile dirty-map, and the host loop
//! together:
//!
//! - **Scheduling.** Mutations mark flags and dirty tiles; the canvas asks
//!   the host for one idle callback through [`Scheduler`] and does all real
//!   work in [`Canvas::idle`].
//! - **Update pass.** The tree's deferred geometry pass runs first; the
//!   damage it reports is folded back into the tile map.
//! - **Paint pass.** Dirty tile runs are painted by recursive bisection,
//!   each chunk rendered into a [`Buffer`] and handed to the [`Backend`].
//!   A per-cycle time budget (checked against [`Clock`]) interrupts the
//!   pass between chunks; completed chunks clear their tiles, so an
//!   interrupted pass resumes where it stopped. After enough consecutive
//!   interruptions one uninterruptible paint bounds staleness.
//! - **Events.** Window events are translated to world space, the item
//!   under the pointer is re-picked with enter/leave synthesis, implicit
//!   and explicit grabs are honored, and the event bubbles from the target
//!   toward the root. Handler side effects arrive as [`EventCtx`] requests
//!   and are applied after dispatch.
//!
//! The three host hooks ([`Scheduler`], [`Clock`], [`Backend`]) are traits
//! so tests can drive the canvas deterministically with counting and manual
//! fakes.
//!
//! This crate is `no_std` and uses `alloc`; the `std` feature adds a
//! monotonic [`StdClock`].

#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

mod canvas;
mod config;
mod hooks;

pub use canvas::Canvas;
pub use config::{CanvasState, PaintConfig, PaintStats, RenderMode};
pub use hooks::{Backend, Clock, Scheduler};
#[cfg(feature = "std")]
pub use hooks::StdClock;

// Re-exported so hosts can depend on this crate alone.
pub use tessella_events::{Event, EventKind, EventMask, GrabError, Modifiers};
pub use tessella_scene::{Buffer, Cursor, Drawable, EventCtx, ItemId, Pick, Tree};
pub use tessella_tiles::{PixelRect, TILE_SIZE, TileMap};
