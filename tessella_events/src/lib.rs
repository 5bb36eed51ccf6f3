// Copyright 2026 the Tessella Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tessella Events: the input-event model for a retained-mode canvas.
//!
//! This crate defines the event vocabulary shared between a canvas and its
//! items, plus the small pieces of interaction state that are independent of
//! any particular scene representation:
//!
//! - [`Event`] / [`EventKind`]: pointer, key, crossing, focus, and scroll
//!   events carrying a world-space position and [`Modifiers`].
//! - [`EventMask`]: per-kind bits used to filter grab delivery.
//! - [`ButtonTracker`]: which buttons are held and where each press started.
//! - [`GrabState`]: exclusive pointer ownership with a delivery mask;
//!   a grab request is denied while another holder is active.
//! - [`dispatch::run`]: bubble an event from a target toward the root,
//!   stopping at the first handler that consumes it.
//!
//! All state here is keyed by a caller-supplied `K` (typically an item id),
//! so the crate has no dependency on any scene graph.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod dispatch;
mod event;
mod grab;
mod tracker;

pub use event::{Button, Event, EventKind, EventMask, Key, Modifiers};
pub use grab::{GrabError, GrabState};
pub use tracker::ButtonTracker;
