// Copyright 2026 the Tessella Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tessella Scene: a retained-mode scene tree for a 2D vector canvas.
//!
//! The tree is a hierarchy of groups with drawable leaves. Each item carries
//! an affine transform relative to its parent and a cached world-space
//! bounding box. Structural and geometric changes are cheap flag updates;
//! the deferred [`Tree::update_world`] pass recomputes world transforms and
//! bounding boxes top-down and reports the damaged world rectangles.
//!
//! ## API overview
//!
//! - [`Tree`]: arena of items rooted at an implicit group.
//!   - Structure: [`Tree::insert_group`], [`Tree::insert_leaf`],
//!     [`Tree::remove`], z-order via [`Tree::raise`], [`Tree::lower`],
//!     [`Tree::raise_to_top`], [`Tree::lower_to_bottom`].
//!   - Geometry: [`Tree::set_transform`], [`Tree::request_update`],
//!     [`Tree::update_world`].
//!   - Queries: [`Tree::point_distance`] (tolerance-based picking),
//!     [`Tree::world_bbox`], [`Tree::is_ancestor`].
//!   - Output: [`Tree::render`] paints visible leaves into a [`Buffer`].
//! - [`Drawable`]: the leaf behavior trait implemented by item kinds
//!   (shapes, text, tool feedback). The tree stores `Box<dyn Drawable>`.
//! - [`ItemId`]: generational handle; stale ids are ignored by mutators and
//!   return `None` from accessors.
//! - [`EventCtx`]: request collector handed to event handlers, applied by
//!   the owning canvas after the handler returns.
//!
//! Item kinds never hold references into the tree; everything they need is
//! passed in, and everything they want done is requested through
//! [`EventCtx`].
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod buffer;
mod ctx;
mod drawable;
mod tree;
mod types;
mod util;

pub use buffer::Buffer;
pub use ctx::{Cursor, EventCtx, Request};
pub use drawable::Drawable;
pub use tree::Tree;
pub use types::{Cascade, ItemFlags, ItemId, Pick};
