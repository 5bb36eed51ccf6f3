// Copyright 2026 the Tessella Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The leaf-item behavior trait.

use kurbo::{Affine, Point, Rect};
use tessella_events::Event;

use crate::buffer::Buffer;
use crate::ctx::EventCtx;

/// Behavior of a drawable leaf item.
///
/// Item kinds (shapes, text, selection handles, tool feedback) implement
/// this trait; the tree owns them as `Box<dyn Drawable>` and drives them
/// through the update, render, and pick passes. Implementations never hold
/// references into the tree: the world transform is passed to
/// [`update`](Self::update), and side effects from event handling go
/// through the [`EventCtx`] request collector.
pub trait Drawable {
    /// Recompute cached world-space geometry for a new local-to-world
    /// transform and return the item's world bounding box.
    ///
    /// Called by the update pass whenever the item requested an update or
    /// an ancestor transform changed. The returned rectangle must
    /// conservatively contain everything [`render`](Self::render) will
    /// draw.
    fn update(&mut self, world: Affine) -> Rect;

    /// Draw the item into a buffer. World clipping is the buffer's job;
    /// the item draws at its world position and lets the buffer discard
    /// out-of-chunk pixels.
    fn render(&mut self, buf: &mut Buffer);

    /// Distance from a world-space point to the item, or `None` if the
    /// item does not consider the point pickable at all. Zero means the
    /// point is inside.
    fn point_distance(&self, world_pt: Point) -> Option<f64>;

    /// Handle an event delivered to this item. Return `true` to consume it
    /// and stop bubbling.
    fn handle_event(&mut self, _event: &Event, _ctx: &mut EventCtx) -> bool {
        false
    }

    /// Notification that the visible world area changed (scroll or
    /// resize). Items that render relative to the viewport (rulers, cached
    /// backgrounds) react here.
    fn viewbox_changed(&mut self, _area: Rect) {}
}
