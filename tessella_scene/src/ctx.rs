// Copyright 2026 the Tessella Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The request collector handed to event handlers.

use alloc::vec::Vec;
use kurbo::Rect;
use tessella_events::EventMask;

use crate::types::ItemId;

/// Pointer cursor an item can request while hovered or grabbing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Cursor {
    /// The host's default arrow.
    #[default]
    Default,
    /// Pointing hand.
    Pointer,
    /// Crosshair for precise placement.
    Crosshair,
    /// Move/drag cursor.
    Move,
    /// Text insertion beam.
    Text,
}

/// One deferred action requested by an event handler.
///
/// Handlers run while the canvas is mid-dispatch and must not mutate the
/// tree directly. They record requests here and the canvas applies them
/// after the handler returns.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Request {
    /// Re-run the update pass for an item.
    Update(ItemId),
    /// Repaint a world-space rectangle.
    Redraw(Rect),
    /// Grab the pointer for an item, filtered by the mask.
    Grab(ItemId, EventMask),
    /// Release the pointer grab held by an item.
    Ungrab(ItemId),
    /// Change the pointer cursor.
    SetCursor(Cursor),
    /// Destroy an item (and its subtree).
    Destroy(ItemId),
}

/// Collects handler requests during event dispatch.
#[derive(Debug, Default)]
pub struct EventCtx {
    item: Option<ItemId>,
    requests: Vec<Request>,
}

impl EventCtx {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// The item currently being offered the event.
    ///
    /// Set by the dispatcher before each handler call, so a handler can
    /// request actions on itself without storing its own id.
    pub fn item(&self) -> Option<ItemId> {
        self.item
    }

    pub(crate) fn set_item(&mut self, item: ItemId) {
        self.item = Some(item);
    }

    /// Request an update pass for `id`.
    pub fn request_update(&mut self, id: ItemId) {
        self.requests.push(Request::Update(id));
    }

    /// Request a repaint of a world-space rectangle.
    pub fn request_redraw(&mut self, rect: Rect) {
        self.requests.push(Request::Redraw(rect));
    }

    /// Request the pointer grab for `id`.
    pub fn grab(&mut self, id: ItemId, mask: EventMask) {
        self.requests.push(Request::Grab(id, mask));
    }

    /// Release the pointer grab held by `id`.
    pub fn ungrab(&mut self, id: ItemId) {
        self.requests.push(Request::Ungrab(id));
    }

    /// Request a pointer cursor change.
    pub fn set_cursor(&mut self, cursor: Cursor) {
        self.requests.push(Request::SetCursor(cursor));
    }

    /// Request destruction of `id` and its subtree.
    pub fn destroy(&mut self, id: ItemId) {
        self.requests.push(Request::Destroy(id));
    }

    /// Drain the collected requests in the order they were made.
    pub fn take_requests(&mut self) -> Vec<Request> {
        core::mem::take(&mut self.requests)
    }
}
