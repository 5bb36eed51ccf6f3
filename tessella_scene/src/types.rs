// Copyright 2026 the Tessella Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the scene tree: item identifiers, flags, pick results.

/// Identifier for an item in the tree (generational).
///
/// An `ItemId` pairs an arena slot with the generation that slot had when
/// the item was created. Removing an item bumps the slot's generation, so
/// ids held by outside code (grabs, focus, tool state) go stale instead of
/// silently referring to a reused slot.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ItemId(pub(crate) u32, pub(crate) u32);

impl ItemId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

bitflags::bitflags! {
    /// Item flags: visibility and pending-update state.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ItemFlags: u8 {
        /// Item participates in rendering and picking.
        const VISIBLE     = 0b0000_0001;
        /// Item (or a descendant) asked to be revisited by the update pass.
        const NEED_UPDATE = 0b0000_0010;
        /// Item's transform changed since the last update pass.
        const NEED_AFFINE = 0b0000_0100;
    }
}

impl Default for ItemFlags {
    fn default() -> Self {
        Self::VISIBLE
    }
}

bitflags::bitflags! {
    /// Per-pass flags cascaded down the update recursion.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Cascade: u8 {
        /// An ancestor was explicitly asked to update.
        const REQUESTED      = 0b0000_0001;
        /// An ancestor's world transform changed; every descendant must
        /// recompute its world geometry.
        const AFFINE_CHANGED = 0b0000_0010;
    }
}

/// Result of a tolerance-based point pick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pick {
    /// The picked item (always a leaf).
    pub item: ItemId,
    /// Distance from the query point to the item, in world units. Zero when
    /// the point is inside the item.
    pub distance: f64,
}
