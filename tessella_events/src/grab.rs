// Copyright 2026 the Tessella Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Exclusive pointer grabs.

use crate::event::{EventKind, EventMask};

/// Why a grab request was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GrabError {
    /// Another item already holds the grab.
    AlreadyGrabbed,
}

impl core::fmt::Display for GrabError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AlreadyGrabbed => f.write_str("pointer is already grabbed by another item"),
        }
    }
}

impl core::error::Error for GrabError {}

/// Exclusive pointer ownership with a delivery mask.
///
/// While a grab is active, pointer events matching the mask are routed to
/// the holder instead of the item under the pointer. Only one holder at a
/// time; a second grab request is refused rather than silently stealing.
#[derive(Clone, Debug, Default)]
pub struct GrabState<K> {
    holder: Option<(K, EventMask)>,
}

impl<K: Copy + PartialEq> GrabState<K> {
    /// Create an inactive grab.
    pub fn new() -> Self {
        Self { holder: None }
    }

    /// Request the grab for `k`, delivering events matching `mask`.
    ///
    /// Re-grabbing by the current holder updates the mask. A request while
    /// another item holds the grab fails with [`GrabError::AlreadyGrabbed`].
    pub fn grab(&mut self, k: K, mask: EventMask) -> Result<(), GrabError> {
        match self.holder {
            Some((holder, _)) if holder != k => Err(GrabError::AlreadyGrabbed),
            _ => {
                self.holder = Some((k, mask));
                Ok(())
            }
        }
    }

    /// Release the grab if `k` holds it. Releasing a grab one does not hold
    /// is a no-op.
    pub fn ungrab(&mut self, k: K) {
        if let Some((holder, _)) = self.holder
            && holder == k
        {
            self.holder = None;
        }
    }

    /// Release the grab unconditionally.
    pub fn clear(&mut self) {
        self.holder = None;
    }

    /// The current holder, if any.
    pub fn holder(&self) -> Option<K> {
        self.holder.map(|(k, _)| k)
    }

    /// The active delivery mask, if a grab is held.
    pub fn mask(&self) -> Option<EventMask> {
        self.holder.map(|(_, m)| m)
    }

    /// Whether a grab is active and its mask includes `kind`.
    pub fn mask_matches(&self, kind: &EventKind) -> bool {
        self.holder
            .is_some_and(|(_, mask)| mask.contains(kind.mask()))
    }
}
