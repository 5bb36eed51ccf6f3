// Copyright 2026 the Tessella Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dispatch helper: bubble an event up an ancestor path.
//!
//! The canvas resolves the target item and its ancestor chain; this module
//! only walks that chain and honors the first handler that consumes the
//! event. Propagation is bubble-only (target toward root); there is no
//! capture phase.

use crate::event::Event;

/// What a handler did with the event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The event was not consumed; offer it to the next ancestor.
    Continue,
    /// The event was consumed; stop propagation.
    Handled,
}

/// Bubble `event` along `path` (target first, root last).
///
/// The handler is called once per entry in order. Returns the key whose
/// handler consumed the event, or `None` if the whole path declined it.
pub fn run<K: Copy, E>(
    path: &[K],
    event: &Event,
    mut handler: impl FnMut(K, &Event, &mut E) -> Outcome,
    state: &mut E,
) -> Option<K> {
    for &k in path {
        match handler(k, event, state) {
            Outcome::Continue => {}
            Outcome::Handled => return Some(k),
        }
    }
    None
}
