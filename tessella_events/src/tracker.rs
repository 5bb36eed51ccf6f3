// Copyright 2026 the Tessella Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pressed-button bookkeeping.

use hashbrown::HashMap;
use kurbo::Point;

use crate::event::Button;

/// Tracks which mouse buttons are currently held and where each press
/// started.
///
/// Buttons are numbered from 1. Presses of an already-held button update the
/// stored press position; releases of an unheld button are no-ops.
#[derive(Clone, Default)]
pub struct ButtonTracker {
    /// Bit `b - 1` set means button `b` is down.
    down: u32,
    /// World-space position at press time, per held button.
    press_pos: HashMap<Button, Point>,
}

impl core::fmt::Debug for ButtonTracker {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ButtonTracker")
            .field("down", &self.down)
            .field("held", &self.press_pos.len())
            .finish_non_exhaustive()
    }
}

impl ButtonTracker {
    /// Create a tracker with no buttons held.
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn bit(button: Button) -> u32 {
        1_u32 << (u32::from(button.saturating_sub(1)) & 31)
    }

    /// Record a button press at `pos`.
    pub fn press(&mut self, button: Button, pos: Point) {
        self.down |= Self::bit(button);
        self.press_pos.insert(button, pos);
    }

    /// Record a button release; returns the press position if the button
    /// was held.
    pub fn release(&mut self, button: Button) -> Option<Point> {
        self.down &= !Self::bit(button);
        self.press_pos.remove(&button)
    }

    /// Whether `button` is currently held.
    pub fn is_down(&self, button: Button) -> bool {
        self.down & Self::bit(button) != 0
    }

    /// Whether any button is currently held.
    pub fn any_down(&self) -> bool {
        self.down != 0
    }

    /// The world-space position where `button` was pressed, if held.
    pub fn press_position(&self, button: Button) -> Option<Point> {
        self.press_pos.get(&button).copied()
    }

    /// Forget all held buttons.
    pub fn clear(&mut self) {
        self.down = 0;
        self.press_pos.clear();
    }
}
