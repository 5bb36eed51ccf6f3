// Copyright 2026 the Tessella Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Event types, modifier flags, and the grab delivery mask.

use kurbo::{Point, Vec2};

/// Mouse button identifier. Buttons are numbered from 1.
pub type Button = u8;

/// Key identifier (a host keysym or keycode; opaque to this crate).
pub type Key = u32;

bitflags::bitflags! {
    /// Keyboard modifier state carried on every event.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// Shift is held.
        const SHIFT   = 0b0000_0001;
        /// Control is held.
        const CONTROL = 0b0000_0010;
        /// Alt is held.
        const ALT     = 0b0000_0100;
        /// Platform meta/super/command is held.
        const META    = 0b0000_1000;
    }
}

bitflags::bitflags! {
    /// Per-kind event bits, used to filter which events a grab receives.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct EventMask: u16 {
        /// Button press events.
        const BUTTON_PRESS   = 0b0000_0000_0001;
        /// Button release events.
        const BUTTON_RELEASE = 0b0000_0000_0010;
        /// Pointer motion events.
        const MOTION         = 0b0000_0000_0100;
        /// Pointer enter events.
        const ENTER          = 0b0000_0000_1000;
        /// Pointer leave events.
        const LEAVE          = 0b0000_0001_0000;
        /// Key press events.
        const KEY_PRESS      = 0b0000_0010_0000;
        /// Key release events.
        const KEY_RELEASE    = 0b0000_0100_0000;
        /// Focus gained/lost events.
        const FOCUS          = 0b0000_1000_0000;
        /// Scroll events.
        const SCROLL         = 0b0001_0000_0000;

        /// Every pointer event kind.
        const POINTER = Self::BUTTON_PRESS.bits()
            | Self::BUTTON_RELEASE.bits()
            | Self::MOTION.bits()
            | Self::ENTER.bits()
            | Self::LEAVE.bits()
            | Self::SCROLL.bits();
    }
}

/// What happened.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EventKind {
    /// A mouse button was pressed.
    ButtonPress {
        /// The button, numbered from 1.
        button: Button,
    },
    /// A mouse button was released.
    ButtonRelease {
        /// The button, numbered from 1.
        button: Button,
    },
    /// The pointer moved.
    Motion,
    /// The pointer entered an item.
    Enter,
    /// The pointer left an item.
    Leave,
    /// A key was pressed.
    KeyPress {
        /// The key identifier.
        key: Key,
    },
    /// A key was released.
    KeyRelease {
        /// The key identifier.
        key: Key,
    },
    /// An item gained keyboard focus.
    FocusIn,
    /// An item lost keyboard focus.
    FocusOut,
    /// The scroll wheel moved.
    Scroll {
        /// Scroll amount, in lines or pixels per the host convention.
        delta: Vec2,
    },
}

impl EventKind {
    /// The [`EventMask`] bit corresponding to this kind.
    pub fn mask(&self) -> EventMask {
        match self {
            Self::ButtonPress { .. } => EventMask::BUTTON_PRESS,
            Self::ButtonRelease { .. } => EventMask::BUTTON_RELEASE,
            Self::Motion => EventMask::MOTION,
            Self::Enter => EventMask::ENTER,
            Self::Leave => EventMask::LEAVE,
            Self::KeyPress { .. } => EventMask::KEY_PRESS,
            Self::KeyRelease { .. } => EventMask::KEY_RELEASE,
            Self::FocusIn | Self::FocusOut => EventMask::FOCUS,
            Self::Scroll { .. } => EventMask::SCROLL,
        }
    }

    /// Whether this is a pointer event (carries a meaningful position).
    pub fn is_pointer(&self) -> bool {
        EventMask::POINTER.contains(self.mask())
    }
}

/// One input event, already translated into world coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Event {
    /// What happened.
    pub kind: EventKind,
    /// Pointer position in world coordinates. For key and focus events this
    /// is the last known pointer position.
    pub pos: Point,
    /// Modifier state at the time of the event.
    pub modifiers: Modifiers,
}

impl Event {
    /// Create an event with no modifiers held.
    pub fn new(kind: EventKind, pos: Point) -> Self {
        Self {
            kind,
            pos,
            modifiers: Modifiers::empty(),
        }
    }

    /// Copy of this event with a different kind, keeping position and
    /// modifiers. Used when synthesizing enter/leave from motion.
    pub fn with_kind(&self, kind: EventKind) -> Self {
        Self { kind, ..*self }
    }
}
