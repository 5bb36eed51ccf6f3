// Copyright 2026 the Tessella Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host integration traits: idle scheduling, time, and presentation.

use tessella_scene::Buffer;

/// Requests one idle callback from the host loop.
///
/// The canvas calls [`schedule`](Self::schedule) at most once per pending
/// work cycle; the host must eventually call [`Canvas::idle`] once per
/// request. Spurious idle calls are harmless.
///
/// [`Canvas::idle`]: crate::Canvas::idle
pub trait Scheduler {
    /// Ask the host to call [`Canvas::idle`] soon.
    ///
    /// [`Canvas::idle`]: crate::Canvas::idle
    fn schedule(&mut self);
}

/// Monotonic time source for the paint deadline.
pub trait Clock {
    /// Microseconds since an arbitrary epoch. Must not go backwards.
    fn now_micros(&self) -> u64;
}

/// Receives finished paint chunks.
///
/// Each buffer covers a world-space rectangle; the host maps it to window
/// coordinates by subtracting the scroll origin.
pub trait Backend {
    /// Present one rendered chunk.
    fn present(&mut self, buf: &Buffer);
}

/// [`Clock`] backed by [`std::time::Instant`].
#[cfg(feature = "std")]
#[derive(Debug)]
pub struct StdClock(std::time::Instant);

#[cfg(feature = "std")]
impl StdClock {
    /// Create a clock whose epoch is now.
    pub fn new() -> Self {
        Self(std::time::Instant::now())
    }
}

#[cfg(feature = "std")]
impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl Clock for StdClock {
    fn now_micros(&self) -> u64 {
        #[allow(
            clippy::cast_possible_truncation,
            reason = "u64 microseconds cover half a million years of uptime"
        )]
        let micros = self.0.elapsed().as_micros() as u64;
        micros
    }
}
