// Copyright 2026 the Tessella Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Paint tuning, render modes, and canvas bookkeeping types.

/// How leaves are rendered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RenderMode {
    /// Full rendering.
    #[default]
    Normal,
    /// Outline-only rendering. Cheap per pixel, so the paint pass may use
    /// larger chunks.
    Outline,
}

/// Where the canvas is in its work cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CanvasState {
    /// Nothing scheduled.
    #[default]
    Idle,
    /// An idle callback is scheduled and an update pass is needed.
    UpdatePending,
    /// An idle callback is scheduled; only painting is needed.
    PaintPending,
    /// Currently inside the paint pass.
    Painting,
}

/// Tunable knobs for the paint pass.
///
/// The chunk-area thresholds and the bisection heuristic trade overdraw
/// against per-chunk overhead; none of them affect what ends up on screen,
/// only how it gets there. Callers should not rely on exact chunk shapes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaintConfig {
    /// Time budget for one paint cycle, in microseconds. A cycle that runs
    /// past the budget is interrupted between chunks and rescheduled.
    pub time_budget_micros: u64,
    /// Maximum chunk area (in pixels) rendered into one buffer in
    /// [`RenderMode::Normal`]. Larger dirty regions are bisected.
    pub buffer_area: i64,
    /// Maximum chunk area in [`RenderMode::Outline`].
    pub outline_buffer_area: i64,
    /// After this many consecutive interrupted paint cycles, one cycle
    /// runs without a deadline so the screen is guaranteed to catch up.
    pub forced_redraw_limit: u32,
}

impl PaintConfig {
    /// The default tuning.
    pub const fn new() -> Self {
        Self {
            time_budget_micros: 1_000,
            buffer_area: 65_536,
            outline_buffer_area: 262_144,
            forced_redraw_limit: 8,
        }
    }
}

impl Default for PaintConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Counters describing paint-pass behavior, for diagnostics and tests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PaintStats {
    /// Paint cycles started.
    pub cycles: u64,
    /// Paint cycles that finished all dirty tiles.
    pub completed: u64,
    /// Paint cycles interrupted by the time budget.
    pub interrupted: u64,
    /// Paint cycles forced to run without a deadline.
    pub forced_complete: u64,
}
