// Copyright 2026 the Tessella Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The canvas: scheduling, incremental paint, and event routing.

use alloc::boxed::Box;
use alloc::vec::Vec;
use kurbo::{Affine, Point, Rect};
use tessella_events::dispatch::{self, Outcome};
use tessella_events::{ButtonTracker, Event, EventKind, EventMask, GrabError, GrabState, Modifiers};
use tessella_scene::{Buffer, Cursor, Drawable, EventCtx, ItemId, Pick, Request, Tree};
use tessella_tiles::{PixelRect, TILE_SIZE, TileMap};

use crate::config::{CanvasState, PaintConfig, PaintStats, RenderMode};
use crate::hooks::{Backend, Clock, Scheduler};

/// Default pick tolerance, in world units.
const PICK_TOLERANCE: f64 = 2.0;

enum PaintOutcome {
    Completed,
    Interrupted,
}

/// A scrollable, incrementally repainted view of a scene [`Tree`].
///
/// The canvas owns the tree, a [`TileMap`] of dirty tiles over the current
/// viewport, and the interaction state (hover, implicit and explicit grabs,
/// focus). Hosts drive it with three calls:
///
/// - mutations (`insert_*`, [`Canvas::set_transform`], ...) which mark work
///   and request an idle callback through the [`Scheduler`],
/// - [`Canvas::handle_event`] for input, with positions in window
///   coordinates,
/// - [`Canvas::idle`] from the scheduled callback, which runs the update
///   pass and then paints dirty tiles until done or out of budget.
///
/// All rectangles exchanged with the tree are world-space; the scroll
/// origin only enters when translating window event positions and when the
/// host blits presented buffers.
pub struct Canvas<S: Scheduler, C: Clock, B: Backend> {
    tree: Tree,
    tiles: TileMap,
    config: PaintConfig,
    mode: RenderMode,
    scheduler: S,
    clock: C,
    backend: B,

    scroll: (i32, i32),
    viewport: (i32, i32),
    mapped: bool,
    state: CanvasState,
    need_repick: bool,
    cursor: Cursor,
    pick_tolerance: f64,

    // Pick state. `current` is the item under the pointer as far as event
    // delivery is concerned; `new_current` is the latest pick result, which
    // lags into `current` while an implicit grab defers the switch.
    current: Option<ItemId>,
    new_current: Option<ItemId>,
    grab: GrabState<ItemId>,
    focused: Option<ItemId>,
    in_repick: bool,
    left_grab: bool,
    gen_all_enter_events: bool,
    buttons: ButtonTracker,
    last_window_pos: Point,
    pointer_in_window: bool,
    modifiers: Modifiers,

    interrupt_limit: u32,
    consecutive_interrupts: u32,
    stats: PaintStats,
}

impl<S: Scheduler, C: Clock, B: Backend> core::fmt::Debug for Canvas<S, C, B> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Canvas")
            .field("state", &self.state)
            .field("mapped", &self.mapped)
            .field("scroll", &self.scroll)
            .field("viewport", &self.viewport)
            .field("tree", &self.tree)
            .field("tiles", &self.tiles)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl<S: Scheduler, C: Clock, B: Backend> Canvas<S, C, B> {
    /// Create an unmapped canvas with an empty viewport.
    pub fn new(config: PaintConfig, scheduler: S, clock: C, backend: B) -> Self {
        Self {
            tree: Tree::new(),
            tiles: TileMap::new(PixelRect::ZERO),
            config,
            mode: RenderMode::Normal,
            scheduler,
            clock,
            backend,
            scroll: (0, 0),
            viewport: (0, 0),
            mapped: false,
            state: CanvasState::Idle,
            need_repick: false,
            cursor: Cursor::Default,
            pick_tolerance: PICK_TOLERANCE,
            current: None,
            new_current: None,
            grab: GrabState::new(),
            focused: None,
            in_repick: false,
            left_grab: false,
            gen_all_enter_events: false,
            buttons: ButtonTracker::new(),
            last_window_pos: Point::ZERO,
            pointer_in_window: false,
            modifiers: Modifiers::empty(),
            interrupt_limit: config.forced_redraw_limit,
            consecutive_interrupts: 0,
            stats: PaintStats::default(),
        }
    }

    // --- accessors ---

    /// Read-only access to the scene tree. Mutations go through the canvas
    /// so scheduling and pick state stay consistent.
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// The scheduling state.
    pub fn state(&self) -> CanvasState {
        self.state
    }

    /// Paint-pass counters.
    pub fn stats(&self) -> PaintStats {
        self.stats
    }

    /// The cursor most recently requested by an item.
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// The item currently receiving pointer events.
    pub fn current_item(&self) -> Option<ItemId> {
        self.current
    }

    /// The keyboard-focused item.
    pub fn focused_item(&self) -> Option<ItemId> {
        self.focused
    }

    /// The explicit pointer-grab holder.
    pub fn grabbed_item(&self) -> Option<ItemId> {
        self.grab.holder()
    }

    /// World coordinates of the viewport's top-left corner.
    pub fn scroll_origin(&self) -> (i32, i32) {
        self.scroll
    }

    /// Viewport size in pixels.
    pub fn viewport_size(&self) -> (i32, i32) {
        self.viewport
    }

    /// Pick the topmost item within the pick tolerance of a world point.
    pub fn pick(&self, world: Point) -> Option<Pick> {
        self.tree.point_distance(world, self.pick_tolerance)
    }

    /// Set the pick tolerance in world units. Items within this distance of
    /// the pointer are eligible to become the current item.
    pub fn set_pick_tolerance(&mut self, tolerance: f64) {
        self.pick_tolerance = tolerance.max(0.0);
    }

    /// Generate enter/leave events even while a button is held, instead of
    /// deferring the hover switch until release.
    pub fn set_gen_all_enter_events(&mut self, on: bool) {
        self.gen_all_enter_events = on;
    }

    // --- structure and geometry ---

    /// Insert an empty group under `parent`. See [`Tree::insert_group`].
    pub fn insert_group(&mut self, parent: ItemId) -> Option<ItemId> {
        let id = self.tree.insert_group(parent);
        self.ensure_update_scheduled();
        id
    }

    /// Insert a drawable leaf under `parent`. See [`Tree::insert_leaf`].
    pub fn insert_leaf(&mut self, parent: ItemId, item: Box<dyn Drawable>) -> Option<ItemId> {
        let id = self.tree.insert_leaf(parent, item);
        self.ensure_update_scheduled();
        id
    }

    /// The root group of the scene tree.
    pub fn root(&self) -> ItemId {
        self.tree.root()
    }

    /// Destroy an item and its subtree.
    ///
    /// Interaction state pointing into the subtree (hover, grab, focus) is
    /// dropped, a re-pick is scheduled, and the area the subtree occupied
    /// is queued for one final repaint.
    pub fn destroy_item(&mut self, id: ItemId) {
        if !self.tree.is_alive(id) {
            return;
        }
        if self.refers_into(self.current, id) {
            self.current = None;
        }
        if self.refers_into(self.new_current, id) {
            self.new_current = None;
        }
        if self.refers_into(self.grab.holder(), id) {
            self.grab.clear();
        }
        if self.refers_into(self.focused, id) {
            self.focused = None;
        }
        self.need_repick = true;
        if let Some(area) = self.tree.remove(id) {
            self.request_redraw(area);
        }
        self.ensure_update_scheduled();
    }

    fn refers_into(&self, r: Option<ItemId>, subtree: ItemId) -> bool {
        r.is_some_and(|r| self.tree.is_ancestor(subtree, r))
    }

    /// Ask for an update pass for `id`. See [`Tree::request_update`].
    pub fn request_update(&mut self, id: ItemId) {
        self.tree.request_update(id);
        self.ensure_update_scheduled();
    }

    /// Set an item's transform. The pointer may now be over something else,
    /// so a re-pick runs with the next update pass.
    pub fn set_transform(&mut self, id: ItemId, transform: Affine) {
        self.tree.set_transform(id, transform);
        self.need_repick = true;
        self.ensure_update_scheduled();
    }

    /// Show or hide an item.
    pub fn set_visible(&mut self, id: ItemId, visible: bool) {
        if let Some(bbox) = self.tree.set_visible(id, visible) {
            self.request_redraw(bbox);
            self.need_repick = true;
            self.ensure_update_scheduled();
        }
    }

    /// Move an item one step up in paint order.
    pub fn raise(&mut self, id: ItemId) {
        if self.tree.raise(id) {
            self.redraw_item_area(id);
        }
    }

    /// Move an item one step down in paint order.
    pub fn lower(&mut self, id: ItemId) {
        if self.tree.lower(id) {
            self.redraw_item_area(id);
        }
    }

    /// Move an item to the top of its siblings' paint order.
    pub fn raise_to_top(&mut self, id: ItemId) {
        if self.tree.raise_to_top(id) {
            self.redraw_item_area(id);
        }
    }

    /// Move an item to the bottom of its siblings' paint order.
    pub fn lower_to_bottom(&mut self, id: ItemId) {
        if self.tree.lower_to_bottom(id) {
            self.redraw_item_area(id);
        }
    }

    fn redraw_item_area(&mut self, id: ItemId) {
        if let Some(bbox) = self.tree.world_bbox(id) {
            self.request_redraw(bbox);
        }
        self.need_repick = true;
        self.ensure_update_scheduled();
    }

    // --- redraw requests ---

    /// Queue a world-space rectangle for repaint.
    ///
    /// The rectangle is rounded outward to pixels and clipped to the
    /// viewport; a request that marks nothing (degenerate or fully
    /// off-screen) does not schedule any work.
    pub fn request_redraw(&mut self, rect: Rect) {
        let pr = outward(rect).intersect(self.viewport_rect());
        if pr.is_empty() {
            return;
        }
        self.tiles.mark_rect(pr);
        if self.mapped && self.tiles.any_dirty() {
            self.ensure_paint_scheduled();
        }
    }

    /// Queue the whole viewport for repaint.
    pub fn request_full_redraw(&mut self) {
        self.tiles.mark_all();
        if self.mapped && self.tiles.any_dirty() {
            self.ensure_paint_scheduled();
        }
    }

    /// Switch render mode; the viewport repaints in the new mode.
    pub fn set_render_mode(&mut self, mode: RenderMode) {
        if self.mode != mode {
            self.mode = mode;
            self.request_full_redraw();
        }
    }

    /// Tighten the forced-redraw limit: after `count` consecutive
    /// interrupted paint cycles, one cycle runs without a deadline. A count
    /// of zero forces every cycle to completion.
    ///
    /// Used around interactions (rubber-band drags, scrolling) where the
    /// screen must not fall arbitrarily far behind.
    pub fn forced_full_redraw(&mut self, count: u32) {
        self.interrupt_limit = count;
    }

    /// Restore the configured forced-redraw limit.
    pub fn end_forced_full_redraws(&mut self) {
        self.interrupt_limit = self.config.forced_redraw_limit;
    }

    // --- viewport ---

    /// Mark the canvas as visible. The whole viewport starts dirty.
    pub fn map(&mut self) {
        self.mapped = true;
        self.tiles.mark_all();
        if self.tree.update_pending() {
            self.ensure_update_scheduled();
        } else if self.tiles.any_dirty() {
            self.ensure_paint_scheduled();
        }
    }

    /// Mark the canvas as hidden; painting stops until mapped again.
    pub fn unmap(&mut self) {
        self.mapped = false;
    }

    /// Resize the viewport. Tiles still visible keep their dirty state;
    /// newly exposed tiles start dirty. Leaves are notified of the new
    /// visible area.
    pub fn set_viewport(&mut self, width: i32, height: i32) {
        self.viewport = (width, height);
        self.tiles.reset(self.viewport_rect());
        self.tree.viewbox_changed(self.viewport_world());
        if self.mapped && self.tiles.any_dirty() {
            self.ensure_paint_scheduled();
        }
    }

    /// Scroll the viewport so its top-left corner is at world `(x, y)`.
    ///
    /// The pointer has not moved in the window but now points at different
    /// world coordinates, so the item under it is re-picked immediately.
    pub fn scroll_to(&mut self, x: i32, y: i32) {
        if self.scroll == (x, y) {
            return;
        }
        self.scroll = (x, y);
        self.tiles.reset(self.viewport_rect());
        self.tree.viewbox_changed(self.viewport_world());
        self.pick_current_item();
        if self.mapped && self.tiles.any_dirty() {
            self.ensure_paint_scheduled();
        }
    }

    fn viewport_rect(&self) -> PixelRect {
        PixelRect::from_xywh(self.scroll.0, self.scroll.1, self.viewport.0, self.viewport.1)
    }

    fn viewport_world(&self) -> Rect {
        let r = self.viewport_rect();
        Rect::new(
            f64::from(r.x0),
            f64::from(r.y0),
            f64::from(r.x1),
            f64::from(r.y1),
        )
    }

    fn window_to_world(&self, window: Point) -> Point {
        Point::new(
            window.x + f64::from(self.scroll.0),
            window.y + f64::from(self.scroll.1),
        )
    }

    // --- scheduling ---

    fn ensure_update_scheduled(&mut self) {
        if !self.tree.update_pending() {
            return;
        }
        match self.state {
            CanvasState::Idle => {
                self.state = CanvasState::UpdatePending;
                self.scheduler.schedule();
            }
            CanvasState::PaintPending => self.state = CanvasState::UpdatePending,
            CanvasState::UpdatePending | CanvasState::Painting => {}
        }
    }

    fn ensure_paint_scheduled(&mut self) {
        if let CanvasState::Idle = self.state {
            self.state = CanvasState::PaintPending;
            self.scheduler.schedule();
        }
    }

    /// Run one scheduled work unit: the update pass, a deferred re-pick,
    /// then painting until done or out of budget.
    ///
    /// Returns true when all pending work finished. When the paint pass is
    /// interrupted by the time budget this returns false and another idle
    /// callback has already been requested; the remaining dirty tiles are
    /// painted then.
    pub fn idle(&mut self) -> bool {
        self.run_update_pass();
        if self.need_repick {
            self.need_repick = false;
            self.pick_current_item();
            // Enter/leave handlers may have dirtied more geometry.
            self.run_update_pass();
        }

        if !self.mapped {
            self.state = CanvasState::Idle;
            return true;
        }

        self.state = CanvasState::Painting;
        match self.paint() {
            PaintOutcome::Completed => {
                self.state = CanvasState::Idle;
                true
            }
            PaintOutcome::Interrupted => {
                self.state = CanvasState::PaintPending;
                self.scheduler.schedule();
                false
            }
        }
    }

    fn run_update_pass(&mut self) {
        if !self.tree.update_pending() {
            return;
        }
        let mut damage = Vec::new();
        self.tree.update_world(&mut damage);
        for rect in damage {
            let pr = outward(rect).intersect(self.viewport_rect());
            if !pr.is_empty() {
                self.tiles.mark_rect(pr);
            }
        }
    }

    // --- painting ---

    fn paint(&mut self) -> PaintOutcome {
        if !self.tiles.any_dirty() {
            return PaintOutcome::Completed;
        }
        self.stats.cycles += 1;
        let forced = self.consecutive_interrupts >= self.interrupt_limit;
        let deadline = if forced {
            None
        } else {
            Some(
                self.clock
                    .now_micros()
                    .saturating_add(self.config.time_budget_micros),
            )
        };

        while let Some(rect) = self.tiles.next_dirty_rect() {
            if let PaintOutcome::Interrupted = self.paint_rect(rect, deadline) {
                self.stats.interrupted += 1;
                self.consecutive_interrupts += 1;
                return PaintOutcome::Interrupted;
            }
        }

        self.stats.completed += 1;
        if forced {
            self.stats.forced_complete += 1;
        }
        self.consecutive_interrupts = 0;
        PaintOutcome::Completed
    }

    fn paint_rect(&mut self, rect: PixelRect, deadline: Option<u64>) -> PaintOutcome {
        if rect.is_empty() {
            return PaintOutcome::Completed;
        }
        if let Some(d) = deadline
            && self.clock.now_micros() >= d
        {
            return PaintOutcome::Interrupted;
        }

        let max_area = match self.mode {
            RenderMode::Normal => self.config.buffer_area,
            RenderMode::Outline => self.config.outline_buffer_area,
        };
        if rect.area() <= max_area {
            let mut buf = Buffer::new(rect);
            self.tree.render(&mut buf);
            self.backend.present(&buf);
            // Only fully painted chunks clear their tiles; everything else
            // stays dirty so an interrupted pass resumes here.
            self.tiles.clear_rect(rect);
            return PaintOutcome::Completed;
        }

        let (near, far) = self.bisect(rect);
        match self.paint_rect(near, deadline) {
            PaintOutcome::Interrupted => PaintOutcome::Interrupted,
            PaintOutcome::Completed => self.paint_rect(far, deadline),
        }
    }

    /// Split an oversized chunk at a tile-aligned midpoint, returning the
    /// half nearer the pointer first so interaction feedback lands even
    /// when the budget interrupts the rest.
    fn bisect(&self, rect: PixelRect) -> (PixelRect, PixelRect) {
        let w = i64::from(rect.width());
        let h = i64::from(rect.height());
        // Prefer stacked bands (scanline-friendly) until the chunk gets
        // flatter than 1:4, then switch to side-by-side halves.
        let (a, b) = if w <= 4 * h {
            let mid = align_mid(rect.y0, rect.y1);
            (
                PixelRect::new(rect.x0, rect.y0, rect.x1, mid),
                PixelRect::new(rect.x0, mid, rect.x1, rect.y1),
            )
        } else {
            let mid = align_mid(rect.x0, rect.x1);
            (
                PixelRect::new(rect.x0, rect.y0, mid, rect.y1),
                PixelRect::new(mid, rect.y0, rect.x1, rect.y1),
            )
        };
        let pointer = self.window_to_world(self.last_window_pos);
        if rect_distance(b, pointer) < rect_distance(a, pointer) {
            (b, a)
        } else {
            (a, b)
        }
    }

    // --- events ---

    /// Feed one host event into the canvas. Positions are in window
    /// coordinates; the canvas translates them by the scroll origin.
    pub fn handle_event(&mut self, event: Event) {
        self.modifiers = event.modifiers;
        let ev = Event {
            pos: self.window_to_world(event.pos),
            ..event
        };
        match ev.kind {
            EventKind::Enter => {
                self.last_window_pos = event.pos;
                self.pointer_in_window = true;
                self.pick_current_item();
            }
            EventKind::Leave => {
                self.pointer_in_window = false;
                self.pick_current_item();
            }
            EventKind::Motion => {
                self.last_window_pos = event.pos;
                self.pointer_in_window = true;
                self.pick_current_item();
                self.emit_event(&ev);
            }
            EventKind::Scroll { .. } => {
                self.last_window_pos = event.pos;
                self.pick_current_item();
                self.emit_event(&ev);
            }
            EventKind::ButtonPress { button } => {
                self.last_window_pos = event.pos;
                self.pointer_in_window = true;
                self.pick_current_item();
                self.buttons.press(button, ev.pos);
                self.emit_event(&ev);
            }
            EventKind::ButtonRelease { button } => {
                // Deliver the release under the implicit grab, then drop
                // the button and repick so a deferred hover switch flushes.
                self.emit_event(&ev);
                self.buttons.release(button);
                self.last_window_pos = event.pos;
                self.pick_current_item();
            }
            EventKind::KeyPress { .. } | EventKind::KeyRelease { .. } => {
                self.emit_event(&ev);
            }
            EventKind::FocusIn | EventKind::FocusOut => {
                if let Some(focused) = self.focused {
                    self.emit_to(focused, &ev);
                }
            }
        }
    }

    /// Move keyboard focus, synthesizing `FocusOut`/`FocusIn`.
    pub fn set_focus(&mut self, id: Option<ItemId>) {
        if self.focused == id {
            return;
        }
        let pos = self.window_to_world(self.last_window_pos);
        if let Some(old) = self.focused.take() {
            let ev = Event {
                kind: EventKind::FocusOut,
                pos,
                modifiers: self.modifiers,
            };
            self.emit_to(old, &ev);
        }
        self.focused = id.filter(|&id| self.tree.is_alive(id));
        if let Some(new) = self.focused {
            let ev = Event {
                kind: EventKind::FocusIn,
                pos,
                modifiers: self.modifiers,
            };
            self.emit_to(new, &ev);
        }
    }

    /// Grab the pointer for an item. Fails while another item holds the
    /// grab; a re-grab by the holder updates the mask.
    ///
    /// On success the holder becomes the current item at once, without
    /// crossing synthesis; the next re-pick reconciles hover normally.
    pub fn grab(&mut self, id: ItemId, mask: EventMask) -> Result<(), GrabError> {
        self.grab.grab(id, mask)?;
        self.current = Some(id);
        self.new_current = Some(id);
        self.left_grab = false;
        Ok(())
    }

    /// Release the pointer grab held by `id`. No-op for non-holders.
    pub fn ungrab(&mut self, id: ItemId) {
        self.grab.ungrab(id);
    }

    /// Recompute which item is under the pointer and synthesize the
    /// enter/leave events the change implies.
    ///
    /// While a button is held the hover switch is deferred: the old item
    /// receives its leave immediately, but `current` (and therefore event
    /// delivery) only moves to the new item once all buttons are released.
    fn pick_current_item(&mut self) {
        if self.in_repick {
            return;
        }
        let button_down = self.buttons.any_down() && !self.gen_all_enter_events;

        self.new_current = if self.pointer_in_window {
            let world = self.window_to_world(self.last_window_pos);
            self.tree
                .point_distance(world, self.pick_tolerance)
                .map(|p| p.item)
        } else {
            None
        };

        if self.new_current == self.current && !self.left_grab {
            return;
        }

        self.in_repick = true;
        let pos = self.window_to_world(self.last_window_pos);

        if self.new_current != self.current
            && self.current.is_some()
            && !self.left_grab
        {
            let leave = Event {
                kind: EventKind::Leave,
                pos,
                modifiers: self.modifiers,
            };
            self.emit_event(&leave);
        }

        if self.new_current != self.current && button_down {
            // Implicit grab: hold the switch until the buttons go up.
            self.left_grab = true;
            self.in_repick = false;
            return;
        }

        self.left_grab = false;
        self.current = self.new_current;
        if self.current.is_some() {
            let enter = Event {
                kind: EventKind::Enter,
                pos,
                modifiers: self.modifiers,
            };
            self.emit_event(&enter);
        }
        self.in_repick = false;
    }

    /// Route an event to its target and bubble it toward the root.
    ///
    /// Key and focus events go to the focused item. Pointer events go to
    /// the grab holder when a grab is active and its mask admits the kind,
    /// unless the item under the pointer is a descendant of the holder (in
    /// which case normal bubbling reaches the holder anyway); with no grab
    /// they go to the item under the pointer.
    fn emit_event(&mut self, event: &Event) {
        let target = match event.kind {
            EventKind::KeyPress { .. }
            | EventKind::KeyRelease { .. }
            | EventKind::FocusIn
            | EventKind::FocusOut => self.focused,
            _ => match self.grab.holder() {
                Some(holder) if self.tree.is_alive(holder) => {
                    if !self.grab.mask_matches(&event.kind) {
                        // The grab swallows pointer events outside its mask.
                        return;
                    }
                    match self.current {
                        Some(c) if self.tree.is_ancestor(holder, c) => self.current,
                        _ => Some(holder),
                    }
                }
                Some(_) => {
                    self.grab.clear();
                    self.current
                }
                None => self.current,
            },
        };
        let Some(target) = target else {
            return;
        };

        let path = self.tree.ancestor_path(target);
        let mut ctx = EventCtx::new();
        {
            let tree = &mut self.tree;
            dispatch::run(
                &path,
                event,
                |id, ev, ctx: &mut EventCtx| {
                    if tree.deliver_event(id, ev, ctx) {
                        Outcome::Handled
                    } else {
                        Outcome::Continue
                    }
                },
                &mut ctx,
            );
        }
        self.apply_requests(ctx);
    }

    /// Deliver an event to one item without bubbling (focus notifications).
    fn emit_to(&mut self, target: ItemId, event: &Event) {
        let mut ctx = EventCtx::new();
        self.tree.deliver_event(target, event, &mut ctx);
        self.apply_requests(ctx);
    }

    fn apply_requests(&mut self, mut ctx: EventCtx) {
        for req in ctx.take_requests() {
            match req {
                Request::Update(id) => self.request_update(id),
                Request::Redraw(rect) => self.request_redraw(rect),
                // A handler has no way to recover from grab contention;
                // the request is simply dropped when another item holds it.
                Request::Grab(id, mask) => {
                    if self.grab.grab(id, mask).is_ok() {
                        self.current = Some(id);
                        self.new_current = Some(id);
                        self.left_grab = false;
                    }
                }
                Request::Ungrab(id) => self.grab.ungrab(id),
                Request::SetCursor(cursor) => self.cursor = cursor,
                Request::Destroy(id) => self.destroy_item(id),
            }
        }
    }
}

/// Round a world rectangle outward to whole pixels.
fn outward(r: Rect) -> PixelRect {
    PixelRect::new(floor_i32(r.x0), floor_i32(r.y0), ceil_i32(r.x1), ceil_i32(r.y1))
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "saturating cast; world coordinates beyond i32 clamp to the edge"
)]
fn floor_i32(x: f64) -> i32 {
    let t = x as i32;
    if f64::from(t) > x { t.saturating_sub(1) } else { t }
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "saturating cast; world coordinates beyond i32 clamp to the edge"
)]
fn ceil_i32(x: f64) -> i32 {
    let t = x as i32;
    if f64::from(t) < x { t.saturating_add(1) } else { t }
}

/// Tile-aligned midpoint of a span. The span is at least two tiles long
/// whenever a chunk is big enough to bisect.
fn align_mid(lo: i32, hi: i32) -> i32 {
    let mid = lo + (hi - lo) / 2;
    let aligned = mid.div_euclid(TILE_SIZE) * TILE_SIZE;
    debug_assert!(
        aligned > lo && aligned < hi,
        "bisected spans must be at least two tiles long"
    );
    aligned.clamp(lo + 1, hi - 1)
}

/// Chebyshev distance from a point to a pixel rectangle; zero inside.
fn rect_distance(r: PixelRect, p: Point) -> f64 {
    let dx = (f64::from(r.x0) - p.x).max(p.x - f64::from(r.x1)).max(0.0);
    let dy = (f64::from(r.y0) - p.y).max(p.y - f64::from(r.y1)).max(0.0);
    dx.max(dy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::boxed::Box;
    use alloc::rc::Rc;
    use alloc::vec::Vec;
    use core::cell::{Cell, RefCell};

    struct CountingScheduler(Rc<Cell<u32>>);
    impl Scheduler for CountingScheduler {
        fn schedule(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    struct ManualClock(Rc<Cell<u64>>);
    impl Clock for ManualClock {
        fn now_micros(&self) -> u64 {
            self.0.get()
        }
    }

    /// Records presented chunk rects; optionally advances the clock per
    /// chunk to simulate slow rendering.
    struct RecordingBackend {
        rects: Rc<RefCell<Vec<PixelRect>>>,
        clock: Rc<Cell<u64>>,
        cost_micros: u64,
    }
    impl Backend for RecordingBackend {
        fn present(&mut self, buf: &Buffer) {
            self.rects.borrow_mut().push(buf.rect());
            self.clock.set(self.clock.get() + self.cost_micros);
        }
    }

    /// Fixed axis-aligned rectangle leaf.
    struct RectItem {
        local: Rect,
        bbox: Rect,
    }
    impl RectItem {
        fn new(local: Rect) -> Self {
            Self {
                local,
                bbox: Rect::ZERO,
            }
        }
    }
    impl Drawable for RectItem {
        fn update(&mut self, world: Affine) -> Rect {
            // Axis-aligned transforms only in these tests.
            let p0 = world * Point::new(self.local.x0, self.local.y0);
            let p1 = world * Point::new(self.local.x1, self.local.y1);
            self.bbox = Rect::new(p0.x.min(p1.x), p0.y.min(p1.y), p0.x.max(p1.x), p0.y.max(p1.y));
            self.bbox
        }
        fn render(&mut self, buf: &mut Buffer) {
            buf.fill_rect(outward(self.bbox), [255, 255, 255, 255]);
        }
        fn point_distance(&self, p: Point) -> Option<f64> {
            let dx = (self.bbox.x0 - p.x).max(p.x - self.bbox.x1).max(0.0);
            let dy = (self.bbox.y0 - p.y).max(p.y - self.bbox.y1).max(0.0);
            Some(dx.max(dy))
        }
    }

    struct Harness {
        canvas: Canvas<CountingScheduler, ManualClock, RecordingBackend>,
        schedules: Rc<Cell<u32>>,
        presented: Rc<RefCell<Vec<PixelRect>>>,
    }

    fn harness(cost_micros: u64) -> Harness {
        let schedules = Rc::new(Cell::new(0));
        let clock = Rc::new(Cell::new(0));
        let presented = Rc::new(RefCell::new(Vec::new()));
        let canvas = Canvas::new(
            PaintConfig::new(),
            CountingScheduler(schedules.clone()),
            ManualClock(clock.clone()),
            RecordingBackend {
                rects: presented.clone(),
                clock: clock.clone(),
                cost_micros,
            },
        );
        Harness {
            canvas,
            schedules,
            presented,
        }
    }

    fn presented_area(presented: &RefCell<Vec<PixelRect>>) -> i64 {
        presented.borrow().iter().map(|r| r.area()).sum()
    }

    fn covers(presented: &RefCell<Vec<PixelRect>>, target: PixelRect) -> bool {
        // Every tile of `target` must be inside some presented rect.
        let mut y = target.y0;
        while y < target.y1 {
            let mut x = target.x0;
            while x < target.x1 {
                let covered = presented
                    .borrow()
                    .iter()
                    .any(|r| r.contains(x, y));
                if !covered {
                    return false;
                }
                x += TILE_SIZE;
            }
            y += TILE_SIZE;
        }
        true
    }

    #[test]
    fn first_paint_covers_viewport_once() {
        let mut h = harness(0);
        h.canvas.set_viewport(128, 128);
        h.canvas.map();
        assert_eq!(h.schedules.get(), 1);
        // A fresh tree has its first update pass still pending.
        assert_eq!(h.canvas.state(), CanvasState::UpdatePending);

        assert!(h.canvas.idle());
        assert_eq!(h.canvas.state(), CanvasState::Idle);
        let viewport = PixelRect::new(0, 0, 128, 128);
        assert!(covers(&h.presented, viewport));
        // Chunks do not overlap: total presented area equals the viewport.
        assert_eq!(presented_area(&h.presented), viewport.area());
    }

    #[test]
    fn remapping_a_settled_tree_schedules_paint_directly() {
        let mut h = harness(0);
        h.canvas.set_viewport(64, 64);
        h.canvas.map();
        assert!(h.canvas.idle());

        // Nothing left to update, so mapping again only needs a paint.
        h.canvas.unmap();
        h.canvas.map();
        assert_eq!(h.canvas.state(), CanvasState::PaintPending);
        assert!(h.canvas.idle());
        assert_eq!(h.canvas.state(), CanvasState::Idle);
    }

    #[test]
    fn update_damage_repaints_only_item_tiles() {
        let mut h = harness(0);
        h.canvas.set_viewport(256, 256);
        let root = h.canvas.root();
        let id = h
            .canvas
            .insert_leaf(root, Box::new(RectItem::new(Rect::new(10.0, 10.0, 30.0, 30.0))))
            .unwrap();
        h.canvas.map();
        assert!(h.canvas.idle());
        h.presented.borrow_mut().clear();

        // A content update repaints the item's tiles and nothing more.
        h.canvas.request_update(id);
        assert_eq!(h.canvas.state(), CanvasState::UpdatePending);
        assert!(h.canvas.idle());
        assert!(covers(&h.presented, PixelRect::new(0, 0, 32, 32)));
        assert!(
            presented_area(&h.presented) < 256 * 256,
            "a local update must not repaint the whole viewport"
        );
    }

    #[test]
    fn moved_item_damages_old_and_new_areas() {
        let mut h = harness(0);
        h.canvas.set_viewport(256, 256);
        let root = h.canvas.root();
        let id = h
            .canvas
            .insert_leaf(root, Box::new(RectItem::new(Rect::new(0.0, 0.0, 20.0, 20.0))))
            .unwrap();
        h.canvas.map();
        assert!(h.canvas.idle());
        h.presented.borrow_mut().clear();

        h.canvas
            .set_transform(id, Affine::translate((100.0, 100.0)));
        assert!(h.canvas.idle());
        assert!(covers(&h.presented, PixelRect::new(0, 0, 32, 32)), "vacated area");
        assert!(
            covers(&h.presented, PixelRect::new(96, 96, 128, 128)),
            "newly occupied area"
        );
    }

    #[test]
    fn offscreen_and_degenerate_redraws_schedule_nothing() {
        let mut h = harness(0);
        h.canvas.set_viewport(64, 64);
        h.canvas.map();
        assert!(h.canvas.idle());
        let before = h.schedules.get();

        h.canvas.request_redraw(Rect::new(500.0, 500.0, 600.0, 600.0));
        h.canvas.request_redraw(Rect::new(10.0, 10.0, 10.0, 40.0));
        h.canvas.request_redraw(Rect::new(-50.0, -50.0, -10.0, -10.0));
        assert_eq!(h.schedules.get(), before, "no-op redraws must not schedule");
        assert_eq!(h.canvas.state(), CanvasState::Idle);
    }

    #[test]
    fn redraw_requests_coalesce_into_one_schedule() {
        let mut h = harness(0);
        h.canvas.set_viewport(64, 64);
        h.canvas.map();
        assert!(h.canvas.idle());
        let before = h.schedules.get();

        h.canvas.request_redraw(Rect::new(0.0, 0.0, 10.0, 10.0));
        h.canvas.request_redraw(Rect::new(20.0, 20.0, 40.0, 40.0));
        h.canvas.request_redraw(Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(h.schedules.get(), before + 1, "one callback per work cycle");
    }

    #[test]
    fn interrupted_paint_resumes_without_repainting() {
        let mut h = harness(600);
        // Budget 1000us, 600us per chunk: two chunks per cycle, and a
        // viewport big enough to bisect into several chunks.
        h.canvas.set_viewport(512, 512);
        h.canvas.map();

        let mut idles = 0;
        while !h.canvas.idle() {
            idles += 1;
            assert!(idles < 100, "paint must terminate");
        }
        assert!(idles > 0, "paint should have been interrupted at least once");
        assert!(h.canvas.stats().interrupted > 0);

        let viewport = PixelRect::new(0, 0, 512, 512);
        assert!(covers(&h.presented, viewport));
        // Completed chunks are never presented twice across resumed cycles.
        assert_eq!(presented_area(&h.presented), viewport.area());
    }

    #[test]
    fn forced_redraw_bounds_staleness() {
        let mut h = harness(2_000);
        // Every chunk blows the whole budget, so every cycle interrupts.
        h.canvas.set_viewport(512, 512);
        h.canvas.forced_full_redraw(3);
        h.canvas.map();

        let mut idles = 0;
        while !h.canvas.idle() {
            idles += 1;
            assert!(idles < 1_000, "forced redraw must eventually complete");
        }
        let stats = h.canvas.stats();
        assert_eq!(stats.interrupted, 3, "limit of 3 interruptions before forcing");
        assert_eq!(stats.forced_complete, 1);
        assert!(covers(&h.presented, PixelRect::new(0, 0, 512, 512)));

        h.canvas.end_forced_full_redraws();
    }

    #[test]
    fn zero_interrupt_limit_forces_every_cycle() {
        let mut h = harness(2_000);
        h.canvas.set_viewport(512, 512);
        // Zero allowed interruptions: the very first cycle runs without a
        // deadline even though every chunk blows the budget.
        h.canvas.forced_full_redraw(0);
        h.canvas.map();

        assert!(h.canvas.idle());
        let stats = h.canvas.stats();
        assert_eq!(stats.interrupted, 0);
        assert_eq!(stats.forced_complete, 1);
        assert!(covers(&h.presented, PixelRect::new(0, 0, 512, 512)));
    }

    #[test]
    fn unmapped_canvas_updates_but_does_not_paint() {
        let mut h = harness(0);
        h.canvas.set_viewport(64, 64);
        let root = h.canvas.root();
        h.canvas
            .insert_leaf(root, Box::new(RectItem::new(Rect::new(0.0, 0.0, 8.0, 8.0))))
            .unwrap();
        assert!(h.canvas.idle());
        assert!(h.presented.borrow().is_empty(), "no paint while unmapped");
        assert!(!h.canvas.tree().update_pending(), "update pass still ran");

        h.canvas.map();
        assert!(h.canvas.idle());
        assert!(!h.presented.borrow().is_empty());
    }

    #[test]
    fn scroll_resets_tiles_and_repaints_exposure() {
        let mut h = harness(0);
        h.canvas.set_viewport(64, 64);
        h.canvas.map();
        assert!(h.canvas.idle());
        h.presented.borrow_mut().clear();

        h.canvas.scroll_to(64, 0);
        assert!(h.canvas.idle());
        // At minimum, the newly exposed column must repaint.
        assert!(covers(&h.presented, PixelRect::new(64, 0, 128, 64)));
    }

    #[test]
    fn outward_rounding_is_conservative() {
        assert_eq!(
            outward(Rect::new(0.2, 0.8, 9.1, 9.9)),
            PixelRect::new(0, 0, 10, 10)
        );
        assert_eq!(
            outward(Rect::new(-0.5, -3.0, 0.5, -1.2)),
            PixelRect::new(-1, -3, 1, -1)
        );
        assert_eq!(
            outward(Rect::new(4.0, 4.0, 8.0, 8.0)),
            PixelRect::new(4, 4, 8, 8),
            "exact integer edges must not inflate"
        );
    }

    #[test]
    fn align_mid_lands_on_tile_boundary() {
        let mid = align_mid(0, 64);
        assert_eq!(mid % TILE_SIZE, 0);
        assert!(mid > 0 && mid < 64);

        let mid = align_mid(-64, 64);
        assert_eq!(mid.rem_euclid(TILE_SIZE), 0);
    }

    // --- event routing ---

    type EventLog = Rc<RefCell<Vec<(&'static str, EventKind)>>>;

    /// Rectangle leaf that records every event it receives.
    struct TrackedItem {
        name: &'static str,
        local: Rect,
        bbox: Rect,
        log: EventLog,
        consume: EventMask,
        grab_on_press: Option<EventMask>,
        destroy_on_press: bool,
        cursor_on_enter: Option<Cursor>,
    }

    impl TrackedItem {
        fn new(name: &'static str, local: Rect, log: &EventLog) -> Self {
            Self {
                name,
                local,
                bbox: Rect::ZERO,
                log: log.clone(),
                consume: EventMask::empty(),
                grab_on_press: None,
                destroy_on_press: false,
                cursor_on_enter: None,
            }
        }
    }

    impl Drawable for TrackedItem {
        fn update(&mut self, world: Affine) -> Rect {
            let p0 = world * Point::new(self.local.x0, self.local.y0);
            let p1 = world * Point::new(self.local.x1, self.local.y1);
            self.bbox = Rect::new(
                p0.x.min(p1.x),
                p0.y.min(p1.y),
                p0.x.max(p1.x),
                p0.y.max(p1.y),
            );
            self.bbox
        }

        fn render(&mut self, buf: &mut Buffer) {
            buf.fill_rect(outward(self.bbox), [255, 255, 255, 255]);
        }

        fn point_distance(&self, p: Point) -> Option<f64> {
            let dx = (self.bbox.x0 - p.x).max(p.x - self.bbox.x1).max(0.0);
            let dy = (self.bbox.y0 - p.y).max(p.y - self.bbox.y1).max(0.0);
            Some(dx.max(dy))
        }

        fn handle_event(&mut self, event: &Event, ctx: &mut EventCtx) -> bool {
            self.log.borrow_mut().push((self.name, event.kind));
            match event.kind {
                EventKind::Enter => {
                    if let Some(cursor) = self.cursor_on_enter {
                        ctx.set_cursor(cursor);
                    }
                }
                EventKind::ButtonPress { .. } => {
                    if let Some(id) = ctx.item() {
                        if self.destroy_on_press {
                            ctx.destroy(id);
                        }
                        if let Some(mask) = self.grab_on_press {
                            ctx.grab(id, mask);
                        }
                    }
                }
                EventKind::ButtonRelease { .. } => {
                    if self.grab_on_press.is_some()
                        && let Some(id) = ctx.item()
                    {
                        ctx.ungrab(id);
                    }
                }
                _ => {}
            }
            self.consume.contains(event.kind.mask())
        }
    }

    fn event_log() -> EventLog {
        Rc::new(RefCell::new(Vec::new()))
    }

    fn motion(x: f64, y: f64) -> Event {
        Event::new(EventKind::Motion, Point::new(x, y))
    }

    fn press(x: f64, y: f64) -> Event {
        Event::new(EventKind::ButtonPress { button: 1 }, Point::new(x, y))
    }

    fn release(x: f64, y: f64) -> Event {
        Event::new(EventKind::ButtonRelease { button: 1 }, Point::new(x, y))
    }

    #[test]
    fn motion_synthesizes_enter_and_leave() {
        let mut h = harness(0);
        h.canvas.set_viewport(128, 128);
        let log = event_log();
        let root = h.canvas.root();
        h.canvas
            .insert_leaf(
                root,
                Box::new(TrackedItem::new("a", Rect::new(0.0, 0.0, 20.0, 20.0), &log)),
            )
            .unwrap();
        h.canvas.map();
        assert!(h.canvas.idle());

        h.canvas.handle_event(motion(10.0, 10.0));
        assert_eq!(
            *log.borrow(),
            [("a", EventKind::Enter), ("a", EventKind::Motion)]
        );
        assert!(h.canvas.current_item().is_some());

        log.borrow_mut().clear();
        h.canvas.handle_event(motion(100.0, 100.0));
        assert_eq!(*log.borrow(), [("a", EventKind::Leave)]);
        assert_eq!(h.canvas.current_item(), None);
    }

    #[test]
    fn pick_prefers_topmost_item() {
        let mut h = harness(0);
        h.canvas.set_viewport(128, 128);
        let log = event_log();
        let root = h.canvas.root();
        h.canvas
            .insert_leaf(
                root,
                Box::new(TrackedItem::new("under", Rect::new(0.0, 0.0, 40.0, 40.0), &log)),
            )
            .unwrap();
        h.canvas
            .insert_leaf(
                root,
                Box::new(TrackedItem::new("over", Rect::new(10.0, 10.0, 30.0, 30.0), &log)),
            )
            .unwrap();
        h.canvas.map();
        assert!(h.canvas.idle());

        // Both items are hit; the later sibling sits on top.
        h.canvas.handle_event(motion(20.0, 20.0));
        assert_eq!(
            *log.borrow(),
            [("over", EventKind::Enter), ("over", EventKind::Motion)]
        );
    }

    #[test]
    fn implicit_grab_defers_hover_switch() {
        let mut h = harness(0);
        h.canvas.set_viewport(128, 128);
        let log = event_log();
        let root = h.canvas.root();
        h.canvas
            .insert_leaf(
                root,
                Box::new(TrackedItem::new("a", Rect::new(0.0, 0.0, 20.0, 20.0), &log)),
            )
            .unwrap();
        h.canvas
            .insert_leaf(
                root,
                Box::new(TrackedItem::new("b", Rect::new(40.0, 0.0, 60.0, 20.0), &log)),
            )
            .unwrap();
        h.canvas.map();
        assert!(h.canvas.idle());

        h.canvas.handle_event(motion(10.0, 10.0));
        log.borrow_mut().clear();

        // Drag from a onto b: a gets its leave right away, but stays the
        // event target (and b's enter waits) until the button goes up.
        h.canvas.handle_event(press(10.0, 10.0));
        h.canvas.handle_event(motion(50.0, 10.0));
        h.canvas.handle_event(motion(55.0, 10.0));
        h.canvas.handle_event(release(55.0, 10.0));
        assert_eq!(
            *log.borrow(),
            [
                ("a", EventKind::ButtonPress { button: 1 }),
                ("a", EventKind::Leave),
                ("a", EventKind::Motion),
                ("a", EventKind::Motion),
                ("a", EventKind::ButtonRelease { button: 1 }),
                ("b", EventKind::Enter),
            ]
        );
        assert_eq!(h.canvas.current_item(), h.canvas.pick(Point::new(55.0, 10.0)).map(|p| p.item));
    }

    #[test]
    fn explicit_grab_redirects_and_filters() {
        let mut h = harness(0);
        h.canvas.set_viewport(128, 128);
        let log = event_log();
        let root = h.canvas.root();
        let a = h
            .canvas
            .insert_leaf(
                root,
                Box::new(TrackedItem::new("a", Rect::new(0.0, 0.0, 20.0, 20.0), &log)),
            )
            .unwrap();
        h.canvas.map();
        assert!(h.canvas.idle());
        h.canvas.handle_event(motion(10.0, 10.0));
        log.borrow_mut().clear();

        h.canvas.grab(a, EventMask::MOTION).unwrap();
        // The leave falls outside the mask and is swallowed; motion over
        // empty space redirects to the holder.
        h.canvas.handle_event(motion(100.0, 100.0));
        assert_eq!(*log.borrow(), [("a", EventKind::Motion)]);
        assert_eq!(h.canvas.current_item(), None);

        log.borrow_mut().clear();
        h.canvas.handle_event(press(100.0, 100.0));
        assert!(log.borrow().is_empty(), "press is not in the grab mask");

        h.canvas.ungrab(a);
        log.borrow_mut().clear();
        h.canvas.handle_event(motion(100.0, 100.0));
        assert!(log.borrow().is_empty(), "no grab, nothing under the pointer");
    }

    #[test]
    fn grab_contention_is_denied() {
        let mut h = harness(0);
        h.canvas.set_viewport(128, 128);
        let log = event_log();
        let root = h.canvas.root();
        let a = h
            .canvas
            .insert_leaf(
                root,
                Box::new(TrackedItem {
                    grab_on_press: Some(EventMask::POINTER),
                    ..TrackedItem::new("a", Rect::new(0.0, 0.0, 20.0, 20.0), &log)
                }),
            )
            .unwrap();
        let b = h
            .canvas
            .insert_leaf(
                root,
                Box::new(TrackedItem::new("b", Rect::new(40.0, 0.0, 60.0, 20.0), &log)),
            )
            .unwrap();
        h.canvas.map();
        assert!(h.canvas.idle());

        h.canvas.handle_event(press(10.0, 10.0));
        assert_eq!(h.canvas.grabbed_item(), Some(a));
        assert_eq!(h.canvas.grab(b, EventMask::MOTION), Err(GrabError::AlreadyGrabbed));

        // The holder releases its own grab from the release handler.
        h.canvas.handle_event(release(10.0, 10.0));
        assert_eq!(h.canvas.grabbed_item(), None);
    }

    #[test]
    fn grab_makes_the_holder_current() {
        let mut h = harness(0);
        h.canvas.set_viewport(128, 128);
        let log = event_log();
        let root = h.canvas.root();
        let a = h
            .canvas
            .insert_leaf(
                root,
                Box::new(TrackedItem::new("a", Rect::new(0.0, 0.0, 20.0, 20.0), &log)),
            )
            .unwrap();
        h.canvas.map();
        assert!(h.canvas.idle());

        // Pointer over empty canvas: nothing is current.
        h.canvas.handle_event(motion(100.0, 100.0));
        assert_eq!(h.canvas.current_item(), None);

        h.canvas.grab(a, EventMask::POINTER).unwrap();
        assert_eq!(h.canvas.current_item(), Some(a));

        // A release away from the item reaches the holder; the re-pick after
        // it finds nothing under the pointer and delivers the leave.
        log.borrow_mut().clear();
        h.canvas.handle_event(release(100.0, 100.0));
        assert_eq!(
            *log.borrow(),
            [
                ("a", EventKind::ButtonRelease { button: 1 }),
                ("a", EventKind::Leave),
            ]
        );
        assert_eq!(h.canvas.current_item(), None);
    }

    #[test]
    fn destroying_unrelated_item_keeps_interaction_state() {
        let mut h = harness(0);
        h.canvas.set_viewport(128, 128);
        let log = event_log();
        let root = h.canvas.root();
        let a = h
            .canvas
            .insert_leaf(
                root,
                Box::new(TrackedItem::new("a", Rect::new(0.0, 0.0, 20.0, 20.0), &log)),
            )
            .unwrap();
        let b = h
            .canvas
            .insert_leaf(
                root,
                Box::new(TrackedItem::new("b", Rect::new(40.0, 0.0, 60.0, 20.0), &log)),
            )
            .unwrap();
        h.canvas.map();
        assert!(h.canvas.idle());

        h.canvas.handle_event(motion(10.0, 10.0));
        h.canvas.set_focus(Some(a));
        h.canvas.grab(a, EventMask::POINTER).unwrap();

        // Destroying an item outside the hover/grab/focus set leaves all
        // three references in place.
        h.canvas.destroy_item(b);
        assert_eq!(h.canvas.current_item(), Some(a));
        assert_eq!(h.canvas.focused_item(), Some(a));
        assert_eq!(h.canvas.grabbed_item(), Some(a));
    }

    #[test]
    fn grab_by_group_keeps_descendants_receiving() {
        let mut h = harness(0);
        h.canvas.set_viewport(128, 128);
        let log = event_log();
        let root = h.canvas.root();
        let g = h.canvas.insert_group(root).unwrap();
        h.canvas
            .insert_leaf(
                g,
                Box::new(TrackedItem::new("a", Rect::new(0.0, 0.0, 20.0, 20.0), &log)),
            )
            .unwrap();
        h.canvas.map();
        assert!(h.canvas.idle());

        h.canvas.grab(g, EventMask::POINTER).unwrap();
        // Over a descendant of the holder, delivery is normal.
        h.canvas.handle_event(motion(10.0, 10.0));
        // Off the subtree, events retarget to the holder; the group has no
        // handler of its own, so they die on the way to the root.
        h.canvas.handle_event(motion(100.0, 100.0));
        assert_eq!(
            *log.borrow(),
            [
                ("a", EventKind::Enter),
                ("a", EventKind::Motion),
                ("a", EventKind::Leave),
            ]
        );
    }

    #[test]
    fn handler_destroy_clears_state_and_erases() {
        let mut h = harness(0);
        h.canvas.set_viewport(128, 128);
        let log = event_log();
        let root = h.canvas.root();
        let id = h
            .canvas
            .insert_leaf(
                root,
                Box::new(TrackedItem {
                    destroy_on_press: true,
                    ..TrackedItem::new("doomed", Rect::new(0.0, 0.0, 20.0, 20.0), &log)
                }),
            )
            .unwrap();
        h.canvas.map();
        assert!(h.canvas.idle());
        h.canvas.handle_event(motion(10.0, 10.0));
        h.presented.borrow_mut().clear();

        h.canvas.handle_event(press(10.0, 10.0));
        assert!(!h.canvas.tree().is_alive(id));
        assert_eq!(h.canvas.current_item(), None);

        // The vacated area gets one final repaint.
        assert!(h.canvas.idle());
        assert!(covers(&h.presented, PixelRect::new(0, 0, 32, 32)));

        // The matching release goes nowhere and must not panic.
        h.canvas.handle_event(release(10.0, 10.0));
    }

    #[test]
    fn focus_receives_keys_and_crossing_notifications() {
        let mut h = harness(0);
        h.canvas.set_viewport(128, 128);
        let log = event_log();
        let root = h.canvas.root();
        let a = h
            .canvas
            .insert_leaf(
                root,
                Box::new(TrackedItem::new("a", Rect::new(0.0, 0.0, 20.0, 20.0), &log)),
            )
            .unwrap();
        let b = h
            .canvas
            .insert_leaf(
                root,
                Box::new(TrackedItem::new("b", Rect::new(40.0, 0.0, 60.0, 20.0), &log)),
            )
            .unwrap();
        h.canvas.map();
        assert!(h.canvas.idle());

        h.canvas.set_focus(Some(a));
        h.canvas
            .handle_event(Event::new(EventKind::KeyPress { key: 42 }, Point::ZERO));
        h.canvas.set_focus(Some(b));
        h.canvas.set_focus(None);
        assert_eq!(
            *log.borrow(),
            [
                ("a", EventKind::FocusIn),
                ("a", EventKind::KeyPress { key: 42 }),
                ("a", EventKind::FocusOut),
                ("b", EventKind::FocusIn),
                ("b", EventKind::FocusOut),
            ]
        );
        assert_eq!(h.canvas.focused_item(), None);
    }

    #[test]
    fn scroll_repicks_under_stationary_pointer() {
        let mut h = harness(0);
        h.canvas.set_viewport(64, 64);
        let log = event_log();
        let root = h.canvas.root();
        h.canvas
            .insert_leaf(
                root,
                Box::new(TrackedItem::new("east", Rect::new(64.0, 0.0, 84.0, 20.0), &log)),
            )
            .unwrap();
        h.canvas.map();
        assert!(h.canvas.idle());

        // Pointer rests over empty canvas; scrolling slides the item under
        // it without any host motion event.
        h.canvas.handle_event(motion(10.0, 10.0));
        assert!(log.borrow().is_empty());
        h.canvas.scroll_to(64, 0);
        assert_eq!(*log.borrow(), [("east", EventKind::Enter)]);
        assert!(h.canvas.current_item().is_some());
    }

    #[test]
    fn cursor_request_applies_after_dispatch() {
        let mut h = harness(0);
        h.canvas.set_viewport(128, 128);
        let log = event_log();
        let root = h.canvas.root();
        h.canvas
            .insert_leaf(
                root,
                Box::new(TrackedItem {
                    cursor_on_enter: Some(Cursor::Pointer),
                    ..TrackedItem::new("a", Rect::new(0.0, 0.0, 20.0, 20.0), &log)
                }),
            )
            .unwrap();
        h.canvas.map();
        assert!(h.canvas.idle());
        assert_eq!(h.canvas.cursor(), Cursor::Default);

        h.canvas.handle_event(motion(10.0, 10.0));
        assert_eq!(h.canvas.cursor(), Cursor::Pointer);
    }
}
