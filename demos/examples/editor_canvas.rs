// Copyright 2026 the Tessella Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A headless editor canvas driven from a plain event loop.
//!
//! This example shows the full cycle:
//! - build a scene of colored rectangles under groups,
//! - map the canvas and drain scheduled idle work,
//! - feed pointer events (hover, click-to-recolor, drag via implicit grab),
//! - scroll the viewport and watch only the exposed tiles repaint.
//!
//! The backend just logs which world-space chunks were presented; a real
//! host would blit each buffer at `chunk - scroll_origin`.
//!
//! Run:
//! - `cargo run -p tessella_demos --example editor_canvas`

use std::cell::Cell;
use std::rc::Rc;

use kurbo::{Affine, Point, Rect};
use tessella_canvas::{
    Buffer, Canvas, Drawable, Event, EventCtx, EventKind, PaintConfig, StdClock,
};

/// One idle flag the main loop polls; a real host would post to its queue.
#[derive(Clone, Default)]
struct LoopScheduler(Rc<Cell<bool>>);

impl tessella_canvas::Scheduler for LoopScheduler {
    fn schedule(&mut self) {
        self.0.set(true);
    }
}

/// Logs each presented chunk instead of blitting it.
#[derive(Default)]
struct LogBackend {
    chunks: u32,
}

impl tessella_canvas::Backend for LogBackend {
    fn present(&mut self, buf: &Buffer) {
        self.chunks += 1;
        println!("  present {:?} ({} bytes)", buf.rect(), buf.data().len());
    }
}

/// A solid rectangle that cycles its color when clicked.
struct ColorRect {
    local: Rect,
    bbox: Rect,
    rgba: [u8; 4],
}

impl ColorRect {
    fn new(local: Rect, rgba: [u8; 4]) -> Self {
        Self {
            local,
            bbox: Rect::ZERO,
            rgba,
        }
    }
}

impl Drawable for ColorRect {
    fn update(&mut self, world: Affine) -> Rect {
        self.bbox = world.transform_rect_bbox(self.local);
        self.bbox
    }

    fn render(&mut self, buf: &mut Buffer) {
        let r = self.bbox;
        let mut y = r.y0.floor() as i32;
        while f64::from(y) < r.y1 {
            let mut x = r.x0.floor() as i32;
            while f64::from(x) < r.x1 {
                buf.put_pixel(x, y, self.rgba);
                x += 1;
            }
            y += 1;
        }
    }

    fn point_distance(&self, p: Point) -> Option<f64> {
        let dx = (self.bbox.x0 - p.x).max(p.x - self.bbox.x1).max(0.0);
        let dy = (self.bbox.y0 - p.y).max(p.y - self.bbox.y1).max(0.0);
        Some((dx * dx + dy * dy).sqrt())
    }

    fn handle_event(&mut self, event: &Event, ctx: &mut EventCtx) -> bool {
        match event.kind {
            EventKind::ButtonPress { button: 1 } => {
                self.rgba.rotate_left(1);
                ctx.request_redraw(self.bbox);
                true
            }
            EventKind::Enter | EventKind::Leave => {
                println!("  {:?} on item {:?}", event.kind, ctx.item());
                true
            }
            _ => false,
        }
    }
}

fn drain(label: &str, canvas: &mut Canvas<LoopScheduler, StdClock, LogBackend>, flag: &LoopScheduler) {
    println!("{label}:");
    while flag.0.replace(false) {
        canvas.idle();
    }
}

fn main() {
    let scheduler = LoopScheduler::default();
    let mut canvas = Canvas::new(
        PaintConfig::new(),
        scheduler.clone(),
        StdClock::new(),
        LogBackend::default(),
    );
    canvas.set_viewport(256, 256);

    let root = canvas.root();
    let layer = canvas.insert_group(root).expect("root is alive");
    let red = canvas
        .insert_leaf(
            layer,
            Box::new(ColorRect::new(
                Rect::new(16.0, 16.0, 96.0, 96.0),
                [220, 60, 60, 255],
            )),
        )
        .expect("layer is alive");
    canvas
        .insert_leaf(
            layer,
            Box::new(ColorRect::new(
                Rect::new(64.0, 64.0, 160.0, 160.0),
                [60, 60, 220, 255],
            )),
        )
        .expect("layer is alive");

    canvas.map();
    drain("initial paint", &mut canvas, &scheduler);

    // Hover, then click the red rectangle: enter/leave crossings are
    // synthesized and only its tiles repaint.
    canvas.handle_event(Event::new(EventKind::Motion, Point::new(40.0, 40.0)));
    canvas.handle_event(Event::new(
        EventKind::ButtonPress { button: 1 },
        Point::new(40.0, 40.0),
    ));
    canvas.handle_event(Event::new(
        EventKind::ButtonRelease { button: 1 },
        Point::new(40.0, 40.0),
    ));
    drain("after click", &mut canvas, &scheduler);

    // Move the whole layer; the update pass damages old and new areas.
    canvas.set_transform(layer, Affine::translate((32.0, 0.0)));
    drain("after layer move", &mut canvas, &scheduler);

    // Scroll east: retained tiles stay clean, exposure repaints.
    canvas.scroll_to(64, 0);
    drain("after scroll", &mut canvas, &scheduler);

    canvas.destroy_item(red);
    drain("after destroy", &mut canvas, &scheduler);

    println!("stats: {:?}", canvas.stats());
}
