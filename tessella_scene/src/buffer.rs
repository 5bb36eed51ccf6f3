// Copyright 2026 the Tessella Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! RGBA pixel buffer covering an integer world rectangle.

use alloc::{vec, vec::Vec};
use kurbo::Rect;
use tessella_tiles::PixelRect;

/// A dense RGBA8 pixel region positioned in world space.
///
/// The paint pass renders one `Buffer` per chunk and hands it to the
/// presentation backend. Drawing methods take world coordinates and clip to
/// the buffer's rectangle, so leaf renderers do not need to know where the
/// chunk boundaries fall.
#[derive(Clone)]
pub struct Buffer {
    rect: PixelRect,
    /// Row-major RGBA8, `rect.width() * rect.height() * 4` bytes.
    data: Vec<u8>,
}

impl core::fmt::Debug for Buffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Buffer")
            .field("rect", &self.rect)
            .field("bytes", &self.data.len())
            .finish_non_exhaustive()
    }
}

impl Buffer {
    /// Create a zeroed (transparent black) buffer covering `rect`.
    pub fn new(rect: PixelRect) -> Self {
        let len = (rect.width() as usize) * (rect.height() as usize) * 4;
        Self {
            rect,
            data: vec![0; len],
        }
    }

    /// The world rectangle this buffer covers.
    pub fn rect(&self) -> PixelRect {
        self.rect
    }

    /// Width in pixels.
    pub fn width(&self) -> i32 {
        self.rect.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> i32 {
        self.rect.height()
    }

    /// Raw RGBA8 bytes, row-major.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Whether a world-space rectangle overlaps this buffer. Empty rects
    /// never overlap anything.
    pub fn intersects_world(&self, r: Rect) -> bool {
        r.x1 > r.x0
            && r.y1 > r.y0
            && r.x1 > f64::from(self.rect.x0)
            && r.x0 < f64::from(self.rect.x1)
            && r.y1 > f64::from(self.rect.y0)
            && r.y0 < f64::from(self.rect.y1)
    }

    #[inline]
    fn offset(&self, x: i32, y: i32) -> usize {
        let lx = (x - self.rect.x0) as usize;
        let ly = (y - self.rect.y0) as usize;
        (ly * self.rect.width() as usize + lx) * 4
    }

    /// Write one pixel at world coordinates; out-of-buffer writes are
    /// silently dropped.
    pub fn put_pixel(&mut self, x: i32, y: i32, rgba: [u8; 4]) {
        if !self.rect.contains(x, y) {
            return;
        }
        let i = self.offset(x, y);
        self.data[i..i + 4].copy_from_slice(&rgba);
    }

    /// Read one pixel at world coordinates.
    pub fn pixel(&self, x: i32, y: i32) -> Option<[u8; 4]> {
        if !self.rect.contains(x, y) {
            return None;
        }
        let i = self.offset(x, y);
        let mut px = [0; 4];
        px.copy_from_slice(&self.data[i..i + 4]);
        Some(px)
    }

    /// Fill a world-space rectangle, clipped to the buffer.
    pub fn fill_rect(&mut self, rect: PixelRect, rgba: [u8; 4]) {
        let r = rect.intersect(self.rect);
        if r.is_empty() {
            return;
        }
        for y in r.y0..r.y1 {
            let start = self.offset(r.x0, y);
            let row = &mut self.data[start..start + (r.width() as usize) * 4];
            for px in row.chunks_exact_mut(4) {
                px.copy_from_slice(&rgba);
            }
        }
    }

    /// Fill the whole buffer with one color.
    pub fn clear(&mut self, rgba: [u8; 4]) {
        self.fill_rect(self.rect, rgba);
    }
}
