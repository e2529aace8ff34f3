//! Scaled geometry shared by every renderer
//!
//! All positions and lengths go through the same rounding rule at every
//! scale, so preview and export place elements identically up to rounding.

use crate::layout::{Point, Size};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Scale a canvas coordinate to target pixels (round half away from zero).
pub fn scale_coord(v: i64, scale: f32) -> i32 {
    (v as f64 * scale as f64).round() as i32
}

/// Scale a length; never negative.
pub fn scale_len(v: u32, scale: f32) -> u32 {
    (v as f64 * scale as f64).round().max(0.0) as u32
}

pub fn scale_point(p: Point, scale: f32) -> (i32, i32) {
    (scale_coord(p.x as i64, scale), scale_coord(p.y as i64, scale))
}

/// Size of the working raster at `scale`, at least 1x1.
pub fn canvas_size(canvas: Size, scale: f32) -> (u32, u32) {
    (scale_len(canvas.w, scale).max(1), scale_len(canvas.h, scale).max(1))
}

/// Placement of a `w`x`h` box anchored at `p`, all scaled.
pub fn scale_rect(p: Point, size: Size, scale: f32) -> Rect {
    let (x, y) = scale_point(p, scale);
    Rect {
        x,
        y,
        width: scale_len(size.w, scale),
        height: scale_len(size.h, scale),
    }
}
