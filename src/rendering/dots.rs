//! Wrapping pip grids
//!
//! Pip `i` sits at row `i / per_row`, column `i % per_row`. A single row is
//! just a grid whose `per_row` is at least the count.

use crate::assets::GlyphAsset;
use crate::layout::{DotField, DotTrack};
use crate::rendering::layout::{scale_coord, scale_len, Rect};
use crate::rendering::paint::{DisplayList, ImageRef, PaintCommand};
use crate::Result;

/// Target rect of pip `index` at `scale`
pub fn dot_rect(field: &DotField, index: u32, scale: f32) -> Rect {
    let (row, col) = field.cell(index);
    let x = field.position.x as i64 + col as i64 * field.spacing as i64;
    let y = field.position.y as i64 + row as i64 * (field.dot_size as i64 + field.row_gap as i64);
    let side = scale_len(field.dot_size, scale);
    Rect {
        x: scale_coord(x, scale),
        y: scale_coord(y, scale),
        width: side,
        height: side,
    }
}

/// Emit one paste per pip. The glyph is only touched when there is something
/// to draw; a glyph that fails to load is returned as an error and nothing is
/// emitted for this grid.
pub fn draw_grid(
    list: &mut DisplayList,
    track: DotTrack,
    field: &DotField,
    glyph: &GlyphAsset,
    scale: f32,
) -> Result<usize> {
    if field.count == 0 {
        return Ok(0);
    }
    glyph.image()?;

    for i in 0..field.count {
        list.push(PaintCommand::Image {
            source: ImageRef::Glyph(track),
            rect: dot_rect(field, i, scale),
        });
    }
    Ok(field.count as usize)
}
