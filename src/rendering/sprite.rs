//! Sprite placement

use crate::layout::SpriteField;
use crate::rendering::layout::scale_rect;
use crate::rendering::paint::{DisplayList, ImageRef, PaintCommand};
use image::RgbaImage;

/// Emit the sprite paste, or nothing when no source is loaded.
pub fn draw_sprite(list: &mut DisplayList, field: &SpriteField, source: Option<&RgbaImage>, scale: f32) -> bool {
    if source.is_none() {
        return false;
    }
    list.push(PaintCommand::Image {
        source: ImageRef::Sprite,
        rect: scale_rect(field.position, field.size, scale),
    });
    true
}
