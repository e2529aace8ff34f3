//! Rasterizer: executes a display list onto an RGBA canvas

use crate::assets::CardAssets;
use crate::fonts::{FontFace, FontResolver, GlyphBitmap};
use crate::rendering::layout::Rect;
use crate::rendering::paint::{DisplayList, ImageRef, PaintCommand};
use crate::Color;
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// Paint every command of `list` onto `canvas`, in order.
pub fn rasterize(list: &DisplayList, canvas: &mut RgbaImage, assets: &CardAssets, fonts: &FontResolver) {
    let mut text = TextPainter::new(fonts);
    let mut scaled: HashMap<(ImageRef, u32, u32), RgbaImage> = HashMap::new();

    for cmd in list.commands() {
        match cmd {
            PaintCommand::Text { x, y, px, color, text: s, .. } => {
                text.stamp(canvas, *x, *y, *px, *color, s);
            }
            PaintCommand::Image { source, rect } => {
                if rect.is_empty() {
                    continue;
                }
                let src = match source {
                    ImageRef::Sprite => assets.sprite(),
                    ImageRef::Glyph(track) => assets.glyph(*track).image().ok(),
                };
                let Some(src) = src else {
                    log::warn!("Skipping paste of unavailable {:?}", source);
                    continue;
                };
                paste(canvas, src, *source, rect, &mut scaled);
            }
        }
    }
}

fn paste(
    canvas: &mut RgbaImage,
    src: &RgbaImage,
    source: ImageRef,
    rect: &Rect,
    cache: &mut HashMap<(ImageRef, u32, u32), RgbaImage>,
) {
    let (x, y) = (rect.x as i64, rect.y as i64);
    if src.dimensions() == (rect.width, rect.height) {
        imageops::overlay(canvas, src, x, y);
        return;
    }
    let resized = cache
        .entry((source, rect.width, rect.height))
        .or_insert_with(|| imageops::resize(src, rect.width, rect.height, FilterType::CatmullRom));
    imageops::overlay(canvas, resized, x, y);
}

/// Caches faces per pixel size and glyph bitmaps per (size, char) for one render.
struct TextPainter<'a> {
    fonts: &'a FontResolver,
    faces: HashMap<u32, FontFace>,
    glyphs: HashMap<(u32, char), GlyphBitmap>,
}

impl<'a> TextPainter<'a> {
    fn new(fonts: &'a FontResolver) -> Self {
        Self {
            fonts,
            faces: HashMap::new(),
            glyphs: HashMap::new(),
        }
    }

    fn stamp(&mut self, canvas: &mut RgbaImage, x: i32, y: i32, px: u32, color: Color, text: &str) {
        let fonts = self.fonts;
        let face = self.faces.entry(px).or_insert_with(|| fonts.resolve(px));
        let baseline = y + face.ascent().round() as i32;
        let mut pen = x as f32;
        let mut prev: Option<char> = None;

        for ch in text.chars() {
            if let Some(p) = prev {
                pen += face.kern(p, ch);
            }
            let glyph = self.glyphs.entry((px, ch)).or_insert_with(|| face.glyph(ch));
            let gx = pen.round() as i32 + glyph.left;
            let gy = baseline + glyph.top;
            blit_coverage(canvas, glyph, gx, gy, color);
            pen += glyph.advance;
            prev = Some(ch);
        }
    }
}

fn blit_coverage(canvas: &mut RgbaImage, glyph: &GlyphBitmap, gx: i32, gy: i32, color: Color) {
    if glyph.width == 0 {
        return;
    }
    let (cw, ch) = (canvas.width() as i32, canvas.height() as i32);
    for (row, line) in glyph.coverage.chunks(glyph.width).enumerate() {
        let py = gy + row as i32;
        if py < 0 || py >= ch {
            continue;
        }
        for (col, &cov) in line.iter().enumerate() {
            let px = gx + col as i32;
            if px < 0 || px >= cw || cov == 0 {
                continue;
            }
            blend(canvas.get_pixel_mut(px as u32, py as u32), color, cov);
        }
    }
}

/// Source-over blend of `color` scaled by `coverage`.
fn blend(dst: &mut Rgba<u8>, color: Color, coverage: u8) {
    let sa = coverage as u32 * color.a as u32 / 255;
    if sa == 0 {
        return;
    }
    let inv = 255 - sa;
    let mix = |s: u8, d: u8| ((s as u32 * sa + d as u32 * inv + 127) / 255) as u8;
    dst.0[0] = mix(color.r, dst.0[0]);
    dst.0[1] = mix(color.g, dst.0[1]);
    dst.0[2] = mix(color.b, dst.0[2]);
    dst.0[3] = (sa + (dst.0[3] as u32 * inv + 127) / 255).min(255) as u8;
}

/// Content digest of a raster (dimensions + pixels), hex encoded.
pub fn raster_digest(img: &RgbaImage) -> String {
    let mut hasher = Sha256::new();
    hasher.update(img.width().to_le_bytes());
    hasher.update(img.height().to_le_bytes());
    hasher.update(img.as_raw());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::GlyphAsset;
    use crate::layout::DotTrack;
    use crate::rendering::paint::TextPass;

    fn assets_with_glyph() -> CardAssets {
        let dot = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 255, 255]));
        CardAssets::new(GlyphAsset::from_image(dot), GlyphAsset::missing("none"))
    }

    #[test]
    fn blend_opaque_replaces_and_transparent_keeps() {
        let mut p = Rgba([10, 20, 30, 255]);
        blend(&mut p, Color::rgb(200, 100, 50), 255);
        assert_eq!(p, Rgba([200, 100, 50, 255]));
        blend(&mut p, Color::rgba(0, 0, 0, 0), 255);
        assert_eq!(p, Rgba([200, 100, 50, 255]));
    }

    #[test]
    fn text_stamp_paints_inside_line_box() {
        let fonts = FontResolver::builtin();
        let mut canvas = RgbaImage::from_pixel(64, 32, Rgba([255, 255, 255, 255]));
        let mut list = DisplayList::new();
        list.push(PaintCommand::Text {
            x: 2,
            y: 3,
            px: 16,
            color: Color::BLACK,
            text: "I".into(),
            pass: TextPass::Fill,
        });
        rasterize(&list, &mut canvas, &assets_with_glyph(), &fonts);

        // builtin 'I' at unit 2: top bar spans columns 2..8 of the glyph on row 0
        assert_eq!(*canvas.get_pixel(2 + 2, 3), Rgba([0, 0, 0, 255]));
        assert_eq!(*canvas.get_pixel(0, 0), Rgba([255, 255, 255, 255]));
        // nothing below the baseline
        assert!((0..64).all(|x| *canvas.get_pixel(x, 3 + 14) == Rgba([255, 255, 255, 255])));
    }

    #[test]
    fn glyph_paste_is_resized_to_rect() {
        let fonts = FontResolver::builtin();
        let mut canvas = RgbaImage::from_pixel(20, 20, Rgba([255, 255, 255, 255]));
        let mut list = DisplayList::new();
        list.push(PaintCommand::Image {
            source: ImageRef::Glyph(DotTrack::Armor),
            rect: Rect { x: 5, y: 5, width: 8, height: 8 },
        });
        rasterize(&list, &mut canvas, &assets_with_glyph(), &fonts);
        assert_eq!(*canvas.get_pixel(8, 8), Rgba([0, 0, 255, 255]));
        assert_eq!(*canvas.get_pixel(4, 4), Rgba([255, 255, 255, 255]));
        assert_eq!(*canvas.get_pixel(13, 13), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn unavailable_source_is_skipped() {
        let fonts = FontResolver::builtin();
        let mut canvas = RgbaImage::from_pixel(8, 8, Rgba([1, 1, 1, 255]));
        let before = canvas.clone();
        let mut list = DisplayList::new();
        list.push(PaintCommand::Image {
            source: ImageRef::Glyph(DotTrack::Structure),
            rect: Rect { x: 0, y: 0, width: 4, height: 4 },
        });
        rasterize(&list, &mut canvas, &assets_with_glyph(), &fonts);
        assert_eq!(canvas, before);
    }

    #[test]
    fn digest_depends_on_pixels() {
        let a = RgbaImage::new(2, 2);
        let mut b = a.clone();
        assert_eq!(raster_digest(&a), raster_digest(&b));
        b.put_pixel(1, 1, Rgba([1, 0, 0, 0]));
        assert_ne!(raster_digest(&a), raster_digest(&b));
        assert_eq!(raster_digest(&a).len(), 64);
    }
}
