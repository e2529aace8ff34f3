#![allow(dead_code)]

use cardsmith::{CardAssets, GlyphAsset, CANVAS_SIZE};
use image::{Rgba, RgbaImage};

/// Assets built in memory: flat background, solid pip glyphs, striped sprite.
pub fn fixture_assets(with_sprite: bool) -> CardAssets {
    let mut assets = CardAssets::new(
        GlyphAsset::from_image(RgbaImage::from_pixel(12, 12, Rgba([30, 60, 200, 255]))),
        GlyphAsset::from_image(RgbaImage::from_pixel(12, 12, Rgba([200, 40, 40, 255]))),
    );
    assets.set_background(RgbaImage::from_pixel(210, 150, Rgba([236, 232, 220, 255])), CANVAS_SIZE);
    if with_sprite {
        let sprite = RgbaImage::from_fn(666, 888, |x, _| {
            if (x / 37) % 2 == 0 {
                Rgba([20, 20, 20, 255])
            } else {
                Rgba([0, 0, 0, 0])
            }
        });
        assets.set_sprite(Some(sprite));
    }
    assets
}
