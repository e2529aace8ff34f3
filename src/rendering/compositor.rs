//! Fixed-order card compositing: background, text, sprite, pip grids

use crate::assets::CardAssets;
use crate::fonts::FontResolver;
use crate::layout::{DotTrack, LayoutConfig, Size};
use crate::rendering::layout::canvas_size;
use crate::rendering::paint::DisplayList;
use crate::rendering::{dots, raster, sprite, text};
use crate::{Error, Result, CANVAS_SIZE};
use image::imageops::{self, FilterType};
use image::RgbaImage;
use std::sync::Arc;

/// Recoverable problems hit while compositing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderWarning {
    /// The pip glyph for a track could not be loaded; that grid was skipped.
    GlyphMissing { track: DotTrack, reason: String },
}

impl std::fmt::Display for RenderWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderWarning::GlyphMissing { track, reason } => {
                write!(f, "{} grid skipped: {}", track.as_str(), reason)
            }
        }
    }
}

/// A finished raster plus whatever was skipped on the way
#[derive(Debug, Clone)]
pub struct Rendered {
    pub image: RgbaImage,
    pub scale: f32,
    pub warnings: Vec<RenderWarning>,
}

impl Rendered {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

#[derive(Debug, Clone)]
pub struct Compositor {
    fonts: Arc<FontResolver>,
    canvas: Size,
}

impl Compositor {
    pub fn new(fonts: Arc<FontResolver>) -> Self {
        Self::with_canvas(fonts, CANVAS_SIZE)
    }

    pub fn with_canvas(fonts: Arc<FontResolver>, canvas: Size) -> Self {
        Self { fonts, canvas }
    }

    pub fn canvas(&self) -> Size {
        self.canvas
    }

    pub fn fonts(&self) -> &FontResolver {
        &self.fonts
    }

    /// Build the paint commands for `config` at `scale` in draw order.
    pub fn display_list(&self, config: &LayoutConfig, assets: &CardAssets, scale: f32) -> (DisplayList, Vec<RenderWarning>) {
        let mut list = DisplayList::new();
        let mut warnings = Vec::new();

        for (_, field) in config.texts() {
            text::draw_text(&mut list, field, scale);
        }

        sprite::draw_sprite(&mut list, config.sprite(), assets.sprite(), scale);

        for track in DotTrack::ALL {
            let field = config.dots(track);
            if let Err(e) = dots::draw_grid(&mut list, track, field, assets.glyph(track), scale) {
                log::warn!("Dot render error ({}): {}", track.as_str(), e);
                warnings.push(RenderWarning::GlyphMissing {
                    track,
                    reason: e.to_string(),
                });
            }
        }

        (list, warnings)
    }

    /// Composite the card at `scale`. Fails only when no background is loaded.
    pub fn render(&self, config: &LayoutConfig, assets: &CardAssets, scale: f32) -> Result<Rendered> {
        let background = assets.background().ok_or(Error::NoBackground)?;

        let (w, h) = canvas_size(self.canvas, scale);
        let mut image = if background.dimensions() == (w, h) {
            background.clone()
        } else {
            imageops::resize(background, w, h, FilterType::CatmullRom)
        };

        let (list, warnings) = self.display_list(config, assets, scale);
        raster::rasterize(&list, &mut image, assets, &self.fonts);
        log::debug!("Rendered {}x{} at scale {} ({} commands)", w, h, scale, list.len());

        Ok(Rendered { image, scale, warnings })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::GlyphAsset;
    use crate::layout::TextKey;
    use crate::rendering::paint::{ImageRef, PaintCommand, TextPass};
    use image::Rgba;

    fn assets() -> CardAssets {
        let mut a = CardAssets::new(
            GlyphAsset::from_image(RgbaImage::from_pixel(6, 6, Rgba([0, 0, 255, 255]))),
            GlyphAsset::from_image(RgbaImage::from_pixel(6, 6, Rgba([0, 255, 0, 255]))),
        );
        a.set_background(RgbaImage::from_pixel(21, 15, Rgba([200, 200, 200, 255])), CANVAS_SIZE);
        a
    }

    fn compositor() -> Compositor {
        Compositor::new(Arc::new(FontResolver::builtin()))
    }

    #[test]
    fn draw_order_is_text_then_sprite_then_armor_then_structure() {
        let mut cfg = LayoutConfig::template();
        cfg.set_text(TextKey::Model, "AS7-D");
        cfg.set_text(TextKey::Pv, "52");
        cfg.dots_mut(DotTrack::Armor).set_count(2);
        cfg.dots_mut(DotTrack::Structure).set_count(1);
        let mut a = assets();
        a.set_sprite(Some(RgbaImage::new(4, 4)));

        let (list, warnings) = compositor().display_list(&cfg, &a, 1.0);
        assert!(warnings.is_empty());

        let kinds: Vec<&str> = list
            .commands()
            .iter()
            .map(|c| match c {
                PaintCommand::Text { .. } => "text",
                PaintCommand::Image { source: ImageRef::Sprite, .. } => "sprite",
                PaintCommand::Image { source: ImageRef::Glyph(DotTrack::Armor), .. } => "armor",
                PaintCommand::Image { source: ImageRef::Glyph(DotTrack::Structure), .. } => "structure",
            })
            .collect();
        let first_sprite = kinds.iter().position(|k| *k == "sprite").unwrap();
        assert!(kinds[..first_sprite].iter().all(|k| *k == "text"));
        assert_eq!(&kinds[first_sprite..], &["sprite", "armor", "armor", "structure"]);

        // model's fill comes before PV's outline
        let texts: Vec<_> = list
            .commands()
            .iter()
            .filter_map(|c| match c {
                PaintCommand::Text { text, pass, .. } => Some((text.as_str(), *pass)),
                _ => None,
            })
            .collect();
        let model_fill = texts.iter().position(|t| *t == ("AS7-D", TextPass::Fill)).unwrap();
        let pv_first = texts.iter().position(|t| t.0 == "52").unwrap();
        assert!(model_fill < pv_first);
    }

    #[test]
    fn missing_background_fails_without_canvas() {
        let a = CardAssets::new(GlyphAsset::missing("x"), GlyphAsset::missing("x"));
        let err = compositor().render(&LayoutConfig::template(), &a, 1.0).unwrap_err();
        assert!(matches!(err, Error::NoBackground));
    }

    #[test]
    fn missing_glyph_is_reported_and_rest_still_renders() {
        let mut cfg = LayoutConfig::template();
        cfg.set_text(TextKey::Name, "ATLAS");
        cfg.dots_mut(DotTrack::Armor).set_count(3);
        cfg.dots_mut(DotTrack::Structure).set_count(2);
        let mut a = CardAssets::new(
            GlyphAsset::missing("armor_dot.png not found"),
            GlyphAsset::from_image(RgbaImage::new(3, 3)),
        );
        a.set_background(RgbaImage::new(10, 10), CANVAS_SIZE);

        let out = compositor().render(&cfg, &a, 0.3).unwrap();
        assert_eq!(out.warnings.len(), 1);
        assert!(matches!(out.warnings[0], RenderWarning::GlyphMissing { track: DotTrack::Armor, .. }));

        let (list, _) = compositor().display_list(&cfg, &a, 0.3);
        assert_eq!(list.images(ImageRef::Glyph(DotTrack::Structure)).count(), 2);
        assert!(list.text_stamps(TextPass::Fill).count() == 1);
    }

    #[test]
    fn preview_canvas_is_scaled() {
        let out = compositor().render(&LayoutConfig::template(), &assets(), 0.3).unwrap();
        assert_eq!((out.width(), out.height()), (630, 450));
        let full = compositor().render(&LayoutConfig::template(), &assets(), 1.0).unwrap();
        assert_eq!((full.width(), full.height()), (2100, 1500));
    }

    #[test]
    fn render_does_not_mutate_config() {
        let mut cfg = LayoutConfig::template();
        cfg.set_text(TextKey::Name, "ATLAS");
        let before = cfg.clone();
        compositor().render(&cfg, &assets(), 0.3).unwrap();
        assert_eq!(cfg, before);
    }
}
