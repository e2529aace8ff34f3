//! External raster assets: background, sprite and pip glyphs

use crate::error::AssetKind;
use crate::layout::{DotTrack, Size};
use crate::{Error, Result};
use image::imageops::FilterType;
use image::RgbaImage;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Decode any supported bitmap and normalize it to RGBA8.
pub fn load_rgba(path: &Path, kind: AssetKind) -> Result<RgbaImage> {
    let img = image::open(path).map_err(|e| Error::AssetMissing {
        kind,
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    Ok(img.to_rgba8())
}

/// A pip glyph, decoded on first use.
///
/// A grid with zero pips never asks for its glyph, so a missing file only
/// matters once a count is set.
#[derive(Debug)]
pub struct GlyphAsset {
    path: Option<PathBuf>,
    image: OnceLock<std::result::Result<RgbaImage, String>>,
}

impl GlyphAsset {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            image: OnceLock::new(),
        }
    }

    pub fn from_image(image: RgbaImage) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(Ok(image));
        Self { path: None, image: cell }
    }

    /// A glyph that always fails to load
    pub fn missing(reason: impl Into<String>) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(Err(reason.into()));
        Self { path: None, image: cell }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.image.get(), Some(Ok(_)))
    }

    pub fn image(&self) -> Result<&RgbaImage> {
        let loaded = self.image.get_or_init(|| match &self.path {
            Some(p) => load_rgba(p, AssetKind::Glyph).map_err(|e| e.to_string()),
            None => Err("no glyph source".to_string()),
        });
        loaded.as_ref().map_err(|reason| Error::AssetMissing {
            kind: AssetKind::Glyph,
            path: self
                .path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            reason: reason.clone(),
        })
    }
}

/// Everything the compositor reads besides the layout
#[derive(Debug)]
pub struct CardAssets {
    background: Option<RgbaImage>,
    sprite: Option<RgbaImage>,
    armor: GlyphAsset,
    structure: GlyphAsset,
}

impl CardAssets {
    pub fn new(armor: GlyphAsset, structure: GlyphAsset) -> Self {
        Self {
            background: None,
            sprite: None,
            armor,
            structure,
        }
    }

    /// Load the background and stretch it to the canvas size.
    pub fn load_background(&mut self, path: &Path, canvas: Size) -> Result<()> {
        let img = load_rgba(path, AssetKind::Background)?;
        self.set_background(img, canvas);
        log::info!("Loaded background {}", path.display());
        Ok(())
    }

    pub fn set_background(&mut self, img: RgbaImage, canvas: Size) {
        let img = if img.dimensions() == (canvas.w, canvas.h) {
            img
        } else {
            image::imageops::resize(&img, canvas.w, canvas.h, FilterType::CatmullRom)
        };
        self.background = Some(img);
    }

    pub fn background(&self) -> Option<&RgbaImage> {
        self.background.as_ref()
    }

    /// Load a sprite and return its natural size.
    pub fn load_sprite(&mut self, path: &Path) -> Result<Size> {
        let img = load_rgba(path, AssetKind::Sprite)?;
        log::info!("Loaded sprite {} ({}x{})", path.display(), img.width(), img.height());
        Ok(self.set_sprite(Some(img)))
    }

    pub fn set_sprite(&mut self, img: Option<RgbaImage>) -> Size {
        let natural = img
            .as_ref()
            .map(|i| Size::new(i.width(), i.height()))
            .unwrap_or_default();
        self.sprite = img;
        natural
    }

    pub fn sprite(&self) -> Option<&RgbaImage> {
        self.sprite.as_ref()
    }

    pub fn glyph(&self, track: DotTrack) -> &GlyphAsset {
        match track {
            DotTrack::Armor => &self.armor,
            DotTrack::Structure => &self.structure,
        }
    }
}
