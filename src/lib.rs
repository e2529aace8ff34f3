//! Cardsmith
//!
//! A layout-driven card compositor. A [`LayoutConfig`] describes where the
//! outlined text labels, the two pip tracks and the sprite sit on a fixed
//! background; the [`Compositor`] turns it into a raster at any scale with
//! the same algorithm, so the interactive preview and the final export only
//! differ by the scale factor.
//!
//! # Example
//!
//! ```no_run
//! use cardsmith::{CardSession, StudioConfig, TextKey};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut session = CardSession::new(StudioConfig::default());
//! session.load_background(None)?;
//! session.set_text(TextKey::Name, "Atlas");
//! let preview = session.preview()?;
//! println!("preview {}x{}", preview.width(), preview.height());
//! let path = session.export()?;
//! println!("exported {}", path.display());
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub mod assets;
pub mod color;
pub mod error;
pub mod export;
pub mod fonts;
pub mod layout;
pub mod rendering;
pub mod session;
pub mod settings;

// Async render facade (worker thread + batch fan-out)
#[cfg(feature = "service")]
pub mod service;

pub use assets::{CardAssets, GlyphAsset};
pub use color::Color;
pub use error::{AssetKind, Error, Result};
pub use fonts::{FontFace, FontResolver, FontSource};
pub use layout::{DotField, DotTrack, FieldKey, LayoutConfig, Point, Size, SpriteField, TextField, TextKey};
pub use rendering::{Compositor, RenderWarning, Rendered};
pub use session::CardSession;
pub use settings::SettingsStore;

/// Full-resolution canvas: a 7x5 inch card at 300 DPI
pub const CANVAS_SIZE: Size = Size::new(2100, 1500);

/// Scale used for the interactive preview
pub const PREVIEW_SCALE: f32 = 0.3;

/// Resolution recorded in exported files
pub const EXPORT_DPI: u32 = 300;

/// Pixels moved by one nudge
pub const NUDGE_STEP: i32 = 5;

/// Studio-level configuration: canvas, scales and where assets live
///
/// The defaults mirror the layout of a card-making workspace:
/// `assets/` for the background, pip glyphs and sprite pictures,
/// `saved_cards/` for settings documents and `output/` for exports.
///
/// # Examples
///
/// ```
/// let cfg = cardsmith::StudioConfig::default();
/// assert_eq!(cfg.canvas.w, 2100);
/// assert_eq!(cfg.preview_scale, 0.3);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    /// Output canvas size in pixels
    pub canvas: Size,
    /// Scale factor of the preview render
    pub preview_scale: f32,
    /// DPI written into exported files
    pub export_dpi: u32,
    /// Background loaded when none is given explicitly
    pub default_background: PathBuf,
    /// Pip glyph for the armor track
    pub armor_dot: PathBuf,
    /// Pip glyph for the structure track
    pub structure_dot: PathBuf,
    /// Directory holding selectable sprite pictures
    pub sprite_dir: PathBuf,
    /// Where settings documents are saved
    pub settings_dir: PathBuf,
    /// Where final exports are written
    pub output_dir: PathBuf,
    /// Pixels per nudge
    pub nudge_step: i32,
    /// Font files to try before the built-in chain (empty => defaults)
    pub font_paths: Vec<PathBuf>,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            canvas: CANVAS_SIZE,
            preview_scale: PREVIEW_SCALE,
            export_dpi: EXPORT_DPI,
            default_background: PathBuf::from("assets/Battletech Card Blank 11-1-25 v1.png"),
            armor_dot: PathBuf::from("assets/armor_dot.png"),
            structure_dot: PathBuf::from("assets/structure_dot.png"),
            sprite_dir: PathBuf::from("assets/mech_pics"),
            settings_dir: PathBuf::from("saved_cards"),
            output_dir: PathBuf::from("output"),
            nudge_step: NUDGE_STEP,
            font_paths: Vec::new(),
        }
    }
}

impl StudioConfig {
    /// Read a JSON config; missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents).map_err(|e| Error::Settings(format!("{}: {}", path.display(), e)))
    }

    /// Font chain: configured paths first, then the default candidates.
    pub fn font_resolver(&self) -> FontResolver {
        let mut sources: Vec<FontSource> = self.font_paths.iter().cloned().map(FontSource::File).collect();
        sources.extend(FontResolver::default_candidates());
        FontResolver::with_candidates(sources)
    }

    /// Assets with lazily loaded pip glyphs and no background or sprite yet
    pub fn card_assets(&self) -> CardAssets {
        CardAssets::new(
            GlyphAsset::from_path(&self.armor_dot),
            GlyphAsset::from_path(&self.structure_dot),
        )
    }
}
