//! Editing session: the state an interactive editor drives between renders
//!
//! Setters taking raw `&str` input are fail-soft: anything that does not
//! parse (or violates a field constraint) leaves the last valid value in
//! place and returns `false`.

use crate::assets::CardAssets;
use crate::export::write_export;
use crate::fonts::FontResolver;
use crate::layout::{parse_numeric, DotTrack, FieldKey, LayoutConfig, TextKey, MAX_COORD, MAX_DOT_COUNT, MAX_LENGTH};
use crate::rendering::{Compositor, Rendered};
use crate::settings::SettingsStore;
use crate::{AssetKind, Color, Error, Result, StudioConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Name of the "no sprite" choice
pub const NO_SPRITE: &str = "None";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nudge {
    Left,
    Right,
    Up,
    Down,
}

impl Nudge {
    fn offset(self, step: i32) -> (i32, i32) {
        match self {
            Nudge::Left => (-step, 0),
            Nudge::Right => (step, 0),
            Nudge::Up => (0, -step),
            Nudge::Down => (0, step),
        }
    }
}

/// Editable parameters of a pip grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DotParam {
    Size,
    Spacing,
    PerRow,
    RowGap,
}

pub struct CardSession {
    studio: StudioConfig,
    config: LayoutConfig,
    assets: CardAssets,
    compositor: Compositor,
    keep_aspect: bool,
}

impl CardSession {
    pub fn new(studio: StudioConfig) -> Self {
        let fonts = Arc::new(studio.font_resolver());
        let assets = studio.card_assets();
        Self::with_parts(studio, assets, fonts)
    }

    /// Build a session around pre-made assets and fonts.
    pub fn with_parts(studio: StudioConfig, assets: CardAssets, fonts: Arc<FontResolver>) -> Self {
        let compositor = Compositor::with_canvas(fonts, studio.canvas);
        Self {
            studio,
            config: LayoutConfig::template(),
            assets,
            compositor,
            keep_aspect: true,
        }
    }

    pub fn studio(&self) -> &StudioConfig {
        &self.studio
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut LayoutConfig {
        &mut self.config
    }

    pub fn assets(&self) -> &CardAssets {
        &self.assets
    }

    pub fn assets_mut(&mut self) -> &mut CardAssets {
        &mut self.assets
    }

    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    /// Hand the layout and assets over, e.g. to a batch render.
    pub fn into_parts(self) -> (LayoutConfig, CardAssets) {
        (self.config, self.assets)
    }

    pub fn keep_aspect(&self) -> bool {
        self.keep_aspect
    }

    pub fn set_keep_aspect(&mut self, on: bool) {
        self.keep_aspect = on;
    }

    /// Load `path`, or the configured default background.
    pub fn load_background(&mut self, path: Option<&Path>) -> Result<()> {
        let path = path.unwrap_or(&self.studio.default_background).to_path_buf();
        self.assets.load_background(&path, self.studio.canvas)
    }

    /// Sprite choices: `"None"` followed by the PNG files in the sprite directory.
    pub fn sprite_choices(&self) -> Vec<String> {
        let mut names: Vec<String> = match std::fs::read_dir(&self.studio.sprite_dir) {
            Ok(entries) => entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .filter(|n| n.to_ascii_lowercase().ends_with(".png"))
                .collect(),
            Err(e) => {
                log::debug!("No sprite directory {}: {}", self.studio.sprite_dir.display(), e);
                Vec::new()
            }
        };
        names.sort();
        names.insert(0, NO_SPRITE.to_string());
        names
    }

    /// Pick a sprite by file name from the sprite directory. `None` or
    /// `"None"` clears it. A file that fails to load leaves the current
    /// sprite untouched.
    pub fn select_sprite(&mut self, name: Option<&str>) -> Result<()> {
        let name = match name.map(str::trim) {
            None | Some("") | Some(NO_SPRITE) => {
                self.assets.set_sprite(None);
                self.config.sprite_mut().clear_source();
                return Ok(());
            }
            Some(n) => n,
        };
        let path = self.studio.sprite_dir.join(name);
        let natural = self.assets.load_sprite(&path)?;
        self.config
            .sprite_mut()
            .set_source(path.display().to_string(), natural.w, natural.h);
        Ok(())
    }

    pub fn set_text(&mut self, key: TextKey, text: &str) {
        self.config.set_text(key, text);
    }

    /// Negative counts clamp to zero, large ones to `MAX_DOT_COUNT`.
    pub fn set_dot_count(&mut self, track: DotTrack, count: i64) {
        self.config
            .dots_mut(track)
            .set_count(count.min(MAX_DOT_COUNT as i64));
    }

    /// Negative input clamps to zero; counts above `MAX_DOT_COUNT` are rejected.
    pub fn set_dot_count_input(&mut self, track: DotTrack, input: &str) -> bool {
        match parse_numeric(input).filter(|&n| n <= MAX_DOT_COUNT as i64) {
            Some(n) => {
                self.set_dot_count(track, n);
                true
            }
            None => false,
        }
    }

    pub fn set_position_input(&mut self, key: FieldKey, axis: Axis, input: &str) -> bool {
        let Some(v) = parse_numeric(input)
            .filter(|n| n.unsigned_abs() <= MAX_COORD as u64)
            .and_then(|n| i32::try_from(n).ok())
        else {
            return false;
        };
        let p = self.config.position_mut(key);
        match axis {
            Axis::X => p.x = v,
            Axis::Y => p.y = v,
        }
        true
    }

    pub fn set_font_size_input(&mut self, key: TextKey, input: &str) -> bool {
        match positive(input) {
            Some(v) => {
                self.config.text_mut(key).font_size = v;
                true
            }
            None => false,
        }
    }

    pub fn set_outline_width_input(&mut self, key: TextKey, input: &str) -> bool {
        match non_negative(input) {
            Some(v) => {
                self.config.text_mut(key).outline_width = v;
                true
            }
            None => false,
        }
    }

    pub fn set_fill_input(&mut self, key: TextKey, input: &str) -> bool {
        match input.trim().parse::<Color>() {
            Ok(c) => {
                self.config.text_mut(key).fill = c;
                true
            }
            Err(_) => false,
        }
    }

    /// Blank input removes the outline.
    pub fn set_outline_input(&mut self, key: TextKey, input: &str) -> bool {
        match Color::parse_optional(input) {
            Ok(c) => {
                self.config.text_mut(key).outline = c;
                true
            }
            Err(_) => false,
        }
    }

    pub fn set_dot_param_input(&mut self, track: DotTrack, param: DotParam, input: &str) -> bool {
        let parsed = match param {
            DotParam::RowGap => non_negative(input),
            DotParam::PerRow => parse_numeric(input)
                .and_then(|n| u32::try_from(n).ok())
                .filter(|n| (1..=MAX_DOT_COUNT).contains(n)),
            _ => positive(input),
        };
        let Some(v) = parsed else {
            return false;
        };
        let d = self.config.dots_mut(track);
        match param {
            DotParam::Size => d.dot_size = v,
            DotParam::Spacing => d.spacing = v,
            DotParam::PerRow => d.per_row = v,
            DotParam::RowGap => d.row_gap = v,
        }
        true
    }

    pub fn set_sprite_width(&mut self, width: u32) {
        self.config.sprite_mut().set_width(width, self.keep_aspect);
    }

    pub fn set_sprite_height(&mut self, height: u32) {
        self.config.sprite_mut().set_height(height, self.keep_aspect);
    }

    pub fn set_sprite_width_input(&mut self, input: &str) -> bool {
        let Some(w) = non_negative(input) else {
            return false;
        };
        self.set_sprite_width(w);
        true
    }

    pub fn set_sprite_height_input(&mut self, input: &str) -> bool {
        let Some(h) = non_negative(input) else {
            return false;
        };
        self.set_sprite_height(h);
        true
    }

    /// Move a field one step in `dir`.
    pub fn nudge(&mut self, key: FieldKey, dir: Nudge) {
        let (dx, dy) = dir.offset(self.studio.nudge_step);
        self.config.nudge(key, dx, dy);
    }

    pub fn render(&self, scale: f32) -> Result<Rendered> {
        self.compositor.render(&self.config, &self.assets, scale)
    }

    pub fn preview(&self) -> Result<Rendered> {
        self.render(self.studio.preview_scale)
    }

    /// Render at full scale and write the PNG into the output directory.
    pub fn export(&self) -> Result<PathBuf> {
        let rendered = self.render(1.0)?;
        for w in &rendered.warnings {
            log::warn!("Export: {}", w);
        }
        write_export(
            &rendered.image,
            &self.studio.output_dir,
            self.config.text(TextKey::Name).text(),
            self.studio.export_dpi,
        )
    }

    pub fn save_settings(&self) -> Result<PathBuf> {
        SettingsStore::save_to_dir(&self.config, &self.studio.settings_dir)
    }

    /// Merge a settings file, then reload the sprite it names so the aspect
    /// ratio matches the actual picture.
    pub fn load_settings(&mut self, path: &Path) -> Result<()> {
        SettingsStore::load_from_path(&mut self.config, path)?;

        let Some(source) = self.config.sprite().source_path.clone() else {
            self.assets.set_sprite(None);
            return Ok(());
        };
        let file_name = Path::new(&source)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match self.select_sprite(Some(&file_name)) {
            Ok(()) => {}
            Err(e @ Error::AssetMissing { kind: AssetKind::Sprite, .. }) => {
                log::warn!("Sprite from settings not available: {}", e);
                self.assets.set_sprite(None);
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }
}

/// A length in `0..=MAX_LENGTH`
fn non_negative(input: &str) -> Option<u32> {
    parse_numeric(input)
        .and_then(|n| u32::try_from(n).ok())
        .filter(|&n| n <= MAX_LENGTH)
}

fn positive(input: &str) -> Option<u32> {
    non_negative(input).filter(|&n| n > 0)
}
