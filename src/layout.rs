//! Card layout data model
//!
//! A `LayoutConfig` holds every field of the card template: nine outlined
//! text labels, the two pip tracks ("Armor" and "Structure") and the sprite
//! placement. The set of keys is fixed by the template; callers mutate the
//! values and hand the whole config to the compositor.

use crate::{Color, Error, Result, CANVAS_SIZE};
use serde::{Deserialize, Serialize};

/// Key of the sprite field in persisted documents
pub const SPRITE_KEY: &str = "MechImage";

/// Largest accepted length (font size, pip size, spacing, sprite side)
pub const MAX_LENGTH: u32 = 4 * CANVAS_SIZE.w;

/// Largest accepted distance of a position from the canvas origin
pub const MAX_COORD: i32 = 4 * CANVAS_SIZE.w as i32;

/// Largest accepted pip count and row width
pub const MAX_DOT_COUNT: u32 = 10_000;

/// Text label keys, in draw order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextKey {
    Model,
    Name,
    Mv,
    Sz,
    Tmm,
    Short,
    Medium,
    Long,
    Pv,
}

impl TextKey {
    pub const ALL: [TextKey; 9] = [
        TextKey::Model,
        TextKey::Name,
        TextKey::Mv,
        TextKey::Sz,
        TextKey::Tmm,
        TextKey::Short,
        TextKey::Medium,
        TextKey::Long,
        TextKey::Pv,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TextKey::Model => "model",
            TextKey::Name => "name",
            TextKey::Mv => "MV",
            TextKey::Sz => "SZ",
            TextKey::Tmm => "TMM",
            TextKey::Short => "short",
            TextKey::Medium => "medium",
            TextKey::Long => "long",
            TextKey::Pv => "PV",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == key)
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// The two pip tracks, in draw order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DotTrack {
    Armor,
    Structure,
}

impl DotTrack {
    pub const ALL: [DotTrack; 2] = [DotTrack::Armor, DotTrack::Structure];

    pub fn as_str(self) -> &'static str {
        match self {
            DotTrack::Armor => "Armor",
            DotTrack::Structure => "Structure",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == key)
    }
}

/// Any field key of the template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKey {
    Text(TextKey),
    Dots(DotTrack),
    Sprite,
}

impl FieldKey {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldKey::Text(k) => k.as_str(),
            FieldKey::Dots(t) => t.as_str(),
            FieldKey::Sprite => SPRITE_KEY,
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        if key == SPRITE_KEY {
            return Some(FieldKey::Sprite);
        }
        TextKey::from_key(key)
            .map(FieldKey::Text)
            .or_else(|| DotTrack::from_key(key).map(FieldKey::Dots))
    }
}

/// Integer position in canvas pixels. Persisted as `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "[i32; 2]", into = "[i32; 2]")]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<[i32; 2]> for Point {
    fn from([x, y]: [i32; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point> for [i32; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

/// Width/height in canvas pixels. Persisted as `[w, h]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "[u32; 2]", into = "[u32; 2]")]
pub struct Size {
    pub w: u32,
    pub h: u32,
}

impl Size {
    pub const fn new(w: u32, h: u32) -> Self {
        Self { w, h }
    }
}

impl From<[u32; 2]> for Size {
    fn from([w, h]: [u32; 2]) -> Self {
        Self { w, h }
    }
}

impl From<Size> for [u32; 2] {
    fn from(s: Size) -> Self {
        [s.w, s.h]
    }
}

/// An outlined text label
#[derive(Debug, Clone, PartialEq)]
pub struct TextField {
    pub position: Point,
    pub font_size: u32,
    pub fill: Color,
    pub outline: Option<Color>,
    pub outline_width: u32,
    text: String,
}

impl TextField {
    pub fn new(position: Point, font_size: u32, fill: Color, outline: Option<Color>, outline_width: u32) -> Self {
        Self {
            position,
            font_size,
            fill,
            outline,
            outline_width,
            text: String::new(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Commit new text. Labels are always stored upper-cased.
    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_uppercase();
    }

    /// Whether an outline pass will be drawn for this field
    pub fn has_outline(&self) -> bool {
        self.outline.is_some() && self.outline_width > 0
    }
}

/// A counter drawn as a wrapping grid of identical pips
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DotField {
    pub count: u32,
    pub position: Point,
    pub dot_size: u32,
    pub spacing: u32,
    pub per_row: u32,
    pub row_gap: u32,
}

impl DotField {
    /// Set the pip count; negative input clamps to zero.
    pub fn set_count(&mut self, count: i64) {
        self.count = count.clamp(0, u32::MAX as i64) as u32;
    }

    /// Number of rows the grid occupies
    pub fn rows(&self) -> u32 {
        if self.per_row == 0 {
            return 0;
        }
        self.count.div_ceil(self.per_row)
    }

    /// (row, column) of pip `index`
    pub fn cell(&self, index: u32) -> (u32, u32) {
        let per_row = self.per_row.max(1);
        (index / per_row, index % per_row)
    }
}

/// Placement of the sprite image
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteField {
    pub source_path: Option<String>,
    pub position: Point,
    pub size: Size,
    pub aspect_ratio: f64,
}

impl SpriteField {
    /// Record a newly loaded source. The aspect ratio follows its natural size.
    pub fn set_source(&mut self, path: impl Into<String>, natural_width: u32, natural_height: u32) {
        self.source_path = Some(path.into());
        if natural_height != 0 {
            self.aspect_ratio = natural_width as f64 / natural_height as f64;
        }
    }

    pub fn clear_source(&mut self) {
        self.source_path = None;
    }

    /// Width drives; with the lock on the height is derived from the ratio.
    pub fn set_width(&mut self, width: u32, keep_aspect: bool) {
        if keep_aspect && self.aspect_ratio > 0.0 {
            self.size.h = (width as f64 / self.aspect_ratio).round().min(MAX_LENGTH as f64) as u32;
        }
        self.size.w = width;
    }

    /// Height drives; with the lock on the width is derived from the ratio.
    pub fn set_height(&mut self, height: u32, keep_aspect: bool) {
        if keep_aspect && self.aspect_ratio > 0.0 {
            self.size.w = (height as f64 * self.aspect_ratio).round().min(MAX_LENGTH as f64) as u32;
        }
        self.size.h = height;
    }
}

/// Borrowed view of one template field, tagged by kind
#[derive(Debug, Clone, Copy)]
pub enum FieldRef<'a> {
    Text(&'a TextField),
    Dots(&'a DotField),
    Sprite(&'a SpriteField),
}

/// The full card layout
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    // Kept in `TextKey::ALL` order so `TextKey::index` addresses it directly.
    texts: Vec<(TextKey, TextField)>,
    armor: DotField,
    structure: DotField,
    sprite: SpriteField,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self::template()
    }
}

impl LayoutConfig {
    /// Built-in card template defaults
    pub fn template() -> Self {
        let gold = Color::rgb(0xef, 0xe3, 0x1c);
        let red = Color::rgb(0x93, 0x00, 0x00);
        let white = Color::WHITE;

        let text = |key: TextKey| -> TextField {
            let (x, y, size, fill, outline, width) = match key {
                TextKey::Model => (80, 40, 120, gold, red, 6),
                TextKey::Name => (80, 145, 180, red, gold, 6),
                TextKey::Mv => (1020, 480, 120, red, white, 4),
                TextKey::Sz => (260, 480, 120, red, white, 4),
                TextKey::Tmm => (670, 480, 120, red, white, 4),
                TextKey::Short => (305, 740, 120, red, white, 4),
                TextKey::Medium => (625, 740, 120, red, white, 4),
                TextKey::Long => (950, 740, 120, red, white, 4),
                TextKey::Pv => (1785, 10, 140, red, gold, 4),
            };
            TextField::new(Point::new(x, y), size, fill, Some(outline), width)
        };

        let track = |y: i32| DotField {
            count: 0,
            position: Point::new(180, y),
            dot_size: 60,
            spacing: 61,
            per_row: 13,
            row_gap: 5,
        };

        Self {
            texts: TextKey::ALL.into_iter().map(|k| (k, text(k))).collect(),
            armor: track(945),
            structure: track(1095),
            sprite: SpriteField {
                source_path: None,
                position: Point::new(1280, 110),
                size: Size::new(666, 888),
                aspect_ratio: 666.0 / 888.0,
            },
        }
    }

    pub fn text(&self, key: TextKey) -> &TextField {
        &self.texts[key.index()].1
    }

    pub fn text_mut(&mut self, key: TextKey) -> &mut TextField {
        &mut self.texts[key.index()].1
    }

    /// Text fields in draw order
    pub fn texts(&self) -> impl Iterator<Item = (TextKey, &TextField)> {
        self.texts.iter().map(|(k, f)| (*k, f))
    }

    pub fn set_text(&mut self, key: TextKey, text: &str) {
        self.text_mut(key).set_text(text);
    }

    pub fn dots(&self, track: DotTrack) -> &DotField {
        match track {
            DotTrack::Armor => &self.armor,
            DotTrack::Structure => &self.structure,
        }
    }

    pub fn dots_mut(&mut self, track: DotTrack) -> &mut DotField {
        match track {
            DotTrack::Armor => &mut self.armor,
            DotTrack::Structure => &mut self.structure,
        }
    }

    pub fn sprite(&self) -> &SpriteField {
        &self.sprite
    }

    pub fn sprite_mut(&mut self) -> &mut SpriteField {
        &mut self.sprite
    }

    /// Every field as (key, variant), in template order
    pub fn entries(&self) -> Vec<(&'static str, FieldRef<'_>)> {
        let mut out: Vec<_> = self
            .texts
            .iter()
            .map(|(k, f)| (k.as_str(), FieldRef::Text(f)))
            .collect();
        for track in DotTrack::ALL {
            out.push((track.as_str(), FieldRef::Dots(self.dots(track))));
        }
        out.push((SPRITE_KEY, FieldRef::Sprite(&self.sprite)));
        out
    }

    pub fn position(&self, key: FieldKey) -> Point {
        match key {
            FieldKey::Text(k) => self.text(k).position,
            FieldKey::Dots(t) => self.dots(t).position,
            FieldKey::Sprite => self.sprite.position,
        }
    }

    pub fn position_mut(&mut self, key: FieldKey) -> &mut Point {
        match key {
            FieldKey::Text(k) => &mut self.text_mut(k).position,
            FieldKey::Dots(t) => &mut self.dots_mut(t).position,
            FieldKey::Sprite => &mut self.sprite.position,
        }
    }

    /// Move a field by a pixel offset
    pub fn nudge(&mut self, key: FieldKey, dx: i32, dy: i32) {
        let p = self.position_mut(key);
        p.x = p.x.saturating_add(dx);
        p.y = p.y.saturating_add(dy);
    }

    /// Check the numeric invariants of every field.
    ///
    /// Lengths must be positive and at most `MAX_LENGTH`, positions within
    /// `MAX_COORD` of the origin, pip counts and rows at most `MAX_DOT_COUNT`.
    pub fn validate(&self) -> Result<()> {
        for (key, field) in self.texts() {
            let name = key.as_str();
            check_position(name, field.position)?;
            check_length(name, "size", field.font_size, 1)?;
            check_length(name, "outline_width", field.outline_width, 0)?;
        }
        for track in DotTrack::ALL {
            let d = self.dots(track);
            let name = track.as_str();
            check_position(name, d.position)?;
            check_length(name, "size", d.dot_size, 1)?;
            check_length(name, "spacing", d.spacing, 1)?;
            check_length(name, "row_gap", d.row_gap, 0)?;
            if d.per_row == 0 || d.per_row > MAX_DOT_COUNT {
                return Err(Error::Settings(format!("{name}: per_row must be in 1..={MAX_DOT_COUNT}")));
            }
            if d.count > MAX_DOT_COUNT {
                return Err(Error::Settings(format!("{name}: count must be at most {MAX_DOT_COUNT}")));
            }
        }
        let sprite = &self.sprite;
        check_position(SPRITE_KEY, sprite.position)?;
        check_length(SPRITE_KEY, "width", sprite.size.w, 0)?;
        check_length(SPRITE_KEY, "height", sprite.size.h, 0)?;
        let ratio = sprite.aspect_ratio;
        let bound = MAX_LENGTH as f64;
        if !ratio.is_finite() || ratio < 1.0 / bound || ratio > bound {
            return Err(Error::Settings(format!("{SPRITE_KEY}: aspect_ratio out of range")));
        }
        Ok(())
    }
}

fn check_length(field: &str, what: &str, value: u32, min: u32) -> Result<()> {
    if value < min || value > MAX_LENGTH {
        return Err(Error::Settings(format!("{field}: {what} must be in {min}..={MAX_LENGTH}")));
    }
    Ok(())
}

fn check_position(field: &str, p: Point) -> Result<()> {
    if p.x.unsigned_abs() > MAX_COORD as u32 || p.y.unsigned_abs() > MAX_COORD as u32 {
        return Err(Error::Settings(format!("{field}: pos must be within {MAX_COORD} of the origin")));
    }
    Ok(())
}

/// Parse integer input from an editing surface. Anything non-numeric yields
/// `None`, and callers keep the last valid value.
pub fn parse_numeric(input: &str) -> Option<i64> {
    input.trim().parse::<i64>().ok()
}
