//! Font resolution with an ordered candidate chain
//!
//! Faces are parsed with fontdue. Each candidate is parsed at most once and
//! the parsed face is reused for every size; glyphs are always rasterized at
//! the size the caller asks for. When no candidate loads, a tiny built-in
//! bitmap face keeps text rendering total.

use fontdue::{Font, FontSettings};
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

/// Where a candidate face comes from
#[derive(Debug, Clone)]
pub enum FontSource {
    File(PathBuf),
    Memory(Arc<Vec<u8>>),
}

impl FontSource {
    fn load(&self) -> Option<Font> {
        let data = match self {
            FontSource::File(path) => match std::fs::read(path) {
                Ok(d) => d,
                Err(e) => {
                    log::debug!("Font candidate {} unavailable: {}", path.display(), e);
                    return None;
                }
            },
            FontSource::Memory(bytes) => bytes.as_ref().clone(),
        };
        match Font::from_bytes(data, FontSettings::default()) {
            Ok(font) => Some(font),
            Err(e) => {
                log::debug!("Font candidate {:?} failed to parse: {}", self.label(), e);
                None
            }
        }
    }

    fn label(&self) -> String {
        match self {
            FontSource::File(p) => p.display().to_string(),
            FontSource::Memory(b) => format!("<memory: {} bytes>", b.len()),
        }
    }
}

struct Candidate {
    source: FontSource,
    parsed: OnceLock<Option<Arc<Font>>>,
}

/// Resolves a renderable face for a pixel size. Never fails.
pub struct FontResolver {
    candidates: Vec<Candidate>,
}

impl std::fmt::Debug for FontResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontResolver")
            .field(
                "candidates",
                &self.candidates.iter().map(|c| c.source.label()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Default for FontResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl FontResolver {
    /// Resolver over the default candidate chain
    pub fn new() -> Self {
        Self::with_candidates(Self::default_candidates())
    }

    pub fn with_candidates(sources: Vec<FontSource>) -> Self {
        Self {
            candidates: sources
                .into_iter()
                .map(|source| Candidate {
                    source,
                    parsed: OnceLock::new(),
                })
                .collect(),
        }
    }

    /// Resolver that always returns the built-in face
    pub fn builtin() -> Self {
        Self::with_candidates(Vec::new())
    }

    /// Bundled face first, then a host-specific bold sans, then a generic one.
    pub fn default_candidates() -> Vec<FontSource> {
        let mut paths: Vec<&str> = vec!["fonts/Steiner.otf"];

        #[cfg(target_os = "windows")]
        paths.extend_from_slice(&["C:\\Windows\\Fonts\\STEINER.OTF", "C:\\Windows\\Fonts\\arialbd.ttf"]);

        #[cfg(target_os = "macos")]
        paths.extend_from_slice(&[
            "/Library/Fonts/Arial Bold.ttf",
            "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
        ]);

        #[cfg(target_os = "linux")]
        paths.extend_from_slice(&[
            "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
            "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
            "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
        ]);

        paths.into_iter().map(|p| FontSource::File(PathBuf::from(p))).collect()
    }

    /// Return the first candidate that loads, at `point_size` pixels.
    pub fn resolve(&self, point_size: u32) -> FontFace {
        let px = point_size.max(1);
        for candidate in &self.candidates {
            let parsed = candidate
                .parsed
                .get_or_init(|| candidate.source.load().map(Arc::new));
            if let Some(font) = parsed {
                return FontFace::Outline {
                    font: Arc::clone(font),
                    px: px as f32,
                };
            }
        }
        log::debug!("No font candidate loaded; using built-in face at {}px", px);
        FontFace::builtin(px)
    }
}

/// A face bound to one pixel size
#[derive(Clone)]
pub enum FontFace {
    Outline { font: Arc<Font>, px: f32 },
    Builtin { unit: u32 },
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FontFace::Outline { px, .. } => write!(f, "FontFace::Outline({px}px)"),
            FontFace::Builtin { unit } => write!(f, "FontFace::Builtin(unit {unit})"),
        }
    }
}

/// Coverage bitmap of one glyph, positioned relative to the pen on the baseline
#[derive(Debug, Clone)]
pub struct GlyphBitmap {
    pub left: i32,
    /// Offset of the bitmap's top row from the baseline (negative is up)
    pub top: i32,
    pub width: usize,
    pub height: usize,
    pub advance: f32,
    pub coverage: Vec<u8>,
}

const BUILTIN_COLS: u32 = 5;
const BUILTIN_ROWS: u32 = 7;

impl FontFace {
    fn builtin(px: u32) -> Self {
        let unit = ((px as f32) / 8.0).round().max(1.0) as u32;
        FontFace::Builtin { unit }
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self, FontFace::Builtin { .. })
    }

    /// Distance from the top of the line to the baseline
    pub fn ascent(&self) -> f32 {
        match self {
            FontFace::Outline { font, px } => font
                .horizontal_line_metrics(*px)
                .map(|m| m.ascent)
                .unwrap_or(*px),
            FontFace::Builtin { unit } => (BUILTIN_ROWS * unit) as f32,
        }
    }

    pub fn kern(&self, left: char, right: char) -> f32 {
        match self {
            FontFace::Outline { font, px } => font.horizontal_kern(left, right, *px).unwrap_or(0.0),
            FontFace::Builtin { .. } => 0.0,
        }
    }

    pub fn glyph(&self, ch: char) -> GlyphBitmap {
        match self {
            FontFace::Outline { font, px } => {
                let (m, coverage) = font.rasterize(ch, *px);
                GlyphBitmap {
                    left: m.xmin,
                    top: -(m.ymin + m.height as i32),
                    width: m.width,
                    height: m.height,
                    advance: m.advance_width,
                    coverage,
                }
            }
            FontFace::Builtin { unit } => builtin_glyph(ch, *unit),
        }
    }
}

fn builtin_glyph(ch: char, unit: u32) -> GlyphBitmap {
    let advance = ((BUILTIN_COLS + 1) * unit) as f32;
    if ch == ' ' {
        return GlyphBitmap {
            left: 0,
            top: 0,
            width: 0,
            height: 0,
            advance,
            coverage: Vec::new(),
        };
    }
    let rows = builtin_rows(ch.to_ascii_uppercase());
    let width = (BUILTIN_COLS * unit) as usize;
    let height = (BUILTIN_ROWS * unit) as usize;
    let mut coverage = vec![0u8; width * height];
    for (y, row) in coverage.chunks_mut(width).enumerate() {
        let bits = rows[y / unit as usize];
        for (x, px) in row.iter_mut().enumerate() {
            let col = x / unit as usize;
            if bits & (1 << (BUILTIN_COLS as usize - 1 - col)) != 0 {
                *px = 255;
            }
        }
    }
    GlyphBitmap {
        left: 0,
        top: -(height as i32),
        width,
        height,
        advance,
        coverage,
    }
}

#[rustfmt::skip]
fn builtin_rows(ch: char) -> [u8; 7] {
    match ch {
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'B' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110],
        'C' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        'D' => [0b11100, 0b10010, 0b10001, 0b10001, 0b10001, 0b10010, 0b11100],
        'E' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        'F' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
        'G' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111],
        'H' => [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'I' => [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'J' => [0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100],
        'K' => [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
        'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'M' => [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
        'N' => [0b10001, 0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001],
        'O' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'P' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        'Q' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101],
        'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'S' => [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
        'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        'U' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'V' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100],
        'W' => [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010],
        'X' => [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001],
        'Y' => [0b10001, 0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100],
        'Z' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111],
        '-' => [0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000],
        '.' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b01100],
        ',' => [0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b00100, 0b01000],
        '/' => [0b00000, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b00000],
        ':' => [0b00000, 0b01100, 0b01100, 0b00000, 0b01100, 0b01100, 0b00000],
        '\'' => [0b01100, 0b00100, 0b01000, 0b00000, 0b00000, 0b00000, 0b00000],
        '"' => [0b01010, 0b01010, 0b01010, 0b00000, 0b00000, 0b00000, 0b00000],
        '!' => [0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00000, 0b00100],
        '?' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b00000, 0b00100],
        '+' => [0b00000, 0b00100, 0b00100, 0b11111, 0b00100, 0b00100, 0b00000],
        '*' => [0b00000, 0b00100, 0b10101, 0b01110, 0b10101, 0b00100, 0b00000],
        '#' => [0b01010, 0b01010, 0b11111, 0b01010, 0b11111, 0b01010, 0b01010],
        '(' => [0b00010, 0b00100, 0b01000, 0b01000, 0b01000, 0b00100, 0b00010],
        ')' => [0b01000, 0b00100, 0b00010, 0b00010, 0b00010, 0b00100, 0b01000],
        _ => [0b11111, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11111],
    }
}
