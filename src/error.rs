//! Error types for the card compositor

use thiserror::Error;

/// Result type alias for compositor operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading assets, rendering or persisting a card
#[derive(Error, Debug)]
pub enum Error {
    /// A required asset (background, sprite, glyph) could not be loaded
    #[error("Missing {kind} asset at {path}: {reason}")]
    AssetMissing {
        kind: AssetKind,
        path: String,
        reason: String,
    },

    /// The settings document could not be parsed or has the wrong shape
    #[error("Invalid settings document: {0}")]
    Settings(String),

    /// Render or export was requested before a background was loaded
    #[error("No background loaded")]
    NoBackground,

    /// Image decoding or processing failed
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to encode the export raster
    #[error("Encoding failed: {0}")]
    Encode(String),

    /// Render worker went away or another internal failure
    #[error("{0}")]
    Other(String),
}

/// Kinds of external raster assets consumed by the compositor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Background,
    Sprite,
    Glyph,
}

impl std::fmt::Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AssetKind::Background => "background",
            AssetKind::Sprite => "sprite",
            AssetKind::Glyph => "glyph",
        };
        f.write_str(s)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Settings(err.to_string())
    }
}

impl From<png::EncodingError> for Error {
    fn from(err: png::EncodingError) -> Self {
        Error::Encode(err.to_string())
    }
}
