//! Plain RGBA colors parsed from `#rrggbb` / `#rrggbbaa` strings

use crate::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse an optional color where an empty (or all-whitespace) string means "none".
    pub fn parse_optional(s: &str) -> Result<Option<Self>> {
        if s.trim().is_empty() {
            return Ok(None);
        }
        s.parse().map(Some)
    }
}

impl FromStr for Color {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let digits = s.trim().trim_start_matches('#');
        if digits.len() != 6 && digits.len() != 8 {
            return Err(Error::Settings(format!("invalid color: {s}")));
        }
        let bytes =
            hex::decode(digits).map_err(|_| Error::Settings(format!("invalid color: {s}")))?;
        let a = bytes.get(3).copied().unwrap_or(255);
        Ok(Color::rgba(bytes[0], bytes[1], bytes[2], a))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{}", hex::encode([self.r, self.g, self.b]))
        } else {
            write!(f, "#{}", hex::encode([self.r, self.g, self.b, self.a]))
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_with_and_without_hash() {
        assert_eq!("#efe31c".parse::<Color>().unwrap(), Color::rgb(0xef, 0xe3, 0x1c));
        assert_eq!("930000".parse::<Color>().unwrap(), Color::rgb(0x93, 0, 0));
        assert_eq!("#FFFFFF80".parse::<Color>().unwrap(), Color::rgba(255, 255, 255, 0x80));
    }

    #[test]
    fn rejects_garbage() {
        assert!("#12345".parse::<Color>().is_err());
        assert!("#zzzzzz".parse::<Color>().is_err());
    }

    #[test]
    fn empty_optional_is_none() {
        assert_eq!(Color::parse_optional("").unwrap(), None);
        assert_eq!(Color::parse_optional("  ").unwrap(), None);
        assert_eq!(Color::parse_optional("#ffffff").unwrap(), Some(Color::WHITE));
    }

    #[test]
    fn display_is_lowercase_hex() {
        assert_eq!(Color::rgb(0xEF, 0xE3, 0x1C).to_string(), "#efe31c");
        assert_eq!(Color::rgba(1, 2, 3, 4).to_string(), "#01020304");
    }
}
