//! Packed RGBA colors (`0xRRGGBBAA`) and their `#RRGGBB[AA]` string form.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    #[error("color is empty")]
    Empty,
    #[error("color must have 6 or 8 hex digits, got {0}")]
    BadLength(usize),
    #[error("invalid hex digit in color {0:?}")]
    InvalidHex(String),
}

/// An RGBA color packed as `0xRRGGBBAA`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorRgba(pub u32);

impl ColorRgba {
    /// Opaque yellow, used when no color is given.
    pub const DEFAULT: Self = Self(0xFFFF00FF);

    pub fn from_components(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(((r as u32) << 24) | ((g as u32) << 16) | ((b as u32) << 8) | a as u32)
    }

    pub fn r(&self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub fn g(&self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub fn b(&self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub fn a(&self) -> u8 {
        self.0 as u8
    }

    /// Parse, falling back to `fallback` on any error.
    pub fn parse_or(s: &str, fallback: ColorRgba) -> ColorRgba {
        s.parse().unwrap_or(fallback)
    }
}

impl Default for ColorRgba {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Accepts `#RRGGBB` (alpha = 0xFF) or `#RRGGBBAA`; the `#` is optional.
impl FromStr for ColorRgba {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        if t.is_empty() {
            return Err(ColorError::Empty);
        }
        let hex = t.strip_prefix('#').unwrap_or(t);
        if hex.len() != 6 && hex.len() != 8 {
            return Err(ColorError::BadLength(hex.len()));
        }
        // from_str_radix tolerates a leading '+', so validate digits first.
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ColorError::InvalidHex(t.to_string()));
        }
        let byte = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| ColorError::InvalidHex(t.into()))
        };
        let a = if hex.len() == 8 { byte(6)? } else { 0xFF };
        Ok(Self::from_components(byte(0)?, byte(2)?, byte(4)?, a))
    }
}

/// Always the 8-digit form, e.g. `#FFFF00FF`.
impl fmt::Display for ColorRgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{:02X}{:02X}{:02X}{:02X}",
            self.r(),
            self.g(),
            self.b(),
            self.a()
        )
    }
}

impl Serialize for ColorRgba {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ColorRgba {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
