//! Hex colour parsing and formatting.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{PaletteError, Result};

/// An 8-bit sRGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Canonical lowercase `#rrggbb` form.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Channels scaled into `[0, 1]`.
    pub fn to_unit(&self) -> [f64; 3] {
        [
            self.r as f64 / 255.0,
            self.g as f64 / 255.0,
            self.b as f64 / 255.0,
        ]
    }

    pub fn is_gray(&self) -> bool {
        self.r == self.g && self.g == self.b
    }
}

impl From<[u8; 3]> for Rgb8 {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Rgb8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

fn digits(value: &str) -> &str {
    let value = value.trim();
    value.strip_prefix('#').unwrap_or(value)
}

/// Returns true for 3- or 6-digit hex colours, with or without a leading `#`.
pub fn is_valid_hex(value: &str) -> bool {
    let digits = digits(value);
    matches!(digits.len(), 3 | 6) && digits.chars().all(|c| c.is_ascii_hexdigit())
}

/// Normalize a hex colour to lowercase `#rrggbb`, expanding `#abc` shorthand.
pub fn normalize_hex(value: &str) -> Result<String> {
    if !is_valid_hex(value) {
        return Err(PaletteError::InvalidHex(value.to_string()));
    }

    let digits = digits(value).to_ascii_lowercase();
    if digits.len() == 3 {
        let expanded: String = digits.chars().flat_map(|c| [c, c]).collect();
        Ok(format!("#{expanded}"))
    } else {
        Ok(format!("#{digits}"))
    }
}

/// Parse a 3- or 6-digit hex colour into its 8-bit channels.
pub fn hex_to_rgb(value: &str) -> Result<Rgb8> {
    let normalized = normalize_hex(value)?;
    parse_six(&normalized[1..]).ok_or_else(|| PaletteError::InvalidHex(value.to_string()))
}

/// Parse exactly six hex digits (optionally `#`-prefixed, whitespace trimmed).
pub(crate) fn parse_rrggbb(value: &str) -> Result<Rgb8> {
    let digits = digits(value);
    if digits.len() != 6 {
        return Err(PaletteError::InvalidHex(format!(
            "{value} (expected RRGGBB)"
        )));
    }
    parse_six(digits).ok_or_else(|| PaletteError::InvalidHex(value.to_string()))
}

fn parse_six(digits: &str) -> Option<Rgb8> {
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| {
        digits
            .get(range)
            .and_then(|s| u8::from_str_radix(s, 16).ok())
    };
    Some(Rgb8::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_hex() {
        assert!(is_valid_hex("#abc"));
        assert!(is_valid_hex("abc"));
        assert!(is_valid_hex("#A1B2C3"));
        assert!(is_valid_hex("  A1B2C3 "));

        assert!(!is_valid_hex("#12FG34"));
        assert!(!is_valid_hex("12345"));
        assert!(!is_valid_hex(""));
        assert!(!is_valid_hex("##abc"));
    }

    #[test]
    fn test_normalize_hex_expands_shorthand() {
        assert_eq!(normalize_hex("#abc").unwrap(), "#aabbcc");
        assert_eq!(normalize_hex("A1B2C3").unwrap(), "#a1b2c3");
    }

    #[test]
    fn test_normalize_hex_rejects_invalid() {
        let err = normalize_hex("#12FG34").unwrap_err();
        assert!(matches!(err, PaletteError::InvalidHex(_)));
    }

    #[test]
    fn test_hex_to_rgb() {
        assert_eq!(hex_to_rgb("#abc").unwrap(), Rgb8::new(0xaa, 0xbb, 0xcc));
        assert_eq!(hex_to_rgb("A1B2C3").unwrap(), Rgb8::new(0xa1, 0xb2, 0xc3));
    }

    #[test]
    fn test_parse_rrggbb_requires_six_digits() {
        assert_eq!(parse_rrggbb("#929cf9").unwrap(), Rgb8::new(0x92, 0x9c, 0xf9));
        assert!(parse_rrggbb("#abc").is_err());
        assert!(parse_rrggbb("#zzzzzz").is_err());
    }

    #[test]
    fn test_rgb8_to_hex_is_lowercase_and_padded() {
        assert_eq!(Rgb8::new(0, 10, 255).to_hex(), "#000aff");
        assert_eq!(Rgb8::new(0xAB, 0xCD, 0xEF).to_string(), "#abcdef");
    }
}
