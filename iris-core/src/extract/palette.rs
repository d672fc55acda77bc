//! Palette entries and their assembly from quantizer output.

use serde::{Deserialize, Serialize};

use super::quantize::Cluster;
use crate::color::{rgb_to_oklch, Oklch};
use crate::error::{PaletteError, Result};

/// Decimal places kept for serialized OKLCH components.
pub const OKLCH_DECIMALS: i32 = 6;

/// One palette colour as `#rrggbb` plus its OKLCH coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaletteEntry {
    pub hex: String,
    pub oklch: Oklch,
}

impl PaletteEntry {
    /// Check the invariants a stored entry must satisfy.
    pub fn validate(&self) -> Result<()> {
        let digits = self
            .hex
            .strip_prefix('#')
            .ok_or_else(|| PaletteError::InvalidPalette(format!("hex '{}' lacks '#'", self.hex)))?;
        let canonical = digits.len() == 6
            && digits
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c));
        if !canonical {
            return Err(PaletteError::InvalidPalette(format!(
                "hex '{}' is not #rrggbb",
                self.hex
            )));
        }

        let Oklch { l, c, h } = self.oklch;
        if !(l.is_finite() && l >= 0.0) || !(c.is_finite() && c >= 0.0) {
            return Err(PaletteError::InvalidPalette(format!(
                "{}: lightness and chroma must be non-negative",
                self.hex
            )));
        }
        if !(0.0..360.0).contains(&h) {
            return Err(PaletteError::InvalidPalette(format!(
                "{}: hue {} outside [0, 360)",
                self.hex, h
            )));
        }
        Ok(())
    }
}

/// Pair every cluster with its OKLCH expression, keeping the cluster order.
pub fn assemble(clusters: &[Cluster]) -> Vec<PaletteEntry> {
    clusters
        .iter()
        .map(|cluster| PaletteEntry {
            hex: cluster.color.to_hex(),
            oklch: rgb_to_oklch(cluster.color).rounded(OKLCH_DECIMALS),
        })
        .collect()
}

/// Compact JSON form used for storage.
pub fn palette_to_json(palette: &[PaletteEntry]) -> Result<String> {
    serde_json::to_string(palette).map_err(|e| PaletteError::Internal(e.to_string()))
}

/// Parse stored palette JSON and validate every entry.
pub fn parse_palette_json(json: &str) -> Result<Vec<PaletteEntry>> {
    let palette: Vec<PaletteEntry> =
        serde_json::from_str(json).map_err(|e| PaletteError::InvalidPalette(e.to_string()))?;
    for entry in &palette {
        entry.validate()?;
    }
    Ok(palette)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb8;

    #[test]
    fn test_assemble_preserves_order() {
        let clusters = [
            Cluster { color: Rgb8::new(0, 0, 255), population: 9 },
            Cluster { color: Rgb8::new(255, 255, 255), population: 4 },
            Cluster { color: Rgb8::new(0, 0, 0), population: 1 },
        ];
        let palette = assemble(&clusters);

        let hexes: Vec<&str> = palette.iter().map(|e| e.hex.as_str()).collect();
        assert_eq!(hexes, ["#0000ff", "#ffffff", "#000000"]);
        assert_eq!(palette[1].oklch.h, 0.0);
        assert_eq!(palette[2].oklch, Oklch::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_assemble_rounds_to_six_places() {
        let palette = assemble(&[Cluster { color: Rgb8::new(255, 0, 0), population: 1 }]);
        let lch = palette[0].oklch;
        assert_eq!(lch.l, 0.627955);
        assert_eq!(lch.c, (lch.c * 1e6).round() / 1e6);
        assert_eq!(lch.h, (lch.h * 1e6).round() / 1e6);
    }

    #[test]
    fn test_palette_json_shape() {
        let palette = assemble(&[Cluster { color: Rgb8::new(0, 0, 0), population: 1 }]);
        let json = palette_to_json(&palette).unwrap();
        assert_eq!(json, r##"[{"hex":"#000000","oklch":{"L":0.0,"c":0.0,"h":0.0}}]"##);
        assert_eq!(parse_palette_json(&json).unwrap(), palette);
    }

    #[test]
    fn test_parse_palette_json_rejects_bad_shape() {
        assert!(matches!(
            parse_palette_json(r##"{"hex":"#000000"}"##),
            Err(PaletteError::InvalidPalette(_))
        ));
        assert!(matches!(
            parse_palette_json(r##"[{"hex":"#000000"}]"##),
            Err(PaletteError::InvalidPalette(_))
        ));
    }

    #[test]
    fn test_parse_palette_json_rejects_invalid_values() {
        let uppercase = r##"[{"hex":"#ABCDEF","oklch":{"L":0.5,"c":0.1,"h":10.0}}]"##;
        assert!(parse_palette_json(uppercase).is_err());

        let negative_chroma = r##"[{"hex":"#abcdef","oklch":{"L":0.5,"c":-0.1,"h":10.0}}]"##;
        assert!(parse_palette_json(negative_chroma).is_err());

        let hue_overflow = r##"[{"hex":"#abcdef","oklch":{"L":0.5,"c":0.1,"h":360.0}}]"##;
        assert!(parse_palette_json(hue_overflow).is_err());
    }
}
