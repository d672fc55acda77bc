//! Oklab <-> OKLCH, plus the hex entry points used by the palette pipeline.

use serde::{Deserialize, Serialize};

use super::hex::{parse_rrggbb, Rgb8};
use super::oklab::{oklab_to_hex, rgb_to_oklab, Oklab};
use crate::error::Result;

/// Chroma below which a colour is treated as achromatic and its hue forced to 0.
pub const ACHROMATIC_CHROMA_EPSILON: f64 = 1e-9;

/// A colour in OKLCH: lightness, chroma and hue in degrees `[0, 360)`.
///
/// Serialized as `{"L": .., "c": .., "h": ..}`, the shape stored with each
/// palette record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Oklch {
    #[serde(rename = "L")]
    pub l: f64,
    pub c: f64,
    pub h: f64,
}

impl Oklch {
    pub const fn new(l: f64, c: f64, h: f64) -> Self {
        Self { l, c, h }
    }

    /// Round every component to `places` decimal digits.
    ///
    /// A hue that rounds up to 360 wraps to 0.
    pub fn rounded(&self, places: i32) -> Self {
        let factor = 10f64.powi(places);
        let round = |v: f64| (v * factor).round() / factor;
        let mut h = round(self.h);
        if h >= 360.0 {
            h = 0.0;
        }
        Self {
            l: round(self.l),
            c: round(self.c),
            h,
        }
    }

    pub fn is_achromatic(&self) -> bool {
        self.c < ACHROMATIC_CHROMA_EPSILON
    }
}

/// Cartesian to cylindrical. Hue is normalized into `[0, 360)` and forced to
/// exactly 0 when chroma is below [`ACHROMATIC_CHROMA_EPSILON`].
pub fn oklab_to_oklch(lab: Oklab) -> Oklch {
    let c = lab.a.hypot(lab.b);
    if c < ACHROMATIC_CHROMA_EPSILON {
        return Oklch { l: lab.l, c, h: 0.0 };
    }

    let mut h = lab.b.atan2(lab.a).to_degrees().rem_euclid(360.0);
    // rem_euclid can return exactly 360.0 for tiny negative inputs
    if h >= 360.0 {
        h = 0.0;
    }
    Oklch { l: lab.l, c, h }
}

pub fn oklch_to_oklab(lch: Oklch) -> Oklab {
    let (sin, cos) = lch.h.to_radians().sin_cos();
    Oklab {
        l: lch.l,
        a: lch.c * cos,
        b: lch.c * sin,
    }
}

pub fn rgb_to_oklch(rgb: Rgb8) -> Oklch {
    oklab_to_oklch(rgb_to_oklab(rgb))
}

/// Convert a `#rrggbb` (or `rrggbb`) string to OKLCH.
pub fn hex_to_oklch(hex: &str) -> Result<Oklch> {
    Ok(rgb_to_oklch(parse_rrggbb(hex)?))
}

pub fn oklch_to_hex(lch: Oklch) -> String {
    let lab = oklch_to_oklab(lch);
    oklab_to_hex(lab.l, lab.a, lab.b)
}
