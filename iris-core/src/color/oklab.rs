//! sRGB <-> linear sRGB <-> Oklab.
//!
//! Coefficients are Björn Ottosson's published Oklab matrices, kept as
//! `const` data.

use serde::{Deserialize, Serialize};

use super::hex::Rgb8;

/// A colour in Oklab: lightness `l`, green-red axis `a`, blue-yellow axis `b`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Oklab {
    pub l: f64,
    pub a: f64,
    pub b: f64,
}

impl Oklab {
    pub const fn new(l: f64, a: f64, b: f64) -> Self {
        Self { l, a, b }
    }
}

#[rustfmt::skip]
const LINEAR_SRGB_TO_LMS: [[f64; 3]; 3] = [
    [0.4122214708, 0.5363325363, 0.0514459929],
    [0.2119034982, 0.6806995451, 0.1073969566],
    [0.0883024619, 0.2817188376, 0.6299787005],
];

#[rustfmt::skip]
const LMS_PRIME_TO_OKLAB: [[f64; 3]; 3] = [
    [0.2104542553,  0.7936177850, -0.0040720468],
    [1.9779984951, -2.4285922050,  0.4505937099],
    [0.0259040371,  0.7827717662, -0.8086757660],
];

#[rustfmt::skip]
const OKLAB_TO_LMS_PRIME: [[f64; 3]; 3] = [
    [1.0,  0.3963377774,  0.2158037573],
    [1.0, -0.1055613458, -0.0638541728],
    [1.0, -0.0894841775, -1.2914855480],
];

#[rustfmt::skip]
const LMS_TO_LINEAR_SRGB: [[f64; 3]; 3] = [
    [ 4.0767416621, -3.3077115913,  0.2309699292],
    [-1.2684380046,  2.6097574011, -0.3413193965],
    [-0.0041960863, -0.7034186147,  1.7076147010],
];

#[inline]
fn multiply(matrix: &[[f64; 3]; 3], vector: [f64; 3]) -> [f64; 3] {
    let row = |r: &[f64; 3]| r[0] * vector[0] + r[1] * vector[1] + r[2] * vector[2];
    [row(&matrix[0]), row(&matrix[1]), row(&matrix[2])]
}

/// Cube root that keeps the sign of negative inputs.
///
/// Matrix products near black and white can dip slightly below zero.
#[inline]
fn signed_cbrt(value: f64) -> f64 {
    value.abs().powf(1.0 / 3.0).copysign(value)
}

/// Decode one gamma-encoded sRGB channel in `[0, 1]` to linear light.
pub fn srgb_to_linear(c: f64) -> f64 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Encode one linear-light channel with the sRGB transfer curve.
pub fn linear_to_srgb(c: f64) -> f64 {
    if c <= 0.0031308 {
        12.92 * c
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

/// Linear sRGB -> LMS -> signed cube root -> Oklab.
pub fn linear_srgb_to_oklab(rgb: [f64; 3]) -> Oklab {
    let [l, m, s] = multiply(&LINEAR_SRGB_TO_LMS, rgb);
    let [l, a, b] = multiply(
        &LMS_PRIME_TO_OKLAB,
        [signed_cbrt(l), signed_cbrt(m), signed_cbrt(s)],
    );
    Oklab { l, a, b }
}

/// Oklab -> LMS' -> cube -> linear sRGB. Not clamped.
pub fn oklab_to_linear_srgb(lab: Oklab) -> [f64; 3] {
    let [l, m, s] = multiply(&OKLAB_TO_LMS_PRIME, [lab.l, lab.a, lab.b]);
    multiply(&LMS_TO_LINEAR_SRGB, [l.powi(3), m.powi(3), s.powi(3)])
}

/// Convert an 8-bit sRGB colour to Oklab.
///
/// Neutral inputs (`r == g == b`) sit on the lightness axis: the ten-digit
/// coefficients leave a residual `b` of about `4e-8`, which is dropped so
/// that grays carry exactly zero chroma.
pub fn rgb_to_oklab(rgb: Rgb8) -> Oklab {
    let [r, g, b] = rgb.to_unit();
    let mut lab = linear_srgb_to_oklab([srgb_to_linear(r), srgb_to_linear(g), srgb_to_linear(b)]);
    if rgb.is_gray() {
        lab.a = 0.0;
        lab.b = 0.0;
    }
    lab
}

fn unit_to_u8(c: f64) -> u8 {
    (c.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Convert Oklab to an 8-bit sRGB colour, clipping out-of-gamut values.
pub fn oklab_to_rgb(lab: Oklab) -> Rgb8 {
    let [r, g, b] = oklab_to_linear_srgb(lab).map(|c| linear_to_srgb(c.clamp(0.0, 1.0)));
    Rgb8::new(unit_to_u8(r), unit_to_u8(g), unit_to_u8(b))
}

/// Convert Oklab `(L, a, b)` to a `#rrggbb` string.
pub fn oklab_to_hex(l: f64, a: f64, b: f64) -> String {
    oklab_to_rgb(Oklab::new(l, a, b)).to_hex()
}
