//! Colour representations and conversions.
//!
//! Three spaces are involved:
//!
//! - **sRGB**, as 8-bit triples ([`Rgb8`]) and `#rrggbb` strings.
//! - **Oklab** ([`Oklab`]), Björn Ottosson's perceptual Cartesian space.
//! - **OKLCH** ([`Oklch`]), the cylindrical form of Oklab.
//!
//! Every conversion is a pure function over `f64`. Clustering happens in
//! RGB elsewhere; this module only expresses the resulting colours.

pub mod hex;
pub mod oklab;
pub mod oklch;

pub use hex::{hex_to_rgb, is_valid_hex, normalize_hex, Rgb8};
pub use oklab::{
    linear_srgb_to_oklab, linear_to_srgb, oklab_to_hex, oklab_to_linear_srgb, oklab_to_rgb, rgb_to_oklab,
    srgb_to_linear, Oklab,
};
pub use oklch::{
    hex_to_oklch, oklab_to_oklch, oklch_to_hex, oklch_to_oklab, rgb_to_oklch, Oklch,
    ACHROMATIC_CHROMA_EPSILON,
};
