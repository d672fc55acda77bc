//! Palette extraction pipeline.
//!
//! decode -> [`downsample`] -> [`quantize`] -> [`assemble`]. Every stage is
//! synchronous and CPU-bound; async callers should run it on a blocking
//! worker. Nothing here touches the filesystem except
//! [`extract_palette_from_path`].

pub mod downsample;
pub mod palette;
pub mod quantize;

use std::path::Path;

use image::RgbImage;
use tracing::debug;

use crate::color::Rgb8;
use crate::error::{PaletteError, Result, DEFAULT_COLORS, MAX_COLORS, MIN_COLORS};

pub use downsample::{downsample, target_dimensions};
pub use palette::{assemble, palette_to_json, parse_palette_json, PaletteEntry};
pub use quantize::{quantize, Cluster};

/// Clamp a caller-supplied colour count into `[1, 12]`.
pub fn clamp_color_count(requested: i64) -> usize {
    requested.clamp(MIN_COLORS as i64, MAX_COLORS as i64) as usize
}

/// Like [`clamp_color_count`], defaulting to 3 when nothing was requested.
pub fn color_count_or_default(requested: Option<i64>) -> usize {
    requested.map_or(DEFAULT_COLORS, clamp_color_count)
}

/// Decode any format the `image` crate was built with into 8-bit RGB.
pub fn decode_image(bytes: &[u8]) -> Result<RgbImage> {
    let image = image::load_from_memory(bytes)
        .map_err(|e| PaletteError::DecodeError(e.to_string()))?;
    Ok(image.to_rgb8())
}

/// Extract an `n_colors` palette from a decoded image.
///
/// `n_colors` is expected to be clamped already; it is clamped again here
/// so the quantizer never sees an out-of-range count.
pub fn extract_palette(image: &RgbImage, n_colors: usize) -> Result<Vec<PaletteEntry>> {
    let n_colors = n_colors.clamp(MIN_COLORS, MAX_COLORS);
    let sample = downsample(image);
    debug!(
        width = image.width(),
        height = image.height(),
        sample_width = sample.width(),
        sample_height = sample.height(),
        "Downsampled image"
    );

    let pixels: Vec<Rgb8> = sample.pixels().map(|p| Rgb8::from(p.0)).collect();
    let clusters = quantize(&pixels, n_colors)?;
    Ok(assemble(&clusters))
}

/// Decode encoded image bytes and extract their palette.
pub fn extract_palette_from_bytes(bytes: &[u8], n_colors: usize) -> Result<Vec<PaletteEntry>> {
    extract_palette(&decode_image(bytes)?, n_colors)
}

/// Read an image file and extract its palette.
///
/// An unreadable file is reported as [`PaletteError::DecodeError`].
pub fn extract_palette_from_path(path: &Path, n_colors: usize) -> Result<Vec<PaletteEntry>> {
    let bytes = std::fs::read(path).map_err(|e| {
        PaletteError::DecodeError(format!("cannot read image {}: {}", path.display(), e))
    })?;
    extract_palette_from_bytes(&bytes, n_colors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_color_count() {
        assert_eq!(clamp_color_count(-5), 1);
        assert_eq!(clamp_color_count(0), 1);
        assert_eq!(clamp_color_count(1), 1);
        assert_eq!(clamp_color_count(7), 7);
        assert_eq!(clamp_color_count(12), 12);
        assert_eq!(clamp_color_count(500), 12);
    }

    #[test]
    fn test_color_count_default() {
        assert_eq!(color_count_or_default(None), 3);
        assert_eq!(color_count_or_default(Some(40)), 12);
    }

    #[test]
    fn test_decode_image_rejects_garbage() {
        assert!(matches!(
            decode_image(b"definitely not an image"),
            Err(PaletteError::DecodeError(_))
        ));
    }

    #[test]
    fn test_extract_palette_from_missing_path() {
        let err = extract_palette_from_path(Path::new("/nonexistent/iris.png"), 3).unwrap_err();
        assert!(matches!(err, PaletteError::DecodeError(_)));
    }

    #[test]
    fn test_extract_palette_single_pixel() {
        let image = RgbImage::from_pixel(1, 1, image::Rgb([10, 20, 30]));
        let palette = extract_palette(&image, 2).unwrap();
        assert_eq!(palette.len(), 2);
        assert!(palette.iter().all(|e| e.hex == "#0a141e"));
    }
}
