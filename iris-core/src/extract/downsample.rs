//! Fixed-ratio downsampling ahead of clustering.
//!
//! The output is at most 100 pixels wide (or 10% of the input width,
//! whichever is smaller) and is produced with area averaging: every output
//! pixel is the coverage-weighted mean of the source pixels beneath it.
//! The two passes mirror a separable box filter, horizontal then vertical.

use image::{Rgb, RgbImage};

/// Widest sample handed to the quantizer.
pub const MAX_SAMPLE_WIDTH: u32 = 100;

/// Computes the `(width, height)` a `width x height` image is reduced to.
///
/// Returns the input dimensions unchanged when no reduction applies.
pub fn target_dimensions(width: u32, height: u32) -> (u32, u32) {
    // floor(width * 0.1) without going through floating point
    let target_width = (width / 10).clamp(1, MAX_SAMPLE_WIDTH);
    if target_width >= width {
        return (width, height);
    }

    let target_height = (height as f64 * target_width as f64 / width as f64)
        .round()
        .max(1.0) as u32;
    (target_width, target_height)
}

/// Reduce an image for clustering. Never upscales.
pub fn downsample(image: &RgbImage) -> RgbImage {
    let (width, height) = image.dimensions();
    let (out_w, out_h) = target_dimensions(width, height);

    // Fast path: nothing to do
    if out_w == width && out_h == height {
        return image.clone();
    }

    resize_area(image, out_w, out_h)
}

/// Coverage weights of source cells for every output cell along one axis.
///
/// Each inner list holds `(source_index, weight)` pairs whose weights sum to 1.
fn area_weights(in_len: u32, out_len: u32) -> Vec<Vec<(usize, f64)>> {
    let scale = in_len as f64 / out_len as f64;

    (0..out_len)
        .map(|o| {
            let start = o as f64 * scale;
            let end = ((o + 1) as f64 * scale).min(in_len as f64);
            let first = start.floor() as u32;
            let last = (end.ceil() as u32).min(in_len);

            let mut weights: Vec<(usize, f64)> = (first..last)
                .filter_map(|i| {
                    let overlap = end.min((i + 1) as f64) - start.max(i as f64);
                    (overlap > 0.0).then_some((i as usize, overlap))
                })
                .collect();

            let total: f64 = weights.iter().map(|(_, w)| w).sum();
            for (_, w) in weights.iter_mut() {
                *w /= total;
            }
            weights
        })
        .collect()
}

/// Area-averaging resize to exactly `out_w x out_h`.
pub fn resize_area(image: &RgbImage, out_w: u32, out_h: u32) -> RgbImage {
    let (in_w, in_h) = image.dimensions();
    let out_w = out_w.max(1);
    let out_h = out_h.max(1);

    let x_weights = area_weights(in_w, out_w);
    let y_weights = area_weights(in_h, out_h);

    // --------------------------------------------------------
    // First pass: horizontal reduction (in_h rows of out_w)
    // --------------------------------------------------------
    let mut horizontal: Vec<[f64; 3]> = vec![[0.0; 3]; (out_w * in_h) as usize];
    for y in 0..in_h {
        for (x_out, weights) in x_weights.iter().enumerate() {
            let mut acc = [0.0f64; 3];
            for &(x, w) in weights {
                let Rgb(px) = image.get_pixel(x as u32, y);
                for c in 0..3 {
                    acc[c] += px[c] as f64 * w;
                }
            }
            horizontal[y as usize * out_w as usize + x_out] = acc;
        }
    }

    // --------------------------------------------------------
    // Second pass: vertical reduction
    // --------------------------------------------------------
    let mut out = RgbImage::new(out_w, out_h);
    for (y_out, weights) in y_weights.iter().enumerate() {
        for x_out in 0..out_w as usize {
            let mut acc = [0.0f64; 3];
            for &(y, w) in weights {
                let row = horizontal[y * out_w as usize + x_out];
                for c in 0..3 {
                    acc[c] += row[c] * w;
                }
            }
            let px = acc.map(|v| v.round().clamp(0.0, 255.0) as u8);
            out.put_pixel(x_out as u32, y_out as u32, Rgb(px));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_dimensions_caps_width_at_100() {
        assert_eq!(target_dimensions(4000, 3000), (100, 75));
        assert_eq!(target_dimensions(1000, 10), (100, 1));
    }

    #[test]
    fn test_target_dimensions_uses_ten_percent() {
        assert_eq!(target_dimensions(640, 480), (64, 48));
        assert_eq!(target_dimensions(250, 101), (25, 10));
    }

    #[test]
    fn test_target_dimensions_never_upscales() {
        assert_eq!(target_dimensions(1, 1), (1, 1));
        assert_eq!(target_dimensions(1, 500), (1, 500));
    }

    #[test]
    fn test_target_dimensions_small_images_collapse_to_one_column() {
        // floor(15 * 0.1) = 1, which is narrower than 15
        assert_eq!(target_dimensions(15, 30), (1, 2));
        assert_eq!(target_dimensions(5, 1), (1, 1));
    }

    #[test]
    fn test_downsample_returns_same_pixels_when_not_reduced() {
        let mut img = RgbImage::new(1, 3);
        img.put_pixel(0, 1, Rgb([10, 20, 30]));
        let out = downsample(&img);
        assert_eq!(out, img);
    }

    #[test]
    fn test_resize_area_averages_blocks() {
        // 4x2 image: left half black, right half white
        let mut img = RgbImage::new(4, 2);
        for y in 0..2 {
            for x in 2..4 {
                img.put_pixel(x, y, Rgb([255, 255, 255]));
            }
        }
        let out = resize_area(&img, 2, 1);
        assert_eq!(out.get_pixel(0, 0), &Rgb([0, 0, 0]));
        assert_eq!(out.get_pixel(1, 0), &Rgb([255, 255, 255]));

        let out = resize_area(&img, 1, 1);
        assert_eq!(out.get_pixel(0, 0), &Rgb([128, 128, 128]));
    }

    #[test]
    fn test_resize_area_fractional_coverage() {
        // 3 pixels -> 2: each output covers 1.5 source pixels
        let mut img = RgbImage::new(3, 1);
        img.put_pixel(0, 0, Rgb([0, 0, 0]));
        img.put_pixel(1, 0, Rgb([90, 90, 90]));
        img.put_pixel(2, 0, Rgb([180, 180, 180]));
        let out = resize_area(&img, 2, 1);
        // (0 * 1 + 90 * 0.5) / 1.5 = 30, (90 * 0.5 + 180 * 1) / 1.5 = 150
        assert_eq!(out.get_pixel(0, 0), &Rgb([30, 30, 30]));
        assert_eq!(out.get_pixel(1, 0), &Rgb([150, 150, 150]));
    }

    #[test]
    fn test_area_weights_sum_to_one() {
        for (input, output) in [(7, 3), (100, 10), (13, 1), (640, 64)] {
            for weights in area_weights(input, output) {
                let total: f64 = weights.iter().map(|(_, w)| w).sum();
                assert!((total - 1.0).abs() < 1e-12);
            }
        }
    }
}
