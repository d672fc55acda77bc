//! Oklab command - render an Oklab coordinate as sRGB hex.

use anyhow::Result;
use colored::Colorize;
use iris_core::{hex_to_rgb, oklab_to_hex};
use tracing::debug;

pub fn execute(l: f64, a: f64, b: f64, quiet: bool) -> Result<()> {
    let hex = oklab_to_hex(l, a, b);
    debug!(l, a, b, %hex, "Converted Oklab");

    if quiet {
        println!("{hex}");
        return Ok(());
    }

    let rgb = hex_to_rgb(&hex)?;
    println!("{} {}", crate::utils::swatch(rgb), hex.bold());
    Ok(())
}
