//! Convert command - show a hex colour in RGB, Oklab and OKLCH.

use anyhow::{Context, Result};
use colored::Colorize;
use iris_core::{hex_to_rgb, normalize_hex, oklab_to_oklch, rgb_to_oklab};
use serde_json::json;

use crate::utils::{format_oklch, swatch, OutputFormat};

pub fn execute(hex: &str, format: OutputFormat, quiet: bool) -> Result<()> {
    let normalized = normalize_hex(hex)?;
    let rgb = hex_to_rgb(&normalized)?;
    let lab = rgb_to_oklab(rgb);
    let lch = oklab_to_oklch(lab);

    match format {
        OutputFormat::Json => {
            let output = json!({
                "hex": normalized,
                "rgb": [rgb.r, rgb.g, rgb.b],
                "oklab": lab,
                "oklch": lch.rounded(6),
            });
            let text =
                serde_json::to_string_pretty(&output).context("Failed to serialize colour")?;
            println!("{text}");
        }
        OutputFormat::Text if quiet => println!("{normalized}"),
        OutputFormat::Text => {
            println!("{} {}", swatch(rgb), normalized.bold());
            println!("  RGB:   {}, {}, {}", rgb.r, rgb.g, rgb.b);
            println!("  Oklab: L={:.4} a={:.4} b={:.4}", lab.l, lab.a, lab.b);
            println!("  OKLCH: {}", format_oklch(lch));
        }
    }

    Ok(())
}
