//! Extract command - derive an ordered palette from an image file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;
use iris_core::{clamp_color_count, extract_palette_from_bytes, hex_to_rgb};
use serde_json::json;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::utils::{format_oklch, swatch, OutputFormat};

pub fn execute(file: PathBuf, n_colors: i64, format: OutputFormat, quiet: bool) -> Result<()> {
    let bytes = std::fs::read(&file)
        .with_context(|| format!("Failed to read file: {}", file.display()))?;
    let n = clamp_color_count(n_colors);
    let digest = hex::encode(Sha256::digest(&bytes));
    debug!(path = %file.display(), bytes = bytes.len(), requested = n_colors, n_colors = n, "Read image");

    let palette = extract_palette_from_bytes(&bytes, n)
        .with_context(|| format!("Failed to extract palette from {}", file.display()))?;
    info!(n_colors = palette.len(), sha256 = %digest, "Palette extracted");

    match format {
        OutputFormat::Json => {
            let output = json!({
                "file": file.display().to_string(),
                "sha256": digest,
                "n_colors": n,
                "palette": palette,
            });
            let text = serde_json::to_string_pretty(&output)
                .context("Failed to serialize palette")?;
            println!("{text}");
        }
        OutputFormat::Text if quiet => {
            for entry in &palette {
                println!("{}", entry.hex);
            }
        }
        OutputFormat::Text => {
            println!("{}", "Palette extracted".green().bold());
            println!("  File:    {}", file.display());
            println!("  SHA-256: {}", digest);
            println!("  Colors:  {}", n);
            println!();
            for (rank, entry) in palette.iter().enumerate() {
                let rgb = hex_to_rgb(&entry.hex)?;
                println!(
                    "  {:>2}. {} {}  {}",
                    rank + 1,
                    swatch(rgb),
                    entry.hex.bold(),
                    format_oklch(entry.oklch).dimmed()
                );
            }
        }
    }

    Ok(())
}
