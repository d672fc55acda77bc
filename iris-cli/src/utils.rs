//! Output helpers shared across CLI commands.

use clap::ValueEnum;
use colored::{ColoredString, Colorize};
use iris_core::{Oklch, Rgb8};

/// How a command renders its result on stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// A two-cell block painted in the given colour.
pub fn swatch(rgb: Rgb8) -> ColoredString {
    "  ".on_truecolor(rgb.r, rgb.g, rgb.b)
}

/// `L=0.6280 C=0.2577 h=29.23` with fixed precision per component.
pub fn format_oklch(lch: Oklch) -> String {
    format!("L={:.4} C={:.4} h={:.2}", lch.l, lch.c, lch.h)
}
