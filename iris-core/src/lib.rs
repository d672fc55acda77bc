//! Iris Core - palette extraction and content-addressed upload intake
//!
//! This crate turns an arbitrary raster image into a small, ordered palette
//! of representative colours, each expressed as `#rrggbb` and OKLCH.
//!
//! # Features
//!
//! - Area-averaging downsampling ahead of clustering
//! - Seeded k-means in RGB, clusters ordered by pixel population
//! - Oklab / OKLCH conversions with achromatic hue normalization
//! - Bounded, SHA-256 hashed upload intake with atomic rename (`service`)
//! - Record-store seam and an orchestrating [`PaletteService`] (`service`)
//!
//! # Example
//!
//! ```no_run
//! use iris_core::{extract_palette_from_path, hex_to_oklch};
//!
//! # fn example() -> iris_core::Result<()> {
//! let palette = extract_palette_from_path("photo.jpg".as_ref(), 5)?;
//! for entry in &palette {
//!     println!("{} L={:.3} C={:.3} h={:.1}", entry.hex, entry.oklch.l, entry.oklch.c, entry.oklch.h);
//! }
//!
//! let black = hex_to_oklch("#000000")?;
//! assert_eq!(black.h, 0.0);
//! # Ok(())
//! # }
//! ```

pub mod color;
pub mod error;
pub mod extract;

#[cfg(feature = "service")]
pub mod ingest;
#[cfg(feature = "service")]
pub mod record;
#[cfg(feature = "service")]
pub mod service;

// Re-export main types for convenience
pub use color::{
    hex_to_oklch, hex_to_rgb, is_valid_hex, normalize_hex, oklab_to_hex, oklab_to_oklch,
    oklch_to_hex, rgb_to_oklab, rgb_to_oklch, Oklab, Oklch, Rgb8,
};
pub use error::{
    PaletteError, Result, DEFAULT_CHUNK_SIZE, DEFAULT_COLORS, DEFAULT_MAX_UPLOAD_BYTES,
    MAX_COLORS, MIN_COLORS,
};
pub use extract::{
    clamp_color_count, color_count_or_default, extract_palette, extract_palette_from_bytes,
    extract_palette_from_path, palette_to_json, parse_palette_json, PaletteEntry,
};

#[cfg(feature = "service")]
pub use ingest::{
    ingest, sanitize_filename, CollisionPolicy, IngestConfig, IngestedImage, ReaderSource,
    UploadSource,
};
#[cfg(feature = "service")]
pub use record::{
    clamp_history_limit, NewPaletteRecord, PaletteRecordStore, PaletteResult,
    DEFAULT_HISTORY_LIMIT, MAX_HISTORY_LIMIT,
};
#[cfg(feature = "service")]
pub use service::{PaletteService, PendingUpload};
