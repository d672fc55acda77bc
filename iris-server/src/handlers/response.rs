//! JSON shapes shared by the palette endpoints

use chrono::{DateTime, Utc};
use iris_core::{PaletteEntry, PaletteResult};
use serde::Serialize;
use utoipa::ToSchema;

/// Public prefix under which stored images are served
pub const UPLOADS_ROUTE: &str = "/uploads";

/// A stored palette extraction
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaletteResultResponse {
    /// Result identifier
    #[schema(example = 42)]
    pub id: i64,
    /// Original file name as uploaded
    #[schema(example = "sunset.jpg")]
    pub filename: String,
    /// SHA-256 of the uploaded bytes (hex-encoded)
    #[schema(example = "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08")]
    pub sha256: String,
    /// Number of palette colours
    #[schema(example = 3)]
    pub n_colors: usize,
    /// Where the stored image can be fetched
    #[schema(example = "/uploads/9f86d081884c7d65_sunset.jpg")]
    pub image_url: String,
    /// When the result was stored
    #[schema(value_type = String, example = "2026-01-08T10:00:00Z")]
    pub created_at: DateTime<Utc>,
    /// Colours ordered by prevalence: `{hex, oklch: {L, c, h}}`
    #[schema(value_type = Vec<Object>)]
    pub palette: Vec<PaletteEntry>,
}

impl From<PaletteResult> for PaletteResultResponse {
    fn from(result: PaletteResult) -> Self {
        let image_url = format!("{}/{}", UPLOADS_ROUTE, result.image_file_name());
        Self {
            id: result.id,
            filename: result.filename,
            sha256: result.digest,
            n_colors: result.n_colors,
            image_url,
            created_at: result.created_at,
            palette: result.palette,
        }
    }
}

/// History listing
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HistoryResponse {
    pub results: Vec<PaletteResultResponse>,
}

/// Outcome of clearing the history
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ClearHistoryResponse {
    #[schema(example = true)]
    pub ok: bool,
    /// Number of records removed
    #[schema(example = 7)]
    pub removed: usize,
}
