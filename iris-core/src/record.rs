//! Persisted palette results and the storage seam.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::extract::PaletteEntry;

/// Upper bound on rows returned by a single history query.
pub const MAX_HISTORY_LIMIT: usize = 100;

/// Default history page size.
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// A record about to be stored; the store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPaletteRecord {
    /// Original (unsanitized) file name.
    pub filename: String,
    pub digest: String,
    pub n_colors: usize,
    pub palette: Vec<PaletteEntry>,
    pub image_path: String,
}

/// One stored extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaletteResult {
    pub id: i64,
    pub filename: String,
    pub digest: String,
    pub n_colors: usize,
    pub palette: Vec<PaletteEntry>,
    pub image_path: String,
    pub created_at: DateTime<Utc>,
}

impl PaletteResult {
    /// Attach store-assigned fields to a new record.
    pub fn from_new(id: i64, created_at: DateTime<Utc>, record: NewPaletteRecord) -> Self {
        Self {
            id,
            filename: record.filename,
            digest: record.digest,
            n_colors: record.n_colors,
            palette: record.palette,
            image_path: record.image_path,
            created_at,
        }
    }

    /// File name component of `image_path`.
    pub fn image_file_name(&self) -> &str {
        self.image_path
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(&self.image_path)
    }
}

/// Clamp a history page size into `[1, 100]`.
pub fn clamp_history_limit(limit: usize) -> usize {
    limit.clamp(1, MAX_HISTORY_LIMIT)
}

/// Storage backend for palette results.
///
/// Implementations report write failures as
/// [`PaletteError::PersistenceFailure`](crate::PaletteError::PersistenceFailure).
#[async_trait]
pub trait PaletteRecordStore: Send + Sync {
    /// Store a record and return its id.
    async fn create(&self, record: NewPaletteRecord) -> Result<i64>;

    async fn get(&self, id: i64) -> Result<Option<PaletteResult>>;

    /// Most recent records first.
    async fn list(&self, limit: usize) -> Result<Vec<PaletteResult>>;

    /// Delete every record, returning the image paths they referenced.
    async fn delete_all(&self) -> Result<Vec<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_history_limit() {
        assert_eq!(clamp_history_limit(0), 1);
        assert_eq!(clamp_history_limit(20), 20);
        assert_eq!(clamp_history_limit(5000), MAX_HISTORY_LIMIT);
    }

    #[test]
    fn test_image_file_name() {
        let result = PaletteResult::from_new(
            1,
            Utc::now(),
            NewPaletteRecord {
                filename: "cat.png".into(),
                digest: "ab".repeat(32),
                n_colors: 3,
                palette: vec![],
                image_path: "/srv/data/uploads/abababababababab_cat.png".into(),
            },
        );
        assert_eq!(result.image_file_name(), "abababababababab_cat.png");
        assert_eq!(result.id, 1);
    }
}
