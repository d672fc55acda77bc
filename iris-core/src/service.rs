//! Upload-to-record orchestration.
//!
//! [`PaletteService`] ties the pieces together: ingest an upload, run the
//! extraction pipeline on a blocking worker, persist the result. A stored
//! file never outlives a failed request.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::{PaletteError, Result, MAX_COLORS, MIN_COLORS};
use crate::extract::extract_palette_from_path;
use crate::ingest::{
    ingest, original_file_name, remove_stored_file, IngestConfig, IngestedImage, UploadSource,
};
use crate::record::{clamp_history_limit, NewPaletteRecord, PaletteRecordStore, PaletteResult};

/// An ingested upload awaiting extraction.
///
/// Dropping it without [`PaletteService::complete`] succeeding deletes the
/// stored file. This covers error returns as well as futures dropped
/// mid-request.
#[derive(Debug)]
pub struct PendingUpload {
    image: IngestedImage,
    original_name: String,
    armed: bool,
}

impl PendingUpload {
    pub fn image(&self) -> &IngestedImage {
        &self.image
    }

    /// Final path component of the client-declared name.
    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    fn keep(mut self) -> IngestedImage {
        self.armed = false;
        self.image.clone()
    }
}

impl Drop for PendingUpload {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match self.image.discard() {
            Ok(()) => debug!(
                path = %self.image.stored_path.display(),
                "Removed artifact of failed request"
            ),
            Err(e) => warn!(
                path = %self.image.stored_path.display(),
                error = %e,
                "Failed to remove artifact of failed request"
            ),
        }
    }
}

/// Palette extraction backed by an upload directory and a record store.
#[derive(Clone)]
pub struct PaletteService {
    store: Arc<dyn PaletteRecordStore>,
    upload_dir: PathBuf,
    ingest: IngestConfig,
}

impl PaletteService {
    pub fn new(
        store: Arc<dyn PaletteRecordStore>,
        upload_dir: impl Into<PathBuf>,
        ingest: IngestConfig,
    ) -> Self {
        Self {
            store,
            upload_dir: upload_dir.into(),
            ingest,
        }
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn ingest_config(&self) -> &IngestConfig {
        &self.ingest
    }

    /// Ingest `source`, extract `n_colors` colours and store the result.
    ///
    /// `file_name` overrides the name declared by the source. Only its final
    /// path component is kept; without any name the upload is called
    /// `upload`.
    pub async fn extract_and_store<U>(
        &self,
        source: &mut U,
        file_name: Option<&str>,
        n_colors: usize,
    ) -> Result<PaletteResult>
    where
        U: UploadSource + ?Sized,
    {
        let pending = self.ingest_upload(source, file_name).await?;
        self.complete(pending, n_colors).await
    }

    /// First half of [`extract_and_store`](Self::extract_and_store): stream
    /// the upload to disk.
    pub async fn ingest_upload<U>(
        &self,
        source: &mut U,
        file_name: Option<&str>,
    ) -> Result<PendingUpload>
    where
        U: UploadSource + ?Sized,
    {
        let original_name = original_file_name(file_name.or(source.file_name()));
        let image = ingest(source, &original_name, &self.upload_dir, &self.ingest).await?;

        Ok(PendingUpload {
            image,
            original_name,
            armed: true,
        })
    }

    /// Second half: extract the palette and persist the record.
    pub async fn complete(&self, pending: PendingUpload, n_colors: usize) -> Result<PaletteResult> {
        let n_colors = n_colors.clamp(MIN_COLORS, MAX_COLORS);

        let path = pending.image.stored_path.clone();
        let palette = tokio::task::spawn_blocking(move || extract_palette_from_path(&path, n_colors))
            .await
            .map_err(|e| PaletteError::Internal(format!("extraction task failed: {e}")))??;

        let record = NewPaletteRecord {
            filename: pending.original_name.clone(),
            digest: pending.image.digest.clone(),
            n_colors,
            palette,
            image_path: pending.image.stored_path.to_string_lossy().into_owned(),
        };
        let id = self.store.create(record).await?;
        let image = pending.keep();

        let result = self.store.get(id).await?.ok_or_else(|| {
            PaletteError::PersistenceFailure(format!("record {id} missing after insert"))
        })?;

        info!(
            id,
            digest = %image.digest,
            bytes = image.byte_count,
            n_colors,
            "Palette extracted"
        );
        Ok(result)
    }

    /// Delete every record and the files they referenced.
    ///
    /// Returns the number of records removed. Files already gone are
    /// skipped; other removal errors are logged, not returned.
    pub async fn clear_history(&self) -> Result<usize> {
        let paths = self.store.delete_all().await?;

        for path in &paths {
            match remove_stored_file(Path::new(path)).await {
                Ok(true) => debug!(path = %path, "Removed artifact"),
                Ok(false) => debug!(path = %path, "Artifact already missing"),
                Err(e) => warn!(path = %path, error = %e, "Failed to remove artifact"),
            }
        }

        info!(records = paths.len(), "History cleared");
        Ok(paths.len())
    }

    /// Most recent results, `limit` clamped to `[1, 100]`.
    pub async fn history(&self, limit: usize) -> Result<Vec<PaletteResult>> {
        self.store.list(clamp_history_limit(limit)).await
    }

    pub async fn result(&self, id: i64) -> Result<Option<PaletteResult>> {
        self.store.get(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::ReaderSource;
    use async_trait::async_trait;
    use chrono::Utc;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::sync::Mutex;

    #[derive(Default)]
    struct VecStore {
        rows: Mutex<Vec<PaletteResult>>,
    }

    #[async_trait]
    impl PaletteRecordStore for VecStore {
        async fn create(&self, record: NewPaletteRecord) -> Result<i64> {
            let mut rows = self.rows.lock().unwrap();
            let id = rows.len() as i64 + 1;
            rows.push(PaletteResult::from_new(id, Utc::now(), record));
            Ok(id)
        }

        async fn get(&self, id: i64) -> Result<Option<PaletteResult>> {
            Ok(self.rows.lock().unwrap().iter().find(|r| r.id == id).cloned())
        }

        async fn list(&self, limit: usize) -> Result<Vec<PaletteResult>> {
            Ok(self.rows.lock().unwrap().iter().rev().take(limit).cloned().collect())
        }

        async fn delete_all(&self) -> Result<Vec<String>> {
            let rows = std::mem::take(&mut *self.rows.lock().unwrap());
            Ok(rows.into_iter().map(|r| r.image_path).collect())
        }
    }

    struct FailingStore;

    #[async_trait]
    impl PaletteRecordStore for FailingStore {
        async fn create(&self, _record: NewPaletteRecord) -> Result<i64> {
            Err(PaletteError::PersistenceFailure("disk full".into()))
        }

        async fn get(&self, _id: i64) -> Result<Option<PaletteResult>> {
            Ok(None)
        }

        async fn list(&self, _limit: usize) -> Result<Vec<PaletteResult>> {
            Ok(vec![])
        }

        async fn delete_all(&self) -> Result<Vec<String>> {
            Ok(vec![])
        }
    }

    fn solid_png(rgb: [u8; 3]) -> Vec<u8> {
        let img = RgbImage::from_pixel(24, 16, Rgb(rgb));
        let mut buf = std::io::Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    fn service(store: Arc<dyn PaletteRecordStore>, dir: &Path) -> PaletteService {
        PaletteService::new(store, dir.join("uploads"), IngestConfig::default())
    }

    fn file_count(dir: &Path) -> usize {
        std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
    }

    #[tokio::test]
    async fn test_extract_and_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(Arc::new(VecStore::default()), dir.path());
        let png = solid_png([255, 0, 0]);
        let mut source = ReaderSource::new(&png[..], Some("../../red.png".into()));

        let result = svc.extract_and_store(&mut source, None, 2).await.unwrap();

        assert_eq!(result.filename, "red.png");
        assert_eq!(result.n_colors, 2);
        assert_eq!(result.palette.len(), 2);
        assert!(result.palette.iter().all(|e| e.hex == "#ff0000"));
        assert_eq!(result.digest.len(), 64);
        assert!(result.image_file_name().ends_with("_red.png"));
        assert!(Path::new(&result.image_path).exists());

        let fetched = svc.result(result.id).await.unwrap().unwrap();
        assert_eq!(fetched, result);
    }

    #[tokio::test]
    async fn test_color_count_is_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(Arc::new(VecStore::default()), dir.path());
        let png = solid_png([1, 2, 3]);

        let mut source = ReaderSource::new(&png[..], None);
        let result = svc.extract_and_store(&mut source, Some("x.png"), 99).await.unwrap();
        assert_eq!(result.n_colors, 12);
        assert_eq!(result.palette.len(), 12);

        let mut source = ReaderSource::new(&png[..], None);
        let result = svc.extract_and_store(&mut source, None, 0).await.unwrap();
        assert_eq!(result.n_colors, 1);
        assert_eq!(result.filename, "upload");
    }

    #[tokio::test]
    async fn test_decode_failure_removes_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(Arc::new(VecStore::default()), dir.path());
        let mut source = ReaderSource::new(&b"definitely not an image"[..], None);

        let err = svc
            .extract_and_store(&mut source, Some("bad.png"), 3)
            .await
            .unwrap_err();

        assert!(matches!(err, PaletteError::DecodeError(_)));
        assert_eq!(file_count(svc.upload_dir()), 0);
        assert!(svc.history(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_persistence_failure_removes_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(Arc::new(FailingStore), dir.path());
        let png = solid_png([9, 9, 9]);
        let mut source = ReaderSource::new(&png[..], None);

        let err = svc
            .extract_and_store(&mut source, Some("gray.png"), 3)
            .await
            .unwrap_err();

        assert!(matches!(err, PaletteError::PersistenceFailure(_)));
        assert_eq!(file_count(svc.upload_dir()), 0);
    }

    #[tokio::test]
    async fn test_empty_upload_is_client_error() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(Arc::new(VecStore::default()), dir.path());
        let mut source = ReaderSource::new(&b""[..], None);

        let err = svc.extract_and_store(&mut source, None, 3).await.unwrap_err();
        assert!(matches!(err, PaletteError::EmptyUpload));
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn test_clear_history_removes_files() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(Arc::new(VecStore::default()), dir.path());

        for (i, rgb) in [[10, 20, 30], [40, 50, 60]].into_iter().enumerate() {
            let png = solid_png(rgb);
            let mut source = ReaderSource::new(&png[..], Some(format!("img{i}.png")));
            svc.extract_and_store(&mut source, None, 1).await.unwrap();
        }
        assert_eq!(file_count(svc.upload_dir()), 2);

        // A file already removed by hand must not fail the clear
        let history = svc.history(10).await.unwrap();
        std::fs::remove_file(&history[0].image_path).unwrap();

        assert_eq!(svc.clear_history().await.unwrap(), 2);
        assert_eq!(file_count(svc.upload_dir()), 0);
        assert!(svc.history(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_history_newest_first_and_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(Arc::new(VecStore::default()), dir.path());

        for i in 0..3u8 {
            let png = solid_png([i * 50, 0, 0]);
            let mut source = ReaderSource::new(&png[..], Some(format!("{i}.png")));
            svc.extract_and_store(&mut source, None, 1).await.unwrap();
        }

        let history = svc.history(0).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].filename, "2.png");

        let ids: Vec<i64> = svc.history(100).await.unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn test_dropped_pending_upload_is_removed() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(Arc::new(VecStore::default()), dir.path());
        let png = solid_png([5, 5, 5]);
        let mut source = ReaderSource::new(&png[..], None);

        let pending = svc.ingest_upload(&mut source, Some("later.png")).await.unwrap();
        assert_eq!(pending.original_name(), "later.png");
        assert!(pending.image().stored_path.exists());
        assert_eq!(file_count(svc.upload_dir()), 1);

        drop(pending);
        assert_eq!(file_count(svc.upload_dir()), 0);
    }
}
