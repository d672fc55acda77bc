//! Streaming multipart upload source
//!
//! Adapts an axum multipart field into an [`UploadSource`] so the file is
//! fed to ingestion chunk by chunk instead of being buffered whole.

use async_trait::async_trait;
use axum::extract::multipart::{Field, MultipartError};
use axum::http::StatusCode;
use iris_core::{IngestConfig, PaletteError, UploadSource};

/// Map a multipart read failure onto the pipeline taxonomy.
pub fn multipart_error(err: MultipartError, limit: u64) -> PaletteError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        PaletteError::PayloadTooLarge { limit }
    } else {
        PaletteError::InvalidUpload(err.body_text())
    }
}

/// A file field read in chunks of at least `chunk_size` bytes (the last
/// chunk may be shorter).
pub struct FieldSource<'a> {
    field: Field<'a>,
    chunk_size: usize,
    limit: u64,
    file_name: Option<String>,
}

impl<'a> FieldSource<'a> {
    pub fn new(field: Field<'a>, config: &IngestConfig) -> Self {
        let file_name = field.file_name().map(str::to_string);
        Self {
            field,
            chunk_size: config.chunk_size.max(1),
            limit: config.max_bytes,
            file_name,
        }
    }
}

#[async_trait]
impl<'a> UploadSource for FieldSource<'a> {
    fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    async fn next_chunk(&mut self) -> iris_core::Result<Option<Vec<u8>>> {
        let mut buffer: Vec<u8> = Vec::new();

        while buffer.len() < self.chunk_size {
            match self.field.chunk().await {
                Ok(Some(bytes)) => buffer.extend_from_slice(&bytes),
                Ok(None) => break,
                Err(e) => return Err(multipart_error(e, self.limit)),
            }
        }

        if buffer.is_empty() {
            Ok(None)
        } else {
            Ok(Some(buffer))
        }
    }
}
