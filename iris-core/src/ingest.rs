//! Streaming, bounded, content-hashed upload intake.
//!
//! An upload is copied chunk by chunk into a uniquely named temporary file
//! inside the upload directory while a SHA-256 digest is updated alongside.
//! Only once the stream is exhausted and within bounds is the temporary
//! file renamed into place as `{digest[..16]}_{sanitized name}`.
//!
//! The temporary file is owned by a [`tempfile::NamedTempFile`] guard, so
//! every early return, error and dropped future (cancellation, timeout)
//! removes it.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tracing::{debug, warn};

use crate::error::{PaletteError, Result, DEFAULT_CHUNK_SIZE, DEFAULT_MAX_UPLOAD_BYTES};

/// Substitute for names that sanitize to nothing.
pub const PLACEHOLDER_NAME: &str = "upload";

/// Hex characters of the digest used as the stored file name prefix.
pub const DIGEST_PREFIX_LEN: usize = 16;

/// Longest sanitized name kept in a stored file name (in characters).
const MAX_SANITIZED_CHARS: usize = 128;

/// What happens when the computed final path already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionPolicy {
    /// Replace the existing file. The name embeds the content digest, so
    /// the replaced bytes are identical up to a 64-bit prefix collision.
    #[default]
    Overwrite,
    /// Keep the existing file and store under `name-1.ext`, `name-2.ext`, ...
    Disambiguate,
}

impl std::str::FromStr for CollisionPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "overwrite" => Ok(Self::Overwrite),
            "disambiguate" => Ok(Self::Disambiguate),
            other => Err(format!("unknown collision policy '{other}'")),
        }
    }
}

/// Limits applied while ingesting an upload.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Largest accepted upload in bytes (inclusive).
    pub max_bytes: u64,
    /// Read size used by [`ReaderSource`].
    pub chunk_size: usize,
    pub collision: CollisionPolicy,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            chunk_size: DEFAULT_CHUNK_SIZE,
            collision: CollisionPolicy::default(),
        }
    }
}

/// A finalized upload on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestedImage {
    /// Lowercase hex SHA-256 of the full stream.
    pub digest: String,
    pub stored_path: PathBuf,
    pub byte_count: u64,
    /// True when the rename replaced a file that was already at `stored_path`.
    pub replaced_existing: bool,
}

impl IngestedImage {
    /// File name component of the stored path.
    pub fn file_name(&self) -> String {
        self.stored_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Remove the stored file after a failed request.
    ///
    /// A file that already existed before this upload (identical content
    /// under the same name) may belong to an earlier record and is kept.
    pub fn discard(&self) -> Result<()> {
        if self.replaced_existing {
            debug!(path = %self.stored_path.display(), "Keeping pre-existing artifact");
            return Ok(());
        }
        match std::fs::remove_file(&self.stored_path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// A chunked byte stream with an optional declared file name.
#[async_trait]
pub trait UploadSource: Send {
    /// File name declared by the client, if any.
    fn file_name(&self) -> Option<&str>;

    /// Next chunk of the stream; `None` once exhausted.
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>>;
}

/// Adapts any [`AsyncRead`] into fixed-size chunks.
pub struct ReaderSource<R> {
    reader: R,
    chunk_size: usize,
    file_name: Option<String>,
}

impl<R> ReaderSource<R>
where
    R: AsyncRead + Unpin + Send,
{
    pub fn new(reader: R, file_name: Option<String>) -> Self {
        Self::with_chunk_size(reader, file_name, DEFAULT_CHUNK_SIZE)
    }

    pub fn with_chunk_size(reader: R, file_name: Option<String>, chunk_size: usize) -> Self {
        Self {
            reader,
            chunk_size: chunk_size.max(1),
            file_name,
        }
    }
}

#[async_trait]
impl<R> UploadSource for ReaderSource<R>
where
    R: AsyncRead + Unpin + Send,
{
    fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>> {
        let mut chunk = vec![0u8; self.chunk_size];
        let mut filled = 0;
        // Fill the whole chunk unless the stream ends first
        while filled < chunk.len() {
            let n = self.reader.read(&mut chunk[filled..]).await?;
            if n == 0 {
                break;
            }
            filled += n;
        }

        if filled == 0 {
            return Ok(None);
        }
        chunk.truncate(filled);
        Ok(Some(chunk))
    }
}

/// Replace everything but alphanumerics, `-`, `_`, `.` and space with `_`,
/// then trim. Empty results become [`PLACEHOLDER_NAME`].
pub fn sanitize_filename(name: &str) -> String {
    let safe: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | ' ') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let trimmed = safe.trim();
    if trimmed.is_empty() {
        return PLACEHOLDER_NAME.to_string();
    }
    let truncated: String = trimmed.chars().take(MAX_SANITIZED_CHARS).collect();
    truncated.trim_end().to_string()
}

/// The last path component of a client-declared file name, or
/// [`PLACEHOLDER_NAME`] when none is usable.
pub fn original_file_name(declared: Option<&str>) -> String {
    declared
        .and_then(|name| name.rsplit(['/', '\\']).next())
        .map(str::trim)
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
        .map(str::to_string)
        .unwrap_or_else(|| PLACEHOLDER_NAME.to_string())
}

/// `{digest[..16]}_{sanitized name}`.
pub fn stored_file_name(digest: &str, original_name: &str) -> String {
    let prefix = digest.get(..DIGEST_PREFIX_LEN).unwrap_or(digest);
    format!("{}_{}", prefix, sanitize_filename(original_name))
}

/// `name.ext` -> `name-{n}.ext`; names without an extension get the suffix
/// appended.
fn numbered_file_name(file_name: &str, n: u32) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !stem.ends_with('_') => {
            format!("{stem}-{n}.{ext}")
        }
        _ => format!("{file_name}-{n}"),
    }
}

/// Remove a stored artifact. Returns `false` if it was already gone.
pub async fn remove_stored_file(path: &Path) -> Result<bool> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Stream `source` into `upload_dir` and promote it to its content-addressed
/// name.
///
/// Fails with [`PaletteError::PayloadTooLarge`] as soon as the running total
/// exceeds `config.max_bytes`, and with [`PaletteError::EmptyUpload`] when
/// the stream carried no bytes. No file is left behind on failure.
pub async fn ingest<S>(
    source: &mut S,
    original_name: &str,
    upload_dir: &Path,
    config: &IngestConfig,
) -> Result<IngestedImage>
where
    S: UploadSource + ?Sized,
{
    tokio::fs::create_dir_all(upload_dir).await?;

    let dir = upload_dir.to_path_buf();
    let (temp, handle) = run_blocking(move || {
        let temp = tempfile::Builder::new()
            .prefix(".upload-")
            .suffix(".part")
            .tempfile_in(&dir)?;
        let handle = temp.as_file().try_clone()?;
        Ok((temp, handle))
    })
    .await?;
    let mut file = tokio::fs::File::from_std(handle);

    let mut hasher = Sha256::new();
    let mut total: u64 = 0;

    while let Some(chunk) = source.next_chunk().await? {
        total += chunk.len() as u64;
        if total > config.max_bytes {
            debug!(
                limit = config.max_bytes,
                received = total,
                "Upload exceeded size limit"
            );
            return Err(PaletteError::PayloadTooLarge {
                limit: config.max_bytes,
            });
        }
        hasher.update(&chunk);
        file.write_all(&chunk).await?;
    }

    if total == 0 {
        return Err(PaletteError::EmptyUpload);
    }

    file.flush().await?;
    file.sync_all().await?;
    drop(file);

    let digest = hex::encode(hasher.finalize());
    let file_name = stored_file_name(&digest, original_name);
    let dir = upload_dir.to_path_buf();
    let policy = config.collision;
    let (stored_path, replaced_existing) =
        run_blocking(move || promote(temp, &dir, &file_name, policy)).await?;

    debug!(
        digest = %digest,
        bytes = total,
        path = %stored_path.display(),
        replaced_existing,
        "Upload ingested"
    );

    Ok(IngestedImage {
        digest,
        stored_path,
        byte_count: total,
        replaced_existing,
    })
}

/// Run a blocking filesystem step on tokio's blocking pool.
///
/// If the calling future is dropped the closure still runs to completion
/// and its result, including any temp file guard, is dropped there.
async fn run_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| PaletteError::Internal(format!("blocking filesystem task failed: {e}")))?
}

/// Atomically rename the temporary file to its final name.
fn promote(
    mut temp: NamedTempFile,
    upload_dir: &Path,
    file_name: &str,
    policy: CollisionPolicy,
) -> Result<(PathBuf, bool)> {
    let target = upload_dir.join(file_name);

    match policy {
        CollisionPolicy::Overwrite => {
            let existed = target.try_exists()?;
            if existed {
                warn!(path = %target.display(), "Overwriting artifact with identical name");
            }
            temp.persist(&target).map_err(|e| PaletteError::Io(e.error))?;
            Ok((target, existed))
        }
        CollisionPolicy::Disambiguate => {
            let mut candidate = target;
            let mut n = 0u32;
            loop {
                match temp.persist_noclobber(&candidate) {
                    Ok(_) => return Ok((candidate, false)),
                    Err(e) if e.error.kind() == std::io::ErrorKind::AlreadyExists => {
                        temp = e.file;
                        n += 1;
                        candidate = upload_dir.join(numbered_file_name(file_name, n));
                    }
                    Err(e) => return Err(PaletteError::Io(e.error)),
                }
            }
        }
    }
}
