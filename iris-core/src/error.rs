use thiserror::Error;

#[derive(Error, Debug)]
pub enum PaletteError {
    #[error("Empty upload")]
    EmptyUpload,

    #[error("Upload exceeds maximum size of {limit} bytes")]
    PayloadTooLarge { limit: u64 },

    #[error("Malformed upload: {0}")]
    InvalidUpload(String),

    #[error("Invalid hex color: {0}")]
    InvalidHex(String),

    #[error("Cannot decode image: {0}")]
    DecodeError(String),

    #[error("Invalid stored palette: {0}")]
    InvalidPalette(String),

    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PaletteError {
    /// True when the caller supplied invalid input, as opposed to a valid
    /// request that failed during processing.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyUpload
                | Self::PayloadTooLarge { .. }
                | Self::InvalidUpload(_)
                | Self::InvalidHex(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, PaletteError>;

/// Default upload limit (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Default read size for upload streams (1 MiB).
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

/// Bounds for the requested palette size.
pub const MIN_COLORS: usize = 1;
pub const MAX_COLORS: usize = 12;
pub const DEFAULT_COLORS: usize = 3;
