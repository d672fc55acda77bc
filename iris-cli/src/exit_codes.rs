//! Exit codes following sysexits.h conventions.
//!
//! Scripts can tell a bad argument apart from an unreadable file or an
//! image that failed to decode.

use std::io::ErrorKind;

use iris_core::PaletteError;

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// General error (catch-all).
pub const GENERAL_ERROR: i32 = 1;

/// Command line usage error (invalid arguments, malformed hex).
/// Maps to EX_USAGE from sysexits.h.
pub const USAGE_ERROR: i32 = 64;

/// Input data could not be decoded as an image.
/// Maps to EX_DATAERR from sysexits.h.
pub const DATA_ERROR: i32 = 65;

/// Cannot open input file.
/// Maps to EX_NOINPUT from sysexits.h.
pub const INPUT_ERROR: i32 = 66;

/// I/O error (cannot write output).
/// Maps to EX_IOERR from sysexits.h.
pub const IO_ERROR: i32 = 74;

/// Represents an exit code with optional error context.
pub struct ExitCode {
    pub code: i32,
    pub message: Option<String>,
}

impl ExitCode {
    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        let palette_error = err
            .chain()
            .find_map(|cause| cause.downcast_ref::<PaletteError>());

        let code = match palette_error {
            Some(PaletteError::InvalidHex(_)) => USAGE_ERROR,
            Some(PaletteError::DecodeError(_)) | Some(PaletteError::EmptyUpload) => DATA_ERROR,
            Some(PaletteError::Io(io)) => io_error_code(io),
            Some(_) => GENERAL_ERROR,
            None => {
                if let Some(io) = err.chain().find_map(|c| c.downcast_ref::<std::io::Error>()) {
                    io_error_code(io)
                } else if err.chain().any(|c| c.is::<serde_json::Error>()) {
                    IO_ERROR
                } else {
                    GENERAL_ERROR
                }
            }
        };

        Self {
            code,
            message: Some(format!("{err:#}")),
        }
    }
}

/// Missing or unreadable input is EX_NOINPUT; anything else is EX_IOERR.
fn io_error_code(err: &std::io::Error) -> i32 {
    match err.kind() {
        ErrorKind::NotFound | ErrorKind::PermissionDenied => INPUT_ERROR,
        _ => IO_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_invalid_hex_is_usage_error() {
        let err = anyhow::Error::from(PaletteError::InvalidHex("zzz".into()));
        assert_eq!(ExitCode::from_anyhow(&err).code, USAGE_ERROR);
    }

    #[test]
    fn test_decode_error_behind_context_is_data_error() {
        let result: Result<(), PaletteError> =
            Err(PaletteError::DecodeError("not an image".into()));
        let err = result.context("Failed to extract palette").unwrap_err();
        let exit = ExitCode::from_anyhow(&err);
        assert_eq!(exit.code, DATA_ERROR);
        assert!(exit.message.unwrap().contains("not an image"));
    }

    #[test]
    fn test_unreadable_file_is_input_error() {
        let result: Result<Vec<u8>, std::io::Error> = std::fs::read("/definitely/not/here.png");
        let err = result.context("Failed to read file: here.png").unwrap_err();
        assert_eq!(ExitCode::from_anyhow(&err).code, INPUT_ERROR);
    }

    #[test]
    fn test_io_errors_classified_by_kind() {
        let denied = anyhow::Error::from(std::io::Error::new(ErrorKind::PermissionDenied, "no"))
            .context("Opening input");
        assert_eq!(ExitCode::from_anyhow(&denied).code, INPUT_ERROR);

        let broken = anyhow::Error::from(std::io::Error::new(ErrorKind::BrokenPipe, "closed"))
            .context("Writing output");
        assert_eq!(ExitCode::from_anyhow(&broken).code, IO_ERROR);

        // Classification does not depend on the context wording
        let missing = anyhow::Error::from(std::io::Error::new(ErrorKind::NotFound, "gone"))
            .context("something unrelated");
        assert_eq!(ExitCode::from_anyhow(&missing).code, INPUT_ERROR);
    }

    #[test]
    fn test_other_errors_are_general() {
        let err = anyhow::anyhow!("something else");
        assert_eq!(ExitCode::from_anyhow(&err).code, GENERAL_ERROR);
    }
}
