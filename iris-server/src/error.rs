//! API error handling module
//!
//! Provides a unified error type for all API endpoints with structured error variants.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use iris_core::PaletteError;
use thiserror::Error;

/// API error type with structured variants for different error categories
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad request - client provided invalid input
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Not found - requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Error from the palette pipeline
    #[error("Palette error: {0}")]
    Palette(#[from] PaletteError),
}

impl ApiError {
    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Palette(ref e) => match e {
                // Rejected uploads → 400/413
                PaletteError::EmptyUpload
                | PaletteError::InvalidUpload(_)
                | PaletteError::InvalidHex(_) => StatusCode::BAD_REQUEST,
                PaletteError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,

                // Valid upload that is not a decodable image → 422
                PaletteError::DecodeError(_) => StatusCode::UNPROCESSABLE_ENTITY,

                // Processing failures → 500
                PaletteError::InvalidPalette(_)
                | PaletteError::PersistenceFailure(_)
                | PaletteError::Internal(_)
                | PaletteError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Get the error code for programmatic error handling
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "INVALID_INPUT",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Palette(ref e) => match e {
                PaletteError::EmptyUpload => "EMPTY_UPLOAD",
                PaletteError::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE",
                PaletteError::InvalidUpload(_) | PaletteError::InvalidHex(_) => "INVALID_INPUT",
                PaletteError::DecodeError(_) => "DECODE_ERROR",
                PaletteError::PersistenceFailure(_) => "PERSISTENCE_FAILURE",
                PaletteError::InvalidPalette(_)
                | PaletteError::Internal(_)
                | PaletteError::Io(_) => "INTERNAL_ERROR",
            },
        }
    }

    /// Get sanitized error message for client response
    fn client_message(&self) -> String {
        match self {
            Self::BadRequest(msg) | Self::NotFound(msg) => msg.clone(),
            Self::Palette(ref e) => match e {
                PaletteError::EmptyUpload => "Empty upload.".to_string(),
                PaletteError::PayloadTooLarge { limit } => {
                    format!("Upload exceeds maximum size of {} bytes", limit)
                }
                PaletteError::InvalidUpload(_) => "Malformed upload".to_string(),
                PaletteError::InvalidHex(value) => format!("Invalid hex color: {}", value),
                PaletteError::DecodeError(_) => "Uploaded file is not a readable image".to_string(),
                PaletteError::PersistenceFailure(_) => "Failed to store result".to_string(),
                PaletteError::InvalidPalette(_)
                | PaletteError::Internal(_)
                | PaletteError::Io(_) => "Failed to extract palette".to_string(),
            },
        }
    }

    /// Get the error category for logging
    fn error_category(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::NotFound(_) => "not_found",
            Self::Palette(_) => "palette",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let category = self.error_category();
        let code = self.error_code();
        let internal_message = self.to_string();
        let client_message = self.client_message();

        // Log based on severity, always including internal details
        if status.is_client_error() {
            tracing::warn!(
                status = %status,
                category = category,
                code = code,
                error = %internal_message,
                "Client error"
            );
        } else {
            tracing::error!(
                status = %status,
                category = category,
                code = code,
                error = %internal_message,
                client_message = %client_message,
                "Server error (internal details logged)"
            );
        }

        // All error responses include a `code` field for programmatic error handling
        let body = serde_json::json!({
            "error": client_message,
            "code": code,
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_errors_are_client_errors() {
        let cases = [
            (ApiError::from(PaletteError::EmptyUpload), 400, "EMPTY_UPLOAD"),
            (
                ApiError::from(PaletteError::PayloadTooLarge { limit: 10 }),
                413,
                "PAYLOAD_TOO_LARGE",
            ),
            (
                ApiError::from(PaletteError::InvalidUpload("cut".into())),
                400,
                "INVALID_INPUT",
            ),
            (ApiError::bad_request("n_colors"), 400, "INVALID_INPUT"),
            (ApiError::not_found("Result not found."), 404, "NOT_FOUND"),
        ];

        for (err, status, code) in cases {
            assert_eq!(err.status_code().as_u16(), status, "{err}");
            assert_eq!(err.error_code(), code);
        }
    }

    #[test]
    fn test_processing_errors_are_server_errors() {
        let decode = ApiError::from(PaletteError::DecodeError("png: bad crc".into()));
        assert_eq!(decode.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(decode.error_code(), "DECODE_ERROR");

        let db = ApiError::from(PaletteError::PersistenceFailure("locked".into()));
        assert_eq!(db.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(db.error_code(), "PERSISTENCE_FAILURE");
    }

    #[test]
    fn test_internal_details_are_not_exposed() {
        let err = ApiError::from(PaletteError::PersistenceFailure(
            "database is locked at /srv/data/app.db".into(),
        ));
        assert!(!err.client_message().contains("/srv"));

        let err = ApiError::from(PaletteError::Internal(
            "extraction task failed: task 7 panicked".into(),
        ));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error_code(), "INTERNAL_ERROR");
        assert!(!err.client_message().contains("panicked"));
    }
}
