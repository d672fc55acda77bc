//! Checks applied to multipart fields before they reach the pipeline.

use crate::error::ApiError;

/// Media types accepted for the image field. Matching is by prefix.
const ACCEPTED_MEDIA_TYPES: &[&str] = &["image/", "application/octet-stream"];

/// Rejects file fields whose declared type cannot be an image.
///
/// A missing type is accepted; the decoder has the final say either way.
pub fn validate_content_type(content_type: Option<&str>) -> Result<(), ApiError> {
    let Some(declared) = content_type else {
        return Ok(());
    };

    let normalized = declared.trim().to_ascii_lowercase();
    if ACCEPTED_MEDIA_TYPES
        .iter()
        .any(|accepted| normalized.starts_with(accepted))
    {
        return Ok(());
    }

    Err(ApiError::bad_request(format!(
        "Unsupported Content-Type '{declared}', expected an image"
    )))
}

/// Parses the `n_colors` form field.
///
/// Any integer is accepted here; the range is clamped later. Blank values
/// count as absent.
pub fn parse_color_count(value: &str) -> Result<Option<i64>, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<i64>()
        .map(Some)
        .map_err(|_| ApiError::bad_request(format!("n_colors must be an integer, got '{trimmed}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_types_accepted() {
        for ct in ["image/png", "image/jpeg", "image/webp", "IMAGE/GIF", " image/bmp"] {
            assert!(validate_content_type(Some(ct)).is_ok(), "{ct}");
        }
    }

    #[test]
    fn test_binary_or_missing_type_accepted() {
        assert!(validate_content_type(Some("application/octet-stream")).is_ok());
        assert!(validate_content_type(None).is_ok());
    }

    #[test]
    fn test_other_types_rejected() {
        for ct in ["text/html", "application/json", "video/mp4"] {
            assert!(validate_content_type(Some(ct)).is_err(), "{ct}");
        }
    }

    #[test]
    fn test_parse_color_count() {
        assert_eq!(parse_color_count("5").unwrap(), Some(5));
        assert_eq!(parse_color_count(" 40 ").unwrap(), Some(40));
        assert_eq!(parse_color_count("-3").unwrap(), Some(-3));
        assert_eq!(parse_color_count("").unwrap(), None);
        assert!(parse_color_count("five").is_err());
        assert!(parse_color_count("2.5").is_err());
    }
}
