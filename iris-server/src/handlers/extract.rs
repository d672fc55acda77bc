//! Palette extraction handler
//!
//! Handles POST /api/extract requests: stream the image to disk, cluster it,
//! store and return the palette.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use iris_core::{color_count_or_default, PendingUpload};

use crate::error::ApiError;
use crate::handlers::response::PaletteResultResponse;
use crate::multipart::{multipart_error, FieldSource};
use crate::state::AppState;
use crate::validation::{parse_color_count, validate_content_type};

/// Extract a colour palette from an uploaded image
///
/// Accepts multipart/form-data with:
/// - **image** or **file** (required): the image (max 10 MiB by default)
/// - **n_colors** (optional): palette size, clamped to 1..=12 (default: 3)
///
/// Colours are ordered by how many pixels they represent, most prevalent
/// first, and expressed as `#rrggbb` and OKLCH.
#[utoipa::path(
    post,
    path = "/api/extract",
    tag = "Palettes",
    request_body(
        content_type = "multipart/form-data",
        description = "Image file plus optional n_colors"
    ),
    responses(
        (status = 201, description = "Palette extracted and stored", body = PaletteResultResponse),
        (status = 400, description = "Missing or empty upload, invalid n_colors"),
        (status = 413, description = "Upload exceeds the size limit"),
        (status = 422, description = "Upload is not a decodable image"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn extract_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<PaletteResultResponse>), ApiError> {
    let limit = state.service.ingest_config().max_bytes;
    let mut pending: Option<PendingUpload> = None;
    let mut n_colors: Option<i64> = None;

    // Parse multipart form; the image is ingested as soon as its field arrives
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::from(multipart_error(e, limit)))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "image" | "file" if pending.is_none() => {
                validate_content_type(field.content_type())?;

                let mut source = FieldSource::new(field, state.service.ingest_config());
                pending = Some(state.service.ingest_upload(&mut source, None).await?);
            }
            "n_colors" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read n_colors: {}", e)))?;
                n_colors = parse_color_count(&value)?;
            }
            _ => {}
        }
    }

    let pending = pending.ok_or_else(|| {
        ApiError::bad_request("No image provided. Use 'image' or 'file' field in multipart form.")
    })?;

    let result = state
        .service
        .complete(pending, color_count_or_default(n_colors))
        .await?;

    Ok((StatusCode::CREATED, Json(result.into())))
}
