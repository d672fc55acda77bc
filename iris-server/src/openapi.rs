//! OpenAPI documentation configuration
//!
//! Generates the OpenAPI 3 document served at `/api-docs/openapi.json`.

use axum::Json;
use utoipa::OpenApi;

use crate::handlers::{
    ClearHistoryResponse, HealthResponse, HistoryResponse, PaletteResultResponse, ReadyResponse,
};

/// Iris Palette API - OpenAPI Documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Iris - Palette API",
        version = "0.1.0",
        description = r#"
## Image to Palette

Upload an image and receive its dominant colours:

1. The upload is streamed to disk, size-capped and hashed with SHA-256
2. The image is downsampled and clustered with seeded k-means in RGB
3. Clusters are ordered by pixel population
4. Each colour is returned as `#rrggbb` and OKLCH (`L`, `c`, `h`)

Identical input always yields an identical palette. Achromatic colours
report `h = 0`.
"#,
        license(name = "MIT OR Apache-2.0")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    tags(
        (name = "Palettes", description = "Extract palettes from uploaded images"),
        (name = "History", description = "Browse and clear stored results"),
        (name = "Health", description = "Service health and readiness endpoints")
    ),
    paths(
        crate::handlers::health::health,
        crate::handlers::health::ready,
        crate::handlers::extract::extract_handler,
        crate::handlers::history::history_handler,
        crate::handlers::history::result_handler,
        crate::handlers::history::clear_history_handler,
    ),
    components(
        schemas(
            HealthResponse,
            ReadyResponse,
            PaletteResultResponse,
            HistoryResponse,
            ClearHistoryResponse,
        )
    )
)]
pub struct ApiDoc;

/// GET /api-docs/openapi.json
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
