//! Router assembly: API routes, static uploads and the middleware stack.

use std::{sync::Arc, time::Duration};

use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method, StatusCode},
    routing::{get, post},
    Router,
};
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::handlers::{
    clear_history_handler, extract_handler, health, history_handler, ready, result_handler,
    UPLOADS_ROUTE,
};
use crate::openapi::openapi_json;
use crate::state::AppState;

/// Router with [`Config::default`] settings, as used by the tests.
pub fn create_router(state: AppState) -> Router {
    create_router_with_config(state, &Config::default())
}

pub fn create_router_with_config(state: AppState, config: &Config) -> Router {
    let uploads = ServeDir::new(state.service.upload_dir());

    let router = Router::new()
        .route("/api/extract", post(extract_handler))
        .route("/api/history", get(history_handler))
        .route("/api/history/clear", post(clear_history_handler))
        .route("/api/result/{id}", get(result_handler))
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/api-docs/openapi.json", get(openapi_json))
        .nest_service(UPLOADS_ROUTE, uploads)
        .with_state(state)
        // Uploads stream through ingestion, which enforces its own cap
        .layer(DefaultBodyLimit::disable())
        .layer(cors_layer(config))
        .layer(RequestBodyLimitLayer::new(config.body_limit_mb * 1024 * 1024))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.timeout_secs),
        ));

    let router = if config.rate_limit_enabled {
        with_rate_limit(router, config)
    } else {
        warn!("Rate limiting disabled");
        router
    };

    router.layer(TraceLayer::new_for_http())
}

fn cors_layer(config: &Config) -> CorsLayer {
    match config.allowed_origins.as_deref() {
        Some(origins) if !origins.is_empty() => {
            let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            info!(count = origins.len(), "CORS restricted to configured origins");
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        }
        _ => {
            warn!("CORS open to any origin");
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    }
}

fn with_rate_limit(router: Router, config: &Config) -> Router {
    let Some(governor) = GovernorConfigBuilder::default()
        .per_second(config.rate_limit_per_sec)
        .burst_size(config.rate_limit_burst)
        .finish()
    else {
        error!(
            per_sec = config.rate_limit_per_sec,
            burst = config.rate_limit_burst,
            "Invalid rate limit settings, serving without a limiter"
        );
        return router;
    };

    info!(
        per_sec = config.rate_limit_per_sec,
        burst = config.rate_limit_burst,
        "Rate limiting enabled"
    );
    router.layer(GovernorLayer::new(Arc::new(governor)))
}
