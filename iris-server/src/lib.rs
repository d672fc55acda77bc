//! Iris Server Library - REST API components for palette extraction
//!
//! This library exposes the server components for use in integration tests.
//! The main binary uses these same components.

pub mod config;
pub mod error;
pub mod handlers;
pub mod multipart;
pub mod openapi;
pub mod routes;
pub mod state;
pub mod store;
pub mod validation;

pub use config::{Config, StoreBackend};
pub use error::ApiError;
pub use handlers::{ClearHistoryResponse, HistoryResponse, PaletteResultResponse};
pub use openapi::ApiDoc;
pub use routes::{create_router, create_router_with_config};
pub use state::{AppState, StartupError};
pub use store::{MemoryPaletteStore, SqlitePaletteStore};
