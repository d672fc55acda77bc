//! HTTP request handlers
//!
//! This module contains all the request handlers for the API endpoints.

pub mod extract;
pub mod health;
pub mod history;
pub mod response;

pub use crate::state::AppState;
pub use extract::extract_handler;
pub use health::{health, ready, HealthResponse, ReadyResponse};
pub use history::{clear_history_handler, history_handler, result_handler, HistoryQuery};
pub use response::{
    ClearHistoryResponse, HistoryResponse, PaletteResultResponse, UPLOADS_ROUTE,
};
