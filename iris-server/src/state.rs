//! Application state module
//!
//! Defines shared state accessible across all request handlers.

use std::path::Path;
use std::sync::Arc;

use iris_core::{IngestConfig, PaletteRecordStore, PaletteService};
use thiserror::Error;

use crate::config::{Config, StoreBackend};
use crate::store::{MemoryPaletteStore, SqlitePaletteStore};

/// Failures while assembling the application state at startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Failed to prepare data directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Application state containing shared resources.
#[derive(Clone)]
pub struct AppState {
    /// Ingestion, extraction and history operations
    pub service: PaletteService,
    /// SQLite handle for readiness checks (absent for the in-memory store)
    pub sqlite: Option<SqlitePaletteStore>,
}

impl AppState {
    /// State over the in-memory record store.
    pub fn in_memory(upload_dir: &Path, ingest: IngestConfig) -> Self {
        let store: Arc<dyn PaletteRecordStore> = Arc::new(MemoryPaletteStore::new());
        Self {
            service: PaletteService::new(store, upload_dir, ingest),
            sqlite: None,
        }
    }

    /// Create directories, connect the configured store and run migrations.
    pub async fn from_config(config: &Config) -> Result<Self, StartupError> {
        let upload_dir = config.upload_dir();
        tokio::fs::create_dir_all(&upload_dir).await?;

        match config.store_backend() {
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory record store; history is lost on restart");
                Ok(Self::in_memory(&upload_dir, config.ingest_config()))
            }
            StoreBackend::Sqlite(url) => {
                let store =
                    SqlitePaletteStore::connect(&url, config.database_max_connections).await?;
                store.migrate().await?;

                let shared: Arc<dyn PaletteRecordStore> = Arc::new(store.clone());
                Ok(Self {
                    service: PaletteService::new(shared, upload_dir, config.ingest_config()),
                    sqlite: Some(store),
                })
            }
        }
    }
}
