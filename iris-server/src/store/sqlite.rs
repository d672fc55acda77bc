//! SQLite palette record store
//!
//! One row per extraction in `palette_results`. The palette is kept as
//! compact JSON and re-validated on every read.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use iris_core::{
    palette_to_json, parse_palette_json, NewPaletteRecord, PaletteError, PaletteRecordStore,
    PaletteResult, Result,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;

/// Row shape of `palette_results`
#[derive(Debug, Clone, FromRow)]
struct PaletteRow {
    id: i64,
    filename: String,
    sha256: String,
    n_colors: i64,
    palette_json: String,
    image_path: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<PaletteRow> for PaletteResult {
    type Error = PaletteError;

    fn try_from(row: PaletteRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            filename: row.filename,
            digest: row.sha256,
            n_colors: usize::try_from(row.n_colors).map_err(|_| {
                PaletteError::InvalidPalette(format!("row {}: negative n_colors", row.id))
            })?,
            palette: parse_palette_json(&row.palette_json)?,
            image_path: row.image_path,
            created_at: row.created_at,
        })
    }
}

fn db_error(err: sqlx::Error) -> PaletteError {
    PaletteError::PersistenceFailure(err.to_string())
}

/// sqlx-backed record store
#[derive(Clone)]
pub struct SqlitePaletteStore {
    pool: SqlitePool,
}

impl SqlitePaletteStore {
    /// Open (creating if missing) the database at `database_url`
    pub async fn connect(database_url: &str, max_connections: u32) -> std::result::Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await?;

        tracing::info!("Connected to SQLite database");
        Ok(Self { pool })
    }

    /// Create from an existing pool
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Run database migrations
    pub async fn migrate(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Database migrations completed");
        Ok(())
    }

    /// Check database connection health
    pub async fn check_health(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(())
    }
}

#[async_trait]
impl PaletteRecordStore for SqlitePaletteStore {
    async fn create(&self, record: NewPaletteRecord) -> Result<i64> {
        let palette_json = palette_to_json(&record.palette)?;
        let n_colors = i64::try_from(record.n_colors)
            .map_err(|_| PaletteError::Internal("n_colors out of range".into()))?;

        let outcome = sqlx::query(
            r#"
            INSERT INTO palette_results (filename, sha256, n_colors, palette_json, image_path, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.filename)
        .bind(&record.digest)
        .bind(n_colors)
        .bind(&palette_json)
        .bind(&record.image_path)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(outcome.last_insert_rowid())
    }

    async fn get(&self, id: i64) -> Result<Option<PaletteResult>> {
        let row = sqlx::query_as::<_, PaletteRow>(
            r#"
            SELECT id, filename, sha256, n_colors, palette_json, image_path, created_at
            FROM palette_results
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.map(PaletteResult::try_from).transpose()
    }

    async fn list(&self, limit: usize) -> Result<Vec<PaletteResult>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = sqlx::query_as::<_, PaletteRow>(
            r#"
            SELECT id, filename, sha256, n_colors, palette_json, image_path, created_at
            FROM palette_results
            ORDER BY id DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.into_iter().map(PaletteResult::try_from).collect()
    }

    async fn delete_all(&self) -> Result<Vec<String>> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let paths: Vec<(String,)> = sqlx::query_as("SELECT image_path FROM palette_results")
            .fetch_all(&mut *tx)
            .await
            .map_err(db_error)?;
        sqlx::query("DELETE FROM palette_results")
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

        tx.commit().await.map_err(db_error)?;

        Ok(paths
            .into_iter()
            .map(|(path,)| path)
            .filter(|path| !path.is_empty())
            .collect())
    }
}
