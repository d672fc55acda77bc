//! In-memory palette record store
//!
//! Used by tests and by deployments that do not need history to survive a
//! restart (`DATABASE_URL=memory`).

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use iris_core::{NewPaletteRecord, PaletteRecordStore, PaletteResult, Result};

/// DashMap-backed store with monotonically increasing ids.
#[derive(Default)]
pub struct MemoryPaletteStore {
    records: DashMap<i64, PaletteResult>,
    last_id: AtomicI64,
}

impl MemoryPaletteStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl PaletteRecordStore for MemoryPaletteStore {
    async fn create(&self, record: NewPaletteRecord) -> Result<i64> {
        let id = self.last_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.records
            .insert(id, PaletteResult::from_new(id, Utc::now(), record));
        Ok(id)
    }

    async fn get(&self, id: i64) -> Result<Option<PaletteResult>> {
        Ok(self.records.get(&id).map(|entry| entry.value().clone()))
    }

    async fn list(&self, limit: usize) -> Result<Vec<PaletteResult>> {
        let mut results: Vec<PaletteResult> =
            self.records.iter().map(|entry| entry.value().clone()).collect();
        results.sort_by(|a, b| b.id.cmp(&a.id));
        results.truncate(limit);
        Ok(results)
    }

    async fn delete_all(&self) -> Result<Vec<String>> {
        let ids: Vec<i64> = self.records.iter().map(|entry| *entry.key()).collect();
        Ok(ids
            .into_iter()
            .filter_map(|id| self.records.remove(&id))
            .map(|(_, record)| record.image_path)
            .collect())
    }
}
