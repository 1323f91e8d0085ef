//! In-memory backing store
//!
//! Keeps rows per entity type in insertion order. Every read is counted so
//! callers can assert how often the cache fell through to the store.

use crate::constants::DEFAULT_PRIMARY_KEY_FIELD;
use async_trait::async_trait;
use atrium_domain::error::{Error, Result};
use atrium_domain::ports::providers::{BackingRow, BackingStore};
use dashmap::{DashMap, DashSet};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Read counters of an [`InMemoryBackingStore`]
#[derive(Debug, Default)]
pub struct StoreCallCounts {
    scans: AtomicUsize,
    finds: AtomicUsize,
    bulk_finds: AtomicUsize,
}

impl StoreCallCounts {
    /// Number of `paged_scan` calls
    pub fn scans(&self) -> usize {
        self.scans.load(Ordering::SeqCst)
    }

    /// Number of `find_by_key` calls
    pub fn finds(&self) -> usize {
        self.finds.load(Ordering::SeqCst)
    }

    /// Number of `find_many_by_keys` calls
    pub fn bulk_finds(&self) -> usize {
        self.bulk_finds.load(Ordering::SeqCst)
    }
}

/// In-memory backing store
///
/// Rows are JSON objects; the primary key is read from a configurable field
/// (`id` by default).
#[derive(Clone)]
pub struct InMemoryBackingStore {
    tables: Arc<DashMap<String, Vec<BackingRow>>>,
    primary_key_field: String,
    failing: Arc<DashSet<String>>,
    latency: Option<Duration>,
    calls: Arc<StoreCallCounts>,
}

impl InMemoryBackingStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            tables: Arc::new(DashMap::new()),
            primary_key_field: DEFAULT_PRIMARY_KEY_FIELD.to_string(),
            failing: Arc::new(DashSet::new()),
            latency: None,
            calls: Arc::new(StoreCallCounts::default()),
        }
    }

    /// Read primary keys from `field` instead of `id`
    pub fn with_primary_key_field<S: Into<String>>(mut self, field: S) -> Self {
        self.primary_key_field = field.into();
        self
    }

    /// Delay every read by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Insert a row, replacing any row with the same primary key
    pub fn upsert(&self, entity_type: &str, row: BackingRow) {
        let id = self.row_id(&row);
        let mut table = self.tables.entry(entity_type.to_string()).or_default();
        let existing = id.and_then(|id| {
            table
                .iter()
                .position(|r| self.row_id(r).as_deref() == Some(id.as_str()))
        });
        match existing {
            Some(index) => table[index] = row,
            None => table.push(row),
        }
    }

    /// Insert several rows
    pub fn upsert_many<I: IntoIterator<Item = BackingRow>>(&self, entity_type: &str, rows: I) {
        for row in rows {
            self.upsert(entity_type, row);
        }
    }

    /// Delete a row by primary key; returns whether it existed
    pub fn delete(&self, entity_type: &str, id: &str) -> bool {
        let Some(mut table) = self.tables.get_mut(entity_type) else {
            return false;
        };
        let before = table.len();
        table.retain(|r| self.row_id(r).as_deref() != Some(id));
        table.len() != before
    }

    /// Reorder rows to follow `ids`; rows not listed keep their relative order at the end
    pub fn reorder(&self, entity_type: &str, ids: &[String]) {
        let Some(mut table) = self.tables.get_mut(entity_type) else {
            return;
        };
        let rank = |row: &BackingRow| {
            self.row_id(row)
                .and_then(|id| ids.iter().position(|wanted| *wanted == id))
                .unwrap_or(usize::MAX)
        };
        table.sort_by_key(rank);
    }

    /// Make every read of `entity_type` fail
    pub fn fail_reads(&self, entity_type: &str) {
        self.failing.insert(entity_type.to_string());
    }

    /// Stop failing reads of `entity_type`
    pub fn restore_reads(&self, entity_type: &str) {
        self.failing.remove(entity_type);
    }

    /// Number of rows of `entity_type`
    pub fn row_count(&self, entity_type: &str) -> usize {
        self.tables.get(entity_type).map_or(0, |t| t.len())
    }

    /// Read counters
    pub fn calls(&self) -> &StoreCallCounts {
        &self.calls
    }

    fn row_id(&self, row: &BackingRow) -> Option<String> {
        match row.get(&self.primary_key_field)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    async fn before_read(&self, entity_type: &str) -> Result<()> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.failing.contains(entity_type) {
            return Err(Error::backing_store(format!(
                "reads of '{entity_type}' are unavailable"
            )));
        }
        Ok(())
    }
}

impl Default for InMemoryBackingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryBackingStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBackingStore")
            .field("tables", &self.tables.len())
            .field("primary_key_field", &self.primary_key_field)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl BackingStore for InMemoryBackingStore {
    async fn paged_scan(
        &self,
        entity_type: &str,
        page_index: usize,
        page_size: usize,
    ) -> Result<Vec<BackingRow>> {
        self.calls.scans.fetch_add(1, Ordering::SeqCst);
        self.before_read(entity_type).await?;
        if page_size == 0 {
            return Err(Error::invalid_argument("page size must be positive"));
        }
        let start = page_index.saturating_mul(page_size);
        Ok(self
            .tables
            .get(entity_type)
            .map(|table| table.iter().skip(start).take(page_size).cloned().collect())
            .unwrap_or_default())
    }

    async fn find_by_key(&self, entity_type: &str, id: &str) -> Result<Option<BackingRow>> {
        self.calls.finds.fetch_add(1, Ordering::SeqCst);
        self.before_read(entity_type).await?;
        Ok(self.tables.get(entity_type).and_then(|table| {
            table
                .iter()
                .find(|row| self.row_id(row).as_deref() == Some(id))
                .cloned()
        }))
    }

    async fn find_many_by_keys(
        &self,
        entity_type: &str,
        ids: &[String],
    ) -> Result<Vec<BackingRow>> {
        self.calls.bulk_finds.fetch_add(1, Ordering::SeqCst);
        self.before_read(entity_type).await?;
        let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
        Ok(self
            .tables
            .get(entity_type)
            .map(|table| {
                table
                    .iter()
                    .filter(|row| {
                        self.row_id(row)
                            .is_some_and(|id| wanted.contains(id.as_str()))
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn extract_primary_key(&self, _entity_type: &str, row: &BackingRow) -> Option<Value> {
        row.get(&self.primary_key_field)
            .filter(|value| !value.is_null())
            .cloned()
    }
}
