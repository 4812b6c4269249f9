// src/roster/cache.rs

use moka::sync::Cache;
use std::{sync::Arc, time::Duration};
use tracing::debug;

use super::RawTable;

/// Default freshness window for a loaded roster.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

/// Time-bounded cache of raw tables, one entry per source key.
/// Owned by whoever drives recomputation; nothing here is global.
pub struct SourceCache {
    ttl: Duration,
    tables: Cache<String, Arc<RawTable>>,
}

impl SourceCache {
    pub fn new(ttl: Duration) -> Self {
        let tables = Cache::builder().time_to_live(ttl).build();
        Self { ttl, tables }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh table for `key`, if any.
    pub fn get(&self, key: &str) -> Option<Arc<RawTable>> {
        self.tables.get(key)
    }

    /// Store `table` under `key`, replacing any previous entry.
    pub fn insert(&self, key: &str, table: RawTable) -> Arc<RawTable> {
        let table = Arc::new(table);
        self.tables.insert(key.to_string(), Arc::clone(&table));
        table
    }

    /// Drop every entry (manual refresh).
    pub fn invalidate_all(&self) {
        debug!(entries = self.tables.entry_count(), "invalidating source cache");
        self.tables.invalidate_all();
    }

    pub fn len(&self) -> u64 {
        self.tables.run_pending_tasks();
        self.tables.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SourceCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
