//! TTL-aware cache of fetched datasets.
//!
//! Keyed by `(indicator, region, resolution)`. Staleness never evicts an
//! entry, it only changes eligibility for fresh responses; stale entries
//! remain the raw material for the stale-cache and carry-forward fallback
//! paths. The store supports concurrent reads with serialized writes
//! (last-writer-wins per key), and snapshots losslessly to a JSON file.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{CoreError, Indicator, ProviderId, Region, Resolution, Series, UtcDateTime};

/// Cache key: one dataset per `(indicator, region, resolution)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub indicator: Indicator,
    pub region: Region,
    pub resolution: Resolution,
}

impl CacheKey {
    pub fn new(indicator: Indicator, region: Region, resolution: Resolution) -> Self {
        Self {
            indicator,
            region,
            resolution,
        }
    }
}

/// Owned series snapshot plus freshness metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub series: Series,
    pub fetched_at: UtcDateTime,
    pub ttl: Duration,
    pub provider: ProviderId,
}

impl CacheEntry {
    pub fn new(series: Series, fetched_at: UtcDateTime, ttl: Duration, provider: ProviderId) -> Self {
        Self {
            series,
            fetched_at,
            ttl,
            provider,
        }
    }

    /// Entry is stale when `now - fetched_at > ttl`. Takes the clock as an
    /// argument so staleness is testable without waiting out real TTLs.
    pub fn is_stale_at(&self, now: UtcDateTime) -> bool {
        now.seconds_since(self.fetched_at) > self.ttl.as_secs_f64()
    }
}

#[derive(Debug, Default)]
struct CacheInner {
    map: HashMap<CacheKey, CacheEntry>,
}

/// Thread-safe cache store; the single shared mutable state of the
/// pipeline. Injected into the orchestrator so tests can substitute a
/// fresh in-memory instance.
#[derive(Debug, Clone, Default)]
pub struct CacheStore {
    inner: Arc<tokio::sync::RwLock<CacheInner>>,
}

/// Serializable dump of the full store, round-tripping
/// `(key, series, fetched_at, ttl, provider)` losslessly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSnapshot {
    pub entries: Vec<CacheRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheRecord {
    pub key: CacheKey,
    pub entry: CacheEntry,
}

impl CacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry for `key`, if any. A `None` is the internal cache-miss signal;
    /// staleness is the caller's judgement via [`CacheEntry::is_stale_at`].
    pub async fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        let store = self.inner.read().await;
        store.map.get(key).cloned()
    }

    /// Insert or replace the entry for `key` (last-writer-wins; merging
    /// across sources is the resolver's job, never the cache's).
    pub async fn put(
        &self,
        key: CacheKey,
        series: Series,
        ttl: Duration,
        provider: ProviderId,
    ) {
        let entry = CacheEntry::new(series, UtcDateTime::now(), ttl, provider);
        let mut store = self.inner.write().await;
        store.map.insert(key, entry);
    }

    /// Insert a fully-specified entry; used by `restore` and by tests that
    /// need to control `fetched_at`.
    pub async fn put_entry(&self, key: CacheKey, entry: CacheEntry) {
        let mut store = self.inner.write().await;
        store.map.insert(key, entry);
    }

    pub async fn invalidate(&self, key: &CacheKey) {
        let mut store = self.inner.write().await;
        store.map.remove(key);
    }

    pub async fn len(&self) -> usize {
        let store = self.inner.read().await;
        store.map.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn snapshot(&self) -> CacheSnapshot {
        let store = self.inner.read().await;
        let mut entries: Vec<CacheRecord> = store
            .map
            .iter()
            .map(|(key, entry)| CacheRecord {
                key: key.clone(),
                entry: entry.clone(),
            })
            .collect();
        // Stable order keeps snapshot files diffable.
        entries.sort_by(|a, b| {
            (a.key.indicator.code(), a.key.region.as_str(), a.key.resolution.as_str()).cmp(&(
                b.key.indicator.code(),
                b.key.region.as_str(),
                b.key.resolution.as_str(),
            ))
        });
        CacheSnapshot { entries }
    }

    pub async fn restore(&self, snapshot: CacheSnapshot) {
        let mut store = self.inner.write().await;
        for record in snapshot.entries {
            store.map.insert(record.key, record.entry);
        }
    }

    /// Persist the store to a JSON file.
    pub async fn save_to(&self, path: &Path) -> Result<(), CoreError> {
        let snapshot = self.snapshot().await;
        let json = serde_json::to_string_pretty(&snapshot)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load a previously saved snapshot into this store.
    pub async fn load_from(&self, path: &Path) -> Result<(), CoreError> {
        let json = std::fs::read_to_string(path)?;
        let snapshot: CacheSnapshot = serde_json::from_str(&json)?;
        self.restore(snapshot).await;
        Ok(())
    }
}
