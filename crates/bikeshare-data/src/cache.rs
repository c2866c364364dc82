//! Memoizing cache for loaded datasets.
//!
//! Entries are keyed by the canonical source path. Each entry remembers the
//! fingerprint (length and modification time) of the file it was built from
//! along with the cleaning options, so a changed file or different options
//! trigger a reload instead of serving stale data.

use crate::loader::{load_trips, LoadOptions};
use crate::trip::Dataset;
use bikeshare_common::{BikeshareError, Result};
use bikeshare_config::CacheConfig;
use moka::future::Cache;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, info, instrument};

/// Identity of a dataset: source file, its fingerprint and the cleaning options.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DatasetKey {
    /// Canonical path of the source.
    pub path: PathBuf,
    /// File length in bytes.
    pub len: u64,
    /// Last modification time, when the platform reports one.
    pub modified: Option<SystemTime>,
    skip_invalid_rows: bool,
    min_duration_bits: u64,
    max_duration_bits: u64,
}

impl DatasetKey {
    /// Reads the fingerprint of `path`, which should already be canonical.
    pub async fn for_file(path: &Path, options: &LoadOptions) -> Result<Self> {
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| BikeshareError::data_load_with_source("Failed to read trip file metadata", path, e))?;

        Ok(Self {
            path: path.to_path_buf(),
            len: metadata.len(),
            modified: metadata.modified().ok(),
            skip_invalid_rows: options.skip_invalid_rows,
            min_duration_bits: options.min_duration_minutes.to_bits(),
            max_duration_bits: options.max_duration_minutes.to_bits(),
        })
    }
}

#[derive(Debug, Clone)]
struct CachedDataset {
    key: DatasetKey,
    dataset: Arc<Dataset>,
}

/// Cache performance metrics
#[derive(Debug, Default)]
pub struct CacheMetrics {
    /// Requests served from the cache.
    pub hits: AtomicU64,
    /// Requests that had to read the source.
    pub misses: AtomicU64,
    /// Entries dropped explicitly or because their source changed.
    pub invalidations: AtomicU64,
}

/// Point-in-time copy of [`CacheMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Requests served from the cache.
    pub hits: u64,
    /// Requests that had to read the source.
    pub misses: u64,
    /// Entries dropped explicitly or because their source changed.
    pub invalidations: u64,
    /// Datasets currently held.
    pub entry_count: u64,
}

impl CacheMetrics {
    /// Counts a cache hit.
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts a cache miss.
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts `count` invalidated entries.
    pub fn record_invalidations(&self, count: u64) {
        self.invalidations.fetch_add(count, Ordering::Relaxed);
    }

    /// Share of requests served from the cache.
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed) as f64;
        let total = hits + self.misses.load(Ordering::Relaxed) as f64;
        if total > 0.0 {
            hits / total
        } else {
            0.0
        }
    }
}

/// Memoizes loaded datasets per source file.
pub struct DatasetCache {
    cache: Cache<PathBuf, CachedDataset>,
    metrics: Arc<CacheMetrics>,
}

impl DatasetCache {
    /// Create a new cache with the given configuration
    pub fn new(config: &CacheConfig) -> Self {
        let mut builder = Cache::builder()
            .max_capacity(config.max_entries)
            .eviction_listener(|path: Arc<PathBuf>, _value, cause| {
                debug!(path = %path.display(), ?cause, "Dataset evicted from cache");
            });
        if let Some(ttl) = config.ttl() {
            builder = builder.time_to_live(ttl);
        }

        Self {
            cache: builder.build(),
            metrics: Arc::new(CacheMetrics::default()),
        }
    }

    /// Returns the dataset for `path`, reading the source only when it is not
    /// cached or has changed since it was cached.
    #[instrument(skip(self, path, options), fields(path = %path.as_ref().display()))]
    pub async fn get_or_load(&self, path: impl AsRef<Path>, options: &LoadOptions) -> Result<Arc<Dataset>> {
        let path = path.as_ref();
        let canonical = tokio::fs::canonicalize(path)
            .await
            .map_err(|e| BikeshareError::data_load_with_source("Failed to open trip file", path, e))?;
        let key = DatasetKey::for_file(&canonical, options).await?;

        if let Some(entry) = self.cache.get(&canonical).await {
            if entry.key == key {
                debug!("Dataset cache hit");
                self.metrics.record_hit();
                return Ok(entry.dataset);
            }
            info!("Trip source or load options changed, dropping cached dataset");
            self.cache.invalidate(&canonical).await;
            self.metrics.record_invalidations(1);
        }

        debug!("Dataset cache miss");
        self.metrics.record_miss();
        let dataset = Arc::new(load_trips(&canonical, options.clone()).await?);
        self.cache
            .insert(
                canonical,
                CachedDataset {
                    key,
                    dataset: Arc::clone(&dataset),
                },
            )
            .await;
        Ok(dataset)
    }

    /// Whether a dataset for `path` is cached, regardless of freshness.
    pub async fn contains(&self, path: impl AsRef<Path>) -> bool {
        let canonical = resolve(path.as_ref()).await;
        self.cache.contains_key(&canonical)
    }

    /// Drops the cached dataset of `path`. Returns whether one was cached.
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub async fn invalidate(&self, path: impl AsRef<Path>) -> bool {
        let canonical = resolve(path.as_ref()).await;
        let removed = self.cache.remove(&canonical).await.is_some();
        if removed {
            self.metrics.record_invalidations(1);
            info!("Invalidated cached dataset");
        }
        removed
    }

    /// Invalidate all cache entries
    #[instrument(skip(self))]
    pub async fn invalidate_all(&self) {
        self.cache.run_pending_tasks().await;
        let entry_count = self.cache.entry_count();
        self.cache.invalidate_all();
        self.metrics.record_invalidations(entry_count);
        info!("Invalidated {} cached dataset(s)", entry_count);
    }

    /// Get cache metrics
    pub fn metrics(&self) -> Arc<CacheMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Get cache statistics
    pub async fn stats(&self) -> CacheStats {
        self.cache.run_pending_tasks().await;
        CacheStats {
            hits: self.metrics.hits.load(Ordering::Relaxed),
            misses: self.metrics.misses.load(Ordering::Relaxed),
            invalidations: self.metrics.invalidations.load(Ordering::Relaxed),
            entry_count: self.cache.entry_count(),
        }
    }
}

impl Default for DatasetCache {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}

async fn resolve(path: &Path) -> PathBuf {
    tokio::fs::canonicalize(path)
        .await
        .unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bikeshare_common::test_utils::trip_csv;

    #[tokio::test]
    async fn test_same_source_returns_same_arc() {
        let file = trip_csv::write_temp(&trip_csv::generate_rows(20, 5));
        let cache = DatasetCache::default();
        let options = LoadOptions::default();

        let first = cache.get_or_load(file.path(), &options).await.expect("load");
        let second = cache.get_or_load(file.path(), &options).await.expect("load");

        assert!(Arc::ptr_eq(&first, &second));
        let stats = cache.stats().await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entry_count, 1);
    }

    #[tokio::test]
    async fn test_different_options_reload() {
        let file = trip_csv::write_temp(&trip_csv::generate_rows(20, 5));
        let cache = DatasetCache::default();

        let all = cache.get_or_load(file.path(), &LoadOptions::default()).await.expect("load");
        let short_only = LoadOptions {
            max_duration_minutes: 10.0,
            ..LoadOptions::default()
        };
        let short = cache.get_or_load(file.path(), &short_only).await.expect("load");

        assert!(!Arc::ptr_eq(&all, &short));
        assert!(short.len() < all.len());
        assert_eq!(cache.metrics().invalidations.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_invalidate_forces_reload() {
        let file = trip_csv::write_temp(&trip_csv::generate_rows(10, 5));
        let cache = DatasetCache::default();
        let options = LoadOptions::default();

        let first = cache.get_or_load(file.path(), &options).await.expect("load");
        assert!(cache.contains(file.path()).await);
        assert!(cache.invalidate(file.path()).await);
        assert!(!cache.invalidate(file.path()).await);

        let second = cache.get_or_load(file.path(), &options).await.expect("load");
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(*first, *second);
        assert_eq!(cache.metrics().misses.load(Ordering::Relaxed), 2);
    }

    #[tokio::test]
    async fn test_missing_source_is_not_cached() {
        let cache = DatasetCache::default();
        let err = cache
            .get_or_load("/nonexistent/trips.csv", &LoadOptions::default())
            .await
            .unwrap_err();
        assert!(err.is_data_load());
        assert_eq!(cache.stats().await.entry_count, 0);
    }

    #[test]
    fn test_hit_rate() {
        let metrics = CacheMetrics::default();
        assert_eq!(metrics.hit_rate(), 0.0);
        metrics.record_miss();
        metrics.record_hit();
        metrics.record_hit();
        metrics.record_hit();
        assert_eq!(metrics.hit_rate(), 0.75);
    }
}
