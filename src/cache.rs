//! Lifecycle-managed cache of the enriched dataset.
//!
//! The dataset is rebuilt only when the source file changes (length or
//! modification time) or after an explicit [`DatasetCache::invalidate`].
//! Readers share the same `Arc` until then.

use crate::analysis::build_dataset;
use crate::error::PipelineResult;
use crate::loader::{LoadConfig, RecordLoader};
use crate::models::EnrichedDataset;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::SystemTime;
use tracing::{debug, info};

/// Identity of a source file's contents as seen by the filesystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceFingerprint {
    len: u64,
    modified: Option<SystemTime>,
}

impl SourceFingerprint {
    /// Read the fingerprint of the file at `path`.
    pub fn of(path: &Path) -> PipelineResult<Self> {
        let metadata = fs::metadata(path)?;
        Ok(Self {
            len: metadata.len(),
            modified: metadata.modified().ok(),
        })
    }
}

/// Row counters from the most recent build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub rows_read: usize,
    pub rows_dropped: usize,
}

#[derive(Debug)]
struct CacheEntry {
    fingerprint: SourceFingerprint,
    dataset: Arc<EnrichedDataset>,
    stats: LoadStats,
}

/// Cache holding at most one enriched dataset for one source file.
pub struct DatasetCache {
    source: PathBuf,
    loader: RecordLoader,
    entry: RwLock<Option<CacheEntry>>,
}

impl DatasetCache {
    /// Create an empty cache for `source`. Nothing is loaded until [`get`](Self::get).
    pub fn new(source: PathBuf, config: LoadConfig) -> Self {
        Self {
            source,
            loader: RecordLoader::new(config),
            entry: RwLock::new(None),
        }
    }

    /// Path of the cached source.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Return the enriched dataset, rebuilding it if the source changed.
    pub fn get(&self) -> PipelineResult<Arc<EnrichedDataset>> {
        let fingerprint = SourceFingerprint::of(&self.source)?;

        {
            let guard = self.entry.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(entry) = guard.as_ref().filter(|e| e.fingerprint == fingerprint) {
                debug!("Serving cached dataset for {}", self.source.display());
                return Ok(Arc::clone(&entry.dataset));
            }
        }

        let mut guard = self.entry.write().unwrap_or_else(PoisonError::into_inner);

        // Another writer may have rebuilt while we waited for the lock.
        if let Some(entry) = guard.as_ref().filter(|e| e.fingerprint == fingerprint) {
            return Ok(Arc::clone(&entry.dataset));
        }

        info!("Building enriched dataset from {}", self.source.display());
        let loaded = self.loader.load_path(&self.source)?;
        let dataset = Arc::new(build_dataset(&loaded.observations));

        *guard = Some(CacheEntry {
            fingerprint,
            dataset: Arc::clone(&dataset),
            stats: LoadStats {
                rows_read: loaded.rows_read,
                rows_dropped: loaded.rows_dropped,
            },
        });

        Ok(dataset)
    }

    /// Counters from the build currently held, if any.
    pub fn load_stats(&self) -> Option<LoadStats> {
        let guard = self.entry.read().unwrap_or_else(PoisonError::into_inner);
        guard.as_ref().map(|e| e.stats)
    }

    /// Drop the cached dataset so the next [`get`](Self::get) rebuilds it.
    pub fn invalidate(&self) {
        let mut guard = self.entry.write().unwrap_or_else(PoisonError::into_inner);
        if guard.take().is_some() {
            debug!("Invalidated cached dataset for {}", self.source.display());
        }
    }

    /// Whether a dataset is currently cached.
    pub fn is_cached(&self) -> bool {
        self.entry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}
