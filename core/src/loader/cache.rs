#![deny(missing_docs)]

//! # Documentation Cache
//!
//! Memoizes loaded [`DocumentationData`] per directory, invalidated by file
//! modification times, by the file list changing, or by the TTL expiring.
//!
//! Warm reads take a shared lock only. Population is serialized by a separate
//! mutex and re-checked once acquired, so threads racing on a cold cache all
//! receive the single `Arc` produced by whichever thread loaded first.

use crate::error::{AppError, AppResult};
use crate::models::DocumentationData;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::{Duration, Instant, SystemTime};

/// What a cached aggregate is keyed by.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Documentation root.
    pub directory: PathBuf,
    /// Whether subdirectories were included.
    pub recursive: bool,
}

/// Files and their modification times at the moment of a load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint(Vec<(PathBuf, SystemTime)>);

impl Fingerprint {
    /// Reads the modification time of every file.
    pub fn capture(files: &[PathBuf]) -> AppResult<Self> {
        let stamps = files
            .iter()
            .map(|path| modified(path).map(|time| (path.clone(), time)))
            .collect::<AppResult<Vec<_>>>()?;
        Ok(Self(stamps))
    }
}

fn modified(path: &Path) -> AppResult<SystemTime> {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(|e| AppError::Load(path.to_path_buf(), e.to_string()))
}

struct CacheEntry {
    fingerprint: Fingerprint,
    loaded_at: Instant,
    data: Arc<DocumentationData>,
}

/// Thread-safe cache owned by a loader.
pub struct DocumentationCache {
    ttl: Duration,
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
    populate: Mutex<()>,
}

impl DocumentationCache {
    /// Creates an empty cache whose entries live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
            populate: Mutex::new(()),
        }
    }

    /// Returns the cached aggregate for `key` if it is still fresh, otherwise
    /// runs `load` (at most once across concurrent callers) and caches it.
    pub fn get_or_load<F>(
        &self,
        key: &CacheKey,
        fingerprint: &Fingerprint,
        load: F,
    ) -> AppResult<Arc<DocumentationData>>
    where
        F: FnOnce() -> AppResult<DocumentationData>,
    {
        if let Some(hit) = self.lookup(key, fingerprint) {
            log::debug!("Documentation cache hit for {}", key.directory.display());
            return Ok(hit);
        }

        let _populating = self.populate.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(hit) = self.lookup(key, fingerprint) {
            return Ok(hit);
        }

        log::debug!("Documentation cache miss for {}", key.directory.display());
        let data = Arc::new(load()?);
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                key.clone(),
                CacheEntry {
                    fingerprint: fingerprint.clone(),
                    loaded_at: Instant::now(),
                    data: Arc::clone(&data),
                },
            );
        Ok(data)
    }

    fn lookup(&self, key: &CacheKey, fingerprint: &Fingerprint) -> Option<Arc<DocumentationData>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(key)
            .filter(|e| e.fingerprint == *fingerprint && e.loaded_at.elapsed() < self.ttl)
            .map(|e| Arc::clone(&e.data))
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Number of cached directories.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn key() -> CacheKey {
        CacheKey {
            directory: PathBuf::from("docs"),
            recursive: true,
        }
    }

    #[test]
    fn test_hit_returns_same_arc() {
        let cache = DocumentationCache::new(Duration::from_secs(60));
        let fp = Fingerprint(Vec::new());
        let first = cache
            .get_or_load(&key(), &fp, || Ok(DocumentationData::default()))
            .unwrap();
        let second = cache
            .get_or_load(&key(), &fp, || panic!("should not reload"))
            .unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_changed_fingerprint_reloads() {
        let cache = DocumentationCache::new(Duration::from_secs(60));
        let first = cache
            .get_or_load(&key(), &Fingerprint(Vec::new()), || {
                Ok(DocumentationData::default())
            })
            .unwrap();
        let changed = Fingerprint(vec![(PathBuf::from("docs/a.md"), SystemTime::UNIX_EPOCH)]);
        let second = cache
            .get_or_load(&key(), &changed, || Ok(DocumentationData::default()))
            .unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_zero_ttl_always_reloads() {
        let cache = DocumentationCache::new(Duration::ZERO);
        let fp = Fingerprint(Vec::new());
        let loads = AtomicUsize::new(0);
        for _ in 0..3 {
            cache
                .get_or_load(&key(), &fp, || {
                    loads.fetch_add(1, Ordering::SeqCst);
                    Ok(DocumentationData::default())
                })
                .unwrap();
        }
        assert_eq!(loads.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_failed_load_is_not_cached() {
        let cache = DocumentationCache::new(Duration::from_secs(60));
        let fp = Fingerprint(Vec::new());
        let res = cache.get_or_load(&key(), &fp, || Err(AppError::General("boom".into())));
        assert!(res.is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clear() {
        let cache = DocumentationCache::new(Duration::from_secs(60));
        let fp = Fingerprint(Vec::new());
        cache
            .get_or_load(&key(), &fp, || Ok(DocumentationData::default()))
            .unwrap();
        cache.clear();
        assert!(cache.is_empty());
    }
}
