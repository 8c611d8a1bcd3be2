//! Shared Cache Handle
//!
//! Cheaply clonable handle that serializes access to a [`CacheStore`] behind
//! a single mutex. One handle is constructed at process start and cloned into
//! every worker thread; it is also the constructor for memoizing wrappers.

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::cache::{CacheStats, CacheStore};
use crate::config::CacheConfig;
use crate::memo::Memoized;

// == Shared Cache ==
/// Thread-safe, clonable handle over a cache store.
///
/// The mutex is held for the duration of one store operation, durable I/O
/// included. Cache operations are short next to the computations they guard,
/// and parking_lot mutexes do not poison, so a panicking worker thread never
/// wedges the cache.
#[derive(Debug, Clone)]
pub struct SharedCache {
    inner: Arc<Mutex<CacheStore>>,
}

impl SharedCache {
    // == Constructors ==
    /// Creates a handle over a fresh store without touching existing records.
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(CacheStore::new(config))),
        }
    }

    /// Creates a handle and repairs the durable directory before first use.
    ///
    /// This is the intended process-startup entry point: corrupt records left
    /// by crashes or partial writes are deleted before any lookup sees them.
    pub fn open(config: &CacheConfig) -> Self {
        let cache = Self::new(config);
        let removed = {
            let mut store = cache.inner.lock();
            store.repair()
        };
        if removed > 0 {
            info!(removed, "startup repair removed corrupt cache records");
        }
        cache
    }

    // == Store Operations ==
    /// Retrieves a value by key under the default TTL.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.inner.lock().get(key)
    }

    /// Retrieves a value by key under an explicit TTL.
    pub fn get_with_ttl(&self, key: &str, ttl_secs: u64) -> Option<Value> {
        self.inner.lock().get_with_ttl(key, ttl_secs)
    }

    /// Stores a key-value pair. Returns whether the durable write succeeded.
    pub fn set(&self, key: String, value: Value) -> bool {
        self.inner.lock().set(key, value)
    }

    /// Removes an entry from both tiers. Returns whether it was present.
    pub fn invalidate(&self, key: &str) -> bool {
        self.inner.lock().invalidate(key)
    }

    /// Removes every entry, returning the number of distinct entries removed.
    pub fn clear(&self) -> usize {
        self.inner.lock().clear()
    }

    /// Deletes unparseable record files, returning how many were removed.
    pub fn repair(&self) -> usize {
        self.inner.lock().repair()
    }

    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.inner.lock().stats()
    }

    /// Returns the number of entries in the memory tier.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns true if the memory tier is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Returns the number of record files in the durable tier.
    pub fn durable_len(&self) -> usize {
        self.inner.lock().durable_len()
    }

    /// Directory holding the durable record files.
    pub fn cache_dir(&self) -> PathBuf {
        self.inner.lock().cache_dir().to_path_buf()
    }

    // == Memoization ==
    /// Wraps a callable with read-through caching under the default TTL.
    ///
    /// # Arguments
    /// * `name` - Qualified name that namespaces this callable's keys
    /// * `func` - The callable to wrap
    pub fn memoize<A, R, F>(&self, name: &str, func: F) -> Memoized<A, R, F>
    where
        A: Serialize,
        R: Serialize + DeserializeOwned,
        F: Fn(&A) -> R,
    {
        Memoized::new(self.clone(), name, None, func)
    }

    /// Wraps a callable with read-through caching under an explicit TTL.
    pub fn memoize_with_ttl<A, R, F>(&self, name: &str, ttl_secs: u64, func: F) -> Memoized<A, R, F>
    where
        A: Serialize,
        R: Serialize + DeserializeOwned,
        F: Fn(&A) -> R,
    {
        Memoized::new(self.clone(), name, Some(ttl_secs), func)
    }
}
