//! Cache Store Module
//!
//! Main cache engine pairing a bounded in-memory map with one durable record
//! file per key. The memory tier is a lazily populated accelerator; the
//! durable tier is the source of truth across restarts.
//!
//! Every public operation is total: I/O and serialization failures degrade to
//! logged misses or no-ops, never to errors or panics.

use std::collections::{HashMap, HashSet};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cache::durable::{sanitize_key, DurableStore};
use crate::cache::{CacheEntry, CacheStats};
use crate::config::CacheConfig;

// == Cache Store ==
/// Two-tier cache storage with TTL expiration and oldest-first eviction.
#[derive(Debug)]
pub struct CacheStore {
    /// Memory tier, keyed by the full cache key
    entries: HashMap<String, CacheEntry>,
    /// Durable tier holding one record file per key
    durable: DurableStore,
    /// Performance statistics
    stats: CacheStats,
    /// Memory tier capacity enforced after each insert
    max_size: usize,
    /// Default TTL in seconds
    ttl_secs: u64,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new CacheStore from the given configuration.
    ///
    /// The durable directory is resolved from the first usable candidate:
    /// the configured directory, the per-user cache path, a local `.cache`
    /// directory, then the OS temp directory. Construction never fails; an
    /// unusable candidate is logged and the next one is tried.
    pub fn new(config: &CacheConfig) -> Self {
        let dir = resolve_cache_dir(config.cache_dir.as_deref());
        debug!(dir = %dir.display(), ttl_secs = config.ttl_secs, max_size = config.max_size, "cache store created");
        Self {
            entries: HashMap::new(),
            durable: DurableStore::new(dir),
            stats: CacheStats::new(),
            max_size: config.max_size,
            ttl_secs: config.ttl_secs,
        }
    }

    /// Directory holding the durable record files.
    pub fn cache_dir(&self) -> &Path {
        self.durable.dir()
    }

    // == Get ==
    /// Retrieves a value by key under the store's default TTL.
    ///
    /// Returns `None` on a miss. `Some(Value::Null)` is a legitimate hit and
    /// is distinct from a miss.
    pub fn get(&mut self, key: &str) -> Option<Value> {
        self.get_with_ttl(key, self.ttl_secs)
    }

    /// Retrieves a value by key, judging validity against an explicit TTL.
    ///
    /// The memory tier is consulted first. An expired memory entry is removed
    /// and the lookup falls through to the durable tier. A valid durable
    /// record repopulates the memory tier with its original timestamp, so the
    /// remaining TTL is preserved. Expired or unreadable record files are
    /// deleted on the way.
    ///
    /// # Arguments
    /// * `key` - The key to retrieve
    /// * `ttl_secs` - TTL in seconds the entry is judged against
    pub fn get_with_ttl(&mut self, key: &str, ttl_secs: u64) -> Option<Value> {
        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired(ttl_secs) {
                self.stats.record_hit();
                debug!(key, "memory hit");
                return Some(entry.value.clone());
            }
            // Expired in memory; the durable record below carries the same
            // timestamp and gets cleaned up by the fall-through read.
            self.entries.remove(key);
            self.stats.record_expired();
            self.stats.set_total_entries(self.entries.len());
            debug!(key, "expired memory entry removed");
        }

        match self.durable.read(key) {
            Ok(Some(entry)) => {
                if entry.is_expired(ttl_secs) {
                    if let Err(err) = self.durable.remove(key) {
                        warn!(key, error = %err, "failed to remove expired cache record");
                    }
                    self.stats.record_expired();
                    self.stats.record_miss();
                    debug!(key, "expired durable record removed");
                    return None;
                }
                debug!(key, age_ms = entry.age_ms(), "durable hit, promoted to memory");
                let value = entry.value.clone();
                self.entries.insert(key.to_string(), entry);
                self.stats.record_durable_hit();
                self.stats.set_total_entries(self.entries.len());
                Some(value)
            }
            Ok(None) => {
                self.stats.record_miss();
                None
            }
            Err(err) => {
                warn!(key, error = %err, "dropping unreadable cache record");
                if let Err(err) = self.durable.remove(key) {
                    warn!(key, error = %err, "failed to remove unreadable cache record");
                }
                self.stats.record_corrupt();
                self.stats.record_miss();
                None
            }
        }
    }

    // == Set ==
    /// Stores a key-value pair, stamped with the current time.
    ///
    /// The memory tier is always updated, evicting the oldest tenth of the
    /// entries when the insert pushes it past capacity. The durable write is
    /// best effort.
    ///
    /// # Returns
    /// `true` when the durable record was written, `false` when only the
    /// memory tier holds the entry.
    pub fn set(&mut self, key: String, value: Value) -> bool {
        let entry = CacheEntry::new(value);

        let written = match self.durable.write(&key, &entry) {
            Ok(()) => true,
            Err(err) => {
                warn!(key = %key, error = %err, "durable cache write failed, entry is memory-only");
                self.stats.record_failed_write();
                false
            }
        };

        self.entries.insert(key, entry);
        if self.entries.len() > self.max_size {
            self.evict_oldest();
        }
        self.stats.set_total_entries(self.entries.len());

        written
    }

    // == Eviction ==
    /// Removes the oldest tenth of the memory tier, at least one entry.
    ///
    /// Durable records are untouched; an evicted key can still be served
    /// from its record file.
    fn evict_oldest(&mut self) {
        let count = (self.entries.len() / 10).max(1);
        let mut by_age: Vec<(u64, String)> = self
            .entries
            .iter()
            .map(|(key, entry)| (entry.timestamp, key.clone()))
            .collect();
        by_age.sort();

        for (_, key) in by_age.into_iter().take(count) {
            self.entries.remove(&key);
            self.stats.record_eviction();
        }
        debug!(evicted = count, remaining = self.entries.len(), "memory tier over capacity, evicted oldest entries");
    }

    // == Invalidate ==
    /// Removes an entry from both tiers.
    ///
    /// # Returns
    /// `true` when the key was present in either tier. Idempotent: a second
    /// call for the same key returns `false`.
    pub fn invalidate(&mut self, key: &str) -> bool {
        let in_memory = self.entries.remove(key).is_some();
        let on_disk = match self.durable.remove(key) {
            Ok(removed) => removed,
            Err(err) => {
                // The record exists but could not be deleted
                warn!(key, error = %err, "failed to remove cache record");
                true
            }
        };
        if in_memory {
            self.stats.set_total_entries(self.entries.len());
        }
        if in_memory || on_disk {
            debug!(key, "entry invalidated");
        }
        in_memory || on_disk
    }

    // == Clear ==
    /// Removes every entry from both tiers.
    ///
    /// # Returns
    /// The number of distinct entries removed; a key present in memory and on
    /// disk counts once. Partial failures are logged and skipped.
    pub fn clear(&mut self) -> usize {
        let memory_count = self.entries.len();
        let memory_stems: HashSet<String> =
            self.entries.keys().map(|key| sanitize_key(key)).collect();
        self.entries.clear();

        let mut disk_only = 0;
        match self.durable.scan() {
            Ok(records) => {
                for path in records {
                    let stem = path
                        .file_stem()
                        .and_then(|stem| stem.to_str())
                        .unwrap_or_default()
                        .to_string();
                    if self.durable.remove_file(&path) && !memory_stems.contains(&stem) {
                        disk_only += 1;
                    }
                }
            }
            Err(err) => warn!(error = %err, "cache directory scan failed during clear"),
        }

        self.stats.set_total_entries(0);
        let removed = memory_count + disk_only;
        info!(removed, "cache cleared");
        removed
    }

    // == Repair ==
    /// Scans the durable directory and deletes every record file that fails
    /// to parse, along with temp files left by interrupted writes.
    ///
    /// Intended to run once at startup, before the first `get`.
    ///
    /// # Returns
    /// The number of corrupt record files removed. Swept temp files are not
    /// counted.
    pub fn repair(&mut self) -> usize {
        let records = match self.durable.scan() {
            Ok(records) => records,
            Err(err) => {
                warn!(error = %err, "cache directory scan failed, skipping repair");
                return 0;
            }
        };

        let mut removed = 0;
        for path in records {
            if let Err(err) = self.durable.parse_file(&path) {
                warn!(path = %path.display(), error = %err, "removing unparseable cache record");
                if self.durable.remove_file(&path) {
                    removed += 1;
                    self.stats.record_corrupt();
                }
            }
        }
        let swept = self.durable.sweep_temp();
        if removed > 0 || swept > 0 {
            info!(removed, swept, "cache repair finished");
        }
        removed
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    // == Length ==
    /// Returns the current number of entries in the memory tier.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the memory tier is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of record files in the durable tier.
    pub fn durable_len(&self) -> usize {
        self.durable.record_count()
    }
}

// == Directory Resolution ==
/// Picks the durable cache directory from the candidate chain, creating it
/// on the way. Falls back to the OS temp directory when nothing else works.
fn resolve_cache_dir(configured: Option<&Path>) -> PathBuf {
    let mut candidates: Vec<PathBuf> = Vec::new();
    if let Some(dir) = configured {
        candidates.push(dir.to_path_buf());
    }
    if let Some(base) = dirs_next::cache_dir() {
        candidates.push(base.join("response-cache"));
    }
    candidates.push(PathBuf::from(".cache"));

    for candidate in candidates {
        match fs::create_dir_all(&candidate) {
            Ok(()) => return candidate,
            Err(err) => {
                warn!(dir = %candidate.display(), error = %err, "cache directory unusable, trying next candidate");
            }
        }
    }

    let fallback = env::temp_dir().join("response-cache");
    if let Err(err) = fs::create_dir_all(&fallback) {
        warn!(dir = %fallback.display(), error = %err, "temp cache directory could not be created");
    }
    fallback
}
