//! Durable Tier Module
//!
//! Filesystem backend holding one JSON record file per cache key. Writes go
//! through a temporary file and an atomic rename, so a reader never observes
//! a partially written record.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use xxhash_rust::xxh3::xxh3_64;

use crate::cache::{CacheEntry, RECORD_EXT, TEMP_EXT};
use crate::error::{CacheError, Result};

// == Key Sanitization ==
/// Maps a cache key to a filesystem-safe file stem.
///
/// A key made only of `[A-Za-z0-9._-]` is its own stem. Any other key gets
/// its remaining characters mapped to `-` and a digest of the raw key
/// appended, so keys can never smuggle path separators into the cache
/// directory and two distinct keys never alias to one record file.
pub fn sanitize_key(key: &str) -> String {
    let safe = |c: char| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-');
    if !key.is_empty() && key.chars().all(safe) {
        return key.to_string();
    }

    let mapped: String = key.chars().map(|c| if safe(c) { c } else { '-' }).collect();
    let digest = xxh3_64(key.as_bytes());
    if mapped.is_empty() {
        format!("_-{digest:016x}")
    } else {
        format!("{mapped}-{digest:016x}")
    }
}

// == Durable Store ==
/// Filesystem layer that persists cache entries as record files.
#[derive(Debug)]
pub struct DurableStore {
    /// Directory holding the record files
    dir: PathBuf,
}

impl DurableStore {
    // == Constructor ==
    /// Creates a durable store rooted at the given directory.
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Directory the record files live in.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path of the record file for a key.
    pub fn record_path(&self, key: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{}", sanitize_key(key), RECORD_EXT))
    }

    // == Read ==
    /// Loads the record for a key.
    ///
    /// # Returns
    /// - `Ok(Some(entry))` when a record exists and parses
    /// - `Ok(None)` when no record file exists
    /// - `Err` when the file exists but cannot be read or parsed
    pub fn read(&self, key: &str) -> Result<Option<CacheEntry>> {
        self.parse_file(&self.record_path(key))
    }

    /// Parses a single record file, `Ok(None)` when it no longer exists.
    pub fn parse_file(&self, path: &Path) -> Result<Option<CacheEntry>> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let entry = serde_json::from_str(&raw)
            .map_err(|e| CacheError::Corrupt(format!("{}: {}", path.display(), e)))?;
        Ok(Some(entry))
    }

    // == Write ==
    /// Persists a record atomically: temp file, fsync, then rename.
    ///
    /// Recreates the cache directory if it has gone missing.
    pub fn write(&self, key: &str, entry: &CacheEntry) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.record_path(key);
        let tmp = path.with_extension(TEMP_EXT);
        let json = serde_json::to_string(entry)?;
        let mut file = fs::File::create(&tmp)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    // == Remove ==
    /// Deletes the record for a key.
    ///
    /// # Returns
    /// - `Ok(true)` when a record file was removed
    /// - `Ok(false)` when no record file existed
    pub fn remove(&self, key: &str) -> Result<bool> {
        match fs::remove_file(self.record_path(key)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Deletes a record file found by `scan`, swallowing failures with a
    /// warning. Returns whether the file was removed.
    pub fn remove_file(&self, path: &Path) -> bool {
        match fs::remove_file(path) {
            Ok(()) => true,
            Err(e) if e.kind() == ErrorKind::NotFound => false,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to remove cache record file");
                false
            }
        }
    }

    // == Scan ==
    /// Lists every record file currently in the cache directory.
    ///
    /// A missing directory scans as empty.
    pub fn scan(&self) -> Result<Vec<PathBuf>> {
        let mut records = Vec::new();
        let dirents = match fs::read_dir(&self.dir) {
            Ok(dirents) => dirents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(records),
            Err(e) => return Err(e.into()),
        };
        for dirent in dirents {
            let path = dirent?.path();
            if path.extension().and_then(|ext| ext.to_str()) == Some(RECORD_EXT) {
                records.push(path);
            }
        }
        Ok(records)
    }

    /// Number of record files currently on disk.
    pub fn record_count(&self) -> usize {
        self.scan().map(|records| records.len()).unwrap_or(0)
    }

    // == Temp Sweep ==
    /// Removes temp files left behind by interrupted writes.
    ///
    /// Returns the number of files swept.
    pub fn sweep_temp(&self) -> usize {
        let dirents = match fs::read_dir(&self.dir) {
            Ok(dirents) => dirents,
            Err(_) => return 0,
        };
        let mut swept = 0;
        for dirent in dirents.flatten() {
            let path = dirent.path();
            if path.extension().and_then(|ext| ext.to_str()) == Some(TEMP_EXT)
                && self.remove_file(&path)
            {
                swept += 1;
            }
        }
        if swept > 0 {
            debug!(swept, "removed leftover temp files");
        }
        swept
    }
}
