//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;
use std::path::PathBuf;

// == Defaults ==
/// Default entry TTL of one day, in seconds
pub const DEFAULT_TTL_SECS: u64 = 86_400;

/// Default memory tier capacity
pub const DEFAULT_MAX_SIZE: usize = 1000;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Durable cache directory; None resolves a platform default at startup
    pub cache_dir: Option<PathBuf>,
    /// TTL in seconds after which entries are no longer served
    pub ttl_secs: u64,
    /// Maximum number of entries the memory tier holds after an insert
    pub max_size: usize,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_DIR` - Durable cache directory (default: platform cache path)
    /// - `CACHE_TTL` - Entry TTL in seconds (default: 86400)
    /// - `CACHE_MAX_SIZE` - Memory tier capacity (default: 1000)
    pub fn from_env() -> Self {
        Self {
            cache_dir: env::var("CACHE_DIR").ok().map(PathBuf::from),
            ttl_secs: env::var("CACHE_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_TTL_SECS),
            max_size: env::var("CACHE_MAX_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_SIZE),
        }
    }

    /// Creates a configuration rooted at an explicit directory.
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: Some(dir.into()),
            ..Self::default()
        }
    }

    /// Creates a configuration that effectively disables caching.
    ///
    /// Entries expire after one second, so repeat calls recompute instead of
    /// being served from the cache.
    pub fn no_cache() -> Self {
        Self {
            ttl_secs: 1,
            ..Self::default()
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_dir: None,
            ttl_secs: DEFAULT_TTL_SECS,
            max_size: DEFAULT_MAX_SIZE,
        }
    }
}
