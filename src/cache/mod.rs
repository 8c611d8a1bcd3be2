//! Cache Module
//!
//! Two-tier caching: a bounded in-memory map in front of one durable JSON
//! record per key, with TTL expiration and oldest-first eviction.

mod durable;
mod entry;
mod shared;
mod stats;
mod store;


// Re-export public types
pub use entry::{current_timestamp_ms, CacheEntry};
pub use shared::SharedCache;
pub use stats::CacheStats;
pub use store::CacheStore;

// == Public Constants ==
/// File extension for durable cache records
pub const RECORD_EXT: &str = "cache";

/// File extension for in-flight temporary writes
pub const TEMP_EXT: &str = "tmp";
