//! Response Cache - a two-tier cache for expensive call results
//!
//! Pairs a bounded in-memory map with one durable JSON record per key, keyed
//! by a deterministic hash of call arguments, with TTL expiration, atomic
//! record writes, and argument-keyed memoization of arbitrary callables.
//! Cache failures never reach the caller; the wrapped computation is always
//! the fallback.

pub mod cache;
pub mod config;
pub mod error;
pub mod memo;

pub use cache::{CacheStats, CacheStore, SharedCache};
pub use config::CacheConfig;
pub use memo::{derive_key, Memoized};
