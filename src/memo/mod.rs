//! Memoization Module
//!
//! Key derivation plus the wrapper type that puts read-through caching
//! around a callable. Wrappers are built through
//! [`SharedCache::memoize`](crate::cache::SharedCache::memoize).

mod keys;
mod wrapper;

// Re-export public types
pub use keys::derive_key;
pub use wrapper::Memoized;
