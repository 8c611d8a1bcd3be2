//! Memoizing Wrapper
//!
//! Wraps a callable with read-through caching: check the cache, fall back to
//! the callable, store the result. Every cache-side failure degrades to
//! running the callable, so the wrapper is never less reliable than the raw
//! function it wraps.

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::SharedCache;
use crate::memo::keys::derive_key;

// == Memoized ==
/// A callable wrapped with argument-keyed caching.
///
/// Multiple positional arguments are modeled as a tuple; keyword-style
/// arguments as a struct or map. Results round-trip through JSON, so `R`
/// must serialize and deserialize to the same value.
pub struct Memoized<A, R, F>
where
    F: Fn(&A) -> R,
{
    cache: SharedCache,
    /// Qualified name that namespaces this callable's keys
    name: String,
    /// Per-wrapper TTL override; None uses the store default
    ttl_secs: Option<u64>,
    func: F,
    _marker: PhantomData<fn(&A) -> R>,
}

impl<A, R, F> Memoized<A, R, F>
where
    A: Serialize,
    R: Serialize + DeserializeOwned,
    F: Fn(&A) -> R,
{
    pub(crate) fn new(cache: SharedCache, name: &str, ttl_secs: Option<u64>, func: F) -> Self {
        Self {
            cache,
            name: name.to_string(),
            ttl_secs,
            func,
            _marker: PhantomData,
        }
    }

    /// Qualified name this wrapper caches under.
    pub fn name(&self) -> &str {
        &self.name
    }

    // == Call ==
    /// Invokes the wrapped callable through the cache.
    ///
    /// A cached value that no longer deserializes into `R` is treated as a
    /// miss and overwritten by the fresh result. A fresh result that fails to
    /// serialize is returned uncached.
    pub fn call(&self, args: &A) -> R {
        let key = derive_key(&self.name, args);

        let cached = match self.ttl_secs {
            Some(ttl_secs) => self.cache.get_with_ttl(&key, ttl_secs),
            None => self.cache.get(&key),
        };
        if let Some(value) = cached {
            match serde_json::from_value(value) {
                Ok(result) => {
                    debug!(name = %self.name, "serving cached result");
                    return result;
                }
                Err(err) => {
                    warn!(name = %self.name, error = %err, "cached value no longer matches the result type, recomputing");
                }
            }
        }

        let result = (self.func)(args);
        match serde_json::to_value(&result) {
            Ok(value) => {
                self.cache.set(key, value);
            }
            Err(err) => {
                debug!(name = %self.name, error = %err, "result not serializable, skipping cache");
            }
        }
        result
    }

    // == Invalidate ==
    /// Force-evicts the cached result for one argument combination.
    ///
    /// Returns whether an entry was present.
    pub fn invalidate(&self, args: &A) -> bool {
        self.cache.invalidate(&derive_key(&self.name, args))
    }
}

impl<A, R, F> fmt::Debug for Memoized<A, R, F>
where
    F: Fn(&A) -> R,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memoized")
            .field("name", &self.name)
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheConfig;
    use std::cell::Cell;
    use tempfile::TempDir;

    fn shared_in(dir: &TempDir) -> SharedCache {
        SharedCache::new(&CacheConfig::with_dir(dir.path()))
    }

    #[test]
    fn test_call_caches_result() {
        let dir = TempDir::new().unwrap();
        let cache = shared_in(&dir);
        let calls = Cell::new(0u32);

        let double = cache.memoize("math.double", |x: &u64| {
            calls.set(calls.get() + 1);
            x * 2
        });

        assert_eq!(double.call(&21), 42);
        assert_eq!(double.call(&21), 42);
        assert_eq!(calls.get(), 1);

        assert_eq!(double.call(&5), 10);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_invalidate_forces_recompute() {
        let dir = TempDir::new().unwrap();
        let cache = shared_in(&dir);
        let calls = Cell::new(0u32);

        let greet = cache.memoize("gen.greet", |name: &String| {
            calls.set(calls.get() + 1);
            format!("Hello, {}!", name)
        });

        let args = "Ada".to_string();
        assert_eq!(greet.call(&args), "Hello, Ada!");
        assert!(greet.invalidate(&args));
        assert_eq!(greet.call(&args), "Hello, Ada!");
        assert_eq!(calls.get(), 2);

        assert!(!greet.invalidate(&"Nobody".to_string()));
    }

    #[test]
    fn test_none_results_are_cached() {
        let dir = TempDir::new().unwrap();
        let cache = shared_in(&dir);
        let calls = Cell::new(0u32);

        let lookup = cache.memoize("gen.lookup", |_: &String| -> Option<String> {
            calls.set(calls.get() + 1);
            None
        });

        let args = "missing".to_string();
        assert_eq!(lookup.call(&args), None);
        assert_eq!(lookup.call(&args), None);
        assert_eq!(calls.get(), 1, "A cached None must not recompute");
    }

    #[test]
    fn test_stale_shape_recomputes_and_overwrites() {
        let dir = TempDir::new().unwrap();
        let cache = shared_in(&dir);
        let args = "same".to_string();

        let as_text = cache.memoize("gen.shape", |_: &String| "forty-two".to_string());
        as_text.call(&args);

        // Same name and arguments, different result type: the stale record
        // is recomputed and replaced
        let calls = Cell::new(0u32);
        let as_number = cache.memoize("gen.shape", |_: &String| {
            calls.set(calls.get() + 1);
            42u32
        });
        assert_eq!(as_number.call(&args), 42);
        assert_eq!(calls.get(), 1);
        assert_eq!(as_number.call(&args), 42);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_tuple_args() {
        let dir = TempDir::new().unwrap();
        let cache = shared_in(&dir);
        let calls = Cell::new(0u32);

        let join = cache.memoize("gen.join", |(left, right): &(String, String)| {
            calls.set(calls.get() + 1);
            format!("{}-{}", left, right)
        });

        let args = ("a".to_string(), "b".to_string());
        assert_eq!(join.call(&args), "a-b");
        assert_eq!(join.call(&args), "a-b");
        assert_eq!(calls.get(), 1);

        let swapped = ("b".to_string(), "a".to_string());
        assert_eq!(join.call(&swapped), "b-a");
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_debug_skips_callable() {
        let dir = TempDir::new().unwrap();
        let cache = shared_in(&dir);

        let wrapped = cache.memoize_with_ttl("gen.debug", 60, |x: &u8| *x);
        let rendered = format!("{:?}", wrapped);

        assert!(rendered.contains("gen.debug"));
        assert!(rendered.contains("60"));
    }
}
