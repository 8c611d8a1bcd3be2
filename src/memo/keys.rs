//! Cache Key Derivation
//!
//! Turns a qualified function name plus its serializable arguments into a
//! stable cache key of the form `name:digest`.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tracing::debug;
use xxhash_rust::xxh3::xxh3_128;

use crate::cache::current_timestamp_ms;
use crate::error::Result;

static FALLBACK_COUNTER: AtomicU64 = AtomicU64::new(0);

// == Key Derivation ==
/// Derives the cache key for a call.
///
/// Arguments are rendered to a canonical JSON string and hashed with
/// XXH3-128. Map keys are emitted sorted at every nesting level, so building
/// the same argument map in a different order yields the same key. Positional
/// arguments, modeled as tuples, stay order-sensitive.
///
/// If the arguments fail to serialize, a unique one-shot key is returned
/// instead, so the call degrades to a cache miss rather than an error.
///
/// # Arguments
/// * `name` - Qualified function name that namespaces the key
/// * `args` - The argument bundle to fingerprint
pub fn derive_key<A: Serialize>(name: &str, args: &A) -> String {
    match canonical_args(args) {
        Ok(canonical) => {
            let digest = xxh3_128(canonical.as_bytes());
            format!("{name}:{digest:032x}")
        }
        Err(err) => {
            let fallback = fallback_key(name);
            debug!(name, error = %err, key = %fallback, "arguments not serializable, using one-shot key");
            fallback
        }
    }
}

/// Renders arguments to their canonical string form.
///
/// Serialization goes through `serde_json::Value`, whose object variant is
/// backed by a BTreeMap, which is what sorts map keys.
fn canonical_args<A: Serialize>(args: &A) -> Result<String> {
    let value = serde_json::to_value(args)?;
    Ok(value.to_string())
}

/// Builds a low-collision key for arguments that cannot be fingerprinted.
fn fallback_key(name: &str) -> String {
    let nonce = FALLBACK_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{name}:uncacheable-{}-{nonce}", current_timestamp_ms())
}
