//! Cache Entry Module
//!
//! Defines the structure for individual cache entries. The same shape is
//! stored in the memory tier and serialized as the durable record file.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{SystemTime, UNIX_EPOCH};

// == Cache Entry ==
/// A single cached value with its creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The stored value
    pub value: Value,
    /// Creation timestamp (Unix milliseconds)
    pub timestamp: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry stamped with the current time.
    pub fn new(value: Value) -> Self {
        Self {
            value,
            timestamp: current_timestamp_ms(),
        }
    }

    /// Rebuilds an entry loaded from durable storage, keeping its original
    /// creation time so the remaining TTL carries across restarts.
    pub fn with_timestamp(value: Value, timestamp: u64) -> Self {
        Self { value, timestamp }
    }

    // == Is Expired ==
    /// Checks whether the entry has outlived the given TTL.
    ///
    /// Boundary condition: an entry is expired once its age strictly exceeds
    /// the TTL, so an entry read at exactly `ttl_secs` of age is still served.
    ///
    /// # Arguments
    /// * `ttl_secs` - TTL in seconds the entry is judged against
    pub fn is_expired(&self, ttl_secs: u64) -> bool {
        self.age_ms() > ttl_secs.saturating_mul(1000)
    }

    // == Age ==
    /// Returns the entry age in milliseconds.
    ///
    /// Saturates to zero when the stored timestamp is in the future, for
    /// example after a clock adjustment.
    pub fn age_ms(&self) -> u64 {
        current_timestamp_ms().saturating_sub(self.timestamp)
    }

    /// Returns remaining validity in milliseconds under the given TTL.
    ///
    /// # Returns
    /// - `0` if the entry has expired under `ttl_secs`
    /// - the remaining milliseconds otherwise
    pub fn ttl_remaining_ms(&self, ttl_secs: u64) -> u64 {
        ttl_secs.saturating_mul(1000).saturating_sub(self.age_ms())
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
///
/// Falls back to zero if the system clock reports a pre-epoch time, which
/// makes every entry look ancient rather than panicking.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn test_entry_creation() {
        let entry = CacheEntry::new(json!("test_value"));

        assert_eq!(entry.value, json!("test_value"));
        assert!(entry.timestamp > 0);
        assert!(!entry.is_expired(60));
    }

    #[test]
    fn test_entry_with_timestamp() {
        let entry = CacheEntry::with_timestamp(json!(42), 1_000);

        assert_eq!(entry.value, json!(42));
        assert_eq!(entry.timestamp, 1_000);
    }

    #[test]
    fn test_entry_expiration() {
        // Create entry aged exactly 5 seconds
        let entry = CacheEntry::with_timestamp(json!("old"), current_timestamp_ms() - 5_000);

        assert!(entry.is_expired(4));
        assert!(!entry.is_expired(6));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        // Entry aged exactly the TTL is still valid; one millisecond more is not
        let now = current_timestamp_ms();
        let at_ttl = CacheEntry::with_timestamp(json!("t"), now - 5_000);
        let past_ttl = CacheEntry::with_timestamp(json!("t"), now - 5_001);

        assert!(!at_ttl.is_expired(5), "Entry at exactly TTL should be valid");
        assert!(past_ttl.is_expired(5), "Entry past TTL should be expired");
    }

    #[test]
    fn test_entry_expiration_elapsed() {
        let entry = CacheEntry::new(json!("short_lived"));

        assert!(!entry.is_expired(1));

        // Wait for the 1 second TTL to elapse
        sleep(Duration::from_millis(1100));

        assert!(entry.is_expired(1));
    }

    #[test]
    fn test_age_saturates_for_future_timestamps() {
        let entry = CacheEntry::with_timestamp(json!("future"), current_timestamp_ms() + 60_000);

        assert_eq!(entry.age_ms(), 0);
        assert!(!entry.is_expired(1));
    }

    #[test]
    fn test_ttl_remaining_ms() {
        let entry = CacheEntry::with_timestamp(json!("t"), current_timestamp_ms() - 4_000);

        let remaining = entry.ttl_remaining_ms(10);
        assert!(remaining <= 6_000);
        assert!(remaining >= 5_500);
    }

    #[test]
    fn test_ttl_remaining_expired() {
        let entry = CacheEntry::with_timestamp(json!("t"), current_timestamp_ms() - 10_000);

        assert_eq!(entry.ttl_remaining_ms(5), 0);
    }

    #[test]
    fn test_entry_serialization_round_trip() {
        let entry = CacheEntry::with_timestamp(json!({"nested": [1, 2, 3]}), 123_456);

        let raw = serde_json::to_string(&entry).unwrap();
        let parsed: CacheEntry = serde_json::from_str(&raw).unwrap();

        assert_eq!(parsed.value, entry.value);
        assert_eq!(parsed.timestamp, entry.timestamp);
    }
}
