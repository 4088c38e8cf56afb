//! Cache Entry Module
//!
//! Defines the structure for individual cached route payloads.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::models::RoutePayload;

// == Cache Entry ==
/// A cached route payload with its storage timestamp.
///
/// Entries are immutable once stored; a recompute replaces the entry
/// wholesale rather than mutating it in place.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored route payload
    pub payload: RoutePayload,
    /// Storage timestamp (Unix milliseconds)
    pub stored_at: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry stamped with the current time.
    pub fn new(payload: RoutePayload) -> Self {
        Self {
            payload,
            stored_at: current_timestamp_ms(),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has outlived the given TTL.
    ///
    /// Boundary condition: an entry expires when strictly MORE than
    /// `ttl_ms` has elapsed since it was stored; an entry read exactly at
    /// the TTL boundary is still fresh.
    pub fn is_expired(&self, ttl_ms: u64) -> bool {
        current_timestamp_ms().saturating_sub(self.stored_at) > ttl_ms
    }

    // == Age ==
    /// Milliseconds elapsed since the entry was stored.
    pub fn age_ms(&self) -> u64 {
        current_timestamp_ms().saturating_sub(self.stored_at)
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn test_entry_creation() {
        let entry = CacheEntry::new(RoutePayload::default());
        assert!(entry.stored_at > 0);
        assert!(!entry.is_expired(60_000));
    }

    #[test]
    fn test_entry_expiration() {
        let entry = CacheEntry::new(RoutePayload::default());

        assert!(!entry.is_expired(50));

        sleep(Duration::from_millis(80));

        assert!(entry.is_expired(50));
    }

    #[test]
    fn test_expiration_boundary_is_strict() {
        // An entry aged exactly ttl_ms is not yet expired.
        let entry = CacheEntry {
            payload: RoutePayload::default(),
            stored_at: current_timestamp_ms(),
        };
        assert!(!entry.is_expired(u64::MAX));
    }

    #[test]
    fn test_age_advances() {
        let entry = CacheEntry::new(RoutePayload::default());
        sleep(Duration::from_millis(30));
        assert!(entry.age_ms() >= 30);
    }
}
