//! Route Cache Store Module
//!
//! Request-keyed memoization of route payloads combining HashMap storage
//! with TTL expiry and store-order eviction at a fixed capacity.

use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, StoreOrder};
use crate::models::{DepartureTime, RouteMode, RoutePayload, RouteRequest};

// == Canonical Key ==
/// Canonical view of a route request used for key derivation.
///
/// String fields are trimmed (trim only, waypoint order preserved), `mode`
/// always carries its default, and missing optionals serialize as null.
/// Field order is fixed by this declaration, so serialization is
/// deterministic: requests differing only in surrounding whitespace or
/// JSON field order map to the same key.
#[derive(Serialize)]
struct CanonicalRequest<'a> {
    start: &'a str,
    end: &'a str,
    waypoints: Vec<&'a str>,
    use_highways: bool,
    mode: RouteMode,
    departure_time: Option<&'a DepartureTime>,
}

// == Route Cache ==
/// In-memory route cache with TTL expiry and store-order eviction.
///
/// Eviction removes the oldest-STORED entry, not the least recently read
/// one; reads never extend an entry's life.
#[derive(Debug)]
pub struct RouteCache {
    /// Key-payload storage
    entries: HashMap<String, CacheEntry>,
    /// Storage order tracker for eviction
    order: StoreOrder,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries allowed
    capacity: usize,
    /// Entry lifetime
    ttl: Duration,
}

impl RouteCache {
    // == Constructor ==
    /// Creates a new RouteCache with the given capacity and TTL.
    ///
    /// # Arguments
    /// * `capacity` - Maximum number of routes the cache can hold
    /// * `ttl` - Lifetime of each entry
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            order: StoreOrder::new(),
            stats: CacheStats::new(),
            capacity,
            ttl,
        }
    }

    // == Cache Key ==
    /// Derives the canonical cache key for a request.
    ///
    /// Equivalent requests MUST yield identical keys; this is the central
    /// correctness property of the cache.
    pub fn cache_key(request: &RouteRequest) -> String {
        let canonical = CanonicalRequest {
            start: request.origin.trim(),
            end: request.destination.trim(),
            waypoints: request.waypoints.iter().map(|wp| wp.trim()).collect(),
            use_highways: request.use_highways,
            mode: request.mode,
            departure_time: request.departure_time.as_ref(),
        };
        serde_json::to_string(&canonical).expect("canonical request serialization cannot fail")
    }

    // == Put ==
    /// Stores a payload under the request's canonical key.
    ///
    /// Error payloads are never cached. An existing entry for the same key
    /// is replaced and its storage timestamp refreshed. After storing, the
    /// oldest-stored entries are evicted until the cache is back at
    /// capacity.
    pub fn put(&mut self, request: &RouteRequest, payload: RoutePayload) {
        if payload.is_error() {
            debug!("Skipping cache store for error payload");
            return;
        }

        let key = Self::cache_key(request);
        self.entries.insert(key.clone(), CacheEntry::new(payload));
        self.order.record(&key);
        self.prune();

        self.stats.set_total_entries(self.entries.len());
        debug!(key = %key, "Route cached");
    }

    // == Get ==
    /// Retrieves the cached payload for a request, if fresh.
    ///
    /// Returns None if the key is absent, or if the entry outlived the TTL
    /// (in which case it is removed and counted as a miss).
    pub fn get(&mut self, request: &RouteRequest) -> Option<RoutePayload> {
        let key = Self::cache_key(request);

        let Some(entry) = self.entries.get(&key) else {
            self.stats.record_miss();
            return None;
        };

        if entry.is_expired(self.ttl.as_millis() as u64) {
            debug!(key = %key, "Cache entry expired");
            self.entries.remove(&key);
            self.order.remove(&key);
            self.stats.set_total_entries(self.entries.len());
            self.stats.record_miss();
            return None;
        }

        let payload = entry.payload.clone();
        self.stats.record_hit();
        debug!(key = %key, "Cache hit");
        Some(payload)
    }

    // == Clear ==
    /// Removes all entries unconditionally.
    ///
    /// Returns the number of entries removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        self.order.clear();
        self.stats.set_total_entries(0);
        removed
    }

    // == Prune ==
    /// Evicts oldest-stored entries until the cache is at or under capacity.
    fn prune(&mut self) {
        while self.entries.len() > self.capacity {
            let Some(evicted_key) = self.order.evict_oldest() else {
                break;
            };
            self.entries.remove(&evicted_key);
            self.stats.record_eviction();
            debug!(key = %evicted_key, "Evicted oldest cached route");
        }
    }

    // == Sweep Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn sweep_expired(&mut self) -> usize {
        let ttl_ms = self.ttl.as_millis() as u64;
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(ttl_ms))
            .map(|(key, _)| key.clone())
            .collect();

        let count = expired_keys.len();

        for key in expired_keys {
            self.entries.remove(&key);
            self.order.remove(&key);
        }

        self.stats.set_total_entries(self.entries.len());
        count
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
