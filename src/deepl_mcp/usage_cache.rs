//! Short-lived cache for the usage report.
//!
//! Usage lookups are comparatively expensive and change slowly, so the last
//! fetched payload is served again while it is younger than the TTL. An entry
//! is valid only while `now - cached_at < ttl`; once it ages out it is treated
//! as absent and the next lookup overwrites it.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::time::Duration;

/// A cached usage payload and when it was stored.
#[derive(Debug, Clone, PartialEq)]
pub struct UsageCacheEntry {
    pub payload: Value,
    pub cached_at: DateTime<Utc>,
}

/// Single-slot TTL cache.
#[derive(Debug, Clone)]
pub struct UsageCache {
    entry: Option<UsageCacheEntry>,
    ttl: Duration,
}

impl UsageCache {
    pub fn new(ttl: Duration) -> Self {
        Self { entry: None, ttl }
    }

    /// The cached payload if it is still fresh.
    pub fn get(&self) -> Option<&Value> {
        self.get_at(Utc::now())
    }

    /// The cached payload if it is fresh at `now`.
    pub fn get_at(&self, now: DateTime<Utc>) -> Option<&Value> {
        self.entry
            .as_ref()
            .filter(|entry| self.is_fresh(entry, now))
            .map(|entry| &entry.payload)
    }

    /// Store a freshly fetched payload, replacing any previous one.
    pub fn store(&mut self, payload: Value) {
        self.store_at(payload, Utc::now());
    }

    pub fn store_at(&mut self, payload: Value, cached_at: DateTime<Utc>) {
        self.entry = Some(UsageCacheEntry { payload, cached_at });
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn is_fresh(&self, entry: &UsageCacheEntry, now: DateTime<Utc>) -> bool {
        match chrono::Duration::from_std(self.ttl) {
            Ok(ttl) => now.signed_duration_since(entry.cached_at) < ttl,
            // A TTL too large for chrono never expires.
            Err(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_cache_misses() {
        let cache = UsageCache::new(Duration::from_secs(300));
        assert!(cache.get().is_none());
    }

    #[test]
    fn test_fresh_entry_hits() {
        let mut cache = UsageCache::new(Duration::from_secs(300));
        let t0 = Utc::now();
        cache.store_at(json!({"success": true}), t0);

        let later = t0 + chrono::Duration::seconds(299);
        assert_eq!(cache.get_at(later), Some(&json!({"success": true})));
    }

    #[test]
    fn test_entry_expires_at_ttl() {
        let mut cache = UsageCache::new(Duration::from_secs(300));
        let t0 = Utc::now();
        cache.store_at(json!({"success": true}), t0);

        assert!(cache.get_at(t0 + chrono::Duration::seconds(300)).is_none());
        assert!(cache.get_at(t0 + chrono::Duration::minutes(6)).is_none());
    }

    #[test]
    fn test_store_overwrites() {
        let mut cache = UsageCache::new(Duration::from_secs(300));
        cache.store(json!({"n": 1}));
        cache.store(json!({"n": 2}));
        assert_eq!(cache.get(), Some(&json!({"n": 2})));
    }

    #[test]
    fn test_zero_ttl_never_hits() {
        let mut cache = UsageCache::new(Duration::from_secs(0));
        cache.store(json!({"n": 1}));
        assert!(cache.get().is_none());
    }
}
