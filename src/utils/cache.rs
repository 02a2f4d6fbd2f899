//! Short-lived response cache
//!
//! Memoizes decoded RPC responses keyed by full request identity so that
//! near-simultaneous duplicate reads never reach the rate limiter.
//!
//! Features:
//! - TTL measured from insertion, 15s default
//! - Lazy eviction: an expired entry is removed by the lookup that finds it
//! - HIT/MISS counters
//! - DashMap for concurrent access without a global lock
//!
//! Timestamps use `tokio::time::Instant` so tests can drive expiry with a
//! paused clock.

use dashmap::DashMap;
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::utils::constants::DEFAULT_CACHE_TTL_SECS;

/// Deterministic request identity: `METHOD url` plus the serialized body.
///
/// serde_json maps serialize with sorted keys, so two logically identical
/// bodies always produce the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(method: &str, url: &str, body: Option<&serde_json::Value>) -> Self {
        match body {
            Some(body) => Self(format!("{} {}|{}", method, url, body)),
            None => Self(format!("{} {}", method, url)),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Cache entry: payload plus insertion time
#[derive(Clone, Debug)]
pub struct CacheEntry {
    pub payload: serde_json::Value,
    pub inserted_at: Instant,
}

impl CacheEntry {
    #[inline]
    fn is_expired(&self, ttl: Duration) -> bool {
        self.inserted_at.elapsed() >= ttl
    }
}

/// Process-wide response cache, cheap to clone
#[derive(Clone)]
pub struct ResponseCache {
    store: Arc<DashMap<CacheKey, CacheEntry>>,
    ttl: Duration,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_CACHE_TTL_SECS))
    }
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            store: Arc::new(DashMap::new()),
            ttl,
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Returns the payload only while `now - inserted_at < ttl`
    pub fn get(&self, key: &CacheKey) -> Option<serde_json::Value> {
        if let Some(entry) = self.store.get(key) {
            if entry.is_expired(self.ttl) {
                drop(entry); // release read guard before removing
                self.evict_if_expired(key);
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!("📭 CACHE MISS (expired): {}", key);
                None
            } else {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!("✅ CACHE HIT: {}", key);
                Some(entry.payload.clone())
            }
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            debug!("📭 CACHE MISS: {}", key);
            None
        }
    }

    /// Second lookup for a request that already missed on its way into the
    /// queue. Counts a hit when found, never a second miss.
    pub fn recheck(&self, key: &CacheKey) -> Option<serde_json::Value> {
        let entry = self.store.get(key)?;
        if entry.is_expired(self.ttl) {
            return None;
        }
        self.hits.fetch_add(1, Ordering::Relaxed);
        debug!("✅ CACHE HIT (queued duplicate): {}", key);
        Some(entry.payload.clone())
    }

    /// Removes the entry only if it is still the expired one; a fresh `put`
    /// that landed after the lookup survives.
    fn evict_if_expired(&self, key: &CacheKey) -> bool {
        let ttl = self.ttl;
        self.store.remove_if(key, |_, entry| entry.is_expired(ttl)).is_some()
    }

    pub fn put(&self, key: CacheKey, payload: serde_json::Value) {
        debug!("💾 CACHE SET: {} (TTL: {}s)", key, self.ttl.as_secs());
        self.store.insert(
            key,
            CacheEntry {
                payload,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Sweep for long-running servers; reads never depend on it
    pub fn cleanup_expired(&self) -> usize {
        let before = self.store.len();
        let ttl = self.ttl;
        self.store.retain(|_, entry| !entry.is_expired(ttl));
        let removed = before.saturating_sub(self.store.len());
        if removed > 0 {
            info!("🧹 CACHE CLEANUP: {} expired entries removed", removed);
        }
        removed
    }

    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        CacheStats {
            entries: self.store.len(),
            hits,
            misses,
            hit_rate,
            ttl_secs: self.ttl.as_secs(),
        }
    }
}

/// Cache statistics for monitoring
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub ttl_secs: u64,
}
