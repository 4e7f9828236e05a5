//! High-level cache service.
//!
//! `CacheService` is the public face of the crate: typed get/set with
//! optional TTLs, atomic counters, multi-key reads, flush, and statistics.
//! Values cross the boundary through the versioned postcard envelope, so a
//! stored value is opaque bytes until a typed read decodes it.

use crate::clock::{Clock, SystemClock};
use crate::error::{Error, Result};
use crate::registry::KeyRegistry;
use crate::serialization::{
    deserialize_counter, deserialize_from_cache, serialize_counter, serialize_for_cache,
};
use crate::store::EntryStore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Snapshot of service statistics.
///
/// `items` includes entries that are past their TTL but have not yet been
/// observed by a read; lazy expiration removes them on first access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of entries currently held.
    pub items: usize,
    /// Reads that found a live entry.
    pub hits: u64,
    /// Reads that found nothing (absent or expired).
    pub misses: u64,
    /// Total payload bytes currently held.
    pub total_bytes: usize,
    /// Number of keys ever written (diagnostic, cleared on flush).
    pub tracked_keys: usize,
}

impl CacheStats {
    /// Hit rate as a fraction between 0.0 and 1.0.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// TTL-based key-value cache with typed values and atomic counters.
///
/// Cloning is cheap and shares the underlying store, so a service can be
/// handed to every task that needs it.
///
/// # Example
///
/// ```ignore
/// use memo_kit::CacheService;
/// use std::time::Duration;
///
/// let cache = CacheService::new();
/// cache.set("greeting", &"hello", Some(Duration::from_secs(60))).await?;
/// let value: Option<String> = cache.get("greeting").await?;
/// assert_eq!(value.as_deref(), Some("hello"));
/// ```
#[derive(Clone)]
pub struct CacheService {
    store: Arc<EntryStore>,
    registry: KeyRegistry,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
}

impl CacheService {
    /// Create a service reading time from the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create a service with an injected clock.
    ///
    /// Tests use this with [`crate::ManualClock`] to drive expiration
    /// deterministically.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        CacheService {
            store: Arc::new(EntryStore::new(clock)),
            registry: KeyRegistry::new(),
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Retrieve and decode the value stored under `key`.
    ///
    /// Returns `Ok(None)` when the key is absent or expired. Counts as a hit
    /// or miss in [`CacheService::stats`].
    ///
    /// # Errors
    ///
    /// - `Error::DeserializationError` when the stored bytes do not decode
    ///   as `T`
    /// - `Error::InvalidCacheEntry` / `Error::VersionMismatch` when the
    ///   envelope is damaged or from an incompatible schema
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.store.lookup(key) {
            Some(bytes) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                let value = deserialize_from_cache(&bytes)?;
                debug!("✓ Cache GET {} -> HIT", key);
                Ok(Some(value))
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!("✓ Cache GET {} -> MISS", key);
                Ok(None)
            }
        }
    }

    /// Encode `value` and store it under `key`, overwriting unconditionally.
    ///
    /// `ttl` of `None` or zero means the entry never expires. Writing over a
    /// counter turns the key back into an opaque value.
    pub async fn set<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> Result<()> {
        let bytes = serialize_for_cache(value)?;
        self.store.put(key, bytes, ttl);
        self.registry.record(key);
        Ok(())
    }

    /// Store `value` under `key` as a counter.
    ///
    /// Seeds a base for [`CacheService::increment`] and
    /// [`CacheService::decrement`]. The counter operations also accept a
    /// plain [`CacheService::set`] of a single integer; `set_counter` tags
    /// the entry explicitly and lets the base carry a TTL.
    pub async fn set_counter(&self, key: &str, value: u64, ttl: Option<Duration>) -> Result<()> {
        let bytes = serialize_counter(value)?;
        self.store.put(key, bytes, ttl);
        self.registry.record(key);
        Ok(())
    }

    /// Remove the entry under `key`. Returns whether an entry was present.
    pub async fn delete(&self, key: &str) -> Result<bool> {
        Ok(self.store.remove(key))
    }

    /// Check whether `key` holds a live entry, without counting a hit or
    /// miss.
    pub async fn exists(&self, key: &str) -> bool {
        self.store.exists(key)
    }

    /// Atomically add `delta` to the counter under `key`.
    ///
    /// An absent or expired key is treated as zero, so the first increment
    /// of a fresh key yields `delta`. The result is written back with no
    /// TTL. Saturates at `u64::MAX`.
    ///
    /// # Errors
    ///
    /// `Error::TypeMismatch` when the key holds a non-integer value (a
    /// string, a struct, ...); the existing entry is left unmodified.
    pub async fn increment(&self, key: &str, delta: u64) -> Result<u64> {
        let result = self.counter_update(key, |current| current.saturating_add(delta))?;
        debug!("✓ Cache INCR {} += {} -> {}", key, delta, result);
        Ok(result)
    }

    /// Atomically subtract `delta` from the counter under `key`.
    ///
    /// An absent or expired key is treated as zero, and the counter never
    /// goes below zero. Same error behavior as [`CacheService::increment`].
    pub async fn decrement(&self, key: &str, delta: u64) -> Result<u64> {
        let result = self.counter_update(key, |current| current.saturating_sub(delta))?;
        debug!("✓ Cache DECR {} -= {} -> {}", key, delta, result);
        Ok(result)
    }

    fn counter_update(&self, key: &str, apply: impl FnOnce(u64) -> u64) -> Result<u64> {
        let updated = self.store.modify(key, |current| {
            let base = match current {
                Some(bytes) => {
                    deserialize_counter(bytes)?.ok_or_else(|| Error::TypeMismatch {
                        key: key.to_string(),
                    })?
                }
                None => 0,
            };
            let updated = apply(base);
            Ok((serialize_counter(updated)?, updated))
        })?;
        self.registry.record(key);
        Ok(updated)
    }

    /// Retrieve several keys at once.
    ///
    /// Absent and expired keys are omitted from the result, so the map may
    /// be smaller than the input. All values must decode as the same type
    /// `T`. Each requested key counts as one hit or miss.
    pub async fn get_multi<T: DeserializeOwned>(
        &self,
        keys: &[&str],
    ) -> Result<HashMap<String, T>> {
        if keys.is_empty() {
            return Ok(HashMap::new());
        }

        let results = self.store.lookup_many(keys);
        let mut found = HashMap::new();
        for (key, bytes) in keys.iter().zip(results) {
            match bytes {
                Some(bytes) => {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    found.insert(key.to_string(), deserialize_from_cache(&bytes)?);
                }
                None => {
                    self.misses.fetch_add(1, Ordering::Relaxed);
                }
            }
        }
        debug!("✓ Cache MGET {} keys -> {} hits", keys.len(), found.len());
        Ok(found)
    }

    /// Remove every entry and forget all tracked keys.
    ///
    /// Atomic with respect to readers: a concurrent `get` sees either the
    /// full store or the empty one, never an intermediate state. Hit and
    /// miss counters survive a flush.
    pub async fn flush(&self) {
        let registry = self.registry.clone();
        self.store.clear_with(|| registry.clear());
        warn!("⚠ Cache FLUSH executed - all entries removed!");
    }

    /// Statistics snapshot.
    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            items: self.store.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            total_bytes: self.store.total_bytes(),
            tracked_keys: self.registry.len(),
        }
    }

    /// Snapshot of every key ever written, in no particular order.
    ///
    /// Diagnostic only: listed keys may already be expired or deleted.
    pub async fn keys(&self) -> Vec<String> {
        self.registry.keys()
    }

    /// Return the cached value under `key`, or compute, store, and return it.
    ///
    /// Performs exactly one cache read and at most one write. Concurrent
    /// callers missing on the same key may each run `compute`; the last
    /// write wins. A `compute` failure is propagated and nothing is cached.
    pub async fn get_or_set<T, F, Fut>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        compute: F,
    ) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(value) = self.get(key).await? {
            return Ok(value);
        }

        let value = compute().await?;
        self.set(key, &value, ttl).await?;
        Ok(value)
    }
}

impl Default for CacheService {
    fn default() -> Self {
        Self::new()
    }
}
