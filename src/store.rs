//! Entry store: exclusive owner of all cached data.
//!
//! A single `RwLock<HashMap>` guards the entries so that `clear` is atomic
//! with respect to concurrent readers and counter updates can run as one
//! read-modify-write critical section. Expiration is lazy: an expired entry
//! is physically removed by the next read that observes it.
//!
//! This type is normally used through [`crate::CacheService`] rather than
//! directly.

use crate::clock::Clock;
use crate::error::Result;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A cached entry with optional expiration deadline.
struct Entry {
    data: Vec<u8>,
    expires_at: Option<Instant>,
}

impl Entry {
    fn new(data: Vec<u8>, ttl: Option<Duration>, now: Instant) -> Self {
        // A zero TTL means "never expires", matching memcached's time=0.
        let expires_at = ttl.filter(|d| !d.is_zero()).map(|d| now + d);
        Entry { data, expires_at }
    }

    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|exp| now >= exp)
    }
}

/// Mapping from key to entry, with lazy TTL expiration.
///
/// Every key present either has no expiry or has not yet been observed past
/// its deadline; reads treat entries past their deadline as absent and remove
/// them.
pub struct EntryStore {
    entries: RwLock<HashMap<String, Entry>>,
    clock: Arc<dyn Clock>,
}

impl EntryStore {
    /// Create an empty store reading time from `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        EntryStore {
            entries: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Store `data` under `key`, overwriting unconditionally.
    ///
    /// `ttl` of `None` or zero means the entry never expires.
    pub fn put(&self, key: &str, data: Vec<u8>, ttl: Option<Duration>) {
        let entry = Entry::new(data, ttl, self.clock.now());
        self.entries.write().insert(key.to_string(), entry);

        match ttl.filter(|d| !d.is_zero()) {
            Some(d) => debug!("✓ Store PUT {} (TTL: {:?})", key, d),
            None => debug!("✓ Store PUT {}", key),
        }
    }

    /// Retrieve the bytes stored under `key`.
    ///
    /// This is a mutating read: an entry past its deadline is removed and
    /// reported absent.
    pub fn lookup(&self, key: &str) -> Option<Vec<u8>> {
        let now = self.clock.now();
        {
            let entries = self.entries.read();
            match entries.get(key) {
                Some(entry) if !entry.is_expired(now) => {
                    debug!("✓ Store GET {} -> HIT", key);
                    return Some(entry.data.clone());
                }
                Some(_) => {} // expired, fall through to removal
                None => {
                    debug!("✓ Store GET {} -> MISS", key);
                    return None;
                }
            }
        }

        let mut entries = self.entries.write();
        // Re-check under the write lock: the key may have been rewritten
        // between lock acquisitions.
        if let Some(entry) = entries.get(key) {
            if !entry.is_expired(self.clock.now()) {
                return Some(entry.data.clone());
            }
            entries.remove(key);
        }
        debug!("✓ Store GET {} -> MISS (expired)", key);
        None
    }

    /// Retrieve several keys in one critical section.
    ///
    /// Results are positional; absent or expired keys yield `None`. Expired
    /// entries among the requested keys are removed.
    pub fn lookup_many(&self, keys: &[&str]) -> Vec<Option<Vec<u8>>> {
        let mut entries = self.entries.write();
        let now = self.clock.now();

        let mut results = Vec::with_capacity(keys.len());
        for key in keys {
            let expired = matches!(entries.get(*key), Some(entry) if entry.is_expired(now));
            if expired {
                entries.remove(*key);
                results.push(None);
                continue;
            }
            results.push(entries.get(*key).map(|entry| entry.data.clone()));
        }

        debug!("✓ Store MGET {} keys", keys.len());
        results
    }

    /// Atomically read, transform, and replace the entry under `key`.
    ///
    /// The closure receives the current unexpired bytes (or `None`) and
    /// returns the replacement bytes plus a caller-visible value. On closure
    /// error nothing is written and the existing entry is left unmodified.
    /// The replacement entry never expires.
    pub fn modify<T>(
        &self,
        key: &str,
        f: impl FnOnce(Option<&[u8]>) -> Result<(Vec<u8>, T)>,
    ) -> Result<T> {
        let mut entries = self.entries.write();
        let now = self.clock.now();

        let current = entries
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.data.as_slice());

        let (data, out) = f(current)?;
        entries.insert(
            key.to_string(),
            Entry {
                data,
                expires_at: None,
            },
        );
        Ok(out)
    }

    /// Remove the entry under `key`. Returns whether an entry existed.
    pub fn remove(&self, key: &str) -> bool {
        let removed = self.entries.write().remove(key).is_some();
        debug!("✓ Store DELETE {} (removed: {})", key, removed);
        removed
    }

    /// Check whether `key` holds an unexpired entry, without mutating.
    pub fn exists(&self, key: &str) -> bool {
        let now = self.clock.now();
        matches!(self.entries.read().get(key), Some(entry) if !entry.is_expired(now))
    }

    /// Remove all entries unconditionally.
    pub fn clear(&self) {
        self.clear_with(|| {});
    }

    /// Remove all entries, running `and_then` before the write lock is
    /// released. Readers never observe a partially cleared store, and
    /// whatever `and_then` clears (e.g. the key registry) goes with it.
    pub fn clear_with<F: FnOnce()>(&self, and_then: F) {
        let mut entries = self.entries.write();
        entries.clear();
        and_then();
        warn!("⚠ Store CLEAR executed - all entries removed!");
    }

    /// Current number of entries, including any not yet lazily expired.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Total payload bytes currently held.
    pub fn total_bytes(&self) -> usize {
        self.entries
            .read()
            .values()
            .map(|entry| entry.data.len())
            .sum()
    }
}
