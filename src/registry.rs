//! Diagnostic registry of keys the service has written to.
//!
//! The registry is advisory: it records every key ever written through the
//! service and is only cleared on flush. A listed key may already be expired
//! or deleted; use it for inspection endpoints and debugging, not as a source
//! of truth about liveness.

use dashmap::DashSet;
use std::sync::Arc;

/// Concurrent set of keys observed on the write path.
///
/// Cloning is cheap and shares the underlying set.
#[derive(Clone, Default)]
pub struct KeyRegistry {
    keys: Arc<DashSet<String>>,
}

impl KeyRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `key` was written. Idempotent.
    pub fn record(&self, key: &str) {
        self.keys.insert(key.to_string());
    }

    /// Check whether `key` has ever been recorded.
    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Snapshot of all recorded keys, in no particular order.
    pub fn keys(&self) -> Vec<String> {
        self.keys.iter().map(|k| k.key().clone()).collect()
    }

    /// Number of recorded keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Forget all recorded keys.
    pub fn clear(&self) {
        self.keys.clear();
    }
}
