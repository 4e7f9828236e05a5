//! Cache key construction utilities.
//!
//! Keys are plain `prefix:part:part` strings. Memoization keys additionally
//! embed a content hash of the serialized arguments so that distinct argument
//! tuples never collide even when their `Display` forms would.

use crate::error::Result;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Prefix shared by all memoization keys.
pub const MEMO_PREFIX: &str = "memo";

/// Builder for cache keys.
pub struct CacheKeyBuilder;

impl CacheKeyBuilder {
    /// Build a cache key from a prefix and an identifier.
    pub fn build(prefix: &str, id: &dyn std::fmt::Display) -> String {
        format!("{}:{}", prefix, id)
    }

    /// Build a composite key from multiple parts.
    pub fn build_composite(parts: &[&str]) -> String {
        parts.join(":")
    }

    /// Parse a composite key into parts.
    pub fn parse(key: &str) -> Vec<&str> {
        key.split(':').collect()
    }

    /// Build a memoization key for a named computation and its arguments.
    ///
    /// The arguments are serialized with postcard and hashed with SHA-256, so
    /// the key is deterministic for equal arguments and fixed-length no
    /// matter how large the argument tuple is.
    pub fn build_memo<A: Serialize + ?Sized>(name: &str, args: &A) -> Result<String> {
        let encoded = postcard::to_allocvec(args)
            .map_err(|e| crate::error::Error::SerializationError(e.to_string()))?;
        let digest = Sha256::digest(&encoded);
        Ok(format!("{}:{}:{}", MEMO_PREFIX, name, hex::encode(digest)))
    }
}
