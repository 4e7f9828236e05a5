//! Postcard-based cache serialization with versioned envelopes.
//!
//! This module provides the canonical serialization format for everything the
//! cache stores. Payloads are encoded with Postcard and wrapped in a versioned
//! envelope for corruption detection and schema evolution safety.
//!
//! # Format
//!
//! ```text
//! ┌─────────────────┬─────────────────┬──────────────┬──────────────────────────┐
//! │  MAGIC (4 bytes)│VERSION (varint) │ KIND (1 byte)│POSTCARD PAYLOAD (N bytes)│
//! └─────────────────┴─────────────────┴──────────────┴──────────────────────────┘
//!   "MKIT"              u32             Value|Counter   postcard::to_allocvec(T)
//! ```
//!
//! Postcard is not self-describing, so the envelope carries a [`ValueKind`]
//! tag distinguishing opaque values from counters. Counter operations read
//! the stored base through [`deserialize_counter`]: counter-tagged entries
//! decode directly, and value-tagged entries are accepted only when the
//! payload is exactly one integer.
//!
//! # Example
//!
//! ```rust
//! use memo_kit::serialization::{serialize_for_cache, deserialize_from_cache};
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct User {
//!     id: u64,
//!     name: String,
//! }
//!
//! # fn main() -> memo_kit::Result<()> {
//! let user = User { id: 1, name: "Alice".to_string() };
//! let bytes = serialize_for_cache(&user)?;
//! let deserialized: User = deserialize_from_cache(&bytes)?;
//! assert_eq!(user, deserialized);
//! # Ok(())
//! # }
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Magic header for memo-kit entries: b"MKIT"
///
/// Any entry without this signature is rejected during deserialization.
pub const CACHE_MAGIC: [u8; 4] = *b"MKIT";

/// Current schema version.
///
/// Increment when making breaking changes to the envelope or to cached types.
/// Entries written under an older version are rejected with
/// [`Error::VersionMismatch`] and should be evicted and recomputed.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Discriminates what an envelope payload holds.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueKind {
    /// An opaque serialized value written by `set` or the memoizer.
    Value,
    /// A `u64` counter written by `set_counter`/`increment`/`decrement`.
    Counter,
}

/// Versioned envelope wrapping every cache entry.
///
/// Enables corruption detection (bad magic → reject), schema evolution
/// (version mismatch → evict and recompute), and counter typing.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CacheEnvelope<T> {
    /// Magic header: must be b"MKIT"
    pub magic: [u8; 4],
    /// Schema version: must match [`CURRENT_SCHEMA_VERSION`]
    pub version: u32,
    /// What the payload holds
    pub kind: ValueKind,
    /// The actual cached data
    pub payload: T,
}

impl<T> CacheEnvelope<T> {
    /// Create a new envelope for an opaque value.
    pub fn new(payload: T) -> Self {
        Self::with_kind(ValueKind::Value, payload)
    }

    /// Create a new envelope with an explicit kind.
    pub fn with_kind(kind: ValueKind, payload: T) -> Self {
        Self {
            magic: CACHE_MAGIC,
            version: CURRENT_SCHEMA_VERSION,
            kind,
            payload,
        }
    }
}

/// Envelope prefix, readable without decoding the payload.
#[derive(Deserialize)]
struct EnvelopeHeader {
    magic: [u8; 4],
    version: u32,
    kind: ValueKind,
}

/// Serialize an opaque value with envelope for cache storage.
///
/// # Errors
///
/// Returns [`Error::SerializationError`] if Postcard serialization fails.
pub fn serialize_for_cache<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let envelope = CacheEnvelope::new(value);
    postcard::to_allocvec(&envelope).map_err(|e| {
        log::error!("Cache serialization failed: {}", e);
        Error::SerializationError(e.to_string())
    })
}

/// Serialize a counter value with envelope for cache storage.
///
/// Entries written here carry [`ValueKind::Counter`], marking them as valid
/// targets for `increment`/`decrement`.
///
/// # Errors
///
/// Returns [`Error::SerializationError`] if Postcard serialization fails.
pub fn serialize_counter(value: u64) -> Result<Vec<u8>> {
    let envelope = CacheEnvelope::with_kind(ValueKind::Counter, value);
    postcard::to_allocvec(&envelope).map_err(|e| {
        log::error!("Counter serialization failed: {}", e);
        Error::SerializationError(e.to_string())
    })
}

/// Deserialize a value from cache storage with validation.
///
/// Validates the magic header and schema version, then decodes the payload.
/// The kind tag is not checked here: a counter entry read through `get::<u64>`
/// decodes like any other payload.
///
/// # Errors
///
/// - [`Error::InvalidCacheEntry`]: invalid magic header
/// - [`Error::VersionMismatch`]: schema version mismatch
/// - [`Error::DeserializationError`]: corrupted Postcard payload
pub fn deserialize_from_cache<'de, T: Deserialize<'de>>(bytes: &'de [u8]) -> Result<T> {
    let envelope: CacheEnvelope<T> = postcard::from_bytes(bytes).map_err(|e| {
        log::error!("Cache deserialization failed: {}", e);
        Error::DeserializationError(e.to_string())
    })?;
    validate_header(envelope.magic, envelope.version)?;
    Ok(envelope.payload)
}

/// Read the kind tag of a stored entry without decoding its payload.
///
/// Used by counter operations to tell counters apart from opaque values.
///
/// # Errors
///
/// Same validation failures as [`deserialize_from_cache`].
pub fn peek_kind(bytes: &[u8]) -> Result<ValueKind> {
    let (header, _rest): (EnvelopeHeader, &[u8]) = postcard::take_from_bytes(bytes)
        .map_err(|e| Error::DeserializationError(e.to_string()))?;
    validate_header(header.magic, header.version)?;
    Ok(header.kind)
}

/// Decode a stored entry as a counter base, if it holds one.
///
/// Counter-tagged entries decode directly. Value-tagged entries are accepted
/// only when the payload strictly decodes as a single `u64` with no trailing
/// bytes, so an integer written by `set` interoperates with the counter
/// operations while strings and structs do not. Returns `Ok(None)` for a
/// non-integer value; callers report that as a type mismatch.
///
/// # Errors
///
/// Same validation failures as [`deserialize_from_cache`].
pub fn deserialize_counter(bytes: &[u8]) -> Result<Option<u64>> {
    match peek_kind(bytes)? {
        ValueKind::Counter => deserialize_from_cache(bytes).map(Some),
        // peek_kind validated the header, so only the payload shape is in
        // question here.
        ValueKind::Value => match postcard::take_from_bytes::<CacheEnvelope<u64>>(bytes) {
            Ok((envelope, rest)) if rest.is_empty() => Ok(Some(envelope.payload)),
            _ => Ok(None),
        },
    }
}

fn validate_header(magic: [u8; 4], version: u32) -> Result<()> {
    if magic != CACHE_MAGIC {
        log::warn!(
            "Invalid cache entry: expected magic {:?}, got {:?}",
            CACHE_MAGIC,
            magic
        );
        return Err(Error::InvalidCacheEntry(format!(
            "Invalid magic: expected {:?}, got {:?}",
            CACHE_MAGIC, magic
        )));
    }

    if version != CURRENT_SCHEMA_VERSION {
        log::warn!(
            "Cache version mismatch: expected {}, got {}",
            CURRENT_SCHEMA_VERSION,
            version
        );
        return Err(Error::VersionMismatch {
            expected: CURRENT_SCHEMA_VERSION,
            found: version,
        });
    }

    Ok(())
}
