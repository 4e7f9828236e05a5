//! Error types for the cache service.

use std::fmt;

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the cache service.
///
/// "Not found" is never an error: `get`/`get_multi` return empty results and
/// `delete` returns `false` for absent keys. The variants below represent
/// genuine faults that propagate to the caller.
#[derive(Debug, Clone)]
pub enum Error {
    /// Serialization failed when converting a value to cache bytes.
    ///
    /// Raised when the value's Serde implementation or the Postcard codec
    /// fails, including during memo key derivation from argument values.
    SerializationError(String),

    /// Deserialization failed when converting cache bytes back to a value.
    ///
    /// Indicates corrupted or malformed data in the cache, or a type
    /// parameter that does not match what was stored.
    ///
    /// **Recovery:** Evict the entry and recompute.
    DeserializationError(String),

    /// A counter operation was invoked on a key holding a non-integer value.
    ///
    /// `increment`/`decrement` operate on counter entries and on plain
    /// values holding a single integer; anything else (a string, a struct)
    /// raises this. The offending entry is left unmodified.
    TypeMismatch {
        /// Key holding the non-counter value
        key: String,
    },

    /// An external cache backend could not be reached.
    ///
    /// The in-process store never raises this; it exists for real-client
    /// adapters layered over this service so that connection failures are
    /// surfaced distinctly from cache misses.
    BackendUnavailable(String),

    /// Invalid cache entry: corrupted envelope or bad magic.
    ///
    /// Returned when the magic header is not `b"MKIT"` or the envelope
    /// cannot be decoded at all.
    ///
    /// **Recovery:** Evict the entry and recompute.
    InvalidCacheEntry(String),

    /// Schema version mismatch between code and cached data.
    ///
    /// Raised when `CURRENT_SCHEMA_VERSION` changed between the writer and
    /// the reader. Expected during deployments; evict and recompute.
    VersionMismatch {
        /// Expected schema version (from compiled code)
        expected: u32,
        /// Found schema version (from the cached entry)
        found: u32,
    },

    /// Generic error with a custom message.
    Other(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            Error::DeserializationError(msg) => write!(f, "Deserialization error: {}", msg),
            Error::TypeMismatch { key } => {
                write!(f, "Type mismatch: key '{}' does not hold a counter", key)
            }
            Error::BackendUnavailable(msg) => write!(f, "Backend unavailable: {}", msg),
            Error::InvalidCacheEntry(msg) => write!(f, "Invalid cache entry: {}", msg),
            Error::VersionMismatch { expected, found } => {
                write!(
                    f,
                    "Cache version mismatch: expected {}, found {}",
                    expected, found
                )
            }
            Error::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::BackendUnavailable(e.to_string())
    }
}

impl From<String> for Error {
    fn from(e: String) -> Self {
        Error::Other(e)
    }
}

impl From<&str> for Error {
    fn from(e: &str) -> Self {
        Error::Other(e.to_string())
    }
}
