//! # memo-kit
//!
//! A TTL-based in-process key-value cache with typed values, atomic
//! counters, and cache-aside memoization.
//!
//! ## Features
//!
//! - **Typed Values:** Store any `Serialize` type; reads decode back through
//!   a versioned postcard envelope
//! - **Lazy TTL Expiration:** Entries past their deadline read as absent and
//!   are removed on access, with no background sweeper
//! - **Atomic Counters:** `increment`/`decrement` as single read-modify-write
//!   operations, floored at zero
//! - **Memoization:** Cache-aside wrapper deriving keys from a computation
//!   name plus hashed arguments
//! - **Testable Time:** Injected [`Clock`] so tests drive expiration without
//!   sleeping
//!
//! ## Quick Start
//!
//! ```ignore
//! use memo_kit::{CacheService, Memoizer};
//! use serde::{Deserialize, Serialize};
//! use std::time::Duration;
//!
//! #[derive(Clone, Serialize, Deserialize)]
//! struct User {
//!     id: u64,
//!     name: String,
//! }
//!
//! let cache = CacheService::new();
//!
//! // Typed set/get with a TTL
//! let user = User { id: 1, name: "Alice".to_string() };
//! cache.set("user:1", &user, Some(Duration::from_secs(60))).await?;
//! let cached: Option<User> = cache.get("user:1").await?;
//!
//! // Atomic counters
//! cache.increment("page_views", 1).await?;
//!
//! // Memoize an expensive computation
//! let memo = Memoizer::new(cache.clone());
//! let report = memo
//!     .call("report", &("q3", 2024), || async { build_report().await })
//!     .await?;
//! ```

#[macro_use]
extern crate log;

pub mod clock;
pub mod error;
pub mod key;
pub mod memo;
pub mod registry;
pub mod serialization;
pub mod service;
pub mod store;

// Re-exports for convenience
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Error, Result};
pub use key::CacheKeyBuilder;
pub use memo::{Memoizer, DEFAULT_MEMO_TTL};
pub use registry::KeyRegistry;
pub use service::{CacheService, CacheStats};
pub use store::EntryStore;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
