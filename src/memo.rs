//! Cache-aside memoization of expensive computations.
//!
//! The `Memoizer` derives a stable key from a computation name plus its
//! serialized arguments, then delegates to [`CacheService::get_or_set`].
//! There is no single-flight coordination: concurrent callers missing on the
//! same key may each run the computation, and the last write wins.

use crate::error::Result;
use crate::key::CacheKeyBuilder;
use crate::service::CacheService;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::time::Duration;

/// TTL applied to memoized results when none is given: 5 minutes.
pub const DEFAULT_MEMO_TTL: Duration = Duration::from_secs(300);

/// Memoizes named async computations through a [`CacheService`].
///
/// # Example
///
/// ```ignore
/// use memo_kit::{CacheService, Memoizer};
///
/// let memo = Memoizer::new(CacheService::new());
/// let report = memo
///     .call("quarterly_report", &("q3", 2024), || async {
///         build_report("q3", 2024).await
///     })
///     .await?;
/// ```
#[derive(Clone)]
pub struct Memoizer {
    cache: CacheService,
    default_ttl: Option<Duration>,
}

impl Memoizer {
    /// Create a memoizer with the default TTL of [`DEFAULT_MEMO_TTL`].
    pub fn new(cache: CacheService) -> Self {
        Memoizer {
            cache,
            default_ttl: Some(DEFAULT_MEMO_TTL),
        }
    }

    /// Create a memoizer with a custom default TTL. `None` means memoized
    /// results never expire.
    pub fn with_default_ttl(cache: CacheService, default_ttl: Option<Duration>) -> Self {
        Memoizer { cache, default_ttl }
    }

    /// Return the memoized result of `compute` for `(name, args)`, running
    /// it on a miss and caching the result under the default TTL.
    ///
    /// `name` must identify the computation: two different functions
    /// memoized under the same name with the same arguments will collide.
    pub async fn call<A, T, F, Fut>(&self, name: &str, args: &A, compute: F) -> Result<T>
    where
        A: Serialize + ?Sized,
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.call_with_ttl(name, args, self.default_ttl, compute)
            .await
    }

    /// Like [`Memoizer::call`] with a per-call TTL override.
    pub async fn call_with_ttl<A, T, F, Fut>(
        &self,
        name: &str,
        args: &A,
        ttl: Option<Duration>,
        compute: F,
    ) -> Result<T>
    where
        A: Serialize + ?Sized,
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let key = CacheKeyBuilder::build_memo(name, args)?;
        debug!("✓ Memo CALL {} -> {}", name, key);
        self.cache.get_or_set(&key, ttl, compute).await
    }

    /// Evict the memoized result for `(name, args)`, if present.
    pub async fn invalidate<A: Serialize + ?Sized>(&self, name: &str, args: &A) -> Result<bool> {
        let key = CacheKeyBuilder::build_memo(name, args)?;
        self.cache.delete(&key).await
    }

    /// The underlying cache service.
    pub fn cache(&self) -> &CacheService {
        &self.cache
    }
}
