//! Configuration for the SIEVE cache.
//!
//! # Sizing Guidelines
//!
//! ## Understanding `max_size_in_bytes` and `max_count`
//!
//! - **`max_size_in_bytes`**: The hard byte budget for cached *values*, as
//!   measured by the configured weight function. A value of `0` means the
//!   cache accepts nothing: every insertion is immediately swept back out.
//! - **`max_count`**: The hard entry-count budget. A value of `0` disables
//!   count-based restriction entirely, leaving only the byte budget.
//!
//! Both limits are enforced together: the eviction sweep runs while either
//! budget is exceeded and entries remain. A single entry whose weight
//! exceeds the whole byte budget is admitted and then immediately swept
//! back out, leaving the cache empty.
//!
//! ## Choosing values
//!
//! ```text
//! max_size_in_bytes = memory budget for values
//! max_count         = max_size_in_bytes / average_value_size  (or 0)
//! ```
//!
//! With the default [`EqualWeight`](crate::weight::EqualWeight) strategy every
//! value weighs 1, so `max_size_in_bytes` behaves as a second entry-count
//! limit; supply a real weigher when byte accounting matters.
//!
//! # Examples
//!
//! ```
//! use sieve_rs::config::SieveCacheConfig;
//! use sieve_rs::SieveCache;
//!
//! // 10MB budget, at most 10,000 entries.
//! let config = SieveCacheConfig {
//!     max_size_in_bytes: 10 * 1024 * 1024,
//!     max_count: 10_000,
//! };
//! let cache: SieveCache<String, Vec<u8>, _> =
//!     SieveCache::with_weigher(config, |v: &Vec<u8>| v.len() as u64);
//! # let _ = cache;
//! ```

use core::fmt;

/// Configuration for a SIEVE cache.
///
/// # Fields
///
/// - `max_size_in_bytes`: Hard byte budget; `0` means the cache accepts no
///   entries (everything is evicted immediately after insertion).
/// - `max_count`: Hard entry-count budget; `0` means no count-based
///   restriction (only the byte budget applies).
///
/// # Examples
///
/// ```
/// use sieve_rs::config::SieveCacheConfig;
/// use sieve_rs::SieveCache;
///
/// // Count-bounded cache: unit weights, at most 1,000 entries.
/// let config = SieveCacheConfig {
///     max_size_in_bytes: u64::MAX,
///     max_count: 1_000,
/// };
/// let cache: SieveCache<&str, i32> = SieveCache::init(config, None);
/// # let _ = cache;
/// ```
#[derive(Clone, Copy)]
pub struct SieveCacheConfig {
    /// Hard byte budget for stored values; `0` accepts nothing.
    pub max_size_in_bytes: u64,
    /// Hard entry-count budget; `0` disables the count limit.
    pub max_count: usize,
}

impl fmt::Debug for SieveCacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SieveCacheConfig")
            .field("max_size_in_bytes", &self.max_size_in_bytes)
            .field("max_count", &self.max_count)
            .finish()
    }
}
