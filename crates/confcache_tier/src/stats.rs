// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

/// A point-in-time view of cache hit/miss accounting.
///
/// `hit_rate` is `hits / (hits + misses)`, or `0.0` before any lookup.
///
/// # Examples
///
/// ```
/// use confcache_tier::CacheStats;
///
/// let stats = CacheStats::new(3, 1, 10);
/// assert_eq!(stats.hit_rate, 0.75);
///
/// assert_eq!(CacheStats::default().hit_rate, 0.0);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CacheStats {
    /// Number of lookups that returned a live value.
    pub hits: u64,
    /// Number of lookups that found nothing or an expired value.
    pub misses: u64,
    /// Number of entries currently stored.
    pub size: usize,
    /// Fraction of lookups that were hits.
    pub hit_rate: f64,
}

impl CacheStats {
    /// Builds a snapshot, deriving `hit_rate` from the counters.
    #[must_use]
    #[expect(clippy::cast_precision_loss, reason = "hit rate is an approximate ratio")]
    pub fn new(hits: u64, misses: u64, size: usize) -> Self {
        let lookups = hits.saturating_add(misses);
        let hit_rate = if lookups == 0 { 0.0 } else { hits as f64 / lookups as f64 };
        Self {
            hits,
            misses,
            size,
            hit_rate,
        }
    }
}
