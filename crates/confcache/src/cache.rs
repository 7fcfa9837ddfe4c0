// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The two-tier cache coordinator.

use std::fmt;
use std::time::Duration;

use confcache_memory::HotTier;
use confcache_storage::WarmTier;
use confcache_tier::{CacheStats, KeyPattern, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tick::Clock;

use crate::builder::CacheBuilder;
use crate::telemetry::ext::{CacheTelemetryExt, ClockExt};
use crate::telemetry::{CacheActivity, CacheOperation, CacheTelemetry, TelemetryTier};

/// A cache combining a synchronous hot tier with an optional asynchronous warm tier.
///
/// Reads check the hot tier first. A hot miss falls through to the warm tier, and a warm
/// hit is copied back into the hot tier with the hot tier's own TTL (promotion). Writes
/// go to the hot tier and then to the warm tier. The tiers expire entries independently
/// and nothing keeps them transactionally in sync.
///
/// A disabled cache never touches either tier: reads miss, writes do nothing, and
/// statistics stay at zero.
///
/// Warm tier failures never reach the caller. The only errors a cache reports are
/// invalid invalidation patterns and, from [`prefetch`](Self::prefetch), the
/// fetcher's own error.
///
/// # Examples
///
/// ```
/// use confcache::{Cache, MemoryStorage, StorageMedium};
/// use std::sync::Arc;
/// use tick::Clock;
/// # futures::executor::block_on(async {
///
/// let cache = Cache::builder::<String>(Clock::new_frozen())
///     .storage(StorageMedium::Custom(Arc::new(MemoryStorage::new())))
///     .build()?;
///
/// cache.set("config:brandA:web:color", "blue".to_string()).await;
/// assert_eq!(cache.get("config:brandA:web:color").await.as_deref(), Some("blue"));
/// assert_eq!(cache.stats().hits, 1);
/// # Ok::<(), confcache::Error>(())
/// # });
/// ```
pub struct Cache<V> {
    pub(crate) name: String,
    pub(crate) enabled: bool,
    pub(crate) hot: HotTier<V>,
    pub(crate) warm: Option<WarmTier>,
    pub(crate) stale_while_revalidate: bool,
    pub(crate) clock: Clock,
    pub(crate) telemetry: Option<CacheTelemetry>,
}

impl<V> fmt::Debug for Cache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("name", &self.name)
            .field("enabled", &self.enabled)
            .field("hot", &self.hot)
            .field("warm", &self.warm)
            .field("stale_while_revalidate", &self.stale_while_revalidate)
            .finish_non_exhaustive()
    }
}

impl Cache<()> {
    /// Creates a builder for a cache of `V` values.
    ///
    /// # Examples
    ///
    /// ```
    /// use confcache::Cache;
    /// use std::time::Duration;
    /// use tick::Clock;
    ///
    /// let cache = Cache::builder::<i32>(Clock::new_frozen())
    ///     .ttl(Duration::from_secs(30))
    ///     .max_size(100)
    ///     .build()?;
    /// assert!(cache.is_enabled());
    /// assert!(!cache.has_warm_tier());
    /// # Ok::<(), confcache::Error>(())
    /// ```
    #[must_use]
    pub fn builder<V>(clock: Clock) -> CacheBuilder<V> {
        CacheBuilder::new(clock)
    }
}

impl<V: Send + Sync> Cache<V> {
    /// Returns the cache name used in telemetry.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true if caching is on.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns true if a warm tier is configured.
    #[must_use]
    pub fn has_warm_tier(&self) -> bool {
        self.warm.is_some()
    }

    /// Returns the reserved stale-while-revalidate setting.
    ///
    /// Reads do not act on it.
    #[must_use]
    pub fn stale_while_revalidate(&self) -> bool {
        self.stale_while_revalidate
    }

    /// Returns the hot tier.
    #[must_use]
    pub fn hot(&self) -> &HotTier<V> {
        &self.hot
    }

    /// Returns the warm tier, if configured.
    #[must_use]
    pub fn warm(&self) -> Option<&WarmTier> {
        self.warm.as_ref()
    }

    /// Returns true if the hot tier holds an unexpired entry for `key`.
    ///
    /// The warm tier is not consulted. Hit and miss counters are not touched.
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.enabled && self.hot.has(key)
    }

    /// Returns hot tier statistics.
    ///
    /// Warm tier hits only show up once the promoted entry is read from the hot tier.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.hot.stats()
    }

    /// Removes `key` from both tiers.
    ///
    /// A warm tier failure does not undo the hot tier removal.
    pub async fn delete(&self, key: &str) {
        if self.bypass(CacheOperation::Delete) {
            return;
        }

        let timed = self
            .clock
            .timed_async(async {
                self.hot.delete(key);
                match &self.warm {
                    Some(warm) => warm.delete(key).await,
                    None => true,
                }
            })
            .await;

        if !timed.result {
            self.record(TelemetryTier::Warm, CacheOperation::Delete, CacheActivity::Degraded, None);
        }
        self.record(TelemetryTier::Both, CacheOperation::Delete, CacheActivity::Removed, Some(timed.duration));
        self.record_size();
    }

    /// Removes every entry from both tiers and resets the hit and miss counters.
    ///
    /// Only this cache's keys are removed from a shared warm medium.
    pub async fn clear(&self) {
        if self.bypass(CacheOperation::Clear) {
            return;
        }

        let timed = self
            .clock
            .timed_async(async {
                self.hot.clear();
                if let Some(warm) = &self.warm {
                    warm.clear().await;
                }
            })
            .await;

        self.record(TelemetryTier::Both, CacheOperation::Clear, CacheActivity::Invalidated, Some(timed.duration));
        self.record_size();
    }

    /// Removes every key matched by the regular expression `pattern` from both tiers.
    ///
    /// Without a pattern this is [`clear`](Self::clear). Warm tier keys are matched
    /// without their prefix.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidPattern`](crate::ErrorKind::InvalidPattern) if
    /// `pattern` is not a valid regular expression. Neither tier is touched in that case.
    pub async fn invalidate(&self, pattern: Option<&str>) -> Result<()> {
        if self.bypass(CacheOperation::Invalidate) {
            return Ok(());
        }

        let Some(pattern) = pattern else {
            self.clear().await;
            return Ok(());
        };

        let pattern = KeyPattern::new(pattern).inspect_err(|_| {
            self.record(TelemetryTier::Both, CacheOperation::Invalidate, CacheActivity::Error, None);
        })?;
        self.invalidate_matching(&pattern).await;
        Ok(())
    }

    /// Removes every key matched by an already compiled `pattern` from both tiers.
    ///
    /// Returns how many hot and warm entries were removed, in that order.
    pub async fn invalidate_matching(&self, pattern: &KeyPattern) -> (usize, usize) {
        if self.bypass(CacheOperation::Invalidate) {
            return (0, 0);
        }

        let timed = self
            .clock
            .timed_async(async {
                let hot = self.hot.invalidate(pattern);
                let warm = match &self.warm {
                    Some(warm) => warm.invalidate(pattern).await,
                    None => 0,
                };
                (hot, warm)
            })
            .await;

        self.record(
            TelemetryTier::Both,
            CacheOperation::Invalidate,
            CacheActivity::Invalidated,
            Some(timed.duration),
        );
        self.record_size();
        timed.result
    }

    fn bypass(&self, operation: CacheOperation) -> bool {
        if !self.enabled {
            self.record(TelemetryTier::Both, operation, CacheActivity::Bypassed, None);
        }
        !self.enabled
    }

    fn record(&self, tier: TelemetryTier, operation: CacheOperation, activity: CacheActivity, duration: Option<Duration>) {
        self.telemetry.record(&self.name, tier, operation, activity, duration);
    }

    fn record_size(&self) {
        self.telemetry.record_size(&self.name, self.hot.len());
    }
}

impl<V> Cache<V>
where
    V: Clone + Serialize + DeserializeOwned + Send + Sync,
{
    /// Returns the cached value for `key`, or `None` on a miss.
    ///
    /// A hot hit returns without touching the warm tier. A warm hit is promoted into
    /// the hot tier with the hot tier's default TTL.
    pub async fn get(&self, key: &str) -> Option<V> {
        if self.bypass(CacheOperation::Get) {
            return None;
        }

        let timed = self.clock.timed_async(self.lookup(key)).await;
        let (value, tier) = timed.result;
        let activity = if value.is_some() { CacheActivity::Hit } else { CacheActivity::Miss };
        self.record(tier, CacheOperation::Get, activity, Some(timed.duration));
        value
    }

    /// Looks `key` up hot then warm, returning the value and the tier that answered.
    async fn lookup(&self, key: &str) -> (Option<V>, TelemetryTier) {
        if let Some(value) = self.hot.get(key) {
            return (Some(value), TelemetryTier::Hot);
        }

        let Some(warm) = &self.warm else {
            return (None, TelemetryTier::Hot);
        };
        let Some(value) = warm.get::<V>(key).await else {
            return (None, TelemetryTier::Both);
        };

        if self.hot.set(key, value.clone(), None).is_some() {
            self.record_eviction();
        }
        self.record(TelemetryTier::Hot, CacheOperation::Get, CacheActivity::Promoted, None);
        (Some(value), TelemetryTier::Warm)
    }

    /// Stores `value` under `key` in both tiers, each with its default TTL.
    pub async fn set(&self, key: &str, value: V) {
        self.store(key, value, None).await;
    }

    /// Stores `value` under `key` in both tiers with the same `ttl`.
    pub async fn set_with_ttl(&self, key: &str, value: V, ttl: Duration) {
        self.store(key, value, Some(ttl)).await;
    }

    async fn store(&self, key: &str, value: V, ttl: Option<Duration>) {
        if self.bypass(CacheOperation::Set) {
            return;
        }

        let timed = self
            .clock
            .timed_async(async {
                let evicted = self.hot.set(key, value.clone(), ttl);
                let written = match &self.warm {
                    Some(warm) => warm.set(key, &value, ttl).await,
                    None => true,
                };
                (evicted, written)
            })
            .await;

        let (evicted, written) = timed.result;
        if evicted.is_some() {
            self.record_eviction();
        }
        if !written {
            self.record(TelemetryTier::Warm, CacheOperation::Set, CacheActivity::Degraded, None);
        }
        self.record(TelemetryTier::Both, CacheOperation::Set, CacheActivity::Inserted, Some(timed.duration));
        self.record_size();
    }

    /// Returns the cached value for `key`, or runs `fetcher` and caches its result.
    ///
    /// The lookup follows the same path as [`get`](Self::get). On a miss `fetcher` is
    /// invoked exactly once and a successful result is stored with the default TTLs.
    /// Concurrent calls for the same key are not coalesced: each one that misses runs
    /// its own fetcher, and the last write wins.
    ///
    /// # Errors
    ///
    /// Returns the fetcher's error unchanged. Nothing is cached in that case.
    ///
    /// # Examples
    ///
    /// ```
    /// use confcache::Cache;
    /// use tick::Clock;
    /// # futures::executor::block_on(async {
    ///
    /// let cache = Cache::builder::<u32>(Clock::new_frozen()).build()?;
    ///
    /// let value = cache.prefetch("answer", || async { Ok::<_, std::io::Error>(42) }).await?;
    /// assert_eq!(value, 42);
    /// assert!(cache.has("answer"));
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// # });
    /// ```
    pub async fn prefetch<F, Fut, E>(&self, key: &str, fetcher: F) -> std::result::Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<V, E>>,
    {
        if let Some(value) = self.get(key).await {
            return Ok(value);
        }

        let timed = self.clock.timed_async(fetcher()).await;
        let value = match timed.result {
            Ok(value) => value,
            Err(error) => {
                self.record(TelemetryTier::Both, CacheOperation::Prefetch, CacheActivity::Error, Some(timed.duration));
                return Err(error);
            }
        };
        self.record(TelemetryTier::Both, CacheOperation::Prefetch, CacheActivity::Fetched, Some(timed.duration));

        self.set(key, value.clone()).await;
        Ok(value)
    }

    fn record_eviction(&self) {
        self.record(TelemetryTier::Hot, CacheOperation::Set, CacheActivity::Evicted, None);
    }
}
