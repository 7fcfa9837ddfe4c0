// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Builder for [`Cache`].

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use confcache_memory::{EvictionPolicy, HotTier};
use confcache_storage::WarmTierBuilder;
use confcache_tier::{Error, Result, StorageAdapter};
#[cfg(any(feature = "metrics", test))]
use opentelemetry::metrics::MeterProvider;
use tick::Clock;

use crate::cache::Cache;
use crate::options::{CacheOptions, StorageMedium};
use crate::telemetry::config::TelemetryConfig;

const DEFAULT_NAME: &str = "confcache";

/// Builder for a two-tier [`Cache`].
///
/// Created by [`Cache::builder`]. Every setting is optional: the default cache is enabled,
/// keeps up to 1000 entries for 60 seconds in memory, and has no warm tier.
///
/// # Examples
///
/// ```
/// use confcache::{Cache, EvictionPolicy, MemoryStorage, StorageMedium};
/// use std::sync::Arc;
/// use std::time::Duration;
/// use tick::Clock;
///
/// let cache = Cache::builder::<String>(Clock::new_frozen())
///     .name("brand-config")
///     .ttl(Duration::from_secs(30))
///     .max_size(200)
///     .eviction_policy(EvictionPolicy::OldestInserted)
///     .storage(StorageMedium::Custom(Arc::new(MemoryStorage::new())))
///     .storage_prefix("brand:")
///     .warm_ttl(Duration::from_secs(600))
///     .build()?;
///
/// assert_eq!(cache.name(), "brand-config");
/// assert_eq!(cache.warm().map(|warm| warm.prefix()), Some("brand:"));
/// # Ok::<(), confcache::Error>(())
/// ```
#[derive(Debug)]
pub struct CacheBuilder<V> {
    name: Option<String>,
    enabled: bool,
    ttl: Option<Duration>,
    max_size: Option<usize>,
    eviction_policy: EvictionPolicy,
    storage: StorageMedium,
    prefix: Option<String>,
    warm_ttl: Option<Duration>,
    stale_while_revalidate: bool,
    telemetry: TelemetryConfig,
    invalid_options: Option<Error>,
    clock: Clock,
    _phantom: PhantomData<fn() -> V>,
}

impl<V> CacheBuilder<V> {
    pub(crate) fn new(clock: Clock) -> Self {
        Self {
            name: None,
            enabled: true,
            ttl: None,
            max_size: None,
            eviction_policy: EvictionPolicy::default(),
            storage: StorageMedium::default(),
            prefix: None,
            warm_ttl: None,
            stale_while_revalidate: false,
            telemetry: TelemetryConfig::default(),
            invalid_options: None,
            clock,
            _phantom: PhantomData,
        }
    }

    /// Sets the name that identifies this cache in logs and metrics.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Turns caching on or off. A disabled cache has no warm tier.
    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Sets the hot tier TTL.
    #[must_use]
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Sets the hot tier capacity.
    #[must_use]
    pub fn max_size(mut self, max_size: usize) -> Self {
        self.max_size = Some(max_size);
        self
    }

    /// Sets how the hot tier picks a victim when full.
    #[must_use]
    pub fn eviction_policy(mut self, policy: EvictionPolicy) -> Self {
        self.eviction_policy = policy;
        self
    }

    /// Sets the warm tier medium.
    #[must_use]
    pub fn storage(mut self, storage: StorageMedium) -> Self {
        self.storage = storage;
        self
    }

    /// Sets the namespace prefix for warm tier keys.
    #[must_use]
    pub fn storage_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Sets the warm tier TTL.
    #[must_use]
    pub fn warm_ttl(mut self, ttl: Duration) -> Self {
        self.warm_ttl = Some(ttl);
        self
    }

    /// Records the reserved stale-while-revalidate setting.
    #[must_use]
    pub fn stale_while_revalidate(mut self, enabled: bool) -> Self {
        self.stale_while_revalidate = enabled;
        self
    }

    /// Applies SDK-level [`CacheOptions`].
    ///
    /// An unusable storage setting is reported by [`build`](Self::build).
    #[must_use]
    pub fn options(mut self, options: &CacheOptions) -> Self {
        self.enabled = options.enabled;
        self.ttl = Some(options.ttl);
        self.max_size = Some(options.max_size);
        self.stale_while_revalidate = options.stale_while_revalidate;
        match options.storage_medium() {
            Ok(storage) => self.storage = storage,
            Err(error) => self.invalid_options = Some(error),
        }
        self
    }

    /// Emits a `tracing` event for every cache operation.
    #[must_use]
    pub fn enable_logs(mut self) -> Self {
        self.telemetry = self.telemetry.with_logs();
        self
    }

    /// Records cache metrics through `provider`.
    #[cfg(any(feature = "metrics", test))]
    #[cfg_attr(docsrs, doc(cfg(feature = "metrics")))]
    #[must_use]
    pub fn enable_metrics(mut self, provider: &dyn MeterProvider) -> Self {
        self.telemetry = self.telemetry.with_metrics(provider);
        self
    }

    /// Builds the cache.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::StorageUnavailable`](crate::ErrorKind::StorageUnavailable) if
    /// the configured warm medium cannot be opened.
    pub fn build(mut self) -> Result<Cache<V>> {
        if let Some(error) = self.invalid_options.take() {
            return Err(error);
        }

        let storage = if self.enabled { self.storage.open()? } else { None };
        Ok(self.assemble(storage))
    }

    /// Builds the cache, falling back to the hot tier alone if the warm medium cannot be
    /// opened.
    #[must_use]
    pub fn build_or_hot_only(mut self) -> Cache<V> {
        if let Some(error) = self.invalid_options.take() {
            tracing::warn!(error = %error, "cache options rejected, continuing without a warm tier");
            return self.assemble(None);
        }

        let storage = if self.enabled {
            self.storage.open().unwrap_or_else(|error| {
                tracing::warn!(error = %error, "warm tier unavailable, continuing with the hot tier only");
                None
            })
        } else {
            None
        };
        self.assemble(storage)
    }

    fn assemble(self, storage: Option<Arc<dyn StorageAdapter>>) -> Cache<V> {
        let warm = storage.map(|storage| {
            let mut builder = WarmTierBuilder::new(storage, self.clock.clone());
            if let Some(prefix) = self.prefix {
                builder = builder.prefix(prefix);
            }
            if let Some(ttl) = self.warm_ttl {
                builder = builder.ttl(ttl);
            }
            builder.build()
        });

        let mut hot = HotTier::builder(self.clock.clone()).eviction_policy(self.eviction_policy);
        if let Some(ttl) = self.ttl {
            hot = hot.ttl(ttl);
        }
        if let Some(max_size) = self.max_size {
            hot = hot.max_size(max_size);
        }

        Cache {
            name: self.name.unwrap_or_else(|| DEFAULT_NAME.to_string()),
            enabled: self.enabled,
            hot: hot.build(),
            warm,
            stale_while_revalidate: self.stale_while_revalidate,
            clock: self.clock,
            telemetry: self.telemetry.build(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::options::StorageKind;

    #[test]
    fn defaults() {
        let cache = CacheBuilder::<u32>::new(Clock::new_frozen()).build().expect("default cache builds");

        assert_eq!(cache.name(), DEFAULT_NAME);
        assert!(cache.is_enabled());
        assert!(!cache.has_warm_tier());
        assert!(!cache.stale_while_revalidate());
        assert_eq!(cache.hot().ttl(), Duration::from_secs(60));
        assert_eq!(cache.hot().max_size(), 1000);
        assert_eq!(cache.hot().policy(), EvictionPolicy::NearestExpiry);
    }

    #[test]
    fn options_are_applied() {
        let options = CacheOptions {
            ttl: Duration::from_secs(5),
            max_size: 3,
            storage: Some(StorageKind::Session),
            stale_while_revalidate: true,
            ..CacheOptions::default()
        };
        let cache = CacheBuilder::<u32>::new(Clock::new_frozen())
            .options(&options)
            .build()
            .expect("session storage opens");

        assert_eq!(cache.hot().ttl(), Duration::from_secs(5));
        assert_eq!(cache.hot().max_size(), 3);
        assert!(cache.has_warm_tier());
        assert!(cache.stale_while_revalidate());
    }

    #[test]
    fn invalid_options_fail_build() {
        let options = CacheOptions {
            storage: Some(StorageKind::Local),
            ..CacheOptions::default()
        };
        let error = CacheBuilder::<u32>::new(Clock::new_frozen())
            .options(&options)
            .build()
            .expect_err("local storage needs a directory");

        assert_eq!(error.kind(), crate::ErrorKind::StorageUnavailable);
    }

    #[test]
    fn invalid_options_degrade_to_hot_only() {
        let options = CacheOptions {
            storage: Some(StorageKind::Local),
            ..CacheOptions::default()
        };
        let cache = CacheBuilder::<u32>::new(Clock::new_frozen()).options(&options).build_or_hot_only();

        assert!(cache.is_enabled());
        assert!(!cache.has_warm_tier());
    }

    #[test]
    fn disabled_cache_never_opens_storage() {
        let cache = CacheBuilder::<u32>::new(Clock::new_frozen())
            .enabled(false)
            .storage(StorageMedium::Local(PathBuf::from("/dev/null/not-a-directory")))
            .build()
            .expect("disabled cache does not open its medium");

        assert!(!cache.is_enabled());
        assert!(!cache.has_warm_tier());
    }

    #[test]
    fn telemetry_is_off_by_default() {
        let cache = CacheBuilder::<u32>::new(Clock::new_frozen()).build().expect("builds");
        assert!(cache.telemetry.is_none());

        let cache = CacheBuilder::<u32>::new(Clock::new_frozen()).enable_logs().build().expect("builds");
        assert!(cache.telemetry.is_some());
    }
}
