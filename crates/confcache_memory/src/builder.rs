// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Builder for configuring hot tiers.

use std::marker::PhantomData;
use std::time::Duration;

use tick::Clock;

use crate::EvictionPolicy;
use crate::tier::{DEFAULT_MAX_SIZE, DEFAULT_TTL, HotTier};

/// Builder for configuring a [`HotTier`].
///
/// # Examples
///
/// ```
/// use confcache_memory::{EvictionPolicy, HotTier};
/// use std::time::Duration;
/// use tick::Clock;
///
/// let hot = HotTier::<String>::builder(Clock::new_frozen())
///     .max_size(500)
///     .ttl(Duration::from_secs(30))
///     .eviction_policy(EvictionPolicy::NearestExpiry)
///     .build();
///
/// assert_eq!(hot.max_size(), 500);
/// assert_eq!(hot.ttl(), Duration::from_secs(30));
/// ```
#[derive(Debug)]
pub struct HotTierBuilder<V> {
    pub(crate) clock: Clock,
    pub(crate) ttl: Duration,
    pub(crate) max_size: usize,
    pub(crate) policy: EvictionPolicy,
    _phantom: PhantomData<V>,
}

impl<V> HotTierBuilder<V> {
    /// Creates a builder with the default TTL (60s), capacity (1000), and
    /// [`EvictionPolicy::NearestExpiry`].
    #[must_use]
    pub fn new(clock: Clock) -> Self {
        Self {
            clock,
            ttl: DEFAULT_TTL,
            max_size: DEFAULT_MAX_SIZE,
            policy: EvictionPolicy::default(),
            _phantom: PhantomData,
        }
    }

    /// Sets the TTL applied when `set` is called without an override.
    ///
    /// A zero TTL makes every entry expire the instant it is written.
    #[must_use]
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Sets the maximum number of entries.
    ///
    /// A capacity of zero retains nothing: every write is evicted immediately.
    #[must_use]
    pub fn max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    /// Sets the policy used to pick an entry to evict when the tier is full.
    #[must_use]
    pub fn eviction_policy(mut self, policy: EvictionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Builds the configured [`HotTier`].
    #[must_use]
    pub fn build(self) -> HotTier<V> {
        HotTier::from_builder(self)
    }
}
