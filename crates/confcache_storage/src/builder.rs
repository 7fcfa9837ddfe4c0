// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::sync::Arc;
use std::time::Duration;

use confcache_tier::StorageAdapter;
use tick::Clock;

use crate::tier::{DEFAULT_PREFIX, DEFAULT_TTL, WarmTier};

/// Builder for configuring a [`WarmTier`].
///
/// # Examples
///
/// ```
/// use confcache_storage::{MemoryStorage, WarmTier};
/// use std::time::Duration;
/// use tick::Clock;
///
/// let warm = WarmTier::builder(MemoryStorage::new(), Clock::new_frozen())
///     .prefix("myapp:")
///     .ttl(Duration::from_secs(600))
///     .build();
///
/// assert_eq!(warm.prefix(), "myapp:");
/// ```
#[derive(Debug)]
pub struct WarmTierBuilder {
    pub(crate) storage: Arc<dyn StorageAdapter>,
    pub(crate) prefix: String,
    pub(crate) ttl: Duration,
    pub(crate) clock: Clock,
}

impl WarmTierBuilder {
    /// Creates a builder over an already shared medium.
    #[must_use]
    pub fn new(storage: Arc<dyn StorageAdapter>, clock: Clock) -> Self {
        Self {
            storage,
            prefix: DEFAULT_PREFIX.to_string(),
            ttl: DEFAULT_TTL,
            clock,
        }
    }

    /// Sets the prefix that namespaces this tier's keys in the medium.
    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Sets the TTL applied when `set` is called without an override.
    #[must_use]
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Builds the configured [`WarmTier`].
    #[must_use]
    pub fn build(self) -> WarmTier {
        WarmTier::from_builder(self)
    }
}
