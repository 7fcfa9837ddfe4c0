// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Prefixed, serialized cache tier over a shared storage medium.

use std::sync::Arc;
use std::time::Duration;

use confcache_tier::{CacheEntry, KeyPattern, StorageAdapter};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tick::Clock;

use crate::builder::WarmTierBuilder;

/// Prefix put in front of every logical key unless configured otherwise.
pub const DEFAULT_PREFIX: &str = "confcache:";

/// Default TTL applied by [`WarmTier::set`] when no override is given.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// A cache tier that keeps serialized entries in a [`StorageAdapter`] medium.
///
/// Every logical key is stored under `prefix + key`, and only keys under the prefix are
/// ever read, enumerated, or removed. Entries are JSON-encoded [`CacheEntry`] values.
///
/// All operations are total. A failing medium, a quota error, or a corrupt value is
/// logged at `warn` level and turned into a miss or a no-op.
///
/// Cloning is cheap and clones share the medium.
///
/// # Examples
///
/// ```
/// use confcache_storage::{MemoryStorage, WarmTier};
/// use tick::Clock;
/// # futures::executor::block_on(async {
///
/// let storage = MemoryStorage::new();
/// let warm = WarmTier::builder(storage.clone(), Clock::new_frozen()).build();
///
/// warm.set("k", &"v".to_string(), None).await;
/// assert_eq!(warm.get::<String>("k").await.as_deref(), Some("v"));
/// assert!(storage.contains_key("confcache:k"));
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct WarmTier {
    storage: Arc<dyn StorageAdapter>,
    prefix: Arc<str>,
    ttl: Duration,
    clock: Clock,
}

#[expect(clippy::unused_async, reason = "async surface over synchronous media")]
impl WarmTier {
    /// Creates a builder for a warm tier over `storage`.
    #[must_use]
    pub fn builder(storage: impl StorageAdapter + 'static, clock: Clock) -> WarmTierBuilder {
        WarmTierBuilder::new(Arc::new(storage), clock)
    }

    pub(crate) fn from_builder(builder: WarmTierBuilder) -> Self {
        Self {
            storage: builder.storage,
            prefix: builder.prefix.into(),
            ttl: builder.ttl,
            clock: builder.clock,
        }
    }

    /// Returns the value under `key` if it is present, decodable, and unexpired.
    pub async fn get<V: DeserializeOwned>(&self, key: &str) -> Option<V> {
        self.get_entry(key).await.map(CacheEntry::into_value)
    }

    /// Like [`get`](Self::get), but returns the whole entry with its timestamps.
    ///
    /// Expired entries and entries that are not a valid envelope are removed. An entry
    /// whose value does not decode as `V` is a miss but stays in the medium, since
    /// another reader of the same key may expect a different type.
    pub async fn get_entry<V: DeserializeOwned>(&self, key: &str) -> Option<CacheEntry<V>> {
        let physical = self.physical_key(key);
        let raw = match self.storage.get_item(&physical) {
            Ok(raw) => raw?,
            Err(error) => {
                tracing::warn!(key, %error, "warm tier read failed");
                return None;
            }
        };

        let entry = match serde_json::from_str::<CacheEntry<serde_json::Value>>(&raw) {
            Ok(entry) => entry,
            Err(error) => {
                tracing::warn!(key, %error, "discarding undecodable warm tier entry");
                self.remove_physical(&physical);
                return None;
            }
        };

        if !entry.is_valid_at(self.clock.system_time()) {
            self.remove_physical(&physical);
            return None;
        }

        match entry.try_map(serde_json::from_value::<V>) {
            Ok(entry) => Some(entry),
            Err(error) => {
                tracing::debug!(key, %error, "warm tier entry holds a different value type");
                None
            }
        }
    }

    /// Stores `value` under `key`, expiring after `ttl` or the configured default.
    ///
    /// Returns false if the entry could not be encoded or written.
    pub async fn set<V: Serialize + ?Sized>(&self, key: &str, value: &V, ttl: Option<Duration>) -> bool {
        let entry = CacheEntry::new(value, self.clock.system_time(), ttl.unwrap_or(self.ttl));
        let raw = match serde_json::to_string(&entry) {
            Ok(raw) => raw,
            Err(error) => {
                tracing::warn!(key, %error, "warm tier entry could not be encoded");
                return false;
            }
        };

        match self.storage.set_item(&self.physical_key(key), &raw) {
            Ok(()) => true,
            Err(error) => {
                tracing::warn!(key, %error, "warm tier write failed");
                false
            }
        }
    }

    /// Removes `key`. Returns false if the medium reported a failure.
    pub async fn delete(&self, key: &str) -> bool {
        self.remove_physical(&self.physical_key(key))
    }

    /// Removes every key under this tier's prefix and leaves other keys alone.
    ///
    /// Returns how many keys were removed.
    pub async fn clear(&self) -> usize {
        self.remove_where(|_| true)
    }

    /// Removes every logical key matched by `pattern`.
    ///
    /// The pattern sees keys with the prefix stripped. Returns how many keys were removed.
    pub async fn invalidate(&self, pattern: &KeyPattern) -> usize {
        self.remove_where(|key| pattern.matches(key))
    }

    /// Returns the logical keys currently stored under this tier's prefix.
    ///
    /// Expired entries are included until a read removes them.
    pub async fn keys(&self) -> Vec<String> {
        self.logical_keys().unwrap_or_default()
    }

    /// Returns the number of keys stored under this tier's prefix.
    pub async fn len(&self) -> usize {
        self.logical_keys().map_or(0, |keys| keys.len())
    }

    /// Returns true if no keys are stored under this tier's prefix.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Returns the key prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the TTL applied when `set` gets no override.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn physical_key(&self, key: &str) -> String {
        format!("{}{key}", self.prefix)
    }

    fn logical_keys(&self) -> Option<Vec<String>> {
        match self.storage.keys() {
            Ok(keys) => Some(
                keys.into_iter()
                    .filter_map(|key| key.strip_prefix(&*self.prefix).map(str::to_string))
                    .collect(),
            ),
            Err(error) => {
                tracing::warn!(%error, "warm tier key enumeration failed");
                None
            }
        }
    }

    fn remove_where(&self, mut predicate: impl FnMut(&str) -> bool) -> usize {
        let Some(keys) = self.logical_keys() else {
            return 0;
        };

        keys.iter()
            .filter(|key| predicate(key))
            .filter(|key| self.remove_physical(&self.physical_key(key)))
            .count()
    }

    fn remove_physical(&self, physical: &str) -> bool {
        match self.storage.remove_item(physical) {
            Ok(()) => true,
            Err(error) => {
                tracing::warn!(key = physical, %error, "warm tier removal failed");
                false
            }
        }
    }
}
