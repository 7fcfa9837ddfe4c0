// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::{
    ops::Deref,
    time::{Duration, SystemTime},
};

use serde::{Deserialize, Serialize};

/// Longest lifetime an entry can be given; larger TTLs are clamped to it.
const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// A cached value with its creation and absolute expiry instants.
///
/// Entries are immutable snapshots: updating a key replaces its entry rather than
/// mutating the stored value. Both cache tiers store `CacheEntry` values, and the
/// warm tier persists them in their serialized form:
///
/// ```json
/// {"value": ..., "createdAt": 1700000000000, "expiresAt": 1700000060000}
/// ```
///
/// # Examples
///
/// ```
/// use confcache_tier::CacheEntry;
/// use std::time::{Duration, SystemTime};
///
/// let now = SystemTime::UNIX_EPOCH + Duration::from_secs(10);
/// let entry = CacheEntry::new(42, now, Duration::from_secs(60));
///
/// assert_eq!(*entry.value(), 42);
/// assert_eq!(entry.created_at(), now);
/// assert_eq!(entry.expires_at(), now + Duration::from_secs(60));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry<V> {
    value: V,
    #[serde(with = "epoch_millis")]
    created_at: SystemTime,
    #[serde(with = "epoch_millis")]
    expires_at: SystemTime,
    /// Reserved for version-based invalidation; not consulted by any read or write path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version: Option<u64>,
}

impl<V> CacheEntry<V> {
    /// Creates an entry created at `now` that expires `ttl` later.
    ///
    /// A TTL longer than one hundred years is clamped.
    pub fn new(value: V, now: SystemTime, ttl: Duration) -> Self {
        Self {
            value,
            created_at: now,
            expires_at: now + ttl.min(MAX_TTL),
            version: None,
        }
    }

    /// Returns this entry tagged with a version number.
    #[must_use]
    pub fn with_version(mut self, version: u64) -> Self {
        self.version = Some(version);
        self
    }

    /// Returns a reference to the cached value.
    #[must_use]
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Consumes the entry and returns the inner value.
    #[must_use]
    pub fn into_value(self) -> V {
        self.value
    }

    /// Converts the value with `f`, keeping timestamps and version.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `f`.
    pub fn try_map<U, E>(self, f: impl FnOnce(V) -> Result<U, E>) -> Result<CacheEntry<U>, E> {
        Ok(CacheEntry {
            value: f(self.value)?,
            created_at: self.created_at,
            expires_at: self.expires_at,
            version: self.version,
        })
    }

    /// Returns the instant the entry was created.
    #[must_use]
    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }

    /// Returns the absolute instant at which the entry stops being valid.
    #[must_use]
    pub fn expires_at(&self) -> SystemTime {
        self.expires_at
    }

    /// Returns the version tag, if any.
    #[must_use]
    pub fn version(&self) -> Option<u64> {
        self.version
    }

    /// Returns `true` if the entry is still valid at `now`.
    ///
    /// Validity ends exactly at [`expires_at`](Self::expires_at): an entry written with a
    /// TTL of 1000ms is visible 999ms later and gone at 1000ms.
    #[must_use]
    pub fn is_valid_at(&self, now: SystemTime) -> bool {
        now < self.expires_at
    }

    /// Returns how long the entry remains valid after `now`, or `None` if it has expired.
    #[must_use]
    pub fn remaining_ttl(&self, now: SystemTime) -> Option<Duration> {
        self.expires_at.duration_since(now).ok().filter(|d| !d.is_zero())
    }
}

impl<V> Deref for CacheEntry<V> {
    type Target = V;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

/// Serializes `SystemTime` as whole milliseconds since the Unix epoch.
mod epoch_millis {
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Latest timestamp accepted when decoding, 100 million days after the epoch.
    const MAX_MILLIS: u64 = 8_640_000_000_000_000;

    pub(super) fn serialize<S: Serializer>(time: &SystemTime, serializer: S) -> Result<S::Ok, S::Error> {
        let millis = time
            .duration_since(UNIX_EPOCH)
            .map_or(0, |since| u64::try_from(since.as_millis()).unwrap_or(u64::MAX));
        serializer.serialize_u64(millis)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SystemTime, D::Error> {
        let millis = u64::deserialize(deserializer)?;
        let out_of_range = || D::Error::custom(format_args!("timestamp {millis}ms is out of range"));
        if millis > MAX_MILLIS {
            return Err(out_of_range());
        }
        UNIX_EPOCH.checked_add(Duration::from_millis(millis)).ok_or_else(out_of_range)
    }
}
