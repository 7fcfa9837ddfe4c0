// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::SystemTime;

/// Chooses which entry to drop when a full hot tier admits a new key.
///
/// # Examples
///
/// ```
/// use confcache_memory::{EvictionPolicy, HotTier};
/// use tick::Clock;
///
/// let hot = HotTier::<i32>::builder(Clock::new_frozen())
///     .eviction_policy(EvictionPolicy::OldestInserted)
///     .build();
/// assert_eq!(hot.policy(), EvictionPolicy::OldestInserted);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum EvictionPolicy {
    /// Evict the entry that expires soonest (smallest absolute expiry).
    ///
    /// Ties go to the entry inserted first. No access recency is tracked, so this is
    /// not LRU: a frequently read entry is still evicted if it expires first.
    #[default]
    NearestExpiry,
    /// Evict the entry inserted first. Overwriting a key keeps its original position.
    OldestInserted,
}

/// What eviction needs to know about one stored entry.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Candidate<'a> {
    pub(crate) key: &'a str,
    pub(crate) expires_at: SystemTime,
    pub(crate) inserted: u64,
}

impl EvictionPolicy {
    /// Returns the key of the entry to evict, or `None` if there are no candidates.
    pub(crate) fn select<'a>(self, candidates: impl Iterator<Item = Candidate<'a>>) -> Option<&'a str> {
        let victim = match self {
            Self::NearestExpiry => candidates.min_by_key(|c| (c.expires_at, c.inserted)),
            Self::OldestInserted => candidates.min_by_key(|c| c.inserted),
        };
        victim.map(|c| c.key)
    }
}
