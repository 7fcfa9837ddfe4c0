// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Bounded, TTL-aware in-memory cache tier.
//!
//! All state lives behind one mutex. Each public operation takes the lock once, so a
//! lookup, lazy expiry, and eviction sequence is never interleaved with another caller.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use confcache_tier::{CacheEntry, CacheStats, KeyPattern};
use parking_lot::Mutex;
use tick::Clock;

use crate::builder::HotTierBuilder;
use crate::eviction::{Candidate, EvictionPolicy};

/// Default TTL applied by [`HotTier::set`] when no override is given.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

/// Default maximum number of entries held by a [`HotTier`].
pub const DEFAULT_MAX_SIZE: usize = 1000;

#[derive(Debug)]
struct Slot<V> {
    entry: CacheEntry<V>,
    seq: u64,
}

#[derive(Debug)]
struct State<V> {
    entries: HashMap<String, Slot<V>>,
    next_seq: u64,
    hits: u64,
    misses: u64,
}

impl<V> State<V> {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            next_seq: 0,
            hits: 0,
            misses: 0,
        }
    }

    fn evict_one(&mut self, policy: EvictionPolicy) -> Option<String> {
        let victim = policy
            .select(self.entries.iter().map(|(key, slot)| Candidate {
                key,
                expires_at: slot.entry.expires_at(),
                inserted: slot.seq,
            }))?
            .to_string();
        self.entries.remove(&victim);
        Some(victim)
    }
}

/// A synchronous, process-local cache with per-entry TTL and bounded size.
///
/// Expired entries are not swept in the background. A read that finds one removes it
/// and treats the lookup as a miss.
///
/// # Examples
///
/// ```
/// use confcache_memory::HotTier;
/// use std::time::Duration;
/// use tick::ClockControl;
///
/// let control = ClockControl::new();
/// let hot = HotTier::<i32>::builder(control.to_clock()).max_size(2).build();
///
/// hot.set("a", 1, Some(Duration::from_millis(100)));
/// hot.set("b", 2, Some(Duration::from_millis(500)));
///
/// // "a" expires first, so it makes room for "c".
/// assert_eq!(hot.set("c", 3, Some(Duration::from_millis(300))).as_deref(), Some("a"));
/// assert!(!hot.has("a"));
/// assert_eq!(hot.len(), 2);
/// ```
pub struct HotTier<V> {
    state: Mutex<State<V>>,
    clock: Clock,
    ttl: Duration,
    max_size: usize,
    policy: EvictionPolicy,
}

impl<V> fmt::Debug for HotTier<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HotTier")
            .field("len", &self.len())
            .field("ttl", &self.ttl)
            .field("max_size", &self.max_size)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl<V> HotTier<V> {
    /// Creates a hot tier with default settings.
    #[must_use]
    pub fn new(clock: Clock) -> Self {
        Self::builder(clock).build()
    }

    /// Creates a builder for configuring a hot tier.
    #[must_use]
    pub fn builder(clock: Clock) -> HotTierBuilder<V> {
        HotTierBuilder::new(clock)
    }

    pub(crate) fn from_builder(builder: HotTierBuilder<V>) -> Self {
        Self {
            state: Mutex::new(State::new()),
            clock: builder.clock,
            ttl: builder.ttl,
            max_size: builder.max_size,
            policy: builder.policy,
        }
    }

    /// Writes `value` under `key`, expiring after `ttl` or the configured default.
    ///
    /// Overwriting an existing key never evicts and keeps the key's insertion position.
    /// Adding a new key to a full tier first evicts one entry chosen by the
    /// [`EvictionPolicy`]. Returns the key of the evicted entry, if any.
    ///
    /// With a capacity of zero nothing is stored, and `key` itself is reported as evicted.
    pub fn set(&self, key: &str, value: V, ttl: Option<Duration>) -> Option<String> {
        let entry = CacheEntry::new(value, self.clock.system_time(), ttl.unwrap_or(self.ttl));
        let mut state = self.state.lock();

        if let Some(slot) = state.entries.get_mut(key) {
            slot.entry = entry;
            return None;
        }

        if self.max_size == 0 {
            return Some(key.to_string());
        }

        let evicted = if state.entries.len() >= self.max_size {
            state.evict_one(self.policy)
        } else {
            None
        };

        let seq = state.next_seq;
        state.next_seq += 1;
        state.entries.insert(key.to_string(), Slot { entry, seq });
        evicted
    }

    /// Removes `key`. Returns true if an entry was present.
    pub fn delete(&self, key: &str) -> bool {
        self.state.lock().entries.remove(key).is_some()
    }

    /// Removes every entry and resets the hit and miss counters.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.entries.clear();
        state.hits = 0;
        state.misses = 0;
    }

    /// Removes every key matched by `pattern`. Returns how many entries were removed.
    pub fn invalidate(&self, pattern: &KeyPattern) -> usize {
        let mut state = self.state.lock();
        let before = state.entries.len();
        state.entries.retain(|key, _| !pattern.matches(key));
        before - state.entries.len()
    }

    /// Returns true if `key` holds an unexpired entry.
    ///
    /// An expired entry is removed. Hit and miss counters are not touched.
    pub fn has(&self, key: &str) -> bool {
        let now = self.clock.system_time();
        let mut state = self.state.lock();
        match state.entries.get(key).map(|slot| slot.entry.is_valid_at(now)) {
            Some(true) => true,
            Some(false) => {
                state.entries.remove(key);
                false
            }
            None => false,
        }
    }

    /// Returns the hit and miss counters along with the current number of entries.
    ///
    /// The size includes expired entries that no read has noticed yet.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock();
        CacheStats::new(state.hits, state.misses, state.entries.len())
    }

    /// Returns the number of stored entries, including expired ones not yet removed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    /// Returns the stored keys in no particular order.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.state.lock().entries.keys().cloned().collect()
    }

    /// Returns true if no entries are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the TTL applied when `set` gets no override.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the maximum number of entries.
    #[must_use]
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Returns the eviction policy.
    #[must_use]
    pub fn policy(&self) -> EvictionPolicy {
        self.policy
    }
}

impl<V: Clone> HotTier<V> {
    /// Returns a clone of the value under `key` if it is present and unexpired.
    ///
    /// A hit increments the hit counter. An absent or expired key increments the miss
    /// counter, and an expired entry is removed.
    pub fn get(&self, key: &str) -> Option<V> {
        self.get_entry(key).map(CacheEntry::into_value)
    }

    /// Like [`get`](Self::get), but returns the whole entry with its timestamps.
    pub fn get_entry(&self, key: &str) -> Option<CacheEntry<V>> {
        let now = self.clock.system_time();
        let mut state = self.state.lock();
        let found = state
            .entries
            .get(key)
            .filter(|slot| slot.entry.is_valid_at(now))
            .map(|slot| slot.entry.clone());

        if found.is_some() {
            state.hits += 1;
        } else {
            state.entries.remove(key);
            state.misses += 1;
        }
        found
    }
}
