// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Synchronous in-memory hot tier for the confcache configuration cache.
//!
//! This crate provides [`HotTier`], a process-local map from string keys to
//! [`CacheEntry`](confcache_tier::CacheEntry) values with:
//!
//! - **Per-entry TTL**: every entry carries an absolute expiry; expired entries are
//!   removed lazily when a read notices them
//! - **Bounded size**: inserting a new key at capacity evicts exactly one entry first,
//!   chosen by an explicit [`EvictionPolicy`]
//! - **Pattern invalidation**: remove every key matching a regular expression
//! - **Hit/miss accounting**: counters reported through [`CacheStats`](confcache_tier::CacheStats)
//!
//! The tier never suspends. Each operation takes a single short lock, so a
//! read/write/evict sequence is atomic with respect to other callers.
//!
//! # Quick Start
//!
//! ```
//! use confcache_memory::HotTier;
//! use std::time::Duration;
//! use tick::ClockControl;
//!
//! let control = ClockControl::new();
//! let hot = HotTier::<String>::builder(control.to_clock())
//!     .max_size(100)
//!     .ttl(Duration::from_secs(60))
//!     .build();
//!
//! hot.set("config:brandA:web:color", "blue".to_string(), None);
//! assert_eq!(hot.get("config:brandA:web:color").as_deref(), Some("blue"));
//!
//! control.advance(Duration::from_secs(60));
//! assert!(hot.get("config:brandA:web:color").is_none());
//! ```

pub mod builder;
mod eviction;
pub mod tier;

#[doc(inline)]
pub use builder::HotTierBuilder;
#[doc(inline)]
pub use eviction::EvictionPolicy;
#[doc(inline)]
pub use tier::{DEFAULT_MAX_SIZE, DEFAULT_TTL, HotTier};
