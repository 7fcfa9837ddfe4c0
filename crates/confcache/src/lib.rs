// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! A two-tier cache for configuration data fetched by SDK clients.
//!
//! A [`Cache`] pairs a fast, bounded, synchronous hot tier with an optional warm tier
//! that serializes entries into a pluggable key-value medium. It provides:
//! - Hot-then-warm reads with promotion of warm hits
//! - Per-tier TTLs and a capacity-bounded hot tier with explicit eviction policies
//! - Regular-expression invalidation across both tiers
//! - `prefetch`, a fetch-on-miss read used by [`ConfigClient`]
//! - Opt-in `tracing` events and OpenTelemetry metrics
//!
//! Warm tier failures are logged and absorbed. A caller sees the same values whether
//! the warm tier is healthy, degraded, or absent.
//!
//! # Examples
//!
//! ## Hot Tier Only
//!
//! ```
//! use confcache::Cache;
//! use std::time::Duration;
//! use tick::Clock;
//! # futures::executor::block_on(async {
//!
//! let cache = Cache::builder::<i32>(Clock::new_frozen())
//!     .ttl(Duration::from_secs(60))
//!     .max_size(100)
//!     .build()?;
//!
//! cache.set("answer", 42).await;
//! assert_eq!(cache.get("answer").await, Some(42));
//! # Ok::<(), confcache::Error>(())
//! # });
//! ```
//!
//! ## With a Warm Tier
//!
//! ```
//! use confcache::{Cache, MemoryStorage, StorageMedium};
//! use std::sync::Arc;
//! use tick::Clock;
//! # futures::executor::block_on(async {
//!
//! let medium = Arc::new(MemoryStorage::new());
//! let clock = Clock::new_frozen();
//!
//! let writer = Cache::builder::<String>(clock.clone())
//!     .storage(StorageMedium::Custom(medium.clone()))
//!     .build()?;
//! writer.set("config:brandA:web:color", "blue".to_string()).await;
//!
//! // A fresh cache over the same medium finds the entry in its warm tier.
//! let reader = Cache::builder::<String>(clock)
//!     .storage(StorageMedium::Custom(medium))
//!     .build()?;
//! assert_eq!(reader.get("config:brandA:web:color").await.as_deref(), Some("blue"));
//! assert!(reader.has("config:brandA:web:color"));
//! # Ok::<(), confcache::Error>(())
//! # });
//! ```
//!
//! ## From SDK Options
//!
//! ```
//! use confcache::{Cache, CacheOptions};
//! use tick::Clock;
//!
//! let options: CacheOptions = serde_json::from_str(r#"{"ttl": 5000, "storage": "session"}"#)?;
//! let cache = Cache::builder::<String>(Clock::new_frozen()).options(&options).build()?;
//! assert!(cache.has_warm_tier());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod builder;
mod cache;
mod client;
mod options;
mod telemetry;

#[doc(inline)]
pub use builder::CacheBuilder;
#[doc(inline)]
pub use cache::Cache;
#[doc(inline)]
pub use client::{ConfigClient, ConfigFetcher, FetchOptions, config_key, value_key};
#[doc(inline)]
pub use confcache_memory::EvictionPolicy;
#[doc(inline)]
pub use confcache_storage::{FileStorage, MemoryStorage};
#[cfg(any(feature = "test-util", test))]
#[doc(inline)]
pub use confcache_tier::testing::{MockStorage, StorageOp};
#[doc(inline)]
pub use confcache_tier::{CacheEntry, CacheStats, Error, ErrorKind, KeyPattern, Result, StorageAdapter};
#[doc(inline)]
pub use options::{CacheOptions, StorageKind, StorageMedium};
