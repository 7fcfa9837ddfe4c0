// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Asynchronous warm tier for the confcache configuration cache.
//!
//! [`WarmTier`] layers key prefixing, JSON serialization, and per-entry TTL over any
//! [`StorageAdapter`](confcache_tier::StorageAdapter) medium. It is an optional
//! accelerator: every operation after construction is total, and medium failures are
//! logged through `tracing` and degrade to a miss or a no-op.
//!
//! Two media are provided:
//!
//! - [`MemoryStorage`]: an in-process map, optionally bounded by a byte quota.
//!   [`MemoryStorage::session`] returns the medium shared by the whole process.
//! - [`FileStorage`]: a directory with one file per key. Opening fails fast when the
//!   directory is unusable.
//!
//! # Quick Start
//!
//! ```
//! use confcache_storage::{FileStorage, WarmTier};
//! use std::collections::BTreeMap;
//! use tick::Clock;
//! # futures::executor::block_on(async {
//!
//! let dir = tempfile::tempdir()?;
//! let warm = WarmTier::builder(FileStorage::open(dir.path())?, Clock::new_frozen()).build();
//!
//! let config = BTreeMap::from([("color".to_string(), "blue".to_string())]);
//! warm.set("config:brandA:web", &config, None).await;
//!
//! let cached: Option<BTreeMap<String, String>> = warm.get("config:brandA:web").await;
//! assert_eq!(cached, Some(config));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! # }).unwrap();
//! ```

mod builder;
mod file;
mod memory;
mod tier;

#[doc(inline)]
pub use builder::WarmTierBuilder;
#[doc(inline)]
pub use file::FileStorage;
#[doc(inline)]
pub use memory::MemoryStorage;
#[doc(inline)]
pub use tier::{DEFAULT_PREFIX, DEFAULT_TTL, WarmTier};
