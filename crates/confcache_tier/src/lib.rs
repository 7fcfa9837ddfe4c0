// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Core types shared by the tiers of the confcache two-tier cache.
//!
//! This crate defines [`CacheEntry`] for storing values with their expiry metadata,
//! the [`StorageAdapter`] trait that persistent key-value media must satisfy, the
//! [`KeyPattern`] used by pattern invalidation, [`CacheStats`] for hit/miss accounting,
//! and the workspace-wide [`Error`] type.
//!
//! # Overview
//!
//! The hot tier (`confcache_memory`) and the warm tier (`confcache_storage`) both store
//! [`CacheEntry`] values. An entry is valid strictly before its absolute expiry instant:
//!
//! ```
//! use confcache_tier::CacheEntry;
//! use std::time::{Duration, SystemTime};
//!
//! let now = SystemTime::UNIX_EPOCH;
//! let entry = CacheEntry::new("v", now, Duration::from_millis(1000));
//!
//! assert!(entry.is_valid_at(now + Duration::from_millis(999)));
//! assert!(!entry.is_valid_at(now + Duration::from_millis(1000)));
//! ```
//!
//! # Implementing a Storage Medium
//!
//! Implement all methods of [`StorageAdapter`]:
//!
//! ```
//! use confcache_tier::{Result, StorageAdapter};
//! use std::collections::HashMap;
//! use std::sync::Mutex;
//!
//! #[derive(Debug, Default)]
//! struct SimpleStorage(Mutex<HashMap<String, String>>);
//!
//! impl StorageAdapter for SimpleStorage {
//!     fn get_item(&self, key: &str) -> Result<Option<String>> {
//!         Ok(self.0.lock().unwrap().get(key).cloned())
//!     }
//!
//!     fn set_item(&self, key: &str, value: &str) -> Result<()> {
//!         self.0.lock().unwrap().insert(key.to_string(), value.to_string());
//!         Ok(())
//!     }
//!
//!     fn remove_item(&self, key: &str) -> Result<()> {
//!         self.0.lock().unwrap().remove(key);
//!         Ok(())
//!     }
//!
//!     fn keys(&self) -> Result<Vec<String>> {
//!         Ok(self.0.lock().unwrap().keys().cloned().collect())
//!     }
//!
//!     fn clear(&self) -> Result<()> {
//!         self.0.lock().unwrap().clear();
//!         Ok(())
//!     }
//! }
//! ```

mod entry;
pub mod error;
mod pattern;
mod stats;
pub(crate) mod storage;
#[cfg(any(feature = "test-util", test))]
pub mod testing;

#[doc(inline)]
pub use entry::CacheEntry;
#[doc(inline)]
pub use error::{Error, ErrorKind, Result};
#[doc(inline)]
pub use pattern::KeyPattern;
#[doc(inline)]
pub use stats::CacheStats;
#[doc(inline)]
pub use storage::StorageAdapter;
