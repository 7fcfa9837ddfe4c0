// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! In-process storage media.

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use confcache_tier::{Error, ErrorKind, Result, StorageAdapter};
use parking_lot::Mutex;

#[derive(Debug, Default)]
struct Inner {
    items: BTreeMap<String, String>,
    bytes: usize,
}

/// A string key-value medium held in process memory.
///
/// Clones share the same map. An optional byte quota bounds the total size of keys and
/// values; a write that would exceed it fails with [`ErrorKind::QuotaExceeded`] and
/// leaves the medium unchanged.
///
/// # Examples
///
/// ```
/// use confcache_storage::MemoryStorage;
/// use confcache_tier::{ErrorKind, StorageAdapter};
///
/// let storage = MemoryStorage::with_quota(8);
/// storage.set_item("k", "1234567")?;
///
/// let err = storage.set_item("k2", "x").unwrap_err();
/// assert_eq!(err.kind(), ErrorKind::QuotaExceeded);
/// # Ok::<(), confcache_tier::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<Mutex<Inner>>,
    quota: Option<usize>,
}

impl MemoryStorage {
    /// Creates an empty medium without a quota.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty medium that holds at most `bytes` bytes of keys and values.
    #[must_use]
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            inner: Arc::default(),
            quota: Some(bytes),
        }
    }

    /// Returns the medium shared by everything in this process.
    ///
    /// Its contents live as long as the process. Consumers are kept apart only by their
    /// key prefixes.
    #[must_use]
    pub fn session() -> Self {
        static SESSION: OnceLock<MemoryStorage> = OnceLock::new();
        SESSION.get_or_init(Self::new).clone()
    }

    /// Returns true if the medium holds `key`.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.lock().items.contains_key(key)
    }

    /// Returns the number of keys held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().items.len()
    }

    /// Returns true if the medium holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the bytes currently used by keys and values.
    #[must_use]
    pub fn used_bytes(&self) -> usize {
        self.inner.lock().bytes
    }
}

impl StorageAdapter for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.inner.lock().items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut inner = self.inner.lock();
        let replaced = inner.items.get(key).map_or(0, |old| key.len() + old.len());
        let bytes = inner.bytes - replaced + key.len() + value.len();

        if let Some(quota) = self.quota
            && bytes > quota
        {
            return Err(Error::with_cause(
                ErrorKind::QuotaExceeded,
                format!("writing {key} needs {bytes} bytes, quota is {quota}"),
            ));
        }

        inner.items.insert(key.to_string(), value.to_string());
        inner.bytes = bytes;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let mut inner = self.inner.lock();
        if let Some(old) = inner.items.remove(key) {
            inner.bytes -= key.len() + old.len();
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.inner.lock().items.keys().cloned().collect())
    }

    fn clear(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.items.clear();
        inner.bytes = 0;
        Ok(())
    }
}
