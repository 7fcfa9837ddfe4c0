// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Mock storage medium for testing.
//!
//! This module provides `MockStorage`, an in-memory [`StorageAdapter`] that
//! records every call and supports failure injection for testing degraded paths.

use std::{collections::BTreeMap, sync::Arc};

use parking_lot::Mutex;

use crate::{Error, ErrorKind, Result, StorageAdapter};

/// Recorded storage operation with full context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageOp {
    /// A read of the given physical key.
    GetItem(String),
    /// A write of the given physical key and raw value.
    SetItem {
        /// The physical key that was written.
        key: String,
        /// The raw stored value.
        value: String,
    },
    /// A removal of the given physical key.
    RemoveItem(String),
    /// A key enumeration.
    Keys,
    /// A clear of the whole medium.
    Clear,
}

type FailPredicate = Box<dyn Fn(&StorageOp) -> bool + Send + Sync>;

/// A configurable mock storage medium for testing.
///
/// Values live in memory. Every call is recorded for later verification, and a
/// predicate can be installed to make selected calls fail. Clones share state.
///
/// # Examples
///
/// ```
/// use confcache_tier::{StorageAdapter, testing::{MockStorage, StorageOp}};
///
/// let storage = MockStorage::new();
/// storage.set_item("k", "v")?;
/// assert_eq!(storage.get_item("k")?.as_deref(), Some("v"));
///
/// assert_eq!(storage.operations(), vec![
///     StorageOp::SetItem { key: "k".to_string(), value: "v".to_string() },
///     StorageOp::GetItem("k".to_string()),
/// ]);
/// # Ok::<(), confcache_tier::Error>(())
/// ```
///
/// # Failure Injection
///
/// ```
/// use confcache_tier::{StorageAdapter, testing::{MockStorage, StorageOp}};
///
/// let storage = MockStorage::new();
///
/// // Fail every write
/// storage.fail_when(|op| matches!(op, StorageOp::SetItem { .. }));
/// assert!(storage.set_item("k", "v").is_err());
/// assert!(storage.get_item("k").is_ok());
/// ```
#[derive(Clone, Default)]
pub struct MockStorage {
    data: Arc<Mutex<BTreeMap<String, String>>>,
    operations: Arc<Mutex<Vec<StorageOp>>>,
    fail_when: Arc<Mutex<Option<FailPredicate>>>,
}

impl std::fmt::Debug for MockStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockStorage")
            .field("data", &self.data)
            .field("operations", &self.operations)
            .field("fail_when", &self.fail_when.lock().is_some())
            .finish()
    }
}

impl MockStorage {
    /// Creates an empty mock medium.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock medium with pre-populated raw data.
    #[must_use]
    pub fn with_data(data: impl IntoIterator<Item = (String, String)>) -> Self {
        let storage = Self::new();
        storage.data.lock().extend(data);
        storage
    }

    /// Writes a raw value without recording an operation.
    pub fn seed(&self, key: impl Into<String>, value: impl Into<String>) {
        self.data.lock().insert(key.into(), value.into());
    }

    /// Reads a raw value without recording an operation.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.data.lock().get(key).cloned()
    }

    /// Returns the number of keys held.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.data.lock().len()
    }

    /// Returns true if the medium holds the given physical key.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.lock().contains_key(key)
    }

    /// Sets a predicate that determines which operations fail.
    ///
    /// Failing operations are still recorded but leave the data untouched.
    pub fn fail_when<F>(&self, predicate: F)
    where
        F: Fn(&StorageOp) -> bool + Send + Sync + 'static,
    {
        *self.fail_when.lock() = Some(Box::new(predicate));
    }

    /// Clears the failure predicate, allowing all operations to succeed.
    pub fn clear_failures(&self) {
        *self.fail_when.lock() = None;
    }

    /// Returns a clone of all recorded operations.
    #[must_use]
    pub fn operations(&self) -> Vec<StorageOp> {
        self.operations.lock().clone()
    }

    /// Returns how many recorded operations satisfy `predicate`.
    #[must_use]
    pub fn count_operations(&self, predicate: impl Fn(&StorageOp) -> bool) -> usize {
        self.operations.lock().iter().filter(|op| predicate(op)).count()
    }

    /// Clears all recorded operations.
    pub fn clear_operations(&self) {
        self.operations.lock().clear();
    }

    fn record(&self, op: StorageOp) -> Result<()> {
        let failed = self.fail_when.lock().as_ref().is_some_and(|predicate| predicate(&op));
        self.operations.lock().push(op);
        if failed {
            Err(Error::with_cause(ErrorKind::Storage, "mock: operation failed"))
        } else {
            Ok(())
        }
    }
}

impl StorageAdapter for MockStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        self.record(StorageOp::GetItem(key.to_string()))?;
        Ok(self.data.lock().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.record(StorageOp::SetItem {
            key: key.to_string(),
            value: value.to_string(),
        })?;
        self.data.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.record(StorageOp::RemoveItem(key.to_string()))?;
        self.data.lock().remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        self.record(StorageOp::Keys)?;
        Ok(self.data.lock().keys().cloned().collect())
    }

    fn clear(&self) -> Result<()> {
        self.record(StorageOp::Clear)?;
        self.data.lock().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_operations_are_recorded_and_leave_data_untouched() {
        let storage = MockStorage::with_data([("k".to_string(), "old".to_string())]);
        storage.fail_when(|op| matches!(op, StorageOp::SetItem { .. }));

        assert!(storage.set_item("k", "new").is_err());
        assert_eq!(storage.raw("k").as_deref(), Some("old"));
        assert_eq!(storage.count_operations(|op| matches!(op, StorageOp::SetItem { .. })), 1);

        storage.clear_failures();
        storage.set_item("k", "new").expect("write succeeds once failures are cleared");
        assert_eq!(storage.raw("k").as_deref(), Some("new"));
    }

    #[test]
    fn clones_share_data_and_operations() {
        let storage = MockStorage::new();
        let clone = storage.clone();
        clone.seed("k", "v");

        assert!(storage.contains_key("k"));
        let _ = clone.keys().expect("keys");
        assert_eq!(storage.operations(), vec![StorageOp::Keys]);

        storage.clear_operations();
        assert!(clone.operations().is_empty());
    }
}
