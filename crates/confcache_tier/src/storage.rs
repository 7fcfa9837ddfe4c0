// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The capability set a persistent key-value medium must provide.
//!
//! [`StorageAdapter`] is deliberately small and string-typed: it mirrors the
//! `getItem`/`setItem`/`removeItem` surface of browser-style key-value stores, plus key
//! enumeration. The warm tier layers prefixing, serialization, and TTL on top.

use std::{fmt::Debug, sync::Arc};

use crate::Result;

/// A synchronous string key-value medium used by the warm tier.
///
/// A medium is typically shared with unrelated consumers. The warm tier only ever
/// touches keys under its own prefix, so implementations must not assume they own
/// every key they hold.
///
/// All methods are fallible; the warm tier recovers from every error, so
/// implementations should report failures rather than panic.
pub trait StorageAdapter: Debug + Send + Sync {
    /// Reads the value stored under `key`.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Removing an absent key succeeds.
    fn remove_item(&self, key: &str) -> Result<()>;

    /// Returns every key currently held by the medium.
    fn keys(&self) -> Result<Vec<String>>;

    /// Removes every key held by the medium, including keys of other consumers.
    fn clear(&self) -> Result<()>;
}

impl<T: StorageAdapter + ?Sized> StorageAdapter for Arc<T> {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        (**self).remove_item(key)
    }

    fn keys(&self) -> Result<Vec<String>> {
        (**self).keys()
    }

    fn clear(&self) -> Result<()> {
        (**self).clear()
    }
}
