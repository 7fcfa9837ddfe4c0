// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Cache configuration as it appears in SDK option objects, and the storage media a
//! cache can be backed by.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use confcache_memory::{DEFAULT_MAX_SIZE, DEFAULT_TTL};
use confcache_storage::{FileStorage, MemoryStorage};
use confcache_tier::{Error, ErrorKind, Result, StorageAdapter};
use serde::{Deserialize, Serialize};

/// The medium backing a cache's warm tier.
#[derive(Debug, Clone, Default)]
#[non_exhaustive]
pub enum StorageMedium {
    /// No warm tier.
    #[default]
    None,
    /// Explicitly in-memory only: the hot tier is the whole cache.
    MemoryOnly,
    /// A durable directory-backed medium that outlives the process.
    Local(PathBuf),
    /// The process-wide in-memory medium returned by [`MemoryStorage::session`].
    Session,
    /// A caller-supplied medium.
    Custom(Arc<dyn StorageAdapter>),
}

impl StorageMedium {
    /// Opens the medium, or returns `None` when it has no warm tier.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::StorageUnavailable`] if a `Local` directory cannot be used.
    pub fn open(&self) -> Result<Option<Arc<dyn StorageAdapter>>> {
        Ok(match self {
            Self::None | Self::MemoryOnly => None,
            Self::Local(dir) => Some(Arc::new(FileStorage::open(dir.clone())?)),
            Self::Session => Some(Arc::new(MemoryStorage::session())),
            Self::Custom(storage) => Some(Arc::clone(storage)),
        })
    }

    /// Returns true if this medium provides a warm tier.
    #[must_use]
    pub fn has_warm_tier(&self) -> bool {
        !matches!(self, Self::None | Self::MemoryOnly)
    }
}

/// Storage choices accepted in [`CacheOptions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// Hot tier only.
    Memory,
    /// Durable directory-backed warm tier; requires `storageDir`.
    Local,
    /// Process-wide in-memory warm tier.
    Session,
}

/// Cache settings in the shape used by SDK configuration files.
///
/// Field names are camelCase and every field is optional. The TTL is given in
/// milliseconds.
///
/// # Examples
///
/// ```
/// use confcache::{CacheOptions, StorageKind};
/// use std::time::Duration;
///
/// let options: CacheOptions = serde_json::from_str(
///     r#"{"ttl": 30000, "maxSize": 50, "storage": "session"}"#,
/// )?;
///
/// assert!(options.enabled);
/// assert_eq!(options.ttl, Duration::from_secs(30));
/// assert_eq!(options.max_size, 50);
/// assert_eq!(options.storage, Some(StorageKind::Session));
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CacheOptions {
    /// Whether caching is on. Defaults to true.
    pub enabled: bool,
    /// Hot tier TTL. Defaults to 60 seconds.
    #[serde(with = "millis")]
    pub ttl: Duration,
    /// Hot tier capacity. Defaults to 1000.
    pub max_size: usize,
    /// Warm tier medium. Absent means no warm tier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<StorageKind>,
    /// Directory for [`StorageKind::Local`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_dir: Option<PathBuf>,
    /// Reserved; recorded on the cache but not used by reads.
    pub stale_while_revalidate: bool,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl: DEFAULT_TTL,
            max_size: DEFAULT_MAX_SIZE,
            storage: None,
            storage_dir: None,
            stale_while_revalidate: false,
        }
    }
}

impl CacheOptions {
    /// Resolves the configured storage into a [`StorageMedium`].
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::StorageUnavailable`] when `storage` is `local` but no
    /// `storageDir` is given.
    pub fn storage_medium(&self) -> Result<StorageMedium> {
        match (self.storage, &self.storage_dir) {
            (None, _) => Ok(StorageMedium::None),
            (Some(StorageKind::Memory), _) => Ok(StorageMedium::MemoryOnly),
            (Some(StorageKind::Session), _) => Ok(StorageMedium::Session),
            (Some(StorageKind::Local), Some(dir)) => Ok(StorageMedium::Local(dir.clone())),
            (Some(StorageKind::Local), None) => Err(Error::with_cause(
                ErrorKind::StorageUnavailable,
                "local storage requires storageDir",
            )),
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(ttl: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
