// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Error types for cache construction and storage media.

use std::fmt;

/// The category of a cache [`Error`].
///
/// Only [`StorageUnavailable`](Self::StorageUnavailable) and
/// [`InvalidPattern`](Self::InvalidPattern) ever reach callers of the cache. The other
/// kinds are produced by storage media and recovered inside the warm tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The requested storage medium cannot be used in this environment.
    StorageUnavailable,
    /// A storage medium failed to read, write, remove, or enumerate.
    Storage,
    /// A storage medium rejected a write because it is full.
    QuotaExceeded,
    /// A value could not be serialized or deserialized.
    Serialization,
    /// An invalidation pattern is not a valid regular expression.
    InvalidPattern,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::StorageUnavailable => "storage medium unavailable",
            Self::Storage => "storage medium failure",
            Self::QuotaExceeded => "storage quota exceeded",
            Self::Serialization => "serialization failure",
            Self::InvalidPattern => "invalid key pattern",
        })
    }
}

/// An error from a cache operation.
///
/// The error carries an [`ErrorKind`] and, usually, the underlying cause. Use
/// [`std::error::Error::source()`] to access the cause.
///
/// # Example
///
/// ```
/// use confcache_tier::{Error, ErrorKind};
///
/// let error = Error::with_cause(ErrorKind::Storage, "disk unplugged");
/// assert_eq!(error.kind(), ErrorKind::Storage);
/// ```
#[ohno::error]
#[display("{kind}")]
pub struct Error {
    kind: ErrorKind,
}

impl Error {
    /// Creates an error of the given kind without a cause.
    ///
    /// This is the public constructor for storage media implemented outside this crate.
    #[must_use]
    pub fn from_kind(kind: ErrorKind) -> Self {
        Self::new(kind)
    }

    /// Creates an error of the given kind caused by `cause`.
    ///
    /// # Examples
    ///
    /// ```
    /// use confcache_tier::{Error, ErrorKind};
    ///
    /// let error = Error::with_cause(ErrorKind::QuotaExceeded, "store is full");
    /// assert_eq!(error.kind(), ErrorKind::QuotaExceeded);
    /// assert!(error.to_string().contains("store is full"));
    /// ```
    pub fn with_cause(kind: ErrorKind, cause: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::caused_by(kind, cause)
    }

    /// Returns the category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

/// A specialized [`Result`] type for cache operations.
pub type Result<T> = std::result::Result<T, Error>;
