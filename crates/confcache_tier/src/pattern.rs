// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt;

use regex::Regex;

use crate::{Error, ErrorKind};

/// A compiled regular expression matched against logical cache keys.
///
/// Patterns are unanchored, exactly like `Regex::is_match`: `brandA` matches
/// `config:brandA:web`. Anchor with `^` to restrict to a key prefix.
///
/// # Examples
///
/// ```
/// use confcache_tier::KeyPattern;
///
/// let pattern = KeyPattern::new("^config:brandA:.*")?;
/// assert!(pattern.matches("config:brandA:web:color"));
/// assert!(!pattern.matches("config:brandB:web:color"));
/// # Ok::<(), confcache_tier::Error>(())
/// ```
#[derive(Clone)]
pub struct KeyPattern(Regex);

impl KeyPattern {
    /// Compiles a pattern.
    ///
    /// # Errors
    ///
    /// Returns an [`ErrorKind::InvalidPattern`] error if `pattern` is not a valid
    /// regular expression.
    pub fn new(pattern: &str) -> Result<Self, Error> {
        Regex::new(pattern)
            .map(Self)
            .map_err(|e| Error::with_cause(ErrorKind::InvalidPattern, e))
    }

    /// Returns `true` if the pattern matches anywhere in `key`.
    #[must_use]
    pub fn matches(&self, key: &str) -> bool {
        self.0.is_match(key)
    }

    /// Returns the source text of the pattern.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for KeyPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("KeyPattern").field(&self.0.as_str()).finish()
    }
}

impl From<Regex> for KeyPattern {
    fn from(regex: Regex) -> Self {
        Self(regex)
    }
}
