// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Cached configuration retrieval.
//!
//! [`ConfigClient`] sits between SDK callers and the transport that talks to the
//! configuration service. Single values are cached under `config:<brand>:<config>:<key>`
//! and whole configurations under `config:<brand>:<config>`.

use confcache_tier::{KeyPattern, Result};
use serde_json::Value;

use crate::cache::Cache;

/// Fetches configuration from the configuration service.
///
/// Implementations own the transport; the cache only decides when to call them.
pub trait ConfigFetcher {
    /// The transport error, returned unchanged to callers of [`ConfigClient`].
    type Error;

    /// Fetches a single value of a configuration.
    fn fetch_value(&self, brand: &str, config: &str, key: &str) -> impl Future<Output = std::result::Result<Value, Self::Error>> + Send;

    /// Fetches a whole configuration.
    fn fetch_config(&self, brand: &str, config: &str) -> impl Future<Output = std::result::Result<Value, Self::Error>> + Send;
}

/// Per-request retrieval options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Skips the cache read. The fetched value is still stored.
    pub force_refresh: bool,
}

impl FetchOptions {
    /// Options that skip the cache read.
    #[must_use]
    pub const fn refresh() -> Self {
        Self { force_refresh: true }
    }
}

/// Returns the cache key for a single configuration value.
///
/// # Examples
///
/// ```
/// assert_eq!(confcache::value_key("brandA", "web", "color"), "config:brandA:web:color");
/// ```
#[must_use]
pub fn value_key(brand: &str, config: &str, key: &str) -> String {
    format!("config:{brand}:{config}:{key}")
}

/// Returns the cache key for a whole configuration.
#[must_use]
pub fn config_key(brand: &str, config: &str) -> String {
    format!("config:{brand}:{config}")
}

/// Configuration retrieval through a [`Cache`].
///
/// Reads go through [`Cache::prefetch`], so a cached value is returned without calling
/// the fetcher and a fetched value is cached for the next caller. Fetch errors reach the
/// caller unchanged and nothing is cached.
///
/// # Examples
///
/// ```
/// use confcache::{Cache, ConfigClient, ConfigFetcher, FetchOptions};
/// use serde_json::{Value, json};
/// use tick::Clock;
/// # futures::executor::block_on(async {
///
/// struct Fixed;
///
/// impl ConfigFetcher for Fixed {
///     type Error = std::io::Error;
///
///     async fn fetch_value(&self, _brand: &str, _config: &str, _key: &str) -> Result<Value, Self::Error> {
///         Ok(json!("blue"))
///     }
///
///     async fn fetch_config(&self, _brand: &str, _config: &str) -> Result<Value, Self::Error> {
///         Ok(json!({"color": "blue"}))
///     }
/// }
///
/// let cache = Cache::builder::<Value>(Clock::new_frozen()).build()?;
/// let client = ConfigClient::new(Fixed, cache);
///
/// let color = client.get_value("brandA", "web", "color", FetchOptions::default()).await?;
/// assert_eq!(color, json!("blue"));
/// assert!(client.cache().has("config:brandA:web:color"));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// # });
/// ```
#[derive(Debug)]
pub struct ConfigClient<F> {
    fetcher: F,
    cache: Cache<Value>,
}

impl<F: ConfigFetcher + Sync> ConfigClient<F> {
    /// Creates a client over `fetcher` and `cache`.
    #[must_use]
    pub const fn new(fetcher: F, cache: Cache<Value>) -> Self {
        Self { fetcher, cache }
    }

    /// Returns one value of a configuration.
    ///
    /// # Errors
    ///
    /// Returns the fetcher's error when the value is not cached, or when
    /// `options.force_refresh` is set, and the fetch fails.
    pub async fn get_value(&self, brand: &str, config: &str, key: &str, options: FetchOptions) -> std::result::Result<Value, F::Error> {
        let cache_key = value_key(brand, config, key);
        if options.force_refresh {
            let value = self.fetcher.fetch_value(brand, config, key).await?;
            self.cache.set(&cache_key, value.clone()).await;
            return Ok(value);
        }

        self.cache
            .prefetch(&cache_key, || self.fetcher.fetch_value(brand, config, key))
            .await
    }

    /// Returns a whole configuration.
    ///
    /// # Errors
    ///
    /// Returns the fetcher's error when the configuration is not cached, or when
    /// `options.force_refresh` is set, and the fetch fails.
    pub async fn get_config(&self, brand: &str, config: &str, options: FetchOptions) -> std::result::Result<Value, F::Error> {
        let cache_key = config_key(brand, config);
        if options.force_refresh {
            let value = self.fetcher.fetch_config(brand, config).await?;
            self.cache.set(&cache_key, value.clone()).await;
            return Ok(value);
        }

        self.cache
            .prefetch(&cache_key, || self.fetcher.fetch_config(brand, config))
            .await
    }

    /// Drops every cached value and configuration of `brand`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidPattern`](crate::ErrorKind::InvalidPattern) if the
    /// escaped pattern does not compile.
    pub async fn invalidate_brand(&self, brand: &str) -> Result<()> {
        let mut pattern = String::from("^config:");
        escape_into(&mut pattern, brand);
        pattern.push(':');
        self.cache.invalidate_matching(&KeyPattern::new(&pattern)?).await;
        Ok(())
    }

    /// Drops the cached configuration `config` of `brand` together with its values.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidPattern`](crate::ErrorKind::InvalidPattern) if the
    /// escaped pattern does not compile.
    pub async fn invalidate_config(&self, brand: &str, config: &str) -> Result<()> {
        let mut pattern = String::from("^config:");
        escape_into(&mut pattern, brand);
        pattern.push(':');
        escape_into(&mut pattern, config);
        pattern.push_str("(:|$)");
        self.cache.invalidate_matching(&KeyPattern::new(&pattern)?).await;
        Ok(())
    }

    /// Drops everything this client has cached.
    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }
}

impl<F> ConfigClient<F> {
    /// Returns the underlying cache.
    #[must_use]
    pub const fn cache(&self) -> &Cache<Value> {
        &self.cache
    }

    /// Returns the fetcher.
    #[must_use]
    pub const fn fetcher(&self) -> &F {
        &self.fetcher
    }
}

fn escape_into(pattern: &mut String, literal: &str) {
    pattern.push_str(&regex::escape(literal));
}
