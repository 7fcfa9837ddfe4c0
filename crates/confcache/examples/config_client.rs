// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Caching configuration lookups in front of a slow service.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use confcache::{Cache, ConfigClient, ConfigFetcher, FetchOptions, MemoryStorage, StorageMedium};
use serde_json::{Value, json};
use tick::Clock;

#[derive(Debug, Default)]
struct ConfigService {
    requests: AtomicUsize,
}

impl ConfigFetcher for ConfigService {
    type Error = std::io::Error;

    async fn fetch_value(&self, brand: &str, config: &str, key: &str) -> Result<Value, Self::Error> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        Ok(json!(format!("{brand}/{config}/{key}")))
    }

    async fn fetch_config(&self, brand: &str, config: &str) -> Result<Value, Self::Error> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        Ok(json!({"brand": brand, "config": config}))
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing::subscriber::set_global_default(tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).finish())?;

    let cache = Cache::builder::<Value>(Clock::new_tokio())
        .name("example")
        .storage(StorageMedium::Custom(Arc::new(MemoryStorage::new())))
        .enable_logs()
        .build()?;
    let client = ConfigClient::new(ConfigService::default(), cache);

    for _ in 0..3 {
        let value = client.get_value("brandA", "web", "color", FetchOptions::default()).await?;
        println!("color = {value}");
    }
    let value = client.get_value("brandA", "web", "color", FetchOptions::refresh()).await?;
    println!("refreshed color = {value}");

    client.invalidate_brand("brandA").await?;

    println!("service requests: {}", client.fetcher().requests.load(Ordering::SeqCst));
    println!("cache stats: {:?}", client.cache().stats());
    Ok(())
}
