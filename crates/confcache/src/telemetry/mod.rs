// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Cache telemetry: structured `tracing` events and, with the `metrics` feature,
//! OpenTelemetry instruments.
//!
//! Every recorded event carries the cache name, the tier it concerns, the operation,
//! the activity observed, and optionally the elapsed time.

use tracing::Level;

pub(crate) mod attributes;
pub(crate) mod cache;
pub(crate) mod config;
pub(crate) mod ext;
#[cfg(any(feature = "metrics", test))]
pub(crate) mod metrics;
#[cfg(test)]
pub(crate) mod testing;

pub(crate) use cache::CacheTelemetry;

/// The tier an event concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TelemetryTier {
    Hot,
    Warm,
    Both,
}

impl TelemetryTier {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hot => "hot",
            Self::Warm => "warm",
            Self::Both => "both",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CacheOperation {
    Get,
    Set,
    Delete,
    Clear,
    Invalidate,
    Prefetch,
}

impl CacheOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "cache.get",
            Self::Set => "cache.set",
            Self::Delete => "cache.delete",
            Self::Clear => "cache.clear",
            Self::Invalidate => "cache.invalidate",
            Self::Prefetch => "cache.prefetch",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CacheActivity {
    Hit,
    Miss,
    Bypassed,
    Inserted,
    Evicted,
    Promoted,
    Removed,
    Invalidated,
    Fetched,
    Degraded,
    Error,
}

impl CacheActivity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hit => "cache.hit",
            Self::Miss => "cache.miss",
            Self::Bypassed => "cache.bypassed",
            Self::Inserted => "cache.inserted",
            Self::Evicted => "cache.evicted",
            Self::Promoted => "cache.promoted",
            Self::Removed => "cache.removed",
            Self::Invalidated => "cache.invalidated",
            Self::Fetched => "cache.fetched",
            Self::Degraded => "cache.degraded",
            Self::Error => "cache.error",
        }
    }

    pub fn severity(self) -> Level {
        match self {
            Self::Hit | Self::Miss | Self::Bypassed => Level::DEBUG,
            Self::Inserted | Self::Evicted | Self::Promoted | Self::Removed | Self::Invalidated | Self::Fetched => Level::INFO,
            Self::Degraded => Level::WARN,
            Self::Error => Level::ERROR,
        }
    }
}
