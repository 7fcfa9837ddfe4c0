// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Extension traits for telemetry recording.

use std::time::Duration;

use tick::Clock;

use crate::telemetry::{CacheActivity, CacheOperation, CacheTelemetry, TelemetryTier};

/// Result of a timed async operation.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TimedResult<R> {
    pub result: R,
    pub duration: Duration,
}

pub(crate) trait ClockExt {
    /// Times an async operation and returns both the result and elapsed duration.
    fn timed_async<F, R>(&self, f: F) -> impl Future<Output = TimedResult<R>>
    where
        F: Future<Output = R>;
}

impl ClockExt for Clock {
    async fn timed_async<F, R>(&self, f: F) -> TimedResult<R>
    where
        F: Future<Output = R>,
    {
        let start = self.instant();
        let result = f.await;
        TimedResult {
            result,
            duration: self.instant().saturating_duration_since(start),
        }
    }
}

/// Recording through an optional recorder; `None` records nothing.
pub(crate) trait CacheTelemetryExt {
    fn record(&self, name: &str, tier: TelemetryTier, operation: CacheOperation, activity: CacheActivity, duration: Option<Duration>);

    fn record_size(&self, name: &str, size: usize);
}

impl CacheTelemetryExt for Option<CacheTelemetry> {
    fn record(&self, name: &str, tier: TelemetryTier, operation: CacheOperation, activity: CacheActivity, duration: Option<Duration>) {
        if let Some(t) = self {
            t.record(name, tier, operation, activity, duration);
        }
    }

    fn record_size(&self, name: &str, size: usize) {
        if let Some(t) = self {
            t.record_size(name, size);
        }
    }
}
