// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Cache telemetry recording.

use std::sync::Arc;
use std::time::Duration;

#[cfg(any(feature = "metrics", test))]
use opentelemetry::{KeyValue, metrics::Meter};
use tracing::Level;

#[cfg(any(feature = "metrics", test))]
use crate::telemetry::{attributes, metrics::Instruments};
use crate::telemetry::{CacheActivity, CacheOperation, TelemetryTier};

#[derive(Debug)]
struct Inner {
    logging_enabled: bool,
    #[cfg(any(feature = "metrics", test))]
    instruments: Option<Instruments>,
}

/// Records cache events as `tracing` events and, when a meter is configured, as metrics.
#[derive(Clone, Debug)]
pub(crate) struct CacheTelemetry {
    inner: Arc<Inner>,
}

impl CacheTelemetry {
    pub(crate) fn new(logging_enabled: bool, #[cfg(any(feature = "metrics", test))] meter: Option<&Meter>) -> Self {
        Self {
            inner: Arc::new(Inner {
                logging_enabled,
                #[cfg(any(feature = "metrics", test))]
                instruments: meter.map(Instruments::new),
            }),
        }
    }

    /// Records one cache event.
    pub(crate) fn record(
        &self,
        cache_name: &str,
        tier: TelemetryTier,
        operation: CacheOperation,
        activity: CacheActivity,
        duration: Option<Duration>,
    ) {
        #[cfg(any(feature = "metrics", test))]
        if let Some(instruments) = &self.inner.instruments {
            let attrs = [
                KeyValue::new(attributes::CACHE_NAME, cache_name.to_string()),
                KeyValue::new(attributes::CACHE_TIER_NAME, tier.as_str()),
                KeyValue::new(attributes::CACHE_OPERATION_NAME, operation.as_str()),
                KeyValue::new(attributes::CACHE_ACTIVITY_NAME, activity.as_str()),
            ];
            instruments.event(&attrs, duration);
        }

        if self.inner.logging_enabled {
            Self::emit(cache_name, tier, operation, activity, duration);
        }
    }

    /// Records the current number of hot tier entries.
    #[cfg_attr(
        not(any(feature = "metrics", test)),
        expect(unused_variables, reason = "size is only reported as a metric")
    )]
    pub(crate) fn record_size(&self, cache_name: &str, size: usize) {
        #[cfg(any(feature = "metrics", test))]
        if let Some(instruments) = &self.inner.instruments {
            instruments.size(cache_name, size);
        }
    }

    fn emit(cache_name: &str, tier: TelemetryTier, operation: CacheOperation, activity: CacheActivity, duration: Option<Duration>) {
        let tier = tier.as_str();
        let op = operation.as_str();
        let act = activity.as_str();
        let duration_ns = duration.map(|d| d.as_nanos());

        // Tracing levels must be constant, so a macro selects the call site.
        // Field names must match the constants in attributes.rs.
        macro_rules! emit_event {
            ($level:ident) => {
                tracing::$level!(
                    cache.name = cache_name,
                    cache.tier = tier,
                    cache.operation = op,
                    cache.activity = act,
                    cache.duration_ns = ?duration_ns,
                    "cache.event"
                )
            };
        }

        let level = activity.severity();
        if level == Level::ERROR {
            emit_event!(error);
        } else if level == Level::WARN {
            emit_event!(warn);
        } else if level == Level::INFO {
            emit_event!(info);
        } else {
            emit_event!(debug);
        }
    }
}
