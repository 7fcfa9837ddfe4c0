// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! OpenTelemetry instruments for cache events.

use opentelemetry::InstrumentationScope;
use opentelemetry::KeyValue;
use opentelemetry::metrics::{Counter, Gauge, Histogram, Meter, MeterProvider};

use crate::telemetry::attributes::CACHE_NAME;

pub(crate) const EVENT_COUNT: &str = "cache.event.count";
pub(crate) const OPERATION_DURATION: &str = "cache.operation.duration";
pub(crate) const SIZE: &str = "cache.size";

/// Creates the `confcache` meter, versioned with this crate.
pub(crate) fn create_meter(provider: &dyn MeterProvider) -> Meter {
    let scope = InstrumentationScope::builder("confcache")
        .with_version(env!("CARGO_PKG_VERSION"))
        .with_schema_url("https://opentelemetry.io/schemas/1.47.0")
        .build();
    provider.meter_with_scope(scope)
}

/// The instruments one cache records into.
#[derive(Debug)]
pub(crate) struct Instruments {
    events: Counter<u64>,
    durations: Histogram<f64>,
    size: Gauge<u64>,
}

impl Instruments {
    pub(crate) fn new(meter: &Meter) -> Self {
        Self {
            events: meter
                .u64_counter(EVENT_COUNT)
                .with_description("Cache events by tier, operation and activity")
                .with_unit("{event}")
                .build(),
            durations: meter
                .f64_histogram(OPERATION_DURATION)
                .with_description("Time spent in cache operations")
                .with_unit("s")
                .build(),
            size: meter
                .u64_gauge(SIZE)
                .with_description("Number of entries in the hot tier")
                .with_unit("{entry}")
                .build(),
        }
    }

    /// Counts one event and, when timed, records its duration under the same attributes.
    pub(crate) fn event(&self, attributes: &[KeyValue], duration: Option<std::time::Duration>) {
        self.events.add(1, attributes);
        if let Some(duration) = duration {
            self.durations.record(duration.as_secs_f64(), attributes);
        }
    }

    pub(crate) fn size(&self, cache_name: &str, size: usize) {
        self.size.record(
            u64::try_from(size).unwrap_or(u64::MAX),
            &[KeyValue::new(CACHE_NAME, cache_name.to_string())],
        );
    }
}
