// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Telemetry configuration collected by the cache builder.

#[cfg(any(feature = "metrics", test))]
use opentelemetry::metrics::{Meter, MeterProvider};

use crate::telemetry::CacheTelemetry;

/// Which telemetry outputs a cache should produce.
#[derive(Clone, Debug, Default)]
pub(crate) struct TelemetryConfig {
    logs_enabled: bool,
    #[cfg(any(feature = "metrics", test))]
    meter: Option<Meter>,
}

impl TelemetryConfig {
    /// Enables structured `tracing` events for cache operations.
    #[must_use]
    pub(crate) fn with_logs(self) -> Self {
        Self {
            logs_enabled: true,
            ..self
        }
    }

    /// Enables metrics collection using the provided meter provider.
    #[cfg(any(feature = "metrics", test))]
    #[must_use]
    pub(crate) fn with_metrics(mut self, provider: &dyn MeterProvider) -> Self {
        self.meter = Some(crate::telemetry::metrics::create_meter(provider));
        self
    }

    /// Builds the recorder, or `None` when every output is disabled.
    #[must_use]
    pub(crate) fn build(self) -> Option<CacheTelemetry> {
        #[cfg(any(feature = "metrics", test))]
        {
            if !self.logs_enabled && self.meter.is_none() {
                return None;
            }
            Some(CacheTelemetry::new(self.logs_enabled, self.meter.as_ref()))
        }

        #[cfg(not(any(feature = "metrics", test)))]
        {
            self.logs_enabled.then(|| CacheTelemetry::new(true))
        }
    }
}

#[cfg(test)]
mod tests {
    use opentelemetry_sdk::metrics::SdkMeterProvider;

    use super::*;

    #[test]
    fn nothing_enabled_builds_no_recorder() {
        assert!(TelemetryConfig::default().build().is_none());
    }

    #[test]
    fn logs_alone_build_a_recorder() {
        assert!(TelemetryConfig::default().with_logs().build().is_some());
    }

    #[test]
    fn metrics_alone_build_a_recorder() {
        let provider = SdkMeterProvider::builder().build();
        assert!(TelemetryConfig::default().with_metrics(&provider).build().is_some());
    }
}
