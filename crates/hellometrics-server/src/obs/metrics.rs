//! HTTP metric families registered at startup.

use std::sync::Arc;

use hellometrics_core::error::Result;
use hellometrics_core::metrics::{GaugeVec, HistogramVec, MetricOpts, Registry};

pub const REQUEST_DURATION: &str = "http_request_duration_seconds";
pub const REQUEST_DURATION_HELP: &str = "Duration of HTTP requests in seconds";
pub const ACTIVE_REQUESTS: &str = "active_requests";
pub const ACTIVE_REQUESTS_HELP: &str = "Number of active HTTP requests";

/// Handles to the request metrics. Cheap to clone.
#[derive(Clone)]
pub struct HttpMetrics {
    /// Labeled by `method`, `route`, `status`.
    pub request_duration: Arc<HistogramVec>,
    /// Unlabeled.
    pub active_requests: Arc<GaugeVec>,
}

impl HttpMetrics {
    /// Register both families. Fails if either name is already taken.
    pub fn register(registry: &Registry, duration_buckets: &[f64]) -> Result<Self> {
        let request_duration = registry.register_histogram_vec(
            MetricOpts::new(REQUEST_DURATION, REQUEST_DURATION_HELP)
                .labels(&["method", "route", "status"]),
            duration_buckets,
        )?;
        let active_requests =
            registry.register_gauge_vec(MetricOpts::new(ACTIVE_REQUESTS, ACTIVE_REQUESTS_HELP))?;

        Ok(Self {
            request_duration,
            active_requests,
        })
    }

    /// In-flight requests right now.
    pub fn active(&self) -> f64 {
        self.active_requests.get(&[])
    }

    /// Completed requests recorded for this label combination.
    pub fn completed(&self, method: &str, route: &str, status: u16) -> u64 {
        let status = status.to_string();
        self.request_duration.sample_count(&[
            ("method", method),
            ("route", route),
            ("status", status.as_str()),
        ])
    }
}
