//! hellometrics core: error type, metric primitives and the registry.
//!
//! Everything here is runtime-agnostic so the server crate (and tests) can
//! build registries without pulling in HTTP or async dependencies.
//!
//! Panics, `unwrap`, and `expect` are compile-denied here. Every fallible
//! path surfaces as `HelloMetricsError`/`Result`, and the hot path
//! (observations) is infallible by construction.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod metrics;
pub mod process;

pub use error::{ErrorCode, HelloMetricsError, Result};
pub use metrics::{
    Collector, CounterVec, GaugeVec, HistogramVec, MetricOpts, Registry, CONTENT_TYPE,
    DEFAULT_BUCKETS,
};
pub use process::ProcessCollector;
