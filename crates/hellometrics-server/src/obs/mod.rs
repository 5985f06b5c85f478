//! Request instrumentation.
//!
//! `metrics` owns the HTTP metric families; `middleware` records into them
//! once per request through a drop guard.

pub mod metrics;
pub mod middleware;
