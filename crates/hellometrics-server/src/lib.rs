//! hellometrics server library entry.
//!
//! Wires config, the metrics registry, request instrumentation and the two
//! HTTP routes. Consumed by the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod handlers;
pub mod obs;
pub mod router;
pub mod server;
