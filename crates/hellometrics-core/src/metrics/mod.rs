//! In-process metrics with Prometheus text exposition.
//!
//! Counter/gauge/histogram vectors keep one atomic series per label
//! combination in a `DashMap`, so concurrent observations never take a lock.
//! Series keys are label values in declared label-name order; rendering sorts
//! them so `collect()` output is stable between scrapes.

mod counter;
mod gauge;
mod histogram;
mod registry;

use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{HelloMetricsError, Result};

pub use counter::CounterVec;
pub use gauge::GaugeVec;
pub use histogram::{validate_buckets, HistogramVec, DEFAULT_BUCKETS};
pub use registry::{Collector, Registry, CONTENT_TYPE};

/// Name, help text and label dimensions of one metric family.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricOpts {
    pub name: String,
    pub help: String,
    pub label_names: Vec<String>,
}

impl MetricOpts {
    pub fn new(name: impl Into<String>, help: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            help: help.into(),
            label_names: Vec::new(),
        }
    }

    /// Declare label dimensions. Order is the rendering order.
    pub fn labels(mut self, names: &[&str]) -> Self {
        self.label_names = names.iter().map(|n| n.to_string()).collect();
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if !valid_metric_name(&self.name) {
            return Err(HelloMetricsError::Config(format!(
                "invalid metric name: {:?}",
                self.name
            )));
        }
        if self.help.is_empty() {
            return Err(HelloMetricsError::Config(format!(
                "metric {} must have help text",
                self.name
            )));
        }
        for (i, l) in self.label_names.iter().enumerate() {
            if !valid_label_name(l) {
                return Err(HelloMetricsError::Config(format!(
                    "metric {}: invalid label name {:?}",
                    self.name, l
                )));
            }
            if self.label_names[..i].contains(l) {
                return Err(HelloMetricsError::Config(format!(
                    "metric {}: duplicate label name {}",
                    self.name, l
                )));
            }
        }
        Ok(())
    }

    /// Write the `# HELP` / `# TYPE` header.
    pub(crate) fn render_header(&self, kind: &str, out: &mut String) {
        let _ = writeln!(out, "# HELP {} {}", self.name, escape_help(&self.help));
        let _ = writeln!(out, "# TYPE {} {}", self.name, kind);
    }

    /// Series key for an observation.
    /// Missing labels record an empty value; undeclared pairs are ignored.
    pub(crate) fn series_key(&self, labels: &[(&str, &str)]) -> Vec<String> {
        self.label_names
            .iter()
            .map(|name| {
                labels
                    .iter()
                    .find(|(k, _)| *k == name.as_str())
                    .map(|(_, v)| v.to_string())
                    .unwrap_or_default()
            })
            .collect()
    }

    /// `k1="v1",k2="v2"` without braces.
    pub(crate) fn label_str(&self, values: &[String]) -> String {
        self.label_names
            .iter()
            .zip(values)
            .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
            .collect::<Vec<_>>()
            .join(",")
    }
}

pub(crate) fn valid_metric_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

pub(crate) fn valid_label_name(name: &str) -> bool {
    if name.starts_with("__") {
        return false;
    }
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

/// Help text escapes backslash and newline only.
fn escape_help(v: &str) -> String {
    v.replace('\\', "\\\\").replace('\n', "\\n")
}

/// Wrap a label string in braces, or nothing when empty.
pub(crate) fn braced(label_str: &str) -> String {
    if label_str.is_empty() {
        String::new()
    } else {
        format!("{{{}}}", label_str)
    }
}

/// Float formatting as the exposition format expects it.
pub(crate) fn fmt_f64(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v == f64::INFINITY {
        "+Inf".to_string()
    } else if v == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        v.to_string()
    }
}

/// `f64` stored as bits; updates go through a CAS loop.
#[derive(Debug, Default)]
pub(crate) struct AtomicF64(AtomicU64);

impl AtomicF64 {
    pub(crate) fn load(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Relaxed))
    }

    pub(crate) fn store(&self, v: f64) {
        self.0.store(v.to_bits(), Ordering::Relaxed);
    }

    pub(crate) fn add(&self, v: f64) {
        let _ = self
            .0
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |bits| {
                Some((f64::from_bits(bits) + v).to_bits())
            });
    }
}
