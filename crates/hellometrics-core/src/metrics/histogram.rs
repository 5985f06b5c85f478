use dashmap::DashMap;
use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use super::{braced, fmt_f64, registry::Collector, AtomicF64, MetricOpts};
use crate::error::{HelloMetricsError, Result};

/// Default bucket upper bounds, in seconds.
pub const DEFAULT_BUCKETS: [f64; 11] = [
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

#[derive(Debug)]
struct AtomicHistogram {
    count: AtomicU64,
    sum: AtomicF64,
    // Cumulative: buckets[i] counts observations <= bounds[i].
    buckets: Box<[AtomicU64]>,
}

impl AtomicHistogram {
    fn new(n: usize) -> Self {
        Self {
            count: AtomicU64::new(0),
            sum: AtomicF64::default(),
            buckets: (0..n).map(|_| AtomicU64::new(0)).collect(),
        }
    }
}

/// Histogram with fixed buckets, one series per label combination.
#[derive(Debug)]
pub struct HistogramVec {
    opts: MetricOpts,
    bounds: Vec<f64>,
    map: DashMap<Vec<String>, AtomicHistogram>,
}

impl HistogramVec {
    /// Build with explicit bucket bounds (strictly increasing, finite).
    pub fn new(opts: MetricOpts, bounds: &[f64]) -> Result<Self> {
        opts.validate()?;
        if opts.label_names.iter().any(|l| l == "le") {
            return Err(HelloMetricsError::Config(format!(
                "histogram {}: label name \"le\" is reserved",
                opts.name
            )));
        }
        validate_buckets(bounds)?;

        let map = DashMap::new();
        if opts.label_names.is_empty() {
            map.insert(Vec::new(), AtomicHistogram::new(bounds.len()));
        }
        Ok(Self {
            opts,
            bounds: bounds.to_vec(),
            map,
        })
    }

    pub fn buckets(&self) -> &[f64] {
        &self.bounds
    }

    /// Record one observation.
    pub fn observe(&self, labels: &[(&str, &str)], v: f64) {
        let key = self.opts.series_key(labels);
        let n = self.bounds.len();
        let hist = self
            .map
            .entry(key)
            .or_insert_with(|| AtomicHistogram::new(n));

        hist.count.fetch_add(1, Ordering::Relaxed);
        hist.sum.add(v);
        for (i, &b) in self.bounds.iter().enumerate() {
            if v <= b {
                hist.buckets[i].fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Record a duration in seconds.
    pub fn observe_duration(&self, labels: &[(&str, &str)], d: Duration) {
        self.observe(labels, d.as_secs_f64());
    }

    /// Number of observations recorded for this label combination.
    pub fn sample_count(&self, labels: &[(&str, &str)]) -> u64 {
        let key = self.opts.series_key(labels);
        self.map
            .get(&key)
            .map(|h| h.count.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Sum of observations recorded for this label combination.
    pub fn sample_sum(&self, labels: &[(&str, &str)]) -> f64 {
        let key = self.opts.series_key(labels);
        self.map.get(&key).map(|h| h.sum.load()).unwrap_or(0.0)
    }
}

/// Check bucket bounds: non-empty, finite, strictly increasing.
pub fn validate_buckets(bounds: &[f64]) -> Result<()> {
    if bounds.is_empty() {
        return Err(HelloMetricsError::Config(
            "histogram buckets must not be empty".into(),
        ));
    }
    if bounds.iter().any(|b| !b.is_finite()) {
        return Err(HelloMetricsError::Config(
            "histogram buckets must be finite (+Inf is implicit)".into(),
        ));
    }
    if bounds.windows(2).any(|w| w[0] >= w[1]) {
        return Err(HelloMetricsError::Config(
            "histogram buckets must be strictly increasing".into(),
        ));
    }
    Ok(())
}

impl Collector for HistogramVec {
    fn names(&self) -> Vec<&str> {
        vec![self.opts.name.as_str()]
    }

    fn render(&self, out: &mut String) {
        let name = &self.opts.name;
        self.opts.render_header("histogram", out);

        let mut keys: Vec<Vec<String>> = self.map.iter().map(|r| r.key().clone()).collect();
        keys.sort();

        for key in keys {
            let Some(hist) = self.map.get(&key) else { continue };

            let label_str = self.opts.label_str(&key);
            let prefix = if label_str.is_empty() {
                String::new()
            } else {
                format!("{},", label_str)
            };

            for (i, &le) in self.bounds.iter().enumerate() {
                let count = hist.buckets[i].load(Ordering::Relaxed);
                let _ = writeln!(out, "{}_bucket{{{}le=\"{}\"}} {}", name, prefix, fmt_f64(le), count);
            }
            let count = hist.count.load(Ordering::Relaxed);
            let _ = writeln!(out, "{}_bucket{{{}le=\"+Inf\"}} {}", name, prefix, count);

            let labels = braced(&label_str);
            let _ = writeln!(out, "{}_sum{} {}", name, labels, fmt_f64(hist.sum.load()));
            let _ = writeln!(out, "{}_count{} {}", name, labels, count);
        }
    }
}
