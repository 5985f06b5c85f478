use dashmap::DashMap;
use std::fmt::Write;

use super::{braced, fmt_f64, registry::Collector, AtomicF64, MetricOpts};
use crate::error::Result;

/// Gauge that can go up and down, one series per label combination.
#[derive(Debug)]
pub struct GaugeVec {
    opts: MetricOpts,
    map: DashMap<Vec<String>, AtomicF64>,
}

impl GaugeVec {
    pub fn new(opts: MetricOpts) -> Result<Self> {
        opts.validate()?;
        let map = DashMap::new();
        if opts.label_names.is_empty() {
            map.insert(Vec::new(), AtomicF64::default());
        }
        Ok(Self { opts, map })
    }

    /// Increment by 1.
    pub fn inc(&self, labels: &[(&str, &str)]) {
        self.add(labels, 1.0);
    }

    /// Decrement by 1.
    pub fn dec(&self, labels: &[(&str, &str)]) {
        self.add(labels, -1.0);
    }

    /// Add an arbitrary signed delta.
    pub fn add(&self, labels: &[(&str, &str)], v: f64) {
        let key = self.opts.series_key(labels);
        let gauge = self.map.entry(key).or_insert_with(AtomicF64::default);
        gauge.add(v);
    }

    pub fn set(&self, labels: &[(&str, &str)], v: f64) {
        let key = self.opts.series_key(labels);
        self.map.entry(key).or_insert_with(AtomicF64::default).store(v);
    }

    /// Current value, 0 for a series never touched.
    pub fn get(&self, labels: &[(&str, &str)]) -> f64 {
        let key = self.opts.series_key(labels);
        self.map.get(&key).map(|g| g.load()).unwrap_or(0.0)
    }
}

impl Collector for GaugeVec {
    fn names(&self) -> Vec<&str> {
        vec![self.opts.name.as_str()]
    }

    fn render(&self, out: &mut String) {
        self.opts.render_header("gauge", out);
        let mut rows: Vec<(Vec<String>, f64)> = self
            .map
            .iter()
            .map(|r| (r.key().clone(), r.value().load()))
            .collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));
        for (key, val) in rows {
            let labels = braced(&self.opts.label_str(&key));
            let _ = writeln!(out, "{}{} {}", self.opts.name, labels, fmt_f64(val));
        }
    }
}
