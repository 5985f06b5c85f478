use dashmap::DashMap;
use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};

use super::{braced, registry::Collector, MetricOpts};
use crate::error::Result;

/// Monotonic counter, one series per label combination.
#[derive(Debug)]
pub struct CounterVec {
    opts: MetricOpts,
    map: DashMap<Vec<String>, AtomicU64>,
}

impl CounterVec {
    pub fn new(opts: MetricOpts) -> Result<Self> {
        opts.validate()?;
        let map = DashMap::new();
        // Unlabeled counters report 0 before the first increment.
        if opts.label_names.is_empty() {
            map.insert(Vec::new(), AtomicU64::new(0));
        }
        Ok(Self { opts, map })
    }

    /// Increment by 1.
    pub fn inc(&self, labels: &[(&str, &str)]) {
        self.add(labels, 1);
    }

    /// Increment by an arbitrary value.
    pub fn add(&self, labels: &[(&str, &str)], v: u64) {
        let key = self.opts.series_key(labels);
        let counter = self.map.entry(key).or_insert_with(|| AtomicU64::new(0));
        counter.fetch_add(v, Ordering::Relaxed);
    }

    /// Current value, 0 for a series never touched.
    pub fn get(&self, labels: &[(&str, &str)]) -> u64 {
        let key = self.opts.series_key(labels);
        self.map
            .get(&key)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }
}

impl Collector for CounterVec {
    fn names(&self) -> Vec<&str> {
        vec![self.opts.name.as_str()]
    }

    fn render(&self, out: &mut String) {
        self.opts.render_header("counter", out);
        let mut rows: Vec<(Vec<String>, u64)> = self
            .map
            .iter()
            .map(|r| (r.key().clone(), r.value().load(Ordering::Relaxed)))
            .collect();
        rows.sort();
        for (key, val) in rows {
            let labels = braced(&self.opts.label_str(&key));
            let _ = writeln!(out, "{}{} {}", self.opts.name, labels, val);
        }
    }
}
