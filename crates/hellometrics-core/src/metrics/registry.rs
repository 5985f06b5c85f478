use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use super::{CounterVec, GaugeVec, HistogramVec, MetricOpts};
use crate::error::{HelloMetricsError, Result};

/// Content type of the text exposition format rendered by [`Registry::collect`].
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Something that owns one or more metric families and can render them.
pub trait Collector: Send + Sync {
    /// Family names this collector renders. Reserved in the registry.
    fn names(&self) -> Vec<&str>;
    /// Append families in text exposition format.
    fn render(&self, out: &mut String);
}

#[derive(Default)]
struct RegistryInner {
    names: HashSet<String>,
    collectors: Vec<Arc<dyn Collector>>,
}

/// Set of registered collectors. Build one per process and share it by `Arc`.
///
/// The lock guards registration and `collect()` only; observations go straight
/// to the metric's own atomics.
#[derive(Default)]
pub struct Registry {
    inner: RwLock<RegistryInner>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a collector. Fails with a config error if any of its family
    /// names is already taken; the registry is left untouched in that case.
    pub fn register(&self, collector: Arc<dyn Collector>) -> Result<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| HelloMetricsError::Internal("metrics registry lock poisoned".into()))?;

        let names = collector.names();
        for (i, name) in names.iter().enumerate() {
            if inner.names.contains(*name) || names[..i].contains(name) {
                return Err(HelloMetricsError::Config(format!(
                    "duplicate metric name: {name}"
                )));
            }
        }

        for name in &names {
            inner.names.insert(name.to_string());
        }
        tracing::debug!(names = ?names, "metric registered");
        drop(names);
        inner.collectors.push(collector);
        Ok(())
    }

    pub fn register_counter_vec(&self, opts: MetricOpts) -> Result<Arc<CounterVec>> {
        let counter = Arc::new(CounterVec::new(opts)?);
        self.register(counter.clone())?;
        Ok(counter)
    }

    pub fn register_gauge_vec(&self, opts: MetricOpts) -> Result<Arc<GaugeVec>> {
        let gauge = Arc::new(GaugeVec::new(opts)?);
        self.register(gauge.clone())?;
        Ok(gauge)
    }

    pub fn register_histogram_vec(
        &self,
        opts: MetricOpts,
        buckets: &[f64],
    ) -> Result<Arc<HistogramVec>> {
        let hist = Arc::new(HistogramVec::new(opts, buckets)?);
        self.register(hist.clone())?;
        Ok(hist)
    }

    /// Render every registered family, in registration order.
    pub fn collect(&self) -> String {
        // A poisoned lock still holds a consistent collector list.
        let inner = match self.inner.read() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        let mut out = String::new();
        for c in &inner.collectors {
            c.render(&mut out);
        }
        out
    }

    /// Registered family names, in registration order.
    pub fn names(&self) -> Vec<String> {
        let inner = match self.inner.read() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        inner
            .collectors
            .iter()
            .flat_map(|c| c.names().into_iter().map(str::to_string).collect::<Vec<_>>())
            .collect()
    }
}
