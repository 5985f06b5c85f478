//! Shared application state.
//!
//! The registry is built once here and handed to the router and middleware
//! by `Arc`; there is no global registry.

use std::sync::Arc;

use hellometrics_core::error::Result;
use hellometrics_core::metrics::Registry;
use hellometrics_core::process::ProcessCollector;

use crate::config::ServerConfig;
use crate::obs::metrics::HttpMetrics;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: ServerConfig,
    registry: Arc<Registry>,
    http: HttpMetrics,
}

impl AppState {
    /// Build the registry and register every metric family.
    /// Duplicate names surface here as a config error.
    pub fn new(cfg: ServerConfig) -> Result<Self> {
        let registry = Arc::new(Registry::new());

        if cfg.metrics.process_metrics {
            registry.register(Arc::new(ProcessCollector::new()))?;
        }
        let http = HttpMetrics::register(&registry, &cfg.metrics.duration_buckets)?;

        tracing::debug!(families = registry.names().len(), "metrics registry ready");

        Ok(Self {
            inner: Arc::new(AppStateInner { cfg, registry, http }),
        })
    }

    pub fn cfg(&self) -> &ServerConfig {
        &self.inner.cfg
    }

    pub fn registry(&self) -> Arc<Registry> {
        Arc::clone(&self.inner.registry)
    }

    pub fn http_metrics(&self) -> &HttpMetrics {
        &self.inner.http
    }
}
