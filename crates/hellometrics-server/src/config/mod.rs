//! Server config loader (strict parsing).
//!
//! The config file is optional: without it the server runs on the built-in
//! defaults (port 4000, process metrics on, default duration buckets).

pub mod schema;

use std::fs;
use std::path::Path;

use hellometrics_core::error::{HelloMetricsError, Result};

pub use schema::{MetricsSection, ServerConfig, ServerSection};

/// Looked up in the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "hellometrics.yaml";

pub fn load_from_file(path: &str) -> Result<ServerConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| HelloMetricsError::Config(format!("read config {path} failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<ServerConfig> {
    let cfg: ServerConfig = serde_yaml::from_str(s)
        .map_err(|e| HelloMetricsError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Load `path` if it exists, otherwise fall back to defaults.
pub fn load_or_default(path: &str) -> Result<ServerConfig> {
    if Path::new(path).exists() {
        tracing::info!(%path, "loading config");
        load_from_file(path)
    } else {
        tracing::info!(%path, "no config file, using defaults");
        Ok(ServerConfig::default())
    }
}
