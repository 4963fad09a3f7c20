//! Shared application state.
//!
//! Owns the registry and the initialized recorder. Startup errors are
//! returned rather than panicking so the binary and tests can report them.

use std::sync::Arc;

use respmeter_core::error::Result;
use respmeter_core::{MetricRegistry, ResponseCodeMetrics};

use crate::config::MeterConfig;
use crate::middleware::{strategy_for, MeterState};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: MeterConfig,
    metrics: Arc<ResponseCodeMetrics>,
}

impl AppState {
    /// Build state with a fresh registry.
    pub fn new(cfg: MeterConfig) -> Result<Self> {
        Self::with_registry(cfg, Arc::new(MetricRegistry::new()))
    }

    /// Build state recording into `registry`.
    pub fn with_registry(cfg: MeterConfig, registry: Arc<MetricRegistry>) -> Result<Self> {
        let metrics = Arc::new(ResponseCodeMetrics::new(registry));
        metrics.init(cfg.filter.to_filter_config())?;
        Ok(Self {
            inner: Arc::new(AppStateInner { cfg, metrics }),
        })
    }

    pub fn cfg(&self) -> &MeterConfig {
        &self.inner.cfg
    }

    pub fn metrics(&self) -> Arc<ResponseCodeMetrics> {
        Arc::clone(&self.inner.metrics)
    }

    pub fn registry(&self) -> Arc<MetricRegistry> {
        Arc::clone(self.inner.metrics.registry())
    }

    /// Middleware state for the configured completion mode.
    pub fn meter_state(&self) -> MeterState {
        let server = &self.inner.cfg.server;
        MeterState::new(
            self.metrics(),
            strategy_for(server.completion, server.deferred_timeout()),
        )
    }

    /// Deregister every metric. Safe to call more than once.
    pub fn shutdown(&self) -> usize {
        self.inner.metrics.destroy()
    }
}
