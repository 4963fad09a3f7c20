//! The response-code recorder: lifecycle plus per-request accounting.
//!
//! `ResponseCodeMetrics` owns an explicit registry and, once initialized, an
//! immutable `Instruments` set. A request moves through
//! `Started -> InFlight -> Completing -> Done`:
//!
//! - `begin` classifies the method and starts its timer, yielding an
//!   [`InFlight`] (Started -> InFlight),
//! - `InFlight::finish` (or dropping it unfinished) stops the timer, buckets
//!   the captured status and runs the admin matcher (Completing -> Done).
//!
//! `InFlight` is consumed by completion, so accounting happens exactly once
//! no matter which path (inline return, panic, listener notification,
//! cancellation) gets there first.

mod in_flight;
mod instruments;
mod listener;

use std::sync::{Arc, PoisonError, RwLock};

use crate::capture::StatusCapture;
use crate::classify::RequestMethod;
use crate::config::FilterConfig;
use crate::error::{RespMeterError, Result};
use crate::metric::MetricRegistry;

pub use in_flight::InFlight;
pub use instruments::Instruments;
pub use listener::{AsyncListener, MetricsListener};

/// Default monitoring group: this module's path.
pub const DEFAULT_GROUP_NAME: &str = module_path!();
/// Default monitoring type: the recorder's type name.
pub const DEFAULT_TYPE_NAME: &str = "ResponseCodeMetrics";

pub struct ResponseCodeMetrics {
    registry: Arc<MetricRegistry>,
    // Write-locked only by init/destroy; the request path takes a read lock
    // long enough to clone the Arc.
    state: RwLock<Option<Arc<Instruments>>>,
}

impl ResponseCodeMetrics {
    pub fn new(registry: Arc<MetricRegistry>) -> Self {
        Self {
            registry,
            state: RwLock::new(None),
        }
    }

    pub fn registry(&self) -> &Arc<MetricRegistry> {
        &self.registry
    }

    /// Register every metric for `cfg`. Must complete before requests are
    /// metered; a second call without `destroy` is rejected.
    pub fn init(&self, cfg: FilterConfig) -> Result<()> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.is_some() {
            return Err(RespMeterError::AlreadyInitialized);
        }
        if let Err(e) = cfg.validate() {
            tracing::warn!(error = %e, "rejecting response-code metrics config");
            return Err(e);
        }

        let instruments = Instruments::register(&self.registry, cfg)?;
        tracing::info!(
            group = %instruments.config().group_name(),
            type_name = %instruments.config().type_name(),
            instance = %instruments.config().filter_instance_name(),
            metrics = instruments.names().len(),
            "response-code metrics initialized"
        );
        *state = Some(Arc::new(instruments));
        Ok(())
    }

    /// Deregister everything `init` created. Returns how many names were
    /// removed; zero when not initialized.
    pub fn destroy(&self) -> usize {
        let taken = self
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(instruments) = taken else {
            return 0;
        };
        let removed = instruments
            .names()
            .iter()
            .filter(|name| self.registry.remove(name))
            .count();
        tracing::info!(
            instance = %instruments.config().filter_instance_name(),
            removed,
            "response-code metrics destroyed"
        );
        removed
    }

    pub fn is_initialized(&self) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Current instrument set, if initialized.
    pub fn instruments(&self) -> Option<Arc<Instruments>> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Start accounting for one request. `None` when not initialized; the
    /// caller should then pass the request through unmetered.
    pub fn begin(
        &self,
        method: &str,
        path: impl Into<String>,
        capture: Arc<StatusCapture>,
    ) -> Option<InFlight> {
        let Some(instruments) = self.instruments() else {
            tracing::debug!(method, "response-code metrics not initialized; request unmetered");
            return None;
        };
        Some(InFlight::start(
            instruments,
            RequestMethod::classify(method),
            path.into(),
            capture,
        ))
    }
}
