use std::fmt;
use std::sync::{Mutex, PoisonError};

use super::InFlight;

/// Notifications a host delivers for a request whose completion is deferred.
///
/// Exactly one of `on_complete`, `on_error` or `on_timeout` is expected per
/// request, possibly from a different thread than the one that registered
/// the listener.
pub trait AsyncListener: Send + Sync {
    fn on_start_async(&self) {}
    fn on_complete(&self);
    fn on_error(&self, cause: &dyn fmt::Display);
    fn on_timeout(&self);
}

/// Listener bound to one in-flight request.
///
/// All three notifications run the same completion; whichever arrives first
/// wins and later ones are no-ops.
pub struct MetricsListener {
    in_flight: Mutex<Option<InFlight>>,
}

impl MetricsListener {
    pub fn new(in_flight: InFlight) -> Self {
        Self {
            in_flight: Mutex::new(Some(in_flight)),
        }
    }

    /// Whether completion has already run.
    pub fn is_done(&self) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    fn complete(&self) {
        let taken = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(in_flight) = taken {
            in_flight.finish();
        }
    }
}

impl AsyncListener for MetricsListener {
    fn on_complete(&self) {
        self.complete();
    }

    fn on_error(&self, _cause: &dyn fmt::Display) {
        self.complete();
    }

    fn on_timeout(&self) {
        self.complete();
    }
}
