use std::sync::Arc;

use crate::capture::StatusCapture;
use crate::classify::RequestMethod;
use crate::metric::TimerContext;

use super::Instruments;

/// A request whose timer is running.
///
/// Completion consumes it. If it is dropped without being finished (the
/// handler panicked, or its future was cancelled) the drop runs the same
/// completion using whatever status the capture holds.
pub struct InFlight {
    instruments: Arc<Instruments>,
    timer: Option<TimerContext>,
    method: RequestMethod,
    path: String,
    capture: Arc<StatusCapture>,
}

impl InFlight {
    pub(crate) fn start(
        instruments: Arc<Instruments>,
        method: RequestMethod,
        path: String,
        capture: Arc<StatusCapture>,
    ) -> Self {
        let timer = instruments.timer(method).time();
        Self {
            instruments,
            timer: Some(timer),
            method,
            path,
            capture,
        }
    }

    pub fn method(&self) -> RequestMethod {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn capture(&self) -> &Arc<StatusCapture> {
        &self.capture
    }

    /// Complete with the status currently held by the capture.
    pub fn finish(mut self) {
        self.complete();
    }

    /// Record `status` on the capture, then complete.
    pub fn finish_with(self, status: i32) {
        self.capture.set_status(status);
        self.finish();
    }

    fn complete(&mut self) {
        if let Some(timer) = self.timer.take() {
            self.instruments
                .complete(timer, self.capture.captured_status(), &self.path);
        }
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if self.timer.is_some() {
            tracing::debug!(
                method = ?self.method,
                path = %self.path,
                "request left unfinished; accounting with captured status"
            );
            self.complete();
        }
    }
}
