use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

use respmeter_core::{AsyncListener, InFlight, MetricsListener};
use tokio::task::JoinHandle;

use super::{status_of, CompletionStrategy};

/// Run the handler on a spawned task and observe it through a listener.
///
/// The middleware acts as the host: it waits for the task
/// with a deadline and delivers exactly one of complete, error (the task
/// panicked or was cancelled; answered with 500) or timeout (answered with
/// 503). The status the host answers with is set on the capture before the
/// notification so the response buckets match what the client sees. If the
/// request itself is dropped, the handler task is aborted and the request is
/// accounted once with whatever status the capture holds.
#[derive(Debug, Clone, Copy)]
pub struct Deferred {
    timeout: Duration,
}

impl Deferred {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Aborts the handler task when the request future is dropped.
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

#[async_trait]
impl CompletionStrategy for Deferred {
    async fn drive(&self, in_flight: InFlight, req: Request, next: Next) -> Response {
        let capture = Arc::clone(in_flight.capture());
        let path = in_flight.path().to_owned();
        let listener: Arc<dyn AsyncListener> = Arc::new(MetricsListener::new(in_flight));
        listener.on_start_async();

        let task_capture = Arc::clone(&capture);
        let mut task = AbortOnDrop(tokio::spawn(async move {
            let response = next.run(req).await;
            task_capture.set_status(status_of(&response));
            response
        }));

        match tokio::time::timeout(self.timeout, &mut task.0).await {
            Ok(Ok(response)) => {
                listener.on_complete();
                response
            }
            Ok(Err(err)) => {
                tracing::warn!(%path, error = %err, "deferred handler failed");
                capture.set_status(i32::from(StatusCode::INTERNAL_SERVER_ERROR.as_u16()));
                listener.on_error(&err);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
            Err(_) => {
                task.0.abort();
                tracing::warn!(
                    %path,
                    timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
                    "deferred handler timed out"
                );
                capture.set_status(i32::from(StatusCode::SERVICE_UNAVAILABLE.as_u16()));
                listener.on_timeout();
                StatusCode::SERVICE_UNAVAILABLE.into_response()
            }
        }
    }
}
