use async_trait::async_trait;
use axum::{extract::Request, middleware::Next, response::Response};

use respmeter_core::InFlight;

use super::{status_of, CompletionStrategy};

/// Await the handler on the request's own task.
///
/// If the handler panics, or the request future is dropped mid-flight, the
/// unfinished `InFlight` is accounted as it drops and the panic continues
/// unwinding untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct Inline;

#[async_trait]
impl CompletionStrategy for Inline {
    async fn drive(&self, in_flight: InFlight, req: Request, next: Next) -> Response {
        let response = next.run(req).await;
        in_flight.finish_with(status_of(&response));
        response
    }
}
