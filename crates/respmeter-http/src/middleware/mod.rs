//! Request interception middleware.
//!
//! `meter_requests` is mounted with `axum::middleware::from_fn_with_state`.
//! It starts accounting for every request, hands the request's
//! `StatusCapture` to downstream handlers through the request extensions,
//! and lets the configured [`CompletionStrategy`] decide how completion is
//! observed. Both strategies end in `InFlight` completion, so the metrics
//! they produce are identical.

mod deferred;
mod inline;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use respmeter_core::{InFlight, ResponseCodeMetrics, StatusCapture};

use crate::config::CompletionMode;

pub use deferred::Deferred;
pub use inline::Inline;

/// How completion of a metered request is observed.
#[async_trait]
pub trait CompletionStrategy: Send + Sync {
    async fn drive(&self, in_flight: InFlight, req: Request, next: Next) -> Response;
}

/// Build the strategy for a configured mode.
pub fn strategy_for(mode: CompletionMode, deferred_timeout: Duration) -> Arc<dyn CompletionStrategy> {
    match mode {
        CompletionMode::Inline => Arc::new(Inline),
        CompletionMode::Deferred => Arc::new(Deferred::new(deferred_timeout)),
    }
}

/// State for the interception middleware.
#[derive(Clone)]
pub struct MeterState {
    metrics: Arc<ResponseCodeMetrics>,
    strategy: Arc<dyn CompletionStrategy>,
}

impl MeterState {
    pub fn new(metrics: Arc<ResponseCodeMetrics>, strategy: Arc<dyn CompletionStrategy>) -> Self {
        Self { metrics, strategy }
    }
}

pub async fn meter_requests(State(state): State<MeterState>, mut req: Request, next: Next) -> Response {
    let capture = Arc::new(StatusCapture::new());
    let path = req.uri().path().to_owned();
    let Some(in_flight) = state
        .metrics
        .begin(req.method().as_str(), path, Arc::clone(&capture))
    else {
        return next.run(req).await;
    };
    req.extensions_mut().insert(capture);
    state.strategy.drive(in_flight, req, next).await
}

pub(crate) fn status_of(response: &Response) -> i32 {
    i32::from(response.status().as_u16())
}
