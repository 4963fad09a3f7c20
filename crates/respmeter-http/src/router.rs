//! Axum router wiring.
//!
//! Admin endpoints are mounted at the paths the recorder was configured
//! with, so admin hit meters and routes can never disagree. The metering
//! layer wraps everything, including the 404 fallback.

use axum::{
    middleware,
    routing::{any, get},
    Router,
};

use respmeter_core::admin::AdminRole;

use crate::{app_state::AppState, middleware::meter_requests, ops};

pub fn build_router(state: AppState) -> Router {
    let filter = state.cfg().filter.to_filter_config();
    Router::new()
        .route(filter.endpoint(AdminRole::Ping), get(ops::ping))
        .route(filter.endpoint(AdminRole::Health), get(ops::healthcheck))
        .route(filter.endpoint(AdminRole::Threads), get(ops::threads))
        .route(filter.endpoint(AdminRole::Metrics), get(ops::metrics))
        .route("/echo/:status", any(ops::echo))
        .route("/slow/:ms", get(ops::slow))
        .layer(middleware::from_fn_with_state(
            state.meter_state(),
            meter_requests,
        ))
        .with_state(state)
}
