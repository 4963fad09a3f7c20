//! respmeter demo server.
//!
//! - Loads `respmeter.yaml` (or the path given as the first argument)
//! - Meters every request through the configured completion mode
//! - Serves the admin endpoints and a couple of demo routes
//! - Deregisters metrics on Ctrl-C

use tracing_subscriber::{fmt, EnvFilter};

use respmeter_http::{app_state, config, router};

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "respmeter.yaml".to_string());
    let cfg = config::load_from_file(&path).expect("config load failed");
    let listen = cfg
        .server
        .listen_addr()
        .expect("server.listen must be a valid SocketAddr");
    let completion = cfg.server.completion;

    let state = app_state::AppState::new(cfg).expect("metrics init failed");
    let app = router::build_router(state.clone());

    tracing::info!(%listen, ?completion, "respmeter starting");
    let listener = tokio::net::TcpListener::bind(listen).await.expect("failed to bind");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "ctrl-c handler failed");
            }
        })
        .await
        .expect("server failed");

    let removed = state.shutdown();
    tracing::info!(removed, "respmeter stopped");
}
