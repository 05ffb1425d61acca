use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer, ExposeHeaders},
    trace::TraceLayer,
};

pub mod error;
pub mod handlers;
pub mod state;
pub mod telemetry;

pub use state::AppState;

/// Builds the API router over the shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any())
        .expose_headers(ExposeHeaders::any());

    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/summary", get(handlers::get_summary))
        .route("/api/series", get(handlers::get_series))
        .route("/api/betas", get(handlers::get_betas))
        .route("/api/betas/:beta", get(handlers::get_beta_series))
        .route("/api/correlations", get(handlers::get_correlations))
        .route("/api/reload", post(handlers::reload))
        .with_state(state)
        .layer(cors)
        // Logs every incoming request.
        .layer(TraceLayer::new_for_http())
}

/// Serves the API until the process is stopped.
///
/// Tracing must already be initialized by the caller. An initial load is
/// attempted; if it fails the server still starts and reports 404 until a
/// successful `POST /api/reload`.
pub async fn run_server(addr: SocketAddr, state: Arc<AppState>) -> anyhow::Result<()> {
    let initial = Arc::clone(&state);
    match tokio::task::spawn_blocking(move || initial.reload()).await? {
        Ok(report) => tracing::info!(rows = report.summary.rows, "Initial analysis loaded."),
        Err(err) => tracing::warn!(error = %err, "No initial analysis; serving 404 until reload."),
    }

    let app = router(state);

    tracing::info!("Web server listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
