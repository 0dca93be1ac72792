use analytics::InsightGenerator;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use configuration::Settings;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer, ExposeHeaders},
    trace::TraceLayer,
};

pub mod error;
pub mod handlers;

/// The shared application state that all handlers can access.
#[derive(Debug, Clone)]
pub struct AppState {
    pub settings: Settings,
}

impl AppState {
    /// An insight generator using the configured detection and prediction defaults.
    pub fn generator(&self) -> InsightGenerator {
        InsightGenerator::with_options(
            self.settings.detection.clone(),
            self.settings.prediction.clone(),
        )
    }
}

/// Builds the application router over the given settings.
pub fn router(settings: Settings) -> Router {
    let app_state = Arc::new(AppState { settings });
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any())
        .expose_headers(ExposeHeaders::any());

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/stats", post(handlers::stats))
        .route("/api/anomalies", post(handlers::anomalies))
        .route("/api/trend", post(handlers::trend))
        .route("/api/predictions", post(handlers::predictions))
        .route("/api/insights", post(handlers::insights))
        .route("/api/summary", post(handlers::summary))
        .with_state(app_state)
        .layer(cors)
        // Logs every incoming request.
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(1024 * 1024 * 10))
}

/// The main function to configure and run the web server.
///
/// Tracing is expected to be initialised by the caller.
pub async fn run_server(addr: SocketAddr, settings: Settings) -> anyhow::Result<()> {
    let app = router(settings);

    tracing::info!("Web server started and listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
