//! HTTP server for medrad

use crate::routes;
use anyhow::Result;
use axum::Router;
use medra_common::BiasAnalyzer;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Application state shared across handlers
pub struct AppState {
    pub analyzer: BiasAnalyzer,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(analyzer: BiasAnalyzer) -> Self {
        Self {
            analyzer,
            start_time: Instant::now(),
        }
    }
}

/// Run the HTTP server
pub async fn run(state: AppState, bind: &str) -> Result<()> {
    let state = Arc::new(state);

    let app = Router::new()
        .merge(routes::bias_routes())
        .merge(routes::health_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(bind).await?;
    info!("  Listening on http://{}", bind);

    axum::serve(listener, app).await?;
    Ok(())
}
