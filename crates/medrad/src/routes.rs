//! API routes for medrad

use crate::server::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use medra_common::AnalysisResult;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

type AppStateArc = Arc<AppState>;

/// Success/error envelope consumed by the dashboard frontend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

// ============================================================================
// Bias Analysis Routes
// ============================================================================

pub fn bias_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/api/bias-analysis", get(bias_analysis))
        .route("/api/bias-analysis/invalidate", post(invalidate_analysis))
}

/// Full bias & coverage analysis as JSON. Cached after the first call; the
/// simulation only reruns after an explicit invalidation.
async fn bias_analysis(
    State(state): State<AppStateArc>,
) -> Result<Json<ApiResponse<AnalysisResult>>, (StatusCode, Json<ApiResponse<AnalysisResult>>)> {
    match state.analyzer.run_full_analysis() {
        Ok(result) => Ok(Json(ApiResponse::ok((*result).clone()))),
        Err(e) => {
            let message = e.to_string();
            error!("Bias analysis failed: {:#}", anyhow::Error::from(e));
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::err(message)),
            ))
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvalidateResponse {
    pub success: bool,
}

async fn invalidate_analysis(State(state): State<AppStateArc>) -> Json<InvalidateResponse> {
    state.analyzer.invalidate();
    info!("  Analysis cache invalidated");
    Json(InvalidateResponse { success: true })
}

// ============================================================================
// Health Routes
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub diseases: usize,
    pub checked_at: String,
}

pub fn health_routes() -> Router<AppStateArc> {
    Router::new().route("/v1/health", get(health_check))
}

async fn health_check(State(state): State<AppStateArc>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        diseases: state.analyzer.knowledge().len(),
        checked_at: chrono::Utc::now().to_rfc3339(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_omits_error_field() {
        let response = ApiResponse::ok(vec![1, 2, 3]);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"], serde_json::json!([1, 2, 3]));
        assert!(json.get("error").is_none());
    }

    #[test]
    fn error_envelope_omits_data_field() {
        let response: ApiResponse<()> = ApiResponse::err("it broke");
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "it broke");
        assert!(json.get("data").is_none());
    }
}
