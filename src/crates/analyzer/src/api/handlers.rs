//! API request handlers.

use crate::api::error::ApiResult;
use crate::api::models::{AnalyzeRequest, AnalyzeResponse, HealthResponse, ServiceInfo};
use crate::api::routes::AppState;
use axum::{extract::State, Json};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

/// POST /api/v1/analyze
///
/// Validates the request, runs the pipeline, and returns the result
/// envelope. Pipeline failures are part of the envelope, not HTTP
/// errors; only malformed requests are rejected with an error status.
pub async fn analyze(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeRequest>,
) -> ApiResult<Json<AnalyzeResponse>> {
    let request = body.into_analysis_request()?;
    let request_id = Uuid::new_v4();

    let result = state
        .pipeline
        .run(&request)
        .instrument(info_span!("analysis", %request_id))
        .await;

    info!(%request_id, status = ?result.status, "Analysis request finished");

    Ok(Json(result.into()))
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /
pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        name: "repolens-analyzer".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        endpoints: vec![
            "POST /api/v1/analyze".to_string(),
            "GET /health".to_string(),
        ],
    })
}
