// GET /api/v1/status: classifier readiness, thresholds and lexicon size.
// GET /api/v1/health: liveness only; always 200.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;

use crate::web::AppState;

pub async fn get_status(State(state): State<AppState>) -> impl IntoResponse {
    let status = state.service.status().await;
    let health = if status.classifier_ready {
        "healthy"
    } else {
        "unhealthy"
    };

    Json(serde_json::json!({
        "status": health,
        "classifier_ready": status.classifier_ready,
        "sentiment_approval_threshold": status.thresholds.sentiment_approval_threshold,
        "confidence_threshold": status.thresholds.confidence_threshold,
        "lexicon_size": status.lexicon_size,
        "device": status.compute_device,
    }))
}

pub async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "healthy",
            "message": "Sanctuary review API is running",
            "timestamp": Utc::now().to_rfc3339(),
        })),
    )
}
