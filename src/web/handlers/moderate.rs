// Moderation handlers.
//
// POST /api/v1/moderate       : { "content": "..." }
// POST /api/v1/moderate/batch : { "contents": ["...", ...] }
//
// Both return 422 when the input is out of bounds. A rejected text is still
// a 200 with `is_approved: false`.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::decision::ModerationStatus;
use crate::moderation::ModerationReport;
use crate::sentiment::SentimentScores;
use crate::web::{api_error, validate_content, AppState, MAX_BATCH_ITEMS};

#[derive(Deserialize)]
pub struct ModerationRequest {
    pub content: String,
}

#[derive(Deserialize)]
pub struct BatchModerationRequest {
    pub contents: Vec<String>,
}

#[derive(Serialize)]
pub struct ModerationResponse {
    pub status: ModerationStatus,
    pub is_approved: bool,
    pub confidence_score: f64,
    pub sentiment_scores: Option<SentimentScores>,
    pub negative_words: Vec<String>,
    pub rejection_reasons: Vec<String>,
    pub processing_time_ms: f64,
}

impl From<ModerationReport> for ModerationResponse {
    fn from(report: ModerationReport) -> Self {
        Self {
            status: report.verdict.status(),
            is_approved: report.verdict.approved,
            confidence_score: report.verdict.confidence_score,
            sentiment_scores: report.sentiment,
            negative_words: report.negative_words,
            rejection_reasons: report.verdict.rejection_reasons,
            processing_time_ms: report.processing_time_ms,
        }
    }
}

#[derive(Serialize)]
pub struct BatchModerationResponse {
    pub results: Vec<ModerationResponse>,
    pub total_count: usize,
    pub approved_count: usize,
    pub rejected_count: usize,
    pub total_processing_time_ms: f64,
}

/// POST /api/v1/moderate: moderate a single text.
pub async fn moderate(
    State(state): State<AppState>,
    Json(request): Json<ModerationRequest>,
) -> Response {
    if let Err(message) = validate_content(&request.content) {
        return api_error(StatusCode::UNPROCESSABLE_ENTITY, "ValidationError", &message);
    }

    let report = state.service.moderate_detailed(&request.content).await;
    Json(ModerationResponse::from(report)).into_response()
}

/// POST /api/v1/moderate/batch: moderate several texts, results in input order.
pub async fn moderate_batch(
    State(state): State<AppState>,
    Json(request): Json<BatchModerationRequest>,
) -> Response {
    if request.contents.is_empty() || request.contents.len() > MAX_BATCH_ITEMS {
        return api_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "ValidationError",
            &format!(
                "contents must hold between 1 and {MAX_BATCH_ITEMS} items, got {}",
                request.contents.len()
            ),
        );
    }
    for (i, content) in request.contents.iter().enumerate() {
        if let Err(message) = validate_content(content) {
            return api_error(
                StatusCode::UNPROCESSABLE_ENTITY,
                "ValidationError",
                &format!("contents[{i}]: {message}"),
            );
        }
    }

    let batch = state.service.moderate_batch(&request.contents).await;
    Json(BatchModerationResponse {
        total_count: batch.total_count,
        approved_count: batch.approved_count,
        rejected_count: batch.rejected_count,
        total_processing_time_ms: batch.total_processing_time_ms,
        results: batch.results.into_iter().map(Into::into).collect(),
    })
    .into_response()
}
