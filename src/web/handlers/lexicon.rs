// Lexicon handlers.
//
// GET  /api/v1/lexicon : every registered term
// POST /api/v1/lexicon : { "terms": ["...", ...] } adds terms at runtime
//
// Additions apply to every request that starts after the response.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::web::{api_error, AppState, MAX_BATCH_ITEMS};

#[derive(Deserialize)]
pub struct AddTermsRequest {
    pub terms: Vec<String>,
}

pub async fn list_terms(State(state): State<AppState>) -> Response {
    let terms = state.service.lexicon_terms().await;
    Json(serde_json::json!({
        "count": terms.len(),
        "terms": terms,
    }))
    .into_response()
}

pub async fn add_terms(
    State(state): State<AppState>,
    Json(request): Json<AddTermsRequest>,
) -> Response {
    if request.terms.is_empty() || request.terms.len() > MAX_BATCH_ITEMS {
        return api_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "ValidationError",
            &format!("terms must hold 1 to {MAX_BATCH_ITEMS} entries"),
        );
    }
    if request.terms.iter().any(|t| t.trim().is_empty()) {
        return api_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "ValidationError",
            "terms must not be blank",
        );
    }

    let mut added = Vec::new();
    for term in &request.terms {
        if state.service.add_term(term).await {
            added.push(term.trim().to_string());
        }
    }
    let count = state.service.status().await.lexicon_size;

    Json(serde_json::json!({
        "added": added,
        "count": count,
    }))
    .into_response()
}
