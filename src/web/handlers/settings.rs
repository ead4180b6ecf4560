// PUT /api/v1/settings/thresholds: partial threshold update.
//
// Omitted fields keep their value. Out-of-range values and unknown field
// names return 422 and change nothing.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::moderation::ThresholdUpdate;
use crate::web::{api_error, AppState};

pub async fn update_thresholds(
    State(state): State<AppState>,
    payload: Result<Json<ThresholdUpdate>, JsonRejection>,
) -> Response {
    let update = match payload {
        Ok(Json(update)) => update,
        Err(rejection) => {
            return api_error(rejection.status(), "ValidationError", &rejection.body_text())
        }
    };

    match state.service.update_thresholds(update).await {
        Ok(current) => Json(serde_json::json!({
            "message": "Thresholds updated",
            "current_settings": current,
        }))
        .into_response(),
        Err(e) => api_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "ValidationError",
            &e.to_string(),
        ),
    }
}
