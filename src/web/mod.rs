// Web server: Axum JSON API in front of the moderation service.
//
// Routes live under /api/v1. Request validation (text length, batch size)
// happens here so the service only ever sees bounded input. A rejected text
// is a normal 200 response carrying a verdict; only faults in the service
// itself surface as error statuses. A panicking handler becomes a 500 with
// the usual `{error, message}` body.

use std::any::Any;
use std::sync::Arc;

use anyhow::Result;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::moderation::ModerationService;

pub mod handlers;

/// Longest accepted submission, in characters.
pub const MAX_CONTENT_CHARS: usize = 1000;
/// Most texts accepted in one batch request.
pub const MAX_BATCH_ITEMS: usize = 100;

/// Shared application state threaded through all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ModerationService>,
}

/// Start the Axum web server and block until it exits.
pub async fn run_server(service: Arc<ModerationService>, port: u16, bind: &str) -> Result<()> {
    let app = build_router(AppState { service });

    let addr = format!("{bind}:{port}");
    info!("Sanctuary review API listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/api/v1/moderate", post(handlers::moderate::moderate))
        .route(
            "/api/v1/moderate/batch",
            post(handlers::moderate::moderate_batch),
        )
        .route("/api/v1/status", get(handlers::status::get_status))
        .route(
            "/api/v1/settings/thresholds",
            put(handlers::settings::update_thresholds),
        )
        .route(
            "/api/v1/lexicon",
            get(handlers::lexicon::list_terms).post(handlers::lexicon::add_terms),
        )
        .route("/api/v1/health", get(handlers::status::health));

    Router::new()
        .merge(api)
        .route("/", get(root))
        .layer(
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::PUT,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        )
        .layer(CatchPanicLayer::custom(internal_error))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "message": "Sanctuary review API",
        "version": env!("CARGO_PKG_VERSION"),
        "health": "/api/v1/health",
    }))
}

/// Typed JSON error response helper.
pub fn api_error(status: StatusCode, error: &str, message: &str) -> Response {
    (
        status,
        axum::Json(serde_json::json!({ "error": error, "message": message })),
    )
        .into_response()
}

/// Response for a handler that panicked.
fn internal_error(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        *s
    } else {
        "unknown panic"
    };
    error!(panic = detail, "Request handler panicked");
    api_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "InternalServerError",
        "An internal error occurred",
    )
}

/// Check one submission against the length bounds.
pub fn validate_content(content: &str) -> Result<(), String> {
    let chars = content.chars().count();
    if chars == 0 {
        return Err("content must not be empty".to_string());
    }
    if chars > MAX_CONTENT_CHARS {
        return Err(format!(
            "content is {chars} characters; the limit is {MAX_CONTENT_CHARS}"
        ));
    }
    Ok(())
}
