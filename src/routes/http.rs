// Handlers: version, trigger

use axum::{extract::State, http::StatusCode, response::IntoResponse};

use super::AppState;
use crate::version::{NAME, VERSION};

/// GET /version — returns service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// POST /trigger — runs one season generation pass and maps the outcome to
/// the caller-facing envelope. Failure details carry the full error chain.
pub(super) async fn trigger_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.pipeline.run_season().await {
        Ok(_) => (
            StatusCode::OK,
            axum::Json(serde_json::json!({
                "message": "Challenge generation triggered."
            })),
        ),
        Err(e) => {
            let details = format!("{e:#}");
            tracing::error!(error = %details, "challenge generation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                axum::Json(serde_json::json!({
                    "error": "Failed to trigger challenge generation due to an internal error.",
                    "details": details,
                })),
            )
        }
    }
}
