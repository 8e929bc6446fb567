use crate::startup::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

/// Liveness probe. Reports whether a provider credential is configured
/// without failing on its absence.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "flashcard-service",
        "version": env!("CARGO_PKG_VERSION"),
        "provider_configured": state.text_provider.is_some(),
    }))
}
