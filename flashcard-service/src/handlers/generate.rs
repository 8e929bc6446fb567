use crate::error::FlashcardError;
use crate::models::GenerationRequest;
use crate::services::metrics;
use crate::services::FlashcardGenerator;
use crate::startup::AppState;
use axum::{body::Body, extract::State, http::StatusCode, response::IntoResponse, Json};

/// `OPTIONS /api/generate`: CORS preflight. Needs no configuration.
pub async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// Any method other than POST and OPTIONS.
pub async fn method_not_allowed() -> FlashcardError {
    FlashcardError::MethodNotAllowed
}

/// `POST /api/generate`.
///
/// The credential is checked before the body is read, so a missing key is
/// reported the same way whatever the payload. The body is buffered here up to
/// `max_body_bytes` rather than by an extractor, so an oversized upload still
/// gets a JSON error.
pub async fn generate_flashcards(
    State(state): State<AppState>,
    body: Body,
) -> Result<impl IntoResponse, FlashcardError> {
    let result = run(&state, body).await;

    match &result {
        Ok(cards) => {
            metrics::record_request("ok");
            metrics::record_cards(cards.len());
        }
        Err(e) => {
            metrics::record_request(e.kind());
            tracing::error!(error = %e, kind = e.kind(), "Flashcard generation failed");
        }
    }

    result.map(Json)
}

async fn run(state: &AppState, body: Body) -> Result<crate::models::FlashcardSet, FlashcardError> {
    let provider = state
        .text_provider
        .clone()
        .ok_or(FlashcardError::MissingApiKey)?;

    let body = axum::body::to_bytes(body, state.generation.max_body_bytes)
        .await
        .map_err(FlashcardError::BodyRead)?;

    let request: GenerationRequest =
        serde_json::from_slice(&body).map_err(FlashcardError::InvalidBody)?;

    let generator = FlashcardGenerator::new(
        provider,
        state.extractor.clone(),
        state.generation.clone(),
    );

    generator.generate(&request).await
}
