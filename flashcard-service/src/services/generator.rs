use crate::config::GenerationSettings;
use crate::error::FlashcardError;
use crate::models::{FlashcardSet, GenerationRequest};
use crate::services::extractor::StructuredExtractor;
use crate::services::metrics;
use crate::services::prompt::{build_prompt, truncate_context};
use crate::services::providers::{FinishReason, TextProvider};
use std::sync::Arc;
use std::time::Instant;

/// Turns a [`GenerationRequest`] into flashcards with one provider call.
pub struct FlashcardGenerator {
    provider: Arc<dyn TextProvider>,
    extractor: Arc<dyn StructuredExtractor>,
    settings: GenerationSettings,
}

impl FlashcardGenerator {
    pub fn new(
        provider: Arc<dyn TextProvider>,
        extractor: Arc<dyn StructuredExtractor>,
        settings: GenerationSettings,
    ) -> Self {
        Self {
            provider,
            extractor,
            settings,
        }
    }

    pub async fn generate(&self, request: &GenerationRequest) -> Result<FlashcardSet, FlashcardError> {
        let context = truncate_context(&request.context, self.settings.max_context_chars);
        if context.len() < request.context.len() {
            tracing::info!(
                original_chars = request.context.chars().count(),
                max_chars = self.settings.max_context_chars,
                "Truncated context"
            );
        }

        let language = request.language();
        let count = request.card_count();
        let prompt = build_prompt(context, request.is_file, language, count);

        let model = self.provider.model();
        let started = Instant::now();
        let response = self.provider.generate(&prompt).await;
        metrics::record_provider_latency(model, started.elapsed().as_secs_f64());
        let response = response?;

        metrics::record_tokens(model, response.input_tokens, response.output_tokens);
        if response.finish_reason == FinishReason::Length {
            tracing::warn!(model = %model, "Provider reply was cut at the token limit");
        }

        let raw = response.text.unwrap_or_default();
        let array = self.extractor.extract(&raw).ok_or_else(|| {
            tracing::warn!(reply_len = raw.len(), "No JSON array in provider reply");
            FlashcardError::OutputFormat
        })?;

        let cards: FlashcardSet = serde_json::from_str(array).map_err(FlashcardError::CardParse)?;

        tracing::info!(
            model = %model,
            requested = count.get(),
            returned = cards.len(),
            language = %language,
            is_file = request.is_file,
            "Generated flashcards"
        );

        Ok(cards)
    }
}
