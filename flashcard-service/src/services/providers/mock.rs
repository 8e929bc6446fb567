//! Scripted provider for tests.

use super::{ProviderError, ProviderResponse, TextProvider};
use async_trait::async_trait;
use std::sync::Mutex;

enum Script {
    Reply(String),
    Fail(fn() -> ProviderError),
    FailWith(String),
}

/// Replies with a fixed text (or error) and remembers every prompt it saw.
pub struct ScriptedTextProvider {
    script: Script,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedTextProvider {
    /// Always answer with `text`.
    pub fn replying(text: impl Into<String>) -> Self {
        Self::with_script(Script::Reply(text.into()))
    }

    /// Always fail with an API error carrying `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_script(Script::FailWith(message.into()))
    }

    /// Always fail with the error built by `make_error`.
    pub fn failing_with(make_error: fn() -> ProviderError) -> Self {
        Self::with_script(Script::Fail(make_error))
    }

    fn with_script(script: Script) -> Self {
        Self {
            script,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts().pop()
    }
}

#[async_trait]
impl TextProvider for ScriptedTextProvider {
    async fn generate(&self, prompt: &str) -> Result<ProviderResponse, ProviderError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        match &self.script {
            Script::Reply(text) => Ok(ProviderResponse {
                input_tokens: prompt.len() as i32 / 4,
                output_tokens: text.len() as i32 / 4,
                ..ProviderResponse::from_text(text.clone())
            }),
            Script::Fail(make_error) => Err(make_error()),
            Script::FailWith(message) => Err(ProviderError::ApiError(message.clone())),
        }
    }

    fn model(&self) -> &str {
        "scripted"
    }
}
