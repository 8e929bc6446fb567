use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::str::FromStr;

/// Default Gemini model for flashcard generation.
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";

/// Gemini REST endpoint.
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Bounds for the context truncation limit, in characters.
pub const MIN_CONTEXT_CHARS: usize = 25_000;
pub const MAX_CONTEXT_CHARS: usize = 30_000;

/// Largest request body read by the generate handler.
pub const DEFAULT_MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone)]
pub struct FlashcardConfig {
    pub common: core_config::Config,
    pub gemini: GeminiSettings,
    pub generation: GenerationSettings,
    pub observability: ObservabilitySettings,
}

#[derive(Debug, Clone)]
pub struct GeminiSettings {
    /// Absent keys are reported per request, not at startup.
    pub api_key: Option<Secret<String>>,
    pub model: String,
    pub api_base: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub max_context_chars: usize,
    pub max_body_bytes: usize,
    pub extractor: ExtractorKind,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            max_context_chars: MIN_CONTEXT_CHARS,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            extractor: ExtractorKind::Balanced,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ObservabilitySettings {
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
}

/// Strategy used to pull a JSON array out of the model's reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractorKind {
    Balanced,
    Lazy,
}

impl FromStr for ExtractorKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "balanced" => Ok(ExtractorKind::Balanced),
            "lazy" => Ok(ExtractorKind::Lazy),
            other => Err(AppError::ConfigError(anyhow::anyhow!(
                "unknown extractor '{}', expected 'balanced' or 'lazy'",
                other
            ))),
        }
    }
}

impl FlashcardConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        let api_key = env::var("GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .map(Secret::new);

        Ok(FlashcardConfig {
            common: common_config,
            gemini: GeminiSettings {
                api_key,
                model: get_env("GENAI_TEXT_MODEL", Some(DEFAULT_TEXT_MODEL), is_prod)?,
                api_base: get_env("GEMINI_API_BASE", Some(DEFAULT_GEMINI_API_BASE), is_prod)?,
                timeout_secs: parse_setting(
                    "GEMINI_TIMEOUT_SECS",
                    &get_env(
                        "GEMINI_TIMEOUT_SECS",
                        Some(&DEFAULT_TIMEOUT_SECS.to_string()),
                        is_prod,
                    )?,
                )?,
            },
            generation: GenerationSettings {
                max_context_chars: clamp_context_chars(parse_setting(
                    "GENERATION_MAX_CONTEXT_CHARS",
                    &get_env(
                        "GENERATION_MAX_CONTEXT_CHARS",
                        Some(&MIN_CONTEXT_CHARS.to_string()),
                        is_prod,
                    )?,
                )?),
                max_body_bytes: parse_setting(
                    "GENERATION_MAX_BODY_BYTES",
                    &get_env(
                        "GENERATION_MAX_BODY_BYTES",
                        Some(&DEFAULT_MAX_BODY_BYTES.to_string()),
                        is_prod,
                    )?,
                )?,
                extractor: get_env("GENERATION_EXTRACTOR", Some("balanced"), is_prod)?.parse()?,
            },
            observability: ObservabilitySettings {
                log_level: get_env("LOG_LEVEL", Some("info"), is_prod)?,
                otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|e| !e.is_empty()),
            },
        })
    }
}

pub fn clamp_context_chars(value: usize) -> usize {
    value.clamp(MIN_CONTEXT_CHARS, MAX_CONTEXT_CHARS)
}

fn parse_setting<T>(key: &str, raw: &str) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| {
        AppError::ConfigError(anyhow::anyhow!("{} has invalid value '{}': {}", key, raw, e))
    })
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod && default.is_none() {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
