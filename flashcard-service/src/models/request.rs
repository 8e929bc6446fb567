use serde::Deserialize;
use std::fmt;

/// Body of `POST /api/generate`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    /// Topic text, or text extracted from an uploaded document.
    #[serde(default)]
    pub context: String,

    /// Whether `context` is document text rather than a topic.
    #[serde(default)]
    pub is_file: bool,

    /// `"en"` selects English; anything else selects Vietnamese.
    #[serde(default)]
    pub lang: String,

    #[serde(default)]
    pub card_count: Option<i64>,
}

impl GenerationRequest {
    pub fn language(&self) -> Language {
        Language::from_code(&self.lang)
    }

    pub fn card_count(&self) -> CardCount {
        self.card_count.map(CardCount::clamped).unwrap_or_default()
    }
}

/// Output language requested from the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    English,
    Vietnamese,
}

impl Language {
    pub fn from_code(code: &str) -> Self {
        if code == "en" {
            Language::English
        } else {
            Language::Vietnamese
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Vietnamese => "Vietnamese",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Number of cards to ask for, always within `MIN..=MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardCount(u8);

impl CardCount {
    pub const MIN: u8 = 4;
    pub const MAX: u8 = 10;
    pub const DEFAULT: u8 = 5;

    pub fn clamped(requested: i64) -> Self {
        let value = requested.clamp(Self::MIN as i64, Self::MAX as i64);
        Self(value as u8)
    }

    pub fn get(&self) -> u8 {
        self.0
    }
}

impl Default for CardCount {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl fmt::Display for CardCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
