//! Flashcard generation over a generative text API.
//!
//! `POST /api/generate` turns a topic or document text into a JSON array of
//! `{front, back}` cards by prompting a [`TextProvider`] and pulling the array
//! out of its free-text reply.
//!
//! [`TextProvider`]: services::providers::TextProvider

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;

pub use error::FlashcardError;
pub use startup::{build_router, AppState, Application};
