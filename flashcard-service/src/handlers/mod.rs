//! HTTP handlers for the flashcard service.

pub mod generate;
pub mod health;
pub mod metrics;

pub use generate::{generate_flashcards, method_not_allowed, preflight};
pub use health::health_check;
