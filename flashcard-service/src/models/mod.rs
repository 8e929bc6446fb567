//! Domain models for the flashcard service.

pub mod flashcard;
pub mod request;

pub use flashcard::{Flashcard, FlashcardSet};
pub use request::{CardCount, GenerationRequest, Language};
