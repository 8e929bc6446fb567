use serde::{Deserialize, Serialize};

/// A single question/answer pair produced by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    pub front: String,
    pub back: String,
}

/// Cards in the order the model returned them.
pub type FlashcardSet = Vec<Flashcard>;
