pub mod extractor;
pub mod generator;
pub mod metrics;
pub mod prompt;
pub mod providers;

pub use extractor::{BalancedArrayExtractor, LazyBracketExtractor, StructuredExtractor};
pub use generator::FlashcardGenerator;
