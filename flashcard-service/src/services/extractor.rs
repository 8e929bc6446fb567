//! Best-effort extraction of a JSON array from free-text model output.
//!
//! Models asked for "a bare JSON array" still wrap it in code fences, prepend
//! an introduction or append commentary. Extractors locate the array text;
//! parsing it into cards is left to the caller.

use crate::config::ExtractorKind;
use regex::Regex;
use std::sync::{Arc, OnceLock};

pub trait StructuredExtractor: Send + Sync {
    /// Return the slice of `raw` that most likely holds the JSON array.
    fn extract<'a>(&self, raw: &'a str) -> Option<&'a str>;
}

/// Build the extractor selected in configuration.
pub fn extractor_for(kind: ExtractorKind) -> Arc<dyn StructuredExtractor> {
    match kind {
        ExtractorKind::Balanced => Arc::new(BalancedArrayExtractor),
        ExtractorKind::Lazy => Arc::new(LazyBracketExtractor),
    }
}

/// First match of `\[[\s\S]*?\]`: shortest text between a `[` and the next `]`.
///
/// Breaks on arrays whose strings contain `]`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LazyBracketExtractor;

fn lazy_array_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\[[\s\S]*?\]").expect("static regex is valid"))
}

impl StructuredExtractor for LazyBracketExtractor {
    fn extract<'a>(&self, raw: &'a str) -> Option<&'a str> {
        lazy_array_pattern().find(raw).map(|m| m.as_str())
    }
}

/// Bracket matcher aware of JSON strings and escapes.
///
/// One left-to-right pass. Outside a candidate only `[` matters; inside one,
/// string and escape state is tracked so brackets in card text are ignored.
/// Each top-level balanced candidate is checked in turn: the first that is an
/// array of objects (or empty) wins, otherwise the first candidate is returned
/// so the caller reports its parse error. A candidate that never closes ends
/// the scan, so a reply cut off mid-array yields `None` unless an earlier
/// candidate balanced.
#[derive(Debug, Default, Clone, Copy)]
pub struct BalancedArrayExtractor;

impl BalancedArrayExtractor {
    fn is_card_shaped(candidate: &str) -> bool {
        match serde_json::from_str::<serde_json::Value>(candidate) {
            Ok(serde_json::Value::Array(items)) => items.iter().all(serde_json::Value::is_object),
            _ => false,
        }
    }
}

impl StructuredExtractor for BalancedArrayExtractor {
    fn extract<'a>(&self, raw: &'a str) -> Option<&'a str> {
        let mut first_balanced = None;
        let mut start = 0usize;
        let mut depth = 0usize;
        let mut in_string = false;
        let mut escaped = false;

        for (index, ch) in raw.char_indices() {
            if in_string {
                if escaped {
                    escaped = false;
                } else if ch == '\\' {
                    escaped = true;
                } else if ch == '"' {
                    in_string = false;
                }
                continue;
            }

            match ch {
                '[' => {
                    if depth == 0 {
                        start = index;
                    }
                    depth += 1;
                }
                '"' if depth > 0 => in_string = true,
                ']' if depth > 0 => {
                    depth -= 1;
                    if depth == 0 {
                        let candidate = &raw[start..index + 1];
                        if Self::is_card_shaped(candidate) {
                            return Some(candidate);
                        }
                        first_balanced.get_or_insert(candidate);
                    }
                }
                _ => {}
            }
        }

        first_balanced
    }
}
