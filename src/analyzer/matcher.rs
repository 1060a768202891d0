//! Whole-word keyword matching.
//!
//! Text is lowercased and split on every non-alphanumeric character, the
//! same way registry keywords are split. A keyword matches when its tokens
//! appear back to back in the text, so "hat" never matches inside "chatting"
//! and "self-harm" matches "self harm" as well.

use crate::registry::{tokenize, KeywordRegistry};

/// Scans text against a keyword registry.
pub struct TextMatcher<'a> {
    registry: &'a KeywordRegistry,
}

impl<'a> TextMatcher<'a> {
    pub fn new(registry: &'a KeywordRegistry) -> Self {
        Self { registry }
    }

    /// Keywords found in `text` as whole words, unique, in registry order.
    pub fn find(&self, text: &str) -> Vec<&'a str> {
        let mut positions = self.match_positions(text);
        positions.sort_unstable();
        positions.dedup();

        let entries = self.registry.entries();
        positions
            .into_iter()
            .map(|position| entries[position].keyword())
            .collect()
    }

    /// Registry positions of every keyword occurrence, unordered.
    pub(crate) fn match_positions(&self, text: &str) -> Vec<usize> {
        let tokens = tokenize(text);
        let entries = self.registry.entries();
        let mut found = Vec::new();

        for (start, token) in tokens.iter().enumerate() {
            for &position in self.registry.candidates(token) {
                let keyword_tokens = entries[position].tokens();
                let end = start + keyword_tokens.len();
                if end <= tokens.len() && tokens[start..end] == *keyword_tokens {
                    found.push(position);
                }
            }
        }

        found
    }
}
