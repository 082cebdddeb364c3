mod tables;
mod trie;

use std::collections::{HashMap, HashSet};

use anyhow::Result;
use async_trait::async_trait;

use crate::source::SuggestionSource;
use crate::util::bare_token;
use tables::{COMMON_WORDS, DEFAULT_NEXT_WORDS, NEXT_WORDS, STARTER_WORDS};
use trie::Trie;

/// Lowest-priority source backed by built-in tables. Never fails and needs no
/// network, so it fills in when the generative service is slow or down.
#[derive(Debug, Clone)]
pub struct StaticSource {
    words: Trie,
    next_words: HashMap<&'static str, &'static [&'static str]>,
    limit: usize,
}

impl StaticSource {
    pub fn new(limit: usize) -> Self {
        let mut words = Trie::default();
        let mut seen = HashSet::new();
        let total = COMMON_WORDS.len() as u32;
        for (rank, word) in COMMON_WORDS.iter().enumerate() {
            // Repeated entries keep the rank of their first appearance.
            if seen.insert(*word) {
                words.insert(word, total - rank as u32);
            }
        }

        Self {
            words,
            next_words: NEXT_WORDS.iter().copied().collect(),
            limit,
        }
    }

    pub fn complete(&self, prefix: &str) -> Vec<String> {
        let prefix = prefix.trim().to_lowercase();
        if prefix.is_empty() {
            return Vec::new();
        }
        self.words
            .completions(&prefix, self.limit)
            .into_iter()
            .map(|(word, _)| word)
            .collect()
    }

    pub fn next_words(&self, context: &str) -> Vec<String> {
        let last = context
            .split_whitespace()
            .next_back()
            .map(|token| bare_token(token).to_lowercase());
        let table = match last {
            None => STARTER_WORDS,
            Some(word) => self
                .next_words
                .get(word.as_str())
                .copied()
                .unwrap_or(DEFAULT_NEXT_WORDS),
        };
        table
            .iter()
            .take(self.limit)
            .map(|word| word.to_string())
            .collect()
    }
}

impl Default for StaticSource {
    fn default() -> Self {
        Self::new(5)
    }
}

#[async_trait]
impl SuggestionSource for StaticSource {
    fn name(&self) -> &str {
        "static"
    }

    async fn try_complete(&self, _sentence: &str, prefix: &str) -> Result<Vec<String>> {
        Ok(self.complete(prefix))
    }

    async fn try_next_words(&self, context: &str) -> Result<Vec<String>> {
        Ok(self.next_words(context))
    }
}
