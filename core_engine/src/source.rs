//! Suggestion sources behind one capability interface, so the store, the
//! generative service and the static tables can be swapped or mocked alike.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::generative::{completion_prompt, next_word_prompt, parse_candidates, GenerativeClient};
use crate::store::WordStore;
use crate::util::bare_token;

#[async_trait]
pub trait SuggestionSource: Send + Sync {
    fn name(&self) -> &str;

    /// Full words completing `prefix`, typed after the committed `sentence`.
    async fn try_complete(&self, sentence: &str, prefix: &str) -> Result<Vec<String>>;

    /// Words likely to follow `context`.
    async fn try_next_words(&self, context: &str) -> Result<Vec<String>>;
}

#[derive(Debug, Clone, Copy)]
pub struct StoreLimits {
    pub completions: usize,
    pub context_scan: usize,
    pub followers: usize,
}

impl Default for StoreLimits {
    fn default() -> Self {
        Self {
            completions: 3,
            context_scan: 10,
            followers: 3,
        }
    }
}

/// Learned words ranked by frequency, plus followers mined from saved sentences.
pub struct StoreSource {
    store: Arc<dyn WordStore>,
    limits: StoreLimits,
}

impl StoreSource {
    pub fn new(store: Arc<dyn WordStore>, limits: StoreLimits) -> Self {
        Self { store, limits }
    }
}

#[async_trait]
impl SuggestionSource for StoreSource {
    fn name(&self) -> &str {
        "store"
    }

    async fn try_complete(&self, _sentence: &str, prefix: &str) -> Result<Vec<String>> {
        let records = self
            .store
            .words_with_prefix(&prefix.to_lowercase(), self.limits.completions)
            .await?;
        Ok(records.into_iter().map(|record| record.word).collect())
    }

    async fn try_next_words(&self, context: &str) -> Result<Vec<String>> {
        let tokens: Vec<String> = context
            .split_whitespace()
            .map(str::to_lowercase)
            .collect();
        let [.., first, second] = tokens.as_slice() else {
            return Ok(Vec::new());
        };

        let records = self
            .store
            .contexts_containing(&format!("{first} {second}"), self.limits.context_scan)
            .await?;

        let mut seen = HashSet::new();
        let mut followers = Vec::new();
        for record in records {
            let words: Vec<String> = record
                .sentence
                .split_whitespace()
                .map(str::to_lowercase)
                .collect();
            for window in words.windows(3) {
                if followers.len() >= self.limits.followers {
                    return Ok(followers);
                }
                if window[0] != *first || window[1] != *second {
                    continue;
                }
                let follower = bare_token(&window[2]);
                if !follower.is_empty() && seen.insert(follower.to_string()) {
                    followers.push(follower.to_string());
                }
            }
        }
        Ok(followers)
    }
}

/// Candidates produced by the external text-generation service.
pub struct GenerativeSource {
    client: Arc<dyn GenerativeClient>,
}

impl GenerativeSource {
    pub fn new(client: Arc<dyn GenerativeClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SuggestionSource for GenerativeSource {
    fn name(&self) -> &str {
        self.client.name()
    }

    async fn try_complete(&self, sentence: &str, prefix: &str) -> Result<Vec<String>> {
        let prompt = completion_prompt(&format!("{sentence}{prefix}"));
        let raw = self.client.generate(&prompt).await?;
        let prefix = prefix.to_lowercase();
        Ok(parse_candidates(&raw)
            .into_iter()
            .filter(|candidate| candidate.starts_with(&prefix))
            .collect())
    }

    async fn try_next_words(&self, context: &str) -> Result<Vec<String>> {
        let raw = self.client.generate(&next_word_prompt(context)).await?;
        Ok(parse_candidates(&raw))
    }
}
