//! Merges store, generative and static suggestions into one ranked list.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::baseline::StaticSource;
use crate::generative::GenerativeClient;
use crate::source::{GenerativeSource, StoreLimits, StoreSource, SuggestionSource};
use crate::store::{ContextRecord, WordRecord, WordStore};

#[derive(Debug, Clone)]
pub struct ComposerConfig {
    pub max_suggestions: usize,
    pub store_limits: StoreLimits,
    /// Upper bound on a single generative call before falling back.
    pub generative_timeout: Duration,
    /// Upper bound on each store read or write.
    pub store_timeout: Duration,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            max_suggestions: 5,
            store_limits: StoreLimits::default(),
            generative_timeout: Duration::from_millis(1500),
            store_timeout: Duration::from_millis(500),
        }
    }
}

/// Suggestion composer.
///
/// Precedence is fixed by source, never by which query finishes first:
/// completions list stored words before generated ones, next-word lists put
/// generated words before stored followers. When the generative source
/// yields nothing (failure, timeout, absent, or no usable words), the static
/// tables take its place.
pub struct SuggestionComposer {
    store: Arc<dyn WordStore>,
    stored: Arc<dyn SuggestionSource>,
    generative: Option<Arc<dyn SuggestionSource>>,
    fallback: Arc<dyn SuggestionSource>,
    config: ComposerConfig,
}

impl SuggestionComposer {
    pub fn new(
        store: Arc<dyn WordStore>,
        generative: Option<Arc<dyn GenerativeClient>>,
        config: ComposerConfig,
    ) -> Self {
        Self {
            stored: Arc::new(StoreSource::new(store.clone(), config.store_limits)),
            generative: generative
                .map(|client| Arc::new(GenerativeSource::new(client)) as Arc<dyn SuggestionSource>),
            fallback: Arc::new(StaticSource::new(config.max_suggestions)),
            store,
            config,
        }
    }

    /// Replaces the lowest-priority source.
    pub fn with_fallback(mut self, fallback: Arc<dyn SuggestionSource>) -> Self {
        self.fallback = fallback;
        self
    }

    pub async fn completions(&self, sentence: &str, prefix: &str) -> Vec<String> {
        let prefix = prefix.trim();
        if prefix.is_empty() {
            return Vec::new();
        }

        let (stored, generated) = tokio::join!(
            self.isolate(self.stored.as_ref(), self.stored.try_complete(sentence, prefix)),
            self.bounded_generative(|source| source.try_complete(sentence, prefix)),
        );
        let generated = match generated {
            Some(words) => words,
            None => {
                self.isolate(
                    self.fallback.as_ref(),
                    self.fallback.try_complete(sentence, prefix),
                )
                .await
            }
        };

        merge_suggestions([stored, generated], self.config.max_suggestions)
    }

    pub async fn next_words(&self, context: &str) -> Vec<String> {
        let context = context.trim();
        if context.is_empty() {
            let starters = self
                .isolate(self.fallback.as_ref(), self.fallback.try_next_words(context))
                .await;
            return merge_suggestions([starters], self.config.max_suggestions);
        }

        let (generated, followers) = tokio::join!(
            self.bounded_generative(|source| source.try_next_words(context)),
            self.isolate(self.stored.as_ref(), self.stored.try_next_words(context)),
        );

        match generated {
            Some(words) => merge_suggestions([words, followers], self.config.max_suggestions),
            None => {
                let fallback = self
                    .isolate(self.fallback.as_ref(), self.fallback.try_next_words(context))
                    .await;
                merge_suggestions([followers, fallback], self.config.max_suggestions)
            }
        }
    }

    /// Counts one use of `word` and remembers the sentence it appeared in.
    pub async fn commit_word(&self, word: &str, context: &str) -> Result<WordRecord> {
        let record = timeout(self.config.store_timeout, self.store.record_word(word, context))
            .await
            .map_err(|_| self.store_timed_out("record_word"))??;
        debug!(word = %record.word, frequency = record.frequency, "committed word");
        Ok(record)
    }

    pub async fn save_context(&self, sentence: &str) -> Result<()> {
        let record = ContextRecord::from_sentence(sentence);
        timeout(self.config.store_timeout, self.store.save_context(record))
            .await
            .map_err(|_| self.store_timed_out("save_context"))?
    }

    fn store_timed_out(&self, operation: &str) -> anyhow::Error {
        anyhow!(
            "store {operation} timed out after {}ms",
            self.config.store_timeout.as_millis()
        )
    }

    /// Runs a store or static query; failures and timeouts contribute nothing.
    async fn isolate(
        &self,
        source: &dyn SuggestionSource,
        query: impl Future<Output = Result<Vec<String>>>,
    ) -> Vec<String> {
        match timeout(self.config.store_timeout, query).await {
            Ok(Ok(words)) => words,
            Ok(Err(error)) => {
                warn!(source = source.name(), "suggestion source failed: {error:#}");
                Vec::new()
            }
            Err(_) => {
                warn!(
                    source = source.name(),
                    timeout_ms = self.config.store_timeout.as_millis() as u64,
                    "suggestion source timed out"
                );
                Vec::new()
            }
        }
    }

    /// `None` when the generative source is absent, failed, timed out, or
    /// produced no usable words.
    async fn bounded_generative<'a, F, Fut>(&'a self, query: F) -> Option<Vec<String>>
    where
        F: FnOnce(&'a dyn SuggestionSource) -> Fut,
        Fut: Future<Output = Result<Vec<String>>> + 'a,
    {
        let source = self.generative.as_deref()?;
        let words = match timeout(self.config.generative_timeout, query(source)).await {
            Ok(Ok(words)) => words,
            Ok(Err(error)) => {
                warn!(source = source.name(), "suggestion source failed: {error:#}");
                return None;
            }
            Err(_) => {
                warn!(
                    source = source.name(),
                    timeout_ms = self.config.generative_timeout.as_millis() as u64,
                    "suggestion source timed out"
                );
                return None;
            }
        };
        (!words.is_empty()).then_some(words)
    }
}

/// Concatenates `groups` in order, dropping blanks and case-insensitive
/// repeats, keeping at most `limit` entries.
pub fn merge_suggestions<I>(groups: I, limit: usize) -> Vec<String>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    for candidate in groups.into_iter().flatten() {
        if merged.len() >= limit {
            break;
        }
        let candidate = candidate.trim();
        if candidate.is_empty() {
            continue;
        }
        if seen.insert(candidate.to_lowercase()) {
            merged.push(candidate.to_string());
        }
    }
    merged
}
