//! Word-frequency and sentence-context persistence interface.

use std::collections::HashMap;

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::util::tokenize;

/// A learned word. `word` is lowercase and unique across the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordRecord {
    pub word: String,
    pub frequency: u64,
    /// Sentences the word was committed in, first-seen order, no duplicates.
    pub contexts: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Word and usage count, without the context history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCount {
    pub word: String,
    pub frequency: u64,
}

/// A full sentence kept for next-word lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextRecord {
    pub sentence: String,
    pub words: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl ContextRecord {
    pub fn from_sentence(sentence: &str) -> Self {
        Self {
            sentence: sentence.to_string(),
            words: tokenize(sentence),
            created_at: Utc::now(),
        }
    }
}

/// Normalized store key for `word`, or an error when nothing is left.
pub fn word_key(word: &str) -> Result<String> {
    let key = word.trim().to_lowercase();
    if key.is_empty() {
        bail!("cannot record an empty word");
    }
    Ok(key)
}

#[async_trait]
pub trait WordStore: Send + Sync {
    /// Words whose lowercase form starts with `prefix`, highest frequency first.
    async fn words_with_prefix(&self, prefix: &str, limit: usize) -> Result<Vec<WordCount>>;

    async fn lookup_word(&self, word: &str) -> Result<Option<WordRecord>>;

    /// Atomic increment-or-insert keyed by the lowercase word.
    ///
    /// Frequency grows on every call; `context` is added to the record's
    /// context set only when it is not already present.
    async fn record_word(&self, word: &str, context: &str) -> Result<WordRecord>;

    async fn save_context(&self, record: ContextRecord) -> Result<()>;

    /// Saved sentences containing `fragment` (case-insensitive), oldest first.
    async fn contexts_containing(&self, fragment: &str, limit: usize)
        -> Result<Vec<ContextRecord>>;
}

/// Process-local store, used by tests and when no database is configured.
#[derive(Debug, Default)]
pub struct MemoryStore {
    words: RwLock<HashMap<String, WordRecord>>,
    contexts: RwLock<Vec<ContextRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a word with an explicit frequency, replacing any existing record.
    pub async fn insert_word(&self, word: &str, frequency: u64) -> Result<()> {
        let key = word_key(word)?;
        self.words.write().await.insert(
            key.clone(),
            WordRecord {
                word: key,
                frequency,
                contexts: Vec::new(),
                created_at: Utc::now(),
            },
        );
        Ok(())
    }
}

#[async_trait]
impl WordStore for MemoryStore {
    async fn words_with_prefix(&self, prefix: &str, limit: usize) -> Result<Vec<WordCount>> {
        let prefix = prefix.to_lowercase();
        let words = self.words.read().await;
        let mut matches: Vec<WordCount> = words
            .values()
            .filter(|record| record.word.starts_with(&prefix))
            .map(|record| WordCount {
                word: record.word.clone(),
                frequency: record.frequency,
            })
            .collect();
        matches.sort_by(|a, b| {
            b.frequency
                .cmp(&a.frequency)
                .then_with(|| a.word.cmp(&b.word))
        });
        matches.truncate(limit);
        Ok(matches)
    }

    async fn lookup_word(&self, word: &str) -> Result<Option<WordRecord>> {
        let key = word.trim().to_lowercase();
        Ok(self.words.read().await.get(&key).cloned())
    }

    async fn record_word(&self, word: &str, context: &str) -> Result<WordRecord> {
        let key = word_key(word)?;
        let mut words = self.words.write().await;
        let record = words.entry(key.clone()).or_insert_with(|| WordRecord {
            word: key,
            frequency: 0,
            contexts: Vec::new(),
            created_at: Utc::now(),
        });
        record.frequency = record.frequency.saturating_add(1);
        if !record.contexts.iter().any(|seen| seen == context) {
            record.contexts.push(context.to_string());
        }
        Ok(record.clone())
    }

    async fn save_context(&self, record: ContextRecord) -> Result<()> {
        self.contexts.write().await.push(record);
        Ok(())
    }

    async fn contexts_containing(
        &self,
        fragment: &str,
        limit: usize,
    ) -> Result<Vec<ContextRecord>> {
        let needle = fragment.to_lowercase();
        Ok(self
            .contexts
            .read()
            .await
            .iter()
            .filter(|record| record.sentence.to_lowercase().contains(&needle))
            .take(limit)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[tokio::test]
    async fn record_word_counts_uses_and_dedups_contexts() {
        let store = MemoryStore::new();
        store.record_word("cat", "the cat sat").await.unwrap();
        let record = store.record_word("Cat", "the cat sat").await.unwrap();
        assert_eq!(record.word, "cat");
        assert_eq!(record.frequency, 2);
        assert_eq!(record.contexts, vec!["the cat sat".to_string()]);
    }

    #[tokio::test]
    async fn record_word_rejects_blank() {
        let store = MemoryStore::new();
        assert!(store.record_word("  ", "ctx").await.is_err());
    }

    #[tokio::test]
    async fn concurrent_records_do_not_lose_updates() {
        let store = Arc::new(MemoryStore::new());
        let mut handles = Vec::new();
        for index in 0..32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.record_word("race", &format!("ctx {}", index % 4)).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        let record = store.lookup_word("race").await.unwrap().unwrap();
        assert_eq!(record.frequency, 32);
        assert_eq!(record.contexts.len(), 4);
    }

    #[tokio::test]
    async fn prefix_lookup_orders_by_frequency() {
        let store = MemoryStore::new();
        store.insert_word("help", 2).await.unwrap();
        store.insert_word("hello", 5).await.unwrap();
        store.insert_word("helmet", 2).await.unwrap();
        store.insert_word("world", 9).await.unwrap();

        let words: Vec<String> = store
            .words_with_prefix("HEL", 3)
            .await
            .unwrap()
            .into_iter()
            .map(|record| record.word)
            .collect();
        assert_eq!(words, vec!["hello", "helmet", "help"]);
    }

    #[tokio::test]
    async fn context_search_is_case_insensitive_and_limited() {
        let store = MemoryStore::new();
        for sentence in ["The quick brown fox", "a quick brown dog", "slow green turtle"] {
            store
                .save_context(ContextRecord::from_sentence(sentence))
                .await
                .unwrap();
        }
        let found = store.contexts_containing("QUICK BROWN", 10).await.unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].words, vec!["The", "quick", "brown", "fox"]);

        let limited = store.contexts_containing("quick brown", 1).await.unwrap();
        assert_eq!(limited.len(), 1);
    }
}
