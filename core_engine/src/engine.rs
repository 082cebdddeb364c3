//! Session-level operations: apply an edit, persist what it committed, then
//! refresh suggestions for whichever mode the buffer is now in.

use serde::Serialize;
use tracing::warn;

use crate::buffer::{BoundarySet, TextBuffer, WordCommit};
use crate::composer::SuggestionComposer;
use crate::error::EngineError;

/// State returned to the caller after every operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub current_text: String,
    pub suggestions: Vec<String>,
    pub is_word_complete: bool,
}

/// Shared engine; sessions are owned by the caller and passed in per call.
///
/// Callers serialize operations on one session; the engine holds no session
/// state of its own.
pub struct SuggestionEngine {
    composer: SuggestionComposer,
    boundaries: BoundarySet,
}

impl SuggestionEngine {
    pub fn new(composer: SuggestionComposer, boundaries: BoundarySet) -> Self {
        Self {
            composer,
            boundaries,
        }
    }

    pub fn composer(&self) -> &SuggestionComposer {
        &self.composer
    }

    pub fn new_session(&self) -> TextBuffer {
        TextBuffer::new(self.boundaries.clone())
    }

    pub async fn add_character(
        &self,
        session: &mut TextBuffer,
        input: &str,
    ) -> Result<Snapshot, EngineError> {
        if let Some(commit) = session.insert_character(input)? {
            self.record(commit).await;
        }
        Ok(self.snapshot(session).await)
    }

    pub async fn remove_character(&self, session: &mut TextBuffer) -> Snapshot {
        session.delete_character();
        self.snapshot(session).await
    }

    pub async fn accept_suggestion(
        &self,
        session: &mut TextBuffer,
        chosen: &str,
    ) -> Result<Snapshot, EngineError> {
        let commit = session.accept_suggestion(chosen)?;
        self.record(commit).await;
        Ok(self.snapshot(session).await)
    }

    /// Replaces the whole buffer with transcribed text and keeps the text as a
    /// context for future next-word lookups.
    pub async fn apply_transcription(&self, session: &mut TextBuffer, text: &str) -> Snapshot {
        session.replace_sentence(text);
        if !text.trim().is_empty() {
            if let Err(error) = self.composer.save_context(text).await {
                warn!("failed to save transcribed context: {error:#}");
            }
        }
        self.snapshot(session).await
    }

    /// Completions while a word is being typed, next-word suggestions otherwise.
    pub async fn suggestions_for(&self, session: &TextBuffer) -> Vec<String> {
        if session.is_word_in_progress() {
            self.composer
                .completions(session.sentence(), session.current_word())
                .await
        } else {
            self.composer.next_words(session.sentence()).await
        }
    }

    pub async fn snapshot(&self, session: &TextBuffer) -> Snapshot {
        Snapshot {
            current_text: session.visible_text(),
            suggestions: self.suggestions_for(session).await,
            is_word_complete: !session.is_word_in_progress(),
        }
    }

    async fn record(&self, commit: WordCommit) {
        if let Err(error) = self.composer.commit_word(&commit.word, &commit.context).await {
            warn!(word = %commit.word, "failed to record word: {error:#}");
        }
    }
}
