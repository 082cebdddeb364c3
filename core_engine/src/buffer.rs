//! Character-level text state: committed sentence plus the word in progress.

use std::collections::BTreeSet;

use crate::error::EngineError;

pub const DEFAULT_BOUNDARY_CHARS: &str = " .,!?";

/// Characters that terminate an in-progress word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundarySet {
    chars: BTreeSet<char>,
}

impl BoundarySet {
    pub fn new(chars: impl IntoIterator<Item = char>) -> Self {
        Self {
            chars: chars.into_iter().collect(),
        }
    }

    /// Builds a set from every character of `spec`, e.g. `" .,!?\n\t"`.
    pub fn from_chars(spec: &str) -> Self {
        Self::new(spec.chars())
    }

    pub fn contains(&self, ch: char) -> bool {
        self.chars.contains(&ch)
    }
}

impl Default for BoundarySet {
    fn default() -> Self {
        Self::from_chars(DEFAULT_BOUNDARY_CHARS)
    }
}

/// A word that left the in-progress slot and should be counted by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordCommit {
    pub word: String,
    /// Sentence as it was before the word was appended.
    pub context: String,
}

/// Per-session typing state.
///
/// Visible text is always `sentence + current_word`. `current_word` never holds
/// a boundary character; whether a word is in progress is derived from its
/// emptiness rather than stored separately.
#[derive(Debug, Clone, Default)]
pub struct TextBuffer {
    sentence: String,
    current_word: String,
    boundaries: BoundarySet,
}

impl TextBuffer {
    pub fn new(boundaries: BoundarySet) -> Self {
        Self {
            sentence: String::new(),
            current_word: String::new(),
            boundaries,
        }
    }

    pub fn sentence(&self) -> &str {
        &self.sentence
    }

    pub fn current_word(&self) -> &str {
        &self.current_word
    }

    pub fn visible_text(&self) -> String {
        let mut text = String::with_capacity(self.sentence.len() + self.current_word.len());
        text.push_str(&self.sentence);
        text.push_str(&self.current_word);
        text
    }

    pub fn is_word_in_progress(&self) -> bool {
        !self.current_word.is_empty()
    }

    /// Validates that `input` is exactly one character and applies it.
    pub fn insert_character(&mut self, input: &str) -> Result<Option<WordCommit>, EngineError> {
        let mut chars = input.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => Ok(self.insert_char(ch)),
            _ => Err(EngineError::InvalidInput(
                "character must be a single character".to_string(),
            )),
        }
    }

    pub fn insert_char(&mut self, ch: char) -> Option<WordCommit> {
        if !self.boundaries.contains(ch) {
            self.current_word.push(ch);
            return None;
        }

        let word = self.current_word.trim();
        let commit = (!word.is_empty()).then(|| WordCommit {
            word: word.to_string(),
            context: self.sentence.clone(),
        });
        self.sentence.push_str(&self.current_word);
        self.sentence.push(ch);
        self.current_word.clear();
        commit
    }

    /// Removes one visible character.
    ///
    /// Deleting a boundary character pulls the whole trailing word of the
    /// sentence back into the in-progress slot.
    pub fn delete_character(&mut self) {
        if self.current_word.pop().is_some() {
            return;
        }
        let Some(removed) = self.sentence.pop() else {
            return;
        };
        if self.boundaries.contains(removed) {
            self.uncommit_trailing_word();
        }
    }

    fn uncommit_trailing_word(&mut self) {
        let start = self
            .sentence
            .char_indices()
            .rev()
            .take_while(|(_, ch)| !ch.is_whitespace() && !self.boundaries.contains(*ch))
            .last()
            .map(|(index, _)| index);
        if let Some(start) = start {
            self.current_word = self.sentence.split_off(start);
        }
    }

    pub fn replace_sentence(&mut self, text: &str) {
        self.sentence = text.to_string();
        self.current_word.clear();
    }

    /// Applies a chosen suggestion and returns the commit to record.
    ///
    /// An in-progress word is replaced verbatim with no boundary appended.
    /// Otherwise the suggestion is appended as the next word, separated by a
    /// single space when the sentence does not already end in whitespace.
    pub fn accept_suggestion(&mut self, chosen: &str) -> Result<WordCommit, EngineError> {
        if chosen.trim().is_empty() {
            return Err(EngineError::InvalidInput(
                "suggestion must be a non-empty string".to_string(),
            ));
        }

        let context = self.sentence.clone();
        if self.is_word_in_progress() {
            self.current_word.clear();
        } else if !self.sentence.is_empty() && !self.sentence.ends_with(char::is_whitespace) {
            self.sentence.push(' ');
        }
        self.sentence.push_str(chosen);

        Ok(WordCommit {
            word: chosen.trim().to_string(),
            context,
        })
    }
}
