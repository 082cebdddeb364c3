//! Typing-assistance core: tracks the sentence being typed and composes
//! word completions and next-word suggestions from a frequency store, a
//! generative text service and built-in fallback tables.

pub mod baseline;
pub mod buffer;
pub mod composer;
pub mod engine;
pub mod error;
pub mod generative;
pub mod source;
pub mod store;
mod util;

pub use baseline::StaticSource;
pub use buffer::{BoundarySet, TextBuffer, WordCommit, DEFAULT_BOUNDARY_CHARS};
pub use composer::{merge_suggestions, ComposerConfig, SuggestionComposer};
pub use engine::{Snapshot, SuggestionEngine};
pub use error::EngineError;
pub use generative::GenerativeClient;
pub use source::{GenerativeSource, StoreSource, SuggestionSource};
pub use store::{ContextRecord, MemoryStore, WordCount, WordRecord, WordStore};
