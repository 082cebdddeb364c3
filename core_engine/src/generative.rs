//! Boundary to the external text-generation service.

use anyhow::Result;
use async_trait::async_trait;

use crate::util::is_plain_word;

/// Opaque prompt -> text function. Implementations return the raw reply,
/// expected to be a comma-separated list of candidate words.
#[async_trait]
pub trait GenerativeClient: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String>;
}

pub fn completion_prompt(context: &str) -> String {
    format!(
        "Given the incomplete text: \"{context}\", suggest 3 most probable word completions for the last word. Return only the complete words separated by commas, no explanations."
    )
}

pub fn next_word_prompt(context: &str) -> String {
    format!(
        "Given the context: \"{context}\", suggest 3 most probable next words that would naturally follow. Return only the words separated by commas, no explanations."
    )
}

/// Splits a model reply into lowercase single-word candidates.
///
/// Replies are not trusted to follow the requested format: list numbering,
/// quotes, stray punctuation and multi-word phrases are tolerated and
/// dropped or trimmed, and any number of items may come back.
pub fn parse_candidates(raw: &str) -> Vec<String> {
    raw.split(|ch| ch == ',' || ch == '\n' || ch == ';')
        .map(|item| {
            item.trim()
                .trim_start_matches(|ch: char| {
                    ch.is_ascii_digit() || matches!(ch, '.' | ')' | '-' | '*' | '•')
                })
                .trim_matches(|ch: char| {
                    ch.is_whitespace() || matches!(ch, '"' | '\'' | '`' | '.' | '!' | '?')
                })
                .to_lowercase()
        })
        .filter(|item| is_plain_word(item))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comma_separated_reply() {
        assert_eq!(parse_candidates("help, helmet"), vec!["help", "helmet"]);
    }

    #[test]
    fn tolerates_numbering_quotes_and_noise() {
        let raw = "1. \"Jumps\"\n2. ran.\n3) sat, 42, two words, `leaps`";
        assert_eq!(parse_candidates(raw), vec!["jumps", "ran", "sat", "leaps"]);
    }

    #[test]
    fn empty_reply_yields_nothing() {
        assert!(parse_candidates("").is_empty());
        assert!(parse_candidates(" , ,, ").is_empty());
    }

    #[test]
    fn prompts_embed_context() {
        assert!(completion_prompt("the quick br").contains("\"the quick br\""));
        assert!(next_word_prompt("the quick brown fox").contains("next words"));
    }
}
