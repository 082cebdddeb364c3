pub fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '\'' || ch == '_'
}

/// Alphabetic word, apostrophes allowed between letters ("don't").
pub fn is_plain_word(token: &str) -> bool {
    let first = token.chars().next();
    let last = token.chars().next_back();
    match (first, last) {
        (Some(first), Some(last)) => {
            first.is_alphabetic()
                && last.is_alphabetic()
                && token.chars().all(|ch| ch.is_alphabetic() || ch == '\'')
        }
        _ => false,
    }
}

pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

/// Strips surrounding punctuation from a whitespace token ("fox." -> "fox").
pub fn bare_token(token: &str) -> &str {
    token.trim_matches(|ch: char| !is_word_char(ch))
}
