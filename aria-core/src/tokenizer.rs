//! Tokenizer
//!
//! Normalizes raw text into an ordered sequence of lowercase tokens.
//! Tokenization never fails; a message may simply yield nothing.

/// A tokenized message: ordered tokens with zero-indexed positions
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tokenized {
    /// Tokens in message order; a token's position is its index
    pub tokens: Vec<String>,
    /// Whether the whole message was a single token
    pub standalone: bool,
}

/// Minimum length for a token to survive
const MIN_TOKEN_LEN: usize = 2;

/// Characters that survive normalization besides ASCII alphanumerics
fn keeps(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '\'' || c == '-'
}

/// Normalize and split a raw message.
///
/// Lowercases, replaces every character outside `[A-Za-z0-9_'\-\s]` with a
/// space, collapses whitespace, splits on spaces and drops tokens shorter
/// than two characters.
pub fn tokenize(text: &str) -> Tokenized {
    let normalized: String = text
        .to_lowercase()
        .chars()
        .map(|c| if keeps(c) || c.is_whitespace() { c } else { ' ' })
        .collect();

    let tokens: Vec<String> = normalized
        .split_whitespace()
        .filter(|t| t.chars().count() >= MIN_TOKEN_LEN)
        .map(|t| t.to_string())
        .collect();

    let standalone = tokens.len() == 1;
    Tokenized { tokens, standalone }
}

impl Tokenized {
    /// Whether the message produced no usable tokens
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Distinct tokens in first-occurrence order
    pub fn distinct(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        self.tokens
            .iter()
            .filter(|t| seen.insert(t.as_str()))
            .cloned()
            .collect()
    }
}
