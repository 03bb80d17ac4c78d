//! Operator merging over a finished token sequence

use crate::config::constants::compile_time::lexical::HARD_PUNCTUATION;
use crate::tokens::Token;

/// Single-character lexemes that never absorb a following operator
pub fn is_hard_punctuation(value: &str) -> bool {
    matches!(value.as_bytes(), [byte] if HARD_PUNCTUATION.contains(byte))
}

/// Join each run of adjacent OPERATOR tokens into one token.
///
/// The earlier token keeps its line. A merged token keeps absorbing
/// following operators. Hard punctuation only ever starts a new token.
/// Returns the rebuilt sequence and the number of tokens absorbed.
pub fn merge_operators(tokens: Vec<Token>) -> (Vec<Token>, usize) {
    let mut merged: Vec<Token> = Vec::with_capacity(tokens.len());
    let mut absorbed = 0;

    for token in tokens {
        if let Some(last) = merged.last_mut() {
            if last.is_operator() && token.is_operator() && !is_hard_punctuation(last.value()) {
                last.absorb(&token);
                absorbed += 1;
                continue;
            }
        }
        merged.push(token);
    }

    (merged, absorbed)
}
