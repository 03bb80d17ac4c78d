use super::token::{Token, TokenKind};
use serde::{Deserialize, Serialize};

/// Per-kind totals over a token sequence
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenCounts {
    pub reserved: usize,
    pub identifiers: usize,
    pub literals: usize,
    pub operators: usize,
    /// Operator tokens longer than one byte, i.e. the product of merging
    pub merged_operators: usize,
}

impl TokenCounts {
    pub fn from_tokens(tokens: &[Token]) -> Self {
        tokens.iter().fold(Self::default(), |mut counts, token| {
            match token.kind() {
                TokenKind::Reserved => counts.reserved += 1,
                TokenKind::Identifier => counts.identifiers += 1,
                TokenKind::Literal => counts.literals += 1,
                TokenKind::Operator => {
                    counts.operators += 1;
                    if token.value().len() > 1 {
                        counts.merged_operators += 1;
                    }
                }
            }
            counts
        })
    }

    pub fn total(&self) -> usize {
        self.reserved + self.identifiers + self.literals + self.operators
    }

    pub fn get(&self, kind: TokenKind) -> usize {
        match kind {
            TokenKind::Reserved => self.reserved,
            TokenKind::Identifier => self.identifiers,
            TokenKind::Literal => self.literals,
            TokenKind::Operator => self.operators,
        }
    }

    /// Fold another file's counts into this one
    pub fn add(&mut self, other: &TokenCounts) {
        self.reserved += other.reserved;
        self.identifiers += other.identifiers;
        self.literals += other.literals;
        self.operators += other.operators;
        self.merged_operators += other.merged_operators;
    }
}
