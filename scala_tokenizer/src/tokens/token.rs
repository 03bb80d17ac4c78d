//! Classified, line-numbered tokens

use serde::{Deserialize, Serialize};
use std::fmt;

/// The four token classes downstream similarity matching works with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenKind {
    /// Keyword or built-in type name found in the reserved-word table
    Reserved,
    Identifier,
    /// Numeric literal. String bodies never produce tokens.
    Literal,
    /// Punctuation, possibly several adjacent characters merged together
    Operator,
}

impl TokenKind {
    pub const ALL: [TokenKind; 4] = [
        TokenKind::Reserved,
        TokenKind::Identifier,
        TokenKind::Literal,
        TokenKind::Operator,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Reserved => "RESERVED",
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::Literal => "LITERAL",
            TokenKind::Operator => "OPERATOR",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A token as handed to consumers. Fields are read-only outside the crate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    kind: TokenKind,
    value: String,
    line: u32,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>, line: u32) -> Self {
        Self {
            kind,
            value: value.into(),
            line,
        }
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// 1-based line on which the lexeme began
    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn is_operator(&self) -> bool {
        self.kind == TokenKind::Operator
    }

    /// Append a following operator's text to this one
    pub(crate) fn absorb(&mut self, next: &Token) {
        self.value.push_str(&next.value);
    }
}

/// "show" form: `<line>: <KIND> <value>`
impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} {}", self.line, self.kind, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_form() {
        let token = Token::new(TokenKind::Reserved, "val", 3);
        assert_eq!(token.to_string(), "3: RESERVED val");
    }

    #[test]
    fn test_kind_serializes_upper_case() {
        let token = Token::new(TokenKind::Operator, "+=", 1);
        let json = serde_json::to_string(&token).unwrap();
        assert_eq!(json, r#"{"kind":"OPERATOR","value":"+=","line":1}"#);

        let back: Token = serde_json::from_str(&json).unwrap();
        assert_eq!(back, token);
    }

    #[test]
    fn test_absorb_concatenates_text() {
        let mut first = Token::new(TokenKind::Operator, "+", 2);
        first.absorb(&Token::new(TokenKind::Operator, "=", 3));
        assert_eq!(first.value(), "+=");
        assert_eq!(first.line(), 2);
    }
}
