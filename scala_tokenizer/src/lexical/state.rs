//! Scan modes, line tracking and lexeme classification

use crate::keywords::ReservedWords;
use crate::tokens::TokenKind;
use std::fmt;

pub(crate) const LF: u8 = b'\n';
pub(crate) const CR: u8 = b'\r';

/// Finite-state-machine state of a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanMode {
    Regular,
    InString,
    InChar,
    InComment,
    InLineComment,
    InNumber,
}

impl ScanMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanMode::Regular => "REGULAR",
            ScanMode::InString => "IN_STRING",
            ScanMode::InChar => "IN_CHAR",
            ScanMode::InComment => "IN_COMMENT",
            ScanMode::InLineComment => "IN_LINECOMMENT",
            ScanMode::InNumber => "IN_NUMBER",
        }
    }

    /// Modes whose construct is lost if the input ends inside them
    pub fn swallows_input(&self) -> bool {
        matches!(
            self,
            ScanMode::InString | ScanMode::InChar | ScanMode::InComment
        )
    }
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Line counter plus first/last non-blank byte of the current line
#[derive(Debug, Clone)]
pub(crate) struct LineTracker {
    line: u32,
    first_non_space: Option<u8>,
    last_non_space: Option<u8>,
}

impl LineTracker {
    pub(crate) fn new() -> Self {
        Self {
            line: 1,
            first_non_space: None,
            last_non_space: None,
        }
    }

    pub(crate) fn line(&self) -> u32 {
        self.line
    }

    /// Called on the byte after a linefeed
    pub(crate) fn start_line(&mut self) {
        self.line += 1;
        self.first_non_space = None;
        self.last_non_space = None;
    }

    /// Record a normalized byte that is about to be dispatched
    pub(crate) fn track(&mut self, current: u8) {
        if current == b' ' || current == b'\t' {
            return;
        }
        if current != LF {
            self.last_non_space = Some(current);
        }
        if self.first_non_space.is_none() {
            self.first_non_space = Some(current);
        }
    }

    pub(crate) fn first_non_space(&self) -> Option<u8> {
        self.first_non_space
    }

    pub(crate) fn last_non_space(&self) -> Option<u8> {
        self.last_non_space
    }
}

/// Letters, underscore and any byte above 127 continue an identifier
pub(crate) fn is_identifier_byte(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b'_' || byte > 127
}

pub(crate) fn is_number_byte(byte: u8) -> bool {
    byte.is_ascii_digit() || matches!(byte, b'.' | b'E' | b'e')
}

/// Decide the kind of a finished lexeme from its first byte.
///
/// Returns `None` for an empty lexeme or one made only of bytes at or
/// below the space character. Only an ASCII letter or underscore leads an
/// identifier here, so a lexeme starting with a byte above 127 is an
/// operator even though such bytes continue identifiers.
pub(crate) fn classify(lexeme: &[u8], reserved: &ReservedWords) -> Option<TokenKind> {
    if lexeme.iter().all(|&b| b <= b' ') {
        return None;
    }
    let (&first, _) = lexeme.split_first()?;

    let kind = if first.is_ascii_alphabetic() || first == b'_' {
        match std::str::from_utf8(lexeme) {
            Ok(word) if reserved.is_reserved(word) => TokenKind::Reserved,
            _ => TokenKind::Identifier,
        }
    } else if first.is_ascii_digit() {
        TokenKind::Literal
    } else {
        TokenKind::Operator
    };
    Some(kind)
}
