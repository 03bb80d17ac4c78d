//! Lexical scanning of Scala source
//!
//! [`Scanner`] does the work; the free functions here are the module API
//! used by the file, batch and CLI layers.

pub mod merge;
pub mod scanner;
pub mod state;

use crate::file_processor::FileProcessingResult;
use crate::keywords::ReservedWords;
use crate::logging::{self, codes};
use crate::tokens::{Token, TokenCounts};

pub use merge::{is_hard_punctuation, merge_operators};
pub use scanner::{LexicalMetrics, Scanner, UnterminatedConstruct};
pub use state::ScanMode;

/// Tokens and metrics for one scanned file
#[derive(Debug, Clone)]
pub struct ScanOutput {
    pub tokens: Vec<Token>,
    pub metrics: LexicalMetrics,
}

impl ScanOutput {
    pub fn counts(&self) -> TokenCounts {
        TokenCounts::from_tokens(&self.tokens)
    }
}

// ============================================================================
// MODULE API
// ============================================================================

/// Scan `source` with default preferences
pub fn tokenize(source: impl AsRef<[u8]>) -> Vec<Token> {
    let mut scanner = Scanner::new();
    scanner.parse(source);
    scanner.into_tokens()
}

pub fn create_scanner() -> Scanner {
    Scanner::new()
}

/// Scan a read file with `scanner`, tagging log events with the file path
pub fn tokenize_file_result(scanner: &mut Scanner, file_result: &FileProcessingResult) -> ScanOutput {
    let path = file_result.metadata.path.display().to_string();
    logging::with_file_context(&path, || {
        scanner.parse(&file_result.source);
    });

    ScanOutput {
        tokens: scanner.tokens().to_vec(),
        metrics: scanner.metrics().clone(),
    }
}

pub fn get_token_counts(tokens: &[Token]) -> TokenCounts {
    TokenCounts::from_tokens(tokens)
}

// ============================================================================
// MODULE INITIALIZATION
// ============================================================================

/// Build the reserved-word table and check the lexical codes are registered.
/// Called once at startup so workers never race to build the table.
pub fn init_lexical_logging() -> Result<(), String> {
    for code in [
        codes::lexical::UNTERMINATED_STRING,
        codes::lexical::UNTERMINATED_CHAR,
        codes::lexical::UNTERMINATED_COMMENT,
        codes::success::TOKENIZATION_COMPLETE,
    ] {
        if !codes::is_registered(code.as_str()) {
            return Err(format!("Lexical code {} not found in registry", code));
        }
    }

    let table = ReservedWords::shared();
    if table.is_empty() {
        return Err("Reserved-word table is empty".to_string());
    }

    crate::log_debug!("Lexical module initialized", "reserved_words" => table.len());
    Ok(())
}
