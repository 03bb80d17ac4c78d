//! Single-pass lexical scanner for Scala source
//!
//! Produces line-numbered tokens classified as reserved words, identifiers,
//! literals and operators, for use by similarity and plagiarism tools.

pub mod batch;
pub mod config;
pub mod file_processor;
pub mod keywords;
pub mod lexical;
#[macro_use]
pub mod logging;
pub mod report;
pub mod tokens;

// Re-export key types for library consumers
pub use batch::{BatchConfig, BatchError, BatchProcessor, BatchResults};
pub use file_processor::{FileProcessingResult, FileProcessor, FileProcessorError};
pub use keywords::ReservedWords;
pub use lexical::{tokenize, LexicalMetrics, Scanner};
pub use report::TokenReport;
pub use tokens::{Token, TokenCounts, TokenKind};
