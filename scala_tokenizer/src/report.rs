//! JSON token reports

use crate::batch::{BatchResults, FileTokens};
use crate::tokens::{Token, TokenCounts};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;

/// Tokens for every scanned file, ready for serialization
#[derive(Debug, Clone, Serialize)]
pub struct TokenReport {
    pub generated_at: DateTime<Utc>,
    pub tool_version: &'static str,
    pub files: Vec<FileReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: String,
    pub line_count: usize,
    pub counts: TokenCounts,
    pub tokens: Vec<Token>,
}

impl FileReport {
    pub fn new(path: &Path, line_count: usize, tokens: Vec<Token>) -> Self {
        Self {
            path: path.display().to_string(),
            line_count,
            counts: TokenCounts::from_tokens(&tokens),
            tokens,
        }
    }
}

impl From<&FileTokens> for FileReport {
    fn from(file: &FileTokens) -> Self {
        Self::new(&file.path, file.line_count, file.tokens.clone())
    }
}

impl TokenReport {
    fn with_files(files: Vec<FileReport>) -> Self {
        Self {
            generated_at: Utc::now(),
            tool_version: env!("CARGO_PKG_VERSION"),
            files,
        }
    }

    pub fn from_file(path: &Path, line_count: usize, tokens: Vec<Token>) -> Self {
        Self::with_files(vec![FileReport::new(path, line_count, tokens)])
    }

    /// Successful files only; failures are reported separately by the caller
    pub fn from_batch(results: &BatchResults) -> Self {
        Self::with_files(results.files.iter().map(FileReport::from).collect())
    }

    pub fn total_tokens(&self) -> usize {
        self.files.iter().map(|f| f.tokens.len()).sum()
    }

    pub fn to_json(&self, pretty: bool) -> Result<String, serde_json::Error> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}
