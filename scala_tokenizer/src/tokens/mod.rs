//! Token types produced by the scanner

pub mod counts;
pub mod token;

pub use counts::TokenCounts;
pub use token::{Token, TokenKind};
