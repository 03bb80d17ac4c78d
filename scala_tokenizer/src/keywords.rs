//! Scala reserved-word table
//!
//! Case-sensitive keywords, literal words and built-in type names. The
//! table is built once per process and shared read-only by every scanner.

use std::collections::HashSet;
use std::sync::OnceLock;

/// Every word the scanner classifies as RESERVED
const SCALA_RESERVED_WORDS: &[&str] = &[
    // === KEYWORDS ===
    "abstract", "case", "catch", "class", "def", "do", "else", "extends", "final", "finally",
    "for", "forSome", "if", "implicit", "import", "lazy", "match", "new", "object", "override",
    "package", "private", "protected", "return", "sealed", "super", "this", "throw", "trait",
    "try", "type", "val", "var", "while", "with", "yield",
    // === LITERAL WORDS ===
    "false", "null", "true",
    // === BUILT-IN TYPE NAMES ===
    "Byte", "Short", "Char", "Int", "Long", "Float", "Double", "Boolean", "Unit", "String",
];

static RESERVED_WORDS: OnceLock<ReservedWords> = OnceLock::new();

/// Immutable membership set over [`SCALA_RESERVED_WORDS`]
#[derive(Debug)]
pub struct ReservedWords {
    words: HashSet<&'static str>,
}

impl ReservedWords {
    fn build() -> Self {
        Self {
            words: SCALA_RESERVED_WORDS.iter().copied().collect(),
        }
    }

    /// The process-wide table, constructed on first use
    pub fn shared() -> &'static ReservedWords {
        RESERVED_WORDS.get_or_init(Self::build)
    }

    pub fn is_reserved(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.words.iter().copied()
    }
}

/// The reserved words in declaration order
pub fn reserved_words() -> &'static [&'static str] {
    SCALA_RESERVED_WORDS
}

/// Check against the shared table
pub fn is_reserved(word: &str) -> bool {
    ReservedWords::shared().is_reserved(word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_table_is_built_once() {
        let first = ReservedWords::shared();
        let second = ReservedWords::shared();
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn test_shared_table_across_threads() {
        let addresses: Vec<usize> = (0..4)
            .map(|_| std::thread::spawn(|| ReservedWords::shared() as *const _ as usize))
            .collect::<Vec<_>>()
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect();
        assert!(addresses.windows(2).all(|pair| pair[0] == pair[1]));
    }

    #[test]
    fn test_membership_is_case_sensitive() {
        assert!(is_reserved("val"));
        assert!(is_reserved("forSome"));
        assert!(is_reserved("String"));
        assert!(!is_reserved("Val"));
        assert!(!is_reserved("string"));
        assert!(!is_reserved("forsome"));
        assert!(!is_reserved(""));
    }

    #[test]
    fn test_table_matches_word_list() {
        let table = ReservedWords::shared();
        assert_eq!(table.len(), reserved_words().len());
        assert!(!table.is_empty());
        for word in reserved_words() {
            assert!(table.is_reserved(word), "{} missing", word);
        }
        assert!(table.iter().all(|w| reserved_words().contains(&w)));
    }
}
