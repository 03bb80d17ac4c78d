//! Single-pass scanner over raw source bytes
//!
//! The scan runs a small state machine over normalized bytes, collecting
//! a pending lexeme that is classified and emitted whenever a state
//! boundary is crossed. Adjacent operators are merged in a second pass.

use super::merge::merge_operators;
use super::state::{classify, is_identifier_byte, is_number_byte, LineTracker, ScanMode, CR, LF};
use crate::config::constants::compile_time::lexical::{
    BYTES_PER_TOKEN_ESTIMATE, MAX_INITIAL_TOKEN_CAPACITY, PENDING_BUFFER_CAPACITY,
};
use crate::config::runtime::LexicalPreferences;
use crate::keywords::ReservedWords;
use crate::logging::{codes, Code};
use crate::tokens::Token;
use crate::{log_debug, log_success, log_warning};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::time::{Duration, Instant};

/// A string, char literal or block comment still open at end of input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnterminatedConstruct {
    pub mode: ScanMode,
    /// Line on which the construct was opened
    pub line: u32,
}

impl UnterminatedConstruct {
    pub fn code(&self) -> Code {
        match self.mode {
            ScanMode::InChar => codes::lexical::UNTERMINATED_CHAR,
            ScanMode::InComment => codes::lexical::UNTERMINATED_COMMENT,
            _ => codes::lexical::UNTERMINATED_STRING,
        }
    }
}

/// Figures gathered during the most recent scan
#[derive(Debug, Default, Clone)]
pub struct LexicalMetrics {
    pub bytes_scanned: usize,
    /// Value of the line counter when input ran out
    pub line_count: u32,
    /// Tokens emitted before operator merging
    pub raw_tokens: usize,
    pub total_tokens: usize,
    /// Operator tokens folded into a preceding operator
    pub absorbed_operators: usize,
    pub block_comments: usize,
    pub line_comments: usize,
    pub string_literals: usize,
    pub char_literals: usize,
    pub unterminated: Option<UnterminatedConstruct>,
    pub scan_duration: Duration,

    // Only filled when operator tracking is enabled
    pub operator_usage_patterns: BTreeMap<String, usize>,
}

impl LexicalMetrics {
    fn record_opened(&mut self, mode: ScanMode) {
        match mode {
            ScanMode::InComment => self.block_comments += 1,
            ScanMode::InLineComment => self.line_comments += 1,
            ScanMode::InString => self.string_literals += 1,
            ScanMode::InChar => self.char_literals += 1,
            ScanMode::Regular | ScanMode::InNumber => {}
        }
    }

    fn record_operators(&mut self, tokens: &[Token]) {
        for token in tokens.iter().filter(|t| t.is_operator()) {
            *self
                .operator_usage_patterns
                .entry(token.value().to_string())
                .or_insert(0) += 1;
        }
    }

    /// Bytes per millisecond for the last scan
    pub fn scan_rate(&self) -> f64 {
        let millis = self.scan_duration.as_secs_f64() * 1000.0;
        if millis > 0.0 {
            self.bytes_scanned as f64 / millis
        } else {
            0.0
        }
    }
}

/// Converts source text into classified, line-numbered tokens.
///
/// Each instance owns its token sequence; use one instance per thread.
/// The reserved-word table is the only state shared between instances.
pub struct Scanner {
    reserved: &'static ReservedWords,
    tokens: Vec<Token>,
    metrics: LexicalMetrics,
    preferences: LexicalPreferences,
}

impl Scanner {
    pub fn new() -> Self {
        Self::with_preferences(LexicalPreferences::default())
    }

    pub fn with_preferences(preferences: LexicalPreferences) -> Self {
        Self {
            reserved: ReservedWords::shared(),
            tokens: Vec::new(),
            metrics: LexicalMetrics::default(),
            preferences,
        }
    }

    /// Scan `source`, replacing any tokens from a previous call.
    ///
    /// Never fails. Unterminated strings, char literals and block comments
    /// swallow the rest of the input.
    pub fn parse(&mut self, source: impl AsRef<[u8]>) -> &[Token] {
        let source = source.as_ref();
        let started = Instant::now();

        log_debug!("Starting lexical scan", "bytes" => source.len());

        let mut state = ScanState::new(self.reserved, source.len());
        state.run(source);
        let outcome = state.finish();

        let raw_tokens = outcome.tokens.len();
        let (tokens, absorbed) = merge_operators(outcome.tokens);

        let mut metrics = outcome.metrics;
        metrics.bytes_scanned = source.len();
        metrics.raw_tokens = raw_tokens;
        metrics.total_tokens = tokens.len();
        metrics.absorbed_operators = absorbed;
        if !self.preferences.collect_detailed_metrics {
            metrics.block_comments = 0;
            metrics.line_comments = 0;
            metrics.string_literals = 0;
            metrics.char_literals = 0;
        }
        if self.preferences.track_operator_patterns {
            metrics.record_operators(&tokens);
        }
        metrics.scan_duration = started.elapsed();

        if let Some(open) = metrics.unterminated {
            if self.preferences.warn_on_unterminated {
                log_warning!(open.code(), "Input ended inside an unterminated construct",
                    line = open.line,
                    "state" => open.mode,
                    "last_line" => metrics.line_count
                );
            }
        }

        log_success!(codes::success::TOKENIZATION_COMPLETE,
            "Lexical scan completed",
            "bytes" => metrics.bytes_scanned,
            "lines" => metrics.line_count,
            "raw_tokens" => raw_tokens,
            "tokens" => metrics.total_tokens,
            "absorbed_operators" => absorbed,
            "bytes_per_ms" => format!("{:.2}", metrics.scan_rate())
        );

        self.tokens = tokens;
        self.metrics = metrics;
        &self.tokens
    }

    /// Tokens from the most recent [`parse`](Self::parse)
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    /// Every token in "show" form, one per line
    pub fn show_tokens(&self) -> String {
        let mut output = String::with_capacity(self.tokens.len() * 16);
        for token in &self.tokens {
            let _ = writeln!(output, "{}", token);
        }
        output
    }

    pub fn metrics(&self) -> &LexicalMetrics {
        &self.metrics
    }

    pub fn preferences(&self) -> &LexicalPreferences {
        &self.preferences
    }
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// SCAN STATE
// ============================================================================

/// Result of dispatching one byte: the byte as it should be remembered
/// for the next step, and how many input bytes were consumed.
struct Step {
    processed: u8,
    consumed: usize,
}

impl Step {
    fn one(processed: u8) -> Self {
        Self {
            processed,
            consumed: 1,
        }
    }

    /// The lookahead byte belongs to this step too
    fn two(processed: u8) -> Self {
        Self {
            processed,
            consumed: 2,
        }
    }
}

struct ScanOutcome {
    tokens: Vec<Token>,
    metrics: LexicalMetrics,
}

/// State owned by a single `parse` call
struct ScanState<'r> {
    reserved: &'r ReservedWords,
    mode: ScanMode,
    pending: Vec<u8>,
    pending_line: u32,
    lines: LineTracker,
    previous: Option<u8>,
    /// Line on which the current string, char or comment was opened
    opened_at: u32,
    tokens: Vec<Token>,
    metrics: LexicalMetrics,
}

impl<'r> ScanState<'r> {
    fn new(reserved: &'r ReservedWords, source_len: usize) -> Self {
        Self {
            reserved,
            mode: ScanMode::Regular,
            pending: Vec::with_capacity(PENDING_BUFFER_CAPACITY),
            pending_line: 1,
            lines: LineTracker::new(),
            previous: None,
            opened_at: 1,
            tokens: Vec::with_capacity(
                (source_len / BYTES_PER_TOKEN_ESTIMATE).min(MAX_INITIAL_TOKEN_CAPACITY),
            ),
            metrics: LexicalMetrics::default(),
        }
    }

    fn run(&mut self, source: &[u8]) {
        let mut i = 0;
        while i < source.len() {
            let raw = source[i];
            let next = source.get(i + 1).copied();
            let previous = self.previous;

            if previous == Some(LF) {
                self.lines.start_line();
            }

            // CRLF: the LF carries the line break. A lone CR acts as LF.
            let current = if raw == CR {
                if next == Some(LF) {
                    self.previous = Some(CR);
                    i += 1;
                    continue;
                }
                LF
            } else {
                raw
            };

            self.lines.track(current);

            let step = self.step(current, previous, next);
            self.previous = Some(step.processed);
            i += step.consumed;
        }
    }

    fn finish(mut self) -> ScanOutcome {
        self.flush();

        if self.mode.swallows_input() {
            self.metrics.unterminated = Some(UnterminatedConstruct {
                mode: self.mode,
                line: self.opened_at,
            });
        }
        self.metrics.line_count = self.lines.line();

        log_debug!("Scan reached end of input",
            "final_state" => self.mode,
            "last_line_blank" => self.lines.first_non_space().is_none(),
            "last_line_ends_with" => self.lines.last_non_space().map(char::from).unwrap_or(' ')
        );

        ScanOutcome {
            tokens: self.tokens,
            metrics: self.metrics,
        }
    }

    fn step(&mut self, current: u8, previous: Option<u8>, next: Option<u8>) -> Step {
        match self.mode {
            ScanMode::InComment => {
                if current == b'*' && next == Some(b'/') {
                    self.mode = ScanMode::Regular;
                    return Step::two(current);
                }
                Step::one(current)
            }
            ScanMode::InLineComment => {
                if current == LF {
                    self.mode = ScanMode::Regular;
                }
                Step::one(current)
            }
            ScanMode::InString => self.quoted(b'"', false, current, previous),
            ScanMode::InChar => self.quoted(b'\'', true, current, previous),
            ScanMode::InNumber => {
                let exponent_sign =
                    matches!(current, b'+' | b'-') && matches!(previous, Some(b'E' | b'e'));
                if is_number_byte(current) || exponent_sign {
                    self.pending.push(current);
                    return Step::one(current);
                }
                self.flush();
                self.mode = ScanMode::Regular;
                self.regular(current, next)
            }
            ScanMode::Regular => self.regular(current, next),
        }
    }

    /// Shared by the REGULAR state and the exit path out of IN_NUMBER
    fn regular(&mut self, current: u8, next: Option<u8>) -> Step {
        match current {
            b'/' if next == Some(b'*') => {
                self.flush();
                self.open(ScanMode::InComment);
                Step::two(current)
            }
            b'/' if next == Some(b'/') => {
                self.flush();
                self.open(ScanMode::InLineComment);
                Step::two(current)
            }
            b'"' => {
                self.flush();
                self.open(ScanMode::InString);
                Step::one(current)
            }
            b'\'' => {
                self.flush();
                self.open(ScanMode::InChar);
                Step::one(current)
            }
            b'0'..=b'9' => {
                self.flush();
                self.mode = ScanMode::InNumber;
                self.push_pending(current);
                Step::one(current)
            }
            byte if is_identifier_byte(byte) => {
                self.push_pending(byte);
                Step::one(current)
            }
            byte => {
                self.flush();
                if byte > b' ' {
                    self.push_pending(byte);
                    self.flush();
                }
                Step::one(current)
            }
        }
    }

    /// String and char bodies. A backslash pair is remembered as a space
    /// so the second backslash cannot escape a following quote.
    fn quoted(&mut self, quote: u8, keep_quote: bool, current: u8, previous: Option<u8>) -> Step {
        if current == quote && previous != Some(b'\\') {
            if keep_quote {
                self.push_pending(quote);
            }
            self.mode = ScanMode::Regular;
            return Step::one(current);
        }
        if current == b'\\' && previous == Some(b'\\') {
            return Step::one(b' ');
        }
        Step::one(current)
    }

    fn open(&mut self, mode: ScanMode) {
        self.mode = mode;
        self.opened_at = self.lines.line();
        self.metrics.record_opened(mode);
    }

    fn push_pending(&mut self, byte: u8) {
        if self.pending.is_empty() {
            self.pending_line = self.lines.line();
        }
        self.pending.push(byte);
    }

    fn flush(&mut self) {
        if let Some(kind) = classify(&self.pending, self.reserved) {
            let value = String::from_utf8_lossy(&self.pending).into_owned();
            self.tokens.push(Token::new(kind, value, self.pending_line));
        }
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::TokenKind;

    fn scan(source: &str) -> Vec<Token> {
        Scanner::new().parse(source).to_vec()
    }

    fn tok(kind: TokenKind, value: &str, line: u32) -> Token {
        Token::new(kind, value, line)
    }

    fn values(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.value()).collect()
    }

    #[test]
    fn test_val_declaration() {
        assert_eq!(
            scan("val x = 10"),
            vec![
                tok(TokenKind::Reserved, "val", 1),
                tok(TokenKind::Identifier, "x", 1),
                tok(TokenKind::Operator, "=", 1),
                tok(TokenKind::Literal, "10", 1),
            ]
        );
    }

    #[test]
    fn test_crlf_counts_once() {
        assert_eq!(
            scan("a\r\nb"),
            vec![
                tok(TokenKind::Identifier, "a", 1),
                tok(TokenKind::Identifier, "b", 2),
            ]
        );
    }

    #[test]
    fn test_lone_cr_and_lf_count_once() {
        let tokens = scan("a\rb\nc\r\n\r\nd");
        let lines: Vec<u32> = tokens.iter().map(|t| t.line()).collect();
        assert_eq!(values(&tokens), vec!["a", "b", "c", "d"]);
        assert_eq!(lines, vec![1, 2, 3, 5]);
    }

    #[test]
    fn test_adjacent_operators_merge() {
        assert_eq!(
            scan("a+-b"),
            vec![
                tok(TokenKind::Identifier, "a", 1),
                tok(TokenKind::Operator, "+-", 1),
                tok(TokenKind::Identifier, "b", 1),
            ]
        );
    }

    #[test]
    fn test_hard_punctuation_stays_standalone() {
        assert_eq!(
            scan("f();"),
            vec![
                tok(TokenKind::Identifier, "f", 1),
                tok(TokenKind::Operator, "(", 1),
                tok(TokenKind::Operator, ")", 1),
                tok(TokenKind::Operator, ";", 1),
            ]
        );
    }

    #[test]
    fn test_string_body_produces_no_token() {
        let tokens = scan(r#"println("say \"hi\"")"#);
        assert_eq!(values(&tokens), vec!["println", "(", ")"]);
        assert!(tokens.iter().all(|t| t.kind() != TokenKind::Literal));
    }

    #[test]
    fn test_doubled_backslash_does_not_escape_quote() {
        let tokens = scan(r#"f("\\", x)"#);
        assert_eq!(values(&tokens), vec!["f", "(", ",", "x", ")"]);
    }

    #[test]
    fn test_reparse_replaces_tokens() {
        let mut scanner = Scanner::new();
        scanner.parse("class A { def f = 1 }");
        assert!(scanner.tokens().len() > 3);

        let second = scanner.parse("b").to_vec();
        assert_eq!(second, vec![tok(TokenKind::Identifier, "b", 1)]);
        assert_eq!(scanner.tokens(), second.as_slice());

        assert!(scanner.parse("").is_empty());
        assert_eq!(scanner.metrics().line_count, 1);
    }

    #[test]
    fn test_exponent_literal() {
        assert_eq!(
            scan("1.5e-10"),
            vec![tok(TokenKind::Literal, "1.5e-10", 1)]
        );
        assert_eq!(values(&scan("2E+3*x")), vec!["2E+3", "*", "x"]);
    }

    #[test]
    fn test_sign_without_exponent_ends_number() {
        assert_eq!(values(&scan("1-2")), vec!["1", "-", "2"]);
    }

    #[test]
    fn test_number_exit_reprocesses_byte() {
        // The byte ending a number is dispatched again as REGULAR
        assert_eq!(values(&scan("10\"skip\"y")), vec!["10", "y"]);
        assert_eq!(values(&scan("3//c\n4")), vec!["3", "4"]);
        assert_eq!(values(&scan("0x1F")), vec!["0", "x", "1", "F"]);
    }

    #[test]
    fn test_digits_split_identifiers() {
        assert_eq!(
            scan("x1"),
            vec![
                tok(TokenKind::Identifier, "x", 1),
                tok(TokenKind::Literal, "1", 1),
            ]
        );
    }

    #[test]
    fn test_comments_are_discarded() {
        let tokens = scan("a /* b\n c */ d // e\nf");
        assert_eq!(values(&tokens), vec!["a", "d", "f"]);
        assert_eq!(tokens[1].line(), 2);
        assert_eq!(tokens[2].line(), 3);
    }

    #[test]
    fn test_lone_cr_ends_line_comment() {
        assert_eq!(scan("//c\rx"), vec![tok(TokenKind::Identifier, "x", 2)]);
        assert_eq!(scan("//c\r\nx"), vec![tok(TokenKind::Identifier, "x", 2)]);
    }

    #[test]
    fn test_comment_opener_is_not_closer() {
        assert_eq!(values(&scan("/*/ x */y")), vec!["y"]);
    }

    #[test]
    fn test_char_literal_keeps_closing_quote_only() {
        let tokens = scan("x 'a' y");
        assert_eq!(
            tokens,
            vec![
                tok(TokenKind::Identifier, "x", 1),
                tok(TokenKind::Operator, "'", 1),
                tok(TokenKind::Identifier, "y", 1),
            ]
        );
        assert_eq!(values(&scan(r"'\''")), vec!["'"]);
    }

    #[test]
    fn test_char_quote_merges_with_following_operator() {
        assert_eq!(values(&scan("f('x')")), vec!["f", "(", "')"]);
    }

    #[test]
    fn test_chained_operator_merge() {
        assert_eq!(values(&scan("a<=>b")), vec!["a", "<=>", "b"]);
        assert_eq!(values(&scan("a+(b)")), vec!["a", "+(", "b", ")"]);
    }

    #[test]
    fn test_token_line_is_line_of_first_byte() {
        let tokens = scan("x\n  +\n\n  yy");
        let lines: Vec<u32> = tokens.iter().map(|t| t.line()).collect();
        assert_eq!(lines, vec![1, 2, 4]);
    }

    #[test]
    fn test_line_numbers_non_decreasing() {
        let source = "object Main {\r\n  def main(args: Array[String]): Unit = {\r\n    /* c\r\n */ println(\"x\\\"y\")\r\n  }\r\n}\r\n";
        let tokens = scan(source);
        assert!(tokens.windows(2).all(|w| w[0].line() <= w[1].line()));
        assert_eq!(tokens.last().map(|t| t.line()), Some(6));
    }

    #[test]
    fn test_high_bytes_continue_identifiers() {
        let tokens = scan("val café = 1");
        assert_eq!(tokens[1], tok(TokenKind::Identifier, "café", 1));
        assert_eq!(tokens[0].kind(), TokenKind::Reserved);
    }

    #[test]
    fn test_invalid_utf8_is_tolerated() {
        let mut scanner = Scanner::new();
        let tokens = scanner.parse([b'a', 0xFF, b' ', b'+', 0x00, b'b']).to_vec();
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].kind(), TokenKind::Identifier);
        assert_eq!(tokens[1].value(), "+");
        assert_eq!(tokens[2].value(), "b");
    }

    #[test]
    fn test_unterminated_constructs_swallow_input() {
        let mut scanner = Scanner::new();

        assert_eq!(values(scanner.parse("a \"never closed ; b")), vec!["a"]);
        assert_eq!(
            scanner.metrics().unterminated,
            Some(UnterminatedConstruct {
                mode: ScanMode::InString,
                line: 1
            })
        );

        assert_eq!(values(scanner.parse("a\n/* open\n b")), vec!["a"]);
        let open = scanner.metrics().unterminated.unwrap();
        assert_eq!(open.line, 2);
        assert_eq!(open.code(), codes::lexical::UNTERMINATED_COMMENT);

        assert_eq!(values(scanner.parse("x // trailing")), vec!["x"]);
        assert_eq!(scanner.metrics().unterminated, None);
    }

    #[test]
    fn test_trailing_pending_is_flushed() {
        assert_eq!(values(&scan("return value")), vec!["return", "value"]);
        assert_eq!(values(&scan("42")), vec!["42"]);
    }

    #[test]
    fn test_metrics_and_show_output() {
        let prefs = LexicalPreferences {
            collect_detailed_metrics: true,
            track_operator_patterns: true,
            warn_on_unterminated: false,
        };
        let mut scanner = Scanner::with_preferences(prefs);
        scanner.parse("// c\nx += \"s\" /* b */\ny += 1\nz = 'a'\n");

        let metrics = scanner.metrics();
        assert_eq!(metrics.line_comments, 1);
        assert_eq!(metrics.block_comments, 1);
        assert_eq!(metrics.string_literals, 1);
        assert_eq!(metrics.char_literals, 1);
        assert_eq!(metrics.operator_usage_patterns.get("+="), Some(&2));
        assert_eq!(metrics.operator_usage_patterns.get("='"), Some(&1));
        assert_eq!(metrics.raw_tokens, 10);
        assert_eq!(metrics.total_tokens, 7);
        assert_eq!(metrics.absorbed_operators, 3);
        assert_eq!(metrics.line_count, 4);

        let shown = scanner.show_tokens();
        assert!(shown.starts_with("2: IDENTIFIER x\n2: OPERATOR +=\n"));
        assert!(shown.ends_with("4: IDENTIFIER z\n4: OPERATOR ='\n"));
    }

    #[test]
    fn test_token_bytes_account_for_input() {
        // (input, bytes carried by tokens)
        let samples: [(&[u8], usize); 6] = [
            (b"", 0),
            (b"\r\r\n\n", 0),
            (b"''\"\"/**/", 1),
            (b"a.b(c)[d]{e};f", 14),
            (b"1e+e-E+.5", 9),
            (b"x = \"str\" // c", 2),
        ];
        for (sample, expected) in samples {
            let tokens = Scanner::new().parse(sample).to_vec();
            let covered: usize = tokens.iter().map(|t| t.value().len()).sum();
            assert!(covered <= sample.len());
            assert_eq!(covered, expected, "input {:?}", String::from_utf8_lossy(sample));
        }
    }

    #[test]
    fn test_initial_token_capacity_is_bounded() {
        let state = ScanState::new(ReservedWords::shared(), 10 * 1024 * 1024);
        assert!(state.tokens.capacity() <= MAX_INITIAL_TOKEN_CAPACITY);

        let small = ScanState::new(ReservedWords::shared(), 40);
        assert!(small.tokens.capacity() >= 40 / BYTES_PER_TOKEN_ESTIMATE);
    }

    #[test]
    fn test_unterminated_comment_is_logged_with_line_and_file() {
        let memory = crate::logging::test_memory_logger();

        crate::logging::with_file_context("Unterminated.scala", || {
            Scanner::new().parse("a\n/* open");
        });

        let event = memory
            .get_events_with_code(codes::lexical::UNTERMINATED_COMMENT)
            .into_iter()
            .find(|e| e.file.as_deref() == Some("Unterminated.scala"))
            .expect("unterminated comment warning");
        assert!(event.is_warning());
        assert_eq!(event.line, Some(2));
        assert_eq!(event.context.get("state").map(String::as_str), Some("IN_COMMENT"));
        assert!(memory.has_event_with_code(codes::lexical::UNTERMINATED_COMMENT));
    }

    #[test]
    fn test_unterminated_char_uses_char_code() {
        let memory = crate::logging::test_memory_logger();

        crate::logging::with_file_context("OpenChar.scala", || {
            Scanner::new().parse("x = 'a");
        });

        assert!(memory
            .get_events_with_code(codes::lexical::UNTERMINATED_CHAR)
            .iter()
            .any(|e| e.file.as_deref() == Some("OpenChar.scala") && e.line == Some(1)));
    }

    #[test]
    fn test_scanners_on_many_threads() {
        let handles: Vec<_> = (0..4)
            .map(|i| {
                std::thread::spawn(move || {
                    let mut scanner = Scanner::new();
                    scanner.parse(format!("val v{} = {}", "x".repeat(i + 1), i)).to_vec()
                })
            })
            .collect();
        for (i, handle) in handles.into_iter().enumerate() {
            let tokens = handle.join().unwrap();
            assert_eq!(tokens[0], tok(TokenKind::Reserved, "val", 1));
            assert_eq!(tokens[3].value(), i.to_string());
        }
    }
}
