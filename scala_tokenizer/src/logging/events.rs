//! Log events emitted by the tokenizer

use super::codes::{self, Code};
use crate::config::constants::compile_time::logging::MAX_LOG_CONTEXT_ENTRIES;
pub use crate::config::runtime::LogLevel;
use std::collections::BTreeMap;
use std::time::SystemTime;

const GENERIC_WARNING: Code = Code::new("W000");
const GENERIC_INFO: Code = Code::new("I000");
const GENERIC_DEBUG: Code = Code::new("D000");

/// Core log event structure
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub timestamp: SystemTime,
    pub level: LogLevel,
    pub code: Code,
    pub message: String,
    /// Source file the event refers to, if any
    pub file: Option<String>,
    /// 1-based source line the event refers to, if any
    pub line: Option<u32>,
    pub context: BTreeMap<String, String>,
}

impl LogEvent {
    fn new(level: LogLevel, code: Code, message: &str) -> Self {
        Self {
            timestamp: SystemTime::now(),
            level,
            code,
            message: message.to_string(),
            file: None,
            line: None,
            context: BTreeMap::new(),
        }
    }

    pub fn error(error_code: Code, message: &str) -> Self {
        Self::new(LogLevel::Error, error_code, message)
    }

    pub fn warning(message: &str) -> Self {
        Self::new(LogLevel::Warning, GENERIC_WARNING, message)
    }

    pub fn warning_with_code(warning_code: Code, message: &str) -> Self {
        Self::new(LogLevel::Warning, warning_code, message)
    }

    pub fn info(message: &str) -> Self {
        Self::new(LogLevel::Info, GENERIC_INFO, message)
    }

    /// Info-level event carrying a success code
    pub fn success(success_code: Code, message: &str) -> Self {
        Self::new(LogLevel::Info, success_code, message)
    }

    pub fn debug(message: &str) -> Self {
        Self::new(LogLevel::Debug, GENERIC_DEBUG, message)
    }

    /// Add a context pair. Pairs beyond the configured cap are dropped.
    pub fn with_context(mut self, key: &str, value: &str) -> Self {
        if self.context.len() < MAX_LOG_CONTEXT_ENTRIES || self.context.contains_key(key) {
            self.context.insert(key.to_string(), value.to_string());
        }
        self
    }

    pub fn with_file(mut self, path: &str) -> Self {
        self.file = Some(path.to_string());
        self
    }

    pub fn with_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    pub fn is_error(&self) -> bool {
        self.level == LogLevel::Error
    }

    pub fn is_warning(&self) -> bool {
        self.level == LogLevel::Warning
    }

    pub fn severity(&self) -> &'static str {
        codes::get_severity(self.code.as_str()).as_str()
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.code.as_str())
    }

    /// Human readable single-line form
    pub fn format(&self) -> String {
        let mut output = format!(
            "[{}] {} - {}",
            self.level.as_str(),
            self.code.as_str(),
            self.message
        );

        match (&self.file, self.line) {
            (Some(file), Some(line)) => output.push_str(&format!(" ({}:{})", file, line)),
            (Some(file), None) => output.push_str(&format!(" ({})", file)),
            (None, Some(line)) => output.push_str(&format!(" (line {})", line)),
            (None, None) => {}
        }

        if !self.context.is_empty() {
            let pairs: Vec<String> = self
                .context
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            output.push_str(&format!(" {{{}}}", pairs.join(", ")));
        }

        output
    }

    /// Format as JSON for structured logging
    pub fn format_json(&self) -> Result<String, serde_json::Error> {
        let timestamp = self
            .timestamp
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        let mut json = serde_json::json!({
            "timestamp": timestamp,
            "level": self.level.as_str(),
            "code": self.code.as_str(),
            "message": self.message,
            "category": self.category(),
            "severity": self.severity(),
        });

        if let Some(file) = &self.file {
            json["file"] = serde_json::Value::String(file.clone());
        }
        if let Some(line) = self.line {
            json["line"] = serde_json::json!(line);
        }
        if !self.context.is_empty() {
            json["context"] = serde_json::to_value(&self.context)?;
        }

        serde_json::to_string(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;

    #[test]
    fn test_error_event_creation() {
        let event = LogEvent::error(codes::file_processing::FILE_NOT_FOUND, "File not found");

        assert!(event.is_error());
        assert_eq!(event.code.as_str(), "E005");
        assert_eq!(event.category(), "FileProcessing");
    }

    #[test]
    fn test_event_formatting_with_location() {
        let event = LogEvent::warning_with_code(
            codes::lexical::UNTERMINATED_COMMENT,
            "Input ended inside a block comment",
        )
        .with_file("Main.scala")
        .with_line(12)
        .with_context("state", "IN_COMMENT");

        let formatted = event.format();
        assert!(formatted.starts_with("[WARN] W022"));
        assert!(formatted.contains("(Main.scala:12)"));
        assert!(formatted.contains("{state=IN_COMMENT}"));
    }

    #[test]
    fn test_context_is_capped() {
        let mut event = LogEvent::info("many");
        for i in 0..(MAX_LOG_CONTEXT_ENTRIES + 5) {
            event = event.with_context(&format!("k{:03}", i), "v");
        }
        assert_eq!(event.context.len(), MAX_LOG_CONTEXT_ENTRIES);
    }

    #[test]
    fn test_json_formatting() {
        let event = LogEvent::error(codes::file_processing::PERMISSION_DENIED, "Access denied")
            .with_file("Secret.scala")
            .with_context("mode", "read");

        let json: serde_json::Value = serde_json::from_str(&event.format_json().unwrap()).unwrap();
        assert_eq!(json["level"], "ERROR");
        assert_eq!(json["code"], "E009");
        assert_eq!(json["file"], "Secret.scala");
        assert_eq!(json["context"]["mode"], "read");
        assert!(json.get("line").is_none());
    }
}
