//! Structured execution log for a single rule run.
//!
//! Lines are collected while a rule resolves and cascades, then rendered into
//! the plain-text log stored on the rule row. Each rendered line ends with a
//! newline; a run that logged nothing renders as `"OK"`.

use serde::{Deserialize, Serialize};

/// Severity level for log lines.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warning,
}

/// Phase of rule execution that produced the line.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionPhase {
    CategoryMatch,
    Cascade,
    CourseTotal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogLine {
    pub level: LogLevel,
    pub phase: ExecutionPhase,
    pub message: String,
}

/// Ordered log lines of one rule run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleLog {
    lines: Vec<LogLine>,
}

impl RuleLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, level: LogLevel, phase: ExecutionPhase, message: impl Into<String>) {
        self.lines.push(LogLine {
            level,
            phase,
            message: message.into(),
        });
    }

    pub fn info(&mut self, phase: ExecutionPhase, message: impl Into<String>) {
        self.push(LogLevel::Info, phase, message);
    }

    pub fn warn(&mut self, phase: ExecutionPhase, message: impl Into<String>) {
        self.push(LogLevel::Warning, phase, message);
    }

    /// Move every line of `other` to the end of this log.
    pub fn append(&mut self, other: &mut RuleLog) {
        self.lines.append(&mut other.lines);
    }

    pub fn lines(&self) -> &[LogLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Text stored on the rule row.
    pub fn render(&self) -> String {
        if self.lines.is_empty() {
            return "OK".to_string();
        }
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(&line.message);
            out.push('\n');
        }
        out
    }
}
