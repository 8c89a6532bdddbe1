//! Comment body validation
//!
//! Pure text analysis: every rule runs on every call and issues accumulate
//! in rule order, so the same input always yields the same issue list.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::comment::{OperationKind, MAX_COMMENT_LENGTH};
use crate::markdown::{parse_fence, FenceTracker, LineClass};

/// How serious a validation issue is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Advisory; the operation may still be dispatched
    Warning,
    /// Blocks dispatch of the whole batch
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

/// A problem found while parsing or validating an operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Field the issue is about (`body`, `target`, `reaction`, ...)
    pub field: String,
    /// Human-readable explanation
    pub message: String,
    /// Error or warning
    pub severity: Severity,
    /// Zero-based index of the batch entry, when raised by the parser
    pub operation: Option<usize>,
}

impl ValidationIssue {
    /// An issue that blocks dispatch
    pub fn error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            severity: Severity::Error,
            operation: None,
        }
    }

    /// An advisory issue
    pub fn warning(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            severity: Severity::Warning,
            operation: None,
        }
    }

    /// Attach the batch entry index
    pub fn at(mut self, index: usize) -> Self {
        self.operation = Some(index);
        self
    }

    /// Whether this issue blocks dispatch
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(index) = self.operation {
            write!(f, "{}: comment {}: {}: {}", self.severity, index + 1, self.field, self.message)
        } else {
            write!(f, "{}: {}: {}", self.severity, self.field, self.message)
        }
    }
}

/// Whether any issue in the list blocks dispatch
pub fn has_errors(issues: &[ValidationIssue]) -> bool {
    issues.iter().any(ValidationIssue::is_error)
}

/// Validate a (suggestion-expanded) comment body for an operation kind
pub fn validate(body: &str, kind: OperationKind) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    check_length(body, kind, &mut issues);
    check_suggestion_fences(body, &mut issues);
    check_control_characters(body, &mut issues);
    check_markdown_heuristics(body, &mut issues);
    issues
}

fn check_length(body: &str, kind: OperationKind, issues: &mut Vec<ValidationIssue>) {
    if !kind.has_body() {
        if !body.trim().is_empty() {
            issues.push(ValidationIssue::warning(
                "body",
                format!("body is ignored for {kind} operations"),
            ));
        }
        return;
    }

    if body.trim().is_empty() {
        issues.push(ValidationIssue::error("body", "comment body is empty"));
        return;
    }

    let length = body.chars().count();
    if length > MAX_COMMENT_LENGTH {
        issues.push(ValidationIssue::error(
            "body",
            format!("comment too long: {length} characters (maximum {MAX_COMMENT_LENGTH} allowed)"),
        ));
    }
}

fn check_suggestion_fences(body: &str, issues: &mut Vec<ValidationIssue>) {
    let mut tracker = FenceTracker::new();
    let mut open_line = 0;

    for (number, line) in (1..).zip(body.split_inclusive('\n')) {
        // A second suggestion opener that could have closed the open block
        // means the first one was never closed. Shorter fences inside a
        // longer one are content.
        let reopened = tracker.open_fence().is_some_and(|open| {
            open.is_suggestion()
                && parse_fence(line).is_some_and(|f| {
                    f.is_suggestion() && f.marker == open.marker && f.len >= open.len
                })
        });
        if reopened {
            issues.push(ValidationIssue::error(
                "body",
                format!(
                    "suggestion block opened on line {open_line} is not closed before the next suggestion block on line {number}"
                ),
            ));
            tracker = FenceTracker::new();
        }

        if let LineClass::Open(_) = tracker.classify(line) {
            open_line = number;
        }
    }

    if let Some(fence) = tracker.open_fence() {
        if fence.is_suggestion() {
            issues.push(ValidationIssue::error(
                "body",
                format!("suggestion block opened on line {open_line} is never closed"),
            ));
        } else {
            issues.push(ValidationIssue::warning(
                "body",
                format!("code block opened on line {open_line} is never closed"),
            ));
        }
    }
}

fn is_forbidden_control(c: char) -> bool {
    (c.is_control() && (c as u32) < 0x20 && !matches!(c, '\t' | '\n' | '\r')) || c == '\u{7f}'
}

fn check_control_characters(body: &str, issues: &mut Vec<ValidationIssue>) {
    let mut count = 0usize;
    let mut first: Option<(usize, usize, char)> = None;

    for (line_index, line) in body.split('\n').enumerate() {
        for (column, c) in line.chars().enumerate() {
            if is_forbidden_control(c) {
                count += 1;
                first.get_or_insert((line_index + 1, column + 1, c));
            }
        }
    }

    if let Some((line, column, c)) = first {
        issues.push(ValidationIssue::error(
            "body",
            format!(
                "forbidden control character '{}' at line {line}, column {column} ({count} in total)",
                c.escape_unicode()
            ),
        ));
    }
}

fn check_markdown_heuristics(body: &str, issues: &mut Vec<ValidationIssue>) {
    let mut tracker = FenceTracker::new();
    let mut backtick_runs: BTreeMap<usize, usize> = BTreeMap::new();
    let mut open_block_marker: Option<usize> = None;

    for (number, line) in (1..).zip(body.split_inclusive('\n')) {
        if tracker.classify(line) != LineClass::Text {
            continue;
        }

        let trimmed = line.trim();
        if open_block_marker.is_none() && trimmed.starts_with("<<<SUGGEST") {
            open_block_marker = Some(number);
        } else if trimmed == "SUGGEST>>>" {
            open_block_marker = None;
        }

        let mut chars = line.chars().peekable();
        while let Some(c) = chars.next() {
            if c != '`' {
                continue;
            }
            let mut run = 1;
            while chars.next_if_eq(&'`').is_some() {
                run += 1;
            }
            *backtick_runs.entry(run).or_default() += 1;
        }
    }

    if backtick_runs.values().any(|count| count % 2 != 0) {
        issues.push(ValidationIssue::warning(
            "body",
            "unbalanced inline code backticks",
        ));
    }

    if let Some(start) = body.rfind("<!--") {
        if !body[start..].contains("-->") {
            issues.push(ValidationIssue::warning(
                "body",
                "HTML comment '<!--' is never closed; the rest of the comment will be hidden",
            ));
        }
    }

    if let Some(line) = open_block_marker {
        issues.push(ValidationIssue::warning(
            "body",
            format!("'<<<SUGGEST' on line {line} has no matching 'SUGGEST>>>' and was left as text"),
        ));
    }
}
