//! Batch comment specifications
//!
//! A batch file describes many comment operations at once:
//!
//! ```yaml
//! pr: 42
//! defaults:
//!   file: src/lib.rs
//! comments:
//!   - line: 10
//!     body: "nit: rename\nsuggest: new_name"
//!   - reply_to: 123456
//!     body: Fixed in the latest commit
//!   - kind: react
//!     comment: 123456
//!     reaction: "+1"
//!   - kind: edit
//!     comment: 123457
//!     body: Typo fixed
//! ```
//!
//! [`Parser`] turns the file into a [`BatchSpec`] of fully expanded and
//! validated operations, or reports every problem it found.

mod parser;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::comment::{CommentOperation, CommentType, OperationKind, Side};
use crate::validate::ValidationIssue;

pub use parser::{parse, validate_file_path, ParseOptions, Parser};

/// Errors that make a batch file unreadable as a whole
#[derive(Error, Debug)]
pub enum ParseError {
    /// Batch file could not be read
    #[error("Failed to read batch file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Batch input is not UTF-8
    #[error("Batch file is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    /// Malformed YAML/JSON, wrong field types or unknown fields
    #[error("Invalid batch file: {0}")]
    Syntax(#[from] serde_yaml::Error),
}

/// Values applied to entries that leave them out
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatchDefaults {
    /// File for `add` entries without a location
    pub file: Option<String>,
    /// Line for `add` entries without a line or range
    pub line: Option<u32>,
    /// Comment type for every entry without `type`
    #[serde(rename = "type")]
    pub comment_type: Option<CommentType>,
}

/// A batch file as written by the user
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatchDocument {
    /// Pull request number
    #[serde(default)]
    pub pr: Option<u64>,
    /// Repository as `owner/name`
    #[serde(default)]
    pub repo: Option<String>,
    /// Expand suggestion markers (default true)
    #[serde(default)]
    pub expand_suggestions: Option<bool>,
    /// Values for entries that leave them out
    #[serde(default)]
    pub defaults: BatchDefaults,
    /// Operations, in dispatch order
    #[serde(default, alias = "operations")]
    pub comments: Vec<BatchEntry>,
}

/// Where an entry points when given as a single `target` value
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TargetRef {
    /// A comment id
    Id(u64),
    /// `path:line`, `path:start-end`, or a comment id as text
    Text(String),
}

/// One operation as written in the batch file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatchEntry {
    /// Explicit operation kind; derived from the other fields when absent
    #[serde(default)]
    pub kind: Option<OperationKind>,
    /// `path:line`, `path:start-end` or a comment id
    #[serde(default)]
    pub target: Option<TargetRef>,
    /// File path for line comments
    #[serde(default)]
    pub file: Option<String>,
    /// Single line
    #[serde(default)]
    pub line: Option<u32>,
    /// Line range, `"10-15"`
    #[serde(default)]
    pub range: Option<String>,
    /// Diff side
    #[serde(default)]
    pub side: Option<Side>,
    /// Comment text
    #[serde(default, alias = "message")]
    pub body: Option<String>,
    /// Comment to reply to
    #[serde(default)]
    pub reply_to: Option<u64>,
    /// Comment to react to or resolve
    #[serde(default)]
    pub comment: Option<u64>,
    /// Reaction content (`+1`, `heart`, ...)
    #[serde(default)]
    pub reaction: Option<String>,
    /// Remove `reaction` instead of adding it
    #[serde(default)]
    pub remove: Option<bool>,
    /// Resolve the thread of `comment`
    #[serde(default)]
    pub resolve: Option<bool>,
    /// Comment type
    #[serde(default, rename = "type")]
    pub comment_type: Option<CommentType>,
}

impl BatchEntry {
    /// The operation kind, explicit or derived from which fields are present
    ///
    /// Edits are never derived; they need `kind: edit`.
    pub fn effective_kind(&self) -> OperationKind {
        if let Some(kind) = self.kind {
            kind
        } else if self.reply_to.is_some() {
            OperationKind::Reply
        } else if self.reaction.is_some() {
            OperationKind::React
        } else if self.resolve == Some(true) {
            OperationKind::Resolve
        } else {
            OperationKind::Add
        }
    }
}

/// Validated, expanded operations ready for dispatch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSpec {
    /// Pull request number from the batch file
    pub pr: Option<u64>,
    /// Repository from the batch file
    pub repo: Option<String>,
    /// Defaults the entries were completed with
    pub defaults: BatchDefaults,
    /// Operations in file order
    pub operations: Vec<CommentOperation>,
}

impl BatchSpec {
    /// Number of operations
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Whether there is nothing to dispatch
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

/// Outcome of parsing: the spec plus every issue found
///
/// When any issue is an error the spec holds no operations.
#[derive(Debug, Clone, Default)]
pub struct ParsedBatch {
    pub spec: BatchSpec,
    pub issues: Vec<ValidationIssue>,
}

impl ParsedBatch {
    /// Whether the batch was rejected
    pub fn has_errors(&self) -> bool {
        crate::validate::has_errors(&self.issues)
    }

    /// Only the warnings
    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|issue| !issue.is_error())
    }
}

