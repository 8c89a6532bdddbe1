//! Failure classification and remediation guidance
//!
//! When a call fails the engine works out *why* (GitHub answers a reply to a
//! review-thread comment with a bare 404, for example) and turns that into a
//! plan: one primary message plus ranked alternatives, each with a command
//! the user can run as-is.

mod actions;
mod classify;

use std::fmt;
use std::fmt::Write as _;

use serde::Serialize;

use crate::comment::CommentMetadata;

pub use actions::quote_arg;
pub use classify::{candidate, confirm, finalize, Candidate, Classifier};

/// Why an operation failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Reply to a comment that belongs to a multi-comment review
    ThreadReplyUnsupported,
    /// The comment exists but is of the other type (issue vs review)
    CommentTypeMismatch,
    /// Primary or secondary rate limit hit
    RateLimited,
    /// Token lacks access
    PermissionDenied,
    /// Token missing, expired or revoked
    AuthenticationFailed,
    /// Location not in the diff, or payload rejected
    InvalidLocation,
    /// GitHub had an internal error
    ServerError,
    /// Not found, for no more specific reason
    NotFoundGeneric,
    /// Skipped or abandoned because the batch was cancelled
    Cancelled,
    /// Anything else
    Unknown,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FailureKind::ThreadReplyUnsupported => "reply not supported",
            FailureKind::CommentTypeMismatch => "wrong comment type",
            FailureKind::RateLimited => "rate limited",
            FailureKind::PermissionDenied => "permission denied",
            FailureKind::AuthenticationFailed => "authentication failed",
            FailureKind::InvalidLocation => "invalid location",
            FailureKind::ServerError => "server error",
            FailureKind::NotFoundGeneric => "not found",
            FailureKind::Cancelled => "cancelled",
            FailureKind::Unknown => "unexpected error",
        })
    }
}

/// Something the user can do instead
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alternative {
    /// What the action achieves
    pub description: String,
    /// Command line to run
    pub action: String,
}

impl Alternative {
    fn new(description: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            action: action.into(),
        }
    }
}

/// Raw response details kept for failures nobody recognised
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    pub status: Option<u16>,
    pub body: String,
}

/// Guidance for one failed operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemediationPlan {
    pub failure_kind: FailureKind,
    pub primary_message: String,
    /// Ordered, most useful first
    pub alternatives: Vec<Alternative>,
    /// Only set for [`FailureKind::Unknown`]
    pub diagnostics: Option<Diagnostics>,
}

/// What the classifier knew when building a plan
#[derive(Debug, Clone, Default)]
pub struct RemediationContext {
    /// `owner/name` of the repository, when known
    pub repo: Option<String>,
    /// Pull request the batch runs against
    pub pr: u64,
    /// Lookup result for the target comment, when one was made
    pub metadata: Option<CommentMetadata>,
}

impl RemediationContext {
    fn scope(&self) -> actions::Scope<'_> {
        actions::Scope {
            repo: self.repo.as_deref(),
            pr: self.pr,
        }
    }
}

const MAX_DIAGNOSTIC_BODY: usize = 500;

/// Terminal text for a plan: message, numbered alternatives, diagnostics
pub fn render(plan: &RemediationPlan) -> String {
    let mut out = format!("{}: {}\n", plan.failure_kind, plan.primary_message);

    if !plan.alternatives.is_empty() {
        out.push_str("  Alternatives:\n");
        for (number, alternative) in (1..).zip(&plan.alternatives) {
            let _ = writeln!(out, "    {number}. {}", alternative.description);
            let _ = writeln!(out, "       $ {}", alternative.action);
        }
    }

    if let Some(diagnostics) = &plan.diagnostics {
        if let Some(status) = diagnostics.status {
            let _ = writeln!(out, "  Status: {status}");
        }
        if !diagnostics.body.is_empty() {
            let body: String = diagnostics.body.chars().take(MAX_DIAGNOSTIC_BODY).collect();
            let ellipsis = if diagnostics.body.chars().count() > MAX_DIAGNOSTIC_BODY {
                "..."
            } else {
                ""
            };
            let _ = writeln!(out, "  Response: {}{ellipsis}", body.trim_end());
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_numbers_alternatives() {
        let plan = RemediationPlan {
            failure_kind: FailureKind::NotFoundGeneric,
            primary_message: "comment #5 was not found".to_string(),
            alternatives: vec![
                Alternative::new("List comments", "gh comment list --pr 1"),
                Alternative::new("Try the other type", "gh comment react 5 +1 --type issue"),
            ],
            diagnostics: None,
        };

        let text = render(&plan);
        assert_eq!(
            text,
            "not found: comment #5 was not found\n  Alternatives:\n    1. List comments\n       $ gh comment list --pr 1\n    2. Try the other type\n       $ gh comment react 5 +1 --type issue\n"
        );
    }

    #[test]
    fn test_render_unknown_includes_diagnostics() {
        let plan = RemediationPlan {
            failure_kind: FailureKind::Unknown,
            primary_message: "unexpected response".to_string(),
            alternatives: Vec::new(),
            diagnostics: Some(Diagnostics {
                status: Some(418),
                body: "x".repeat(MAX_DIAGNOSTIC_BODY + 10),
            }),
        };

        let text = render(&plan);
        assert!(text.contains("Status: 418"));
        assert!(text.ends_with("...\n"));
        assert!(!text.contains("Alternatives"));
    }
}
