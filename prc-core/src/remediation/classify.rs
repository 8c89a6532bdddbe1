//! Candidate → confirm → finalize classification pipeline

use std::sync::Arc;

use tracing::{debug, warn};

use super::actions;
use super::{Alternative, Diagnostics, FailureKind, RemediationContext, RemediationPlan};
use crate::client::{ApiFailure, CommentClient};
use crate::comment::{
    CommentMetadata, CommentOperation, CommentTarget, CommentType, OperationKind, Reaction, Side,
};

/// First-phase decision, made from the response alone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Candidate {
    /// The status is enough
    Decided(FailureKind),
    /// A 404 on an existing comment; the comment has to be looked up
    NeedsLookup,
}

/// Classify from status and rate-limit signals only
pub fn candidate(failure: &ApiFailure, op: &CommentOperation) -> Candidate {
    let kind = match failure.status {
        Some(401) => FailureKind::AuthenticationFailed,
        Some(403) if failure.signals_rate_limit() => FailureKind::RateLimited,
        Some(403) => FailureKind::PermissionDenied,
        Some(404) if op.target.comment_id().is_some() => return Candidate::NeedsLookup,
        Some(404) => FailureKind::NotFoundGeneric,
        Some(422) => FailureKind::InvalidLocation,
        Some(429) => FailureKind::RateLimited,
        Some(status) if (500..600).contains(&status) => FailureKind::ServerError,
        _ => FailureKind::Unknown,
    };
    Candidate::Decided(kind)
}

/// Settle a 404 using what the service knows about the target comment
///
/// `metadata` is `None` when the comment does not exist or the lookup failed.
pub fn confirm(
    candidate: Candidate,
    op: &CommentOperation,
    metadata: Option<&CommentMetadata>,
) -> FailureKind {
    match (candidate, metadata) {
        (Candidate::Decided(kind), _) => kind,
        (Candidate::NeedsLookup, None) => FailureKind::NotFoundGeneric,
        (Candidate::NeedsLookup, Some(found)) if found.comment_type != op.metadata.comment_type => {
            FailureKind::CommentTypeMismatch
        }
        (Candidate::NeedsLookup, Some(found))
            if op.kind == OperationKind::Reply && !found.is_standalone =>
        {
            FailureKind::ThreadReplyUnsupported
        }
        (Candidate::NeedsLookup, Some(_)) => FailureKind::NotFoundGeneric,
    }
}

/// Build the plan for a classified failure
pub fn finalize(
    kind: FailureKind,
    op: &CommentOperation,
    failure: &ApiFailure,
    context: &RemediationContext,
) -> RemediationPlan {
    let scope = context.scope();
    let (primary_message, alternatives) = match kind {
        FailureKind::ThreadReplyUnsupported => thread_reply_unsupported(op, context),
        FailureKind::CommentTypeMismatch => comment_type_mismatch(op, context),
        FailureKind::RateLimited => {
            let reset = failure
                .rate_limit
                .as_ref()
                .and_then(|limit| limit.reset_at)
                .map(|at| format!(" (resets at {})", at.format("%H:%M:%S UTC")))
                .unwrap_or_default();
            (
                format!("GitHub API rate limit exceeded{reset}"),
                vec![
                    Alternative::new(
                        "Wait for the limit to reset, then run this operation again",
                        actions::rerun(op, scope, None),
                    ),
                    Alternative::new("Check your remaining quota", "gh api rate_limit"),
                ],
            )
        }
        FailureKind::PermissionDenied => (
            format!(
                "GitHub refused access while trying to {}: {}",
                op.kind.command(),
                failure.message
            ),
            vec![
                Alternative::new(
                    "Make sure the token has write access to pull requests",
                    "gh auth refresh --scopes repo",
                ),
                Alternative::new("Check which account and scopes are in use", "gh auth status"),
            ],
        ),
        FailureKind::AuthenticationFailed => (
            "GitHub rejected the credentials (token missing, expired or revoked)".to_string(),
            vec![
                Alternative::new("Log in again", "gh auth login"),
                Alternative::new(
                    "Provide a personal access token instead",
                    "export GITHUB_TOKEN=<token>",
                ),
            ],
        ),
        FailureKind::InvalidLocation => invalid_location(op, failure, context),
        FailureKind::ServerError => (
            format!(
                "GitHub returned a server error (HTTP {})",
                failure.status.unwrap_or(500)
            ),
            vec![
                Alternative::new("Run this operation again later", actions::rerun(op, scope, None)),
                Alternative::new(
                    "Check GitHub's status page for incidents",
                    "gh api https://www.githubstatus.com/api/v2/status.json",
                ),
            ],
        ),
        FailureKind::NotFoundGeneric => not_found(op, context),
        FailureKind::Cancelled => (
            format!("{} was not completed: {}", op.summary(), failure.message),
            vec![Alternative::new(
                "Run this operation on its own",
                actions::rerun(op, scope, None),
            )],
        ),
        FailureKind::Unknown => (
            format!("unexpected response from GitHub: {failure}"),
            Vec::new(),
        ),
    };

    let diagnostics = (kind == FailureKind::Unknown).then(|| Diagnostics {
        status: failure.status,
        body: failure.body.clone(),
    });

    RemediationPlan {
        failure_kind: kind,
        primary_message,
        alternatives,
        diagnostics,
    }
}

fn thread_reply_unsupported(
    op: &CommentOperation,
    context: &RemediationContext,
) -> (String, Vec<Alternative>) {
    let scope = context.scope();
    let id = op.target.comment_id().unwrap_or_default();
    let location = context.metadata.as_ref().and_then(|m| {
        let path = m.path.as_deref()?;
        let line = m.line?;
        Some((path, line.to_string()))
    });
    let where_ = location
        .as_ref()
        .map(|(path, line)| format!(" ({path}:{line})"))
        .unwrap_or_default();

    (
        format!(
            "comment #{id} is part of a multi-comment review thread; GitHub does not accept direct replies to it"
        ),
        vec![
            Alternative::new(
                format!("Add a new comment at the same location{where_}"),
                actions::add_line(scope, location, &op.body),
            ),
            Alternative::new(
                "React to the original comment",
                actions::react(scope, id, Reaction::PlusOne, op.metadata.comment_type, false),
            ),
            Alternative::new(
                "Resolve the conversation instead",
                actions::resolve(scope, id),
            ),
            Alternative::new(
                "Post a general pull request comment",
                actions::add_general(scope, &op.body),
            ),
        ],
    )
}

fn comment_type_mismatch(
    op: &CommentOperation,
    context: &RemediationContext,
) -> (String, Vec<Alternative>) {
    let scope = context.scope();
    let id = op.target.comment_id().unwrap_or_default();
    let expected = op.metadata.comment_type;
    let actual = context
        .metadata
        .as_ref()
        .map(|m| m.comment_type)
        .unwrap_or(expected.other());
    let message = format!(
        "comment #{id} is {} comment, not {} comment",
        article(actual),
        article(expected)
    );

    if op.kind == OperationKind::Resolve {
        return (
            format!("{message}; only review threads can be resolved"),
            vec![
                Alternative::new(
                    "React to the comment instead",
                    actions::react(scope, id, Reaction::PlusOne, actual, false),
                ),
                Alternative::new("List comments with their types", actions::list(scope)),
            ],
        );
    }

    (
        message,
        vec![
            Alternative::new(
                format!("Run the operation again with --type {actual}"),
                actions::rerun(op, scope, Some(actual)),
            ),
            Alternative::new("List comments with their types", actions::list(scope)),
        ],
    )
}

fn article(comment_type: CommentType) -> &'static str {
    match comment_type {
        CommentType::Review => "a review",
        CommentType::Issue => "an issue",
    }
}

fn invalid_location(
    op: &CommentOperation,
    failure: &ApiFailure,
    context: &RemediationContext,
) -> (String, Vec<Alternative>) {
    let scope = context.scope();
    match &op.target {
        CommentTarget::Line { path, range, side } => {
            let mut lines = actions::lines(scope, path);
            if *side == Side::Left {
                lines.push_str(" --left");
            }
            (
                format!(
                    "{path}:{range} is not part of the pull request diff ({})",
                    failure.message
                ),
                vec![
                    Alternative::new("Show the lines of the file that accept comments", lines),
                    Alternative::new(
                        "Post a general pull request comment instead",
                        actions::add_general(scope, &op.body),
                    ),
                ],
            )
        }
        _ => (
            format!("GitHub rejected the request as invalid: {}", failure.message),
            vec![Alternative::new(
                "List comments to check the target",
                actions::list(scope),
            )],
        ),
    }
}

fn not_found(op: &CommentOperation, context: &RemediationContext) -> (String, Vec<Alternative>) {
    let scope = context.scope();
    let pr = context.pr;
    match op.target.comment_id() {
        Some(id) => (
            format!("comment #{id} was not found on pull request #{pr}"),
            vec![
                Alternative::new("List comments to find the right id", actions::list(scope)),
                Alternative::new(
                    format!(
                        "If it is {} comment, run again with --type {}",
                        article(op.metadata.comment_type.other()),
                        op.metadata.comment_type.other()
                    ),
                    actions::rerun(op, scope, Some(op.metadata.comment_type.other())),
                ),
            ],
        ),
        None => (
            format!("pull request #{pr} was not found, or the token cannot see it"),
            vec![Alternative::new(
                "Check that the pull request exists",
                actions::view_pr(scope),
            )],
        ),
    }
}

/// Runs the full pipeline, looking up comment metadata when needed
#[derive(Clone)]
pub struct Classifier {
    client: Arc<dyn CommentClient>,
    repo: Option<String>,
    pr: u64,
}

impl Classifier {
    /// Create a classifier for a pull request
    pub fn new(client: Arc<dyn CommentClient>, pr: u64) -> Self {
        Self {
            client,
            repo: None,
            pr,
        }
    }

    /// Name the `owner/name` repository in suggested commands
    pub fn with_repo(mut self, repo: impl Into<String>) -> Self {
        self.repo = Some(repo.into());
        self
    }

    /// Classify a failed operation and build its plan
    pub async fn classify(&self, op: &CommentOperation, failure: &ApiFailure) -> RemediationPlan {
        let candidate = candidate(failure, op);
        let metadata = match (candidate, op.target.comment_id()) {
            (Candidate::NeedsLookup, Some(id)) => self.lookup(id).await,
            _ => None,
        };
        let kind = confirm(candidate, op, metadata.as_ref());
        debug!(?candidate, %kind, status = ?failure.status, "Classified failure");

        let context = RemediationContext {
            repo: self.repo.clone(),
            pr: self.pr,
            metadata,
        };
        finalize(kind, op, failure, &context)
    }

    async fn lookup(&self, comment_id: u64) -> Option<CommentMetadata> {
        match self.client.comment_metadata(self.pr, comment_id).await {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!(comment_id, error = %e, "Comment lookup failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{MockCommentClient, RateLimit};
    use crate::comment::{LineRange, OperationMetadata};

    fn reply_op(id: u64) -> CommentOperation {
        CommentOperation {
            kind: OperationKind::Reply,
            target: CommentTarget::Comment { id },
            body: "Fixed".to_string(),
            expanded_body: "Fixed".to_string(),
            metadata: OperationMetadata {
                comment_type: CommentType::Review,
                reply_to: Some(id),
                reaction: None,
                remove_reaction: false,
            },
        }
    }

    fn add_op() -> CommentOperation {
        CommentOperation {
            kind: OperationKind::Add,
            target: CommentTarget::Line {
                path: "src/lib.rs".to_string(),
                range: LineRange::single(12),
                side: Side::Right,
            },
            body: "nit".to_string(),
            expanded_body: "nit".to_string(),
            metadata: OperationMetadata::default(),
        }
    }

    fn review_metadata(id: u64, is_standalone: bool) -> CommentMetadata {
        CommentMetadata {
            id,
            comment_type: CommentType::Review,
            parent_review_id: Some(500),
            is_standalone,
            path: Some("src/lib.rs".to_string()),
            line: Some(42),
        }
    }

    #[test]
    fn test_candidate_by_status() {
        let op = add_op();
        let decided = |status| candidate(&ApiFailure::http(status, "x"), &op);

        assert_eq!(decided(401), Candidate::Decided(FailureKind::AuthenticationFailed));
        assert_eq!(decided(403), Candidate::Decided(FailureKind::PermissionDenied));
        assert_eq!(decided(404), Candidate::Decided(FailureKind::NotFoundGeneric));
        assert_eq!(decided(422), Candidate::Decided(FailureKind::InvalidLocation));
        assert_eq!(decided(429), Candidate::Decided(FailureKind::RateLimited));
        assert_eq!(decided(502), Candidate::Decided(FailureKind::ServerError));
        assert_eq!(decided(418), Candidate::Decided(FailureKind::Unknown));
        assert_eq!(
            candidate(&ApiFailure::transport("timed out"), &op),
            Candidate::Decided(FailureKind::Unknown)
        );
    }

    #[test]
    fn test_candidate_403_rate_limit() {
        let failure = ApiFailure::http(403, "Forbidden").with_rate_limit(RateLimit {
            remaining: Some(0),
            reset_at: None,
        });
        assert_eq!(
            candidate(&failure, &add_op()),
            Candidate::Decided(FailureKind::RateLimited)
        );
    }

    #[test]
    fn test_candidate_404_on_comment_needs_lookup() {
        assert_eq!(
            candidate(&ApiFailure::http(404, "Not Found"), &reply_op(1)),
            Candidate::NeedsLookup
        );
    }

    #[test]
    fn test_confirm_disambiguates_404() {
        let op = reply_op(1);
        assert_eq!(
            confirm(Candidate::NeedsLookup, &op, Some(&review_metadata(1, false))),
            FailureKind::ThreadReplyUnsupported
        );
        assert_eq!(
            confirm(Candidate::NeedsLookup, &op, Some(&review_metadata(1, true))),
            FailureKind::NotFoundGeneric
        );
        assert_eq!(
            confirm(Candidate::NeedsLookup, &op, None),
            FailureKind::NotFoundGeneric
        );

        let mut issue = review_metadata(1, true);
        issue.comment_type = CommentType::Issue;
        assert_eq!(
            confirm(Candidate::NeedsLookup, &op, Some(&issue)),
            FailureKind::CommentTypeMismatch
        );
    }

    #[test]
    fn test_confirm_keeps_decided_kind() {
        assert_eq!(
            confirm(
                Candidate::Decided(FailureKind::ServerError),
                &reply_op(1),
                Some(&review_metadata(1, false))
            ),
            FailureKind::ServerError
        );
    }

    #[test]
    fn test_thread_reply_plan_has_four_ordered_alternatives() {
        let context = RemediationContext {
            repo: None,
            pr: 42,
            metadata: Some(review_metadata(7, false)),
        };
        let plan = finalize(
            FailureKind::ThreadReplyUnsupported,
            &reply_op(7),
            &ApiFailure::http(404, "Not Found"),
            &context,
        );

        assert_eq!(plan.alternatives.len(), 4);
        assert!(plan.alternatives[0]
            .description
            .to_lowercase()
            .contains("add a new comment at the same location"));
        assert_eq!(
            plan.alternatives[0].action,
            "gh comment add src/lib.rs 42 'Fixed' --pr 42"
        );
        assert_eq!(plan.alternatives[1].action, "gh comment react 7 +1 --pr 42");
        assert_eq!(plan.alternatives[2].action, "gh comment resolve 7 --pr 42");
        assert_eq!(
            plan.alternatives[3].action,
            "gh comment add 'Fixed' --type issue --pr 42"
        );
        assert!(plan.diagnostics.is_none());
    }

    #[test]
    fn test_every_thread_reply_alternative_names_the_repository() {
        let context = RemediationContext {
            repo: Some("octo/widgets".to_string()),
            pr: 42,
            metadata: Some(review_metadata(7, false)),
        };
        let plan = finalize(
            FailureKind::ThreadReplyUnsupported,
            &reply_op(7),
            &ApiFailure::http(404, "Not Found"),
            &context,
        );

        assert_eq!(
            plan.alternatives[1].action,
            "gh comment react 7 +1 --repo octo/widgets --pr 42"
        );
        for alternative in &plan.alternatives {
            assert!(
                alternative.action.ends_with("--repo octo/widgets --pr 42"),
                "{}",
                alternative.action
            );
        }
    }

    #[test]
    fn test_invalid_location_points_at_commentable_lines() {
        let mut op = add_op();
        if let CommentTarget::Line { path, side, .. } = &mut op.target {
            *path = "docs/Read Me.md".to_string();
            *side = Side::Left;
        }
        let context = RemediationContext {
            repo: Some("octo/widgets".to_string()),
            pr: 3,
            metadata: None,
        };
        let plan = finalize(
            FailureKind::InvalidLocation,
            &op,
            &ApiFailure::http(422, "Unprocessable Entity"),
            &context,
        );
        assert_eq!(
            plan.alternatives[0].action,
            "gh comment lines 'docs/Read Me.md' --repo octo/widgets --pr 3 --left"
        );
    }

    #[test]
    fn test_missing_pull_request_names_the_repository() {
        let mut op = add_op();
        op.target = CommentTarget::PullRequest;
        let context = RemediationContext {
            repo: Some("octo/widgets".to_string()),
            pr: 3,
            metadata: None,
        };
        let plan = finalize(
            FailureKind::NotFoundGeneric,
            &op,
            &ApiFailure::http(404, "Not Found"),
            &context,
        );
        assert_eq!(plan.alternatives[0].action, "gh pr view 3 --repo octo/widgets");
    }

    #[test]
    fn test_thread_reply_plan_without_location_uses_placeholders() {
        let context = RemediationContext::default();
        let plan = finalize(
            FailureKind::ThreadReplyUnsupported,
            &reply_op(7),
            &ApiFailure::http(404, "Not Found"),
            &context,
        );
        assert!(plan.alternatives[0].action.contains("<file> <line>"));
    }

    #[test]
    fn test_type_mismatch_suggests_other_type() {
        let mut metadata = review_metadata(3, true);
        metadata.comment_type = CommentType::Issue;
        let context = RemediationContext {
            repo: None,
            pr: 5,
            metadata: Some(metadata),
        };
        let plan = finalize(
            FailureKind::CommentTypeMismatch,
            &reply_op(3),
            &ApiFailure::http(404, "Not Found"),
            &context,
        );
        assert!(plan.primary_message.contains("is an issue comment"));
        assert!(plan.alternatives[0].action.contains("--type issue"));
    }

    #[test]
    fn test_rate_limit_plan_shows_reset() {
        let reset_at = chrono::DateTime::parse_from_rfc3339("2024-05-01T12:30:00Z")
            .unwrap()
            .with_timezone(&chrono::Utc);
        let failure = ApiFailure::http(429, "Too Many Requests").with_rate_limit(RateLimit {
            remaining: Some(0),
            reset_at: Some(reset_at),
        });
        let plan = finalize(
            FailureKind::RateLimited,
            &add_op(),
            &failure,
            &RemediationContext::default(),
        );
        assert!(plan.primary_message.contains("resets at 12:30:00 UTC"));
    }

    #[test]
    fn test_unknown_has_diagnostics_and_no_alternatives() {
        let failure = ApiFailure::http(418, "I'm a teapot").with_body("{\"message\":\"teapot\"}");
        let plan = finalize(
            FailureKind::Unknown,
            &add_op(),
            &failure,
            &RemediationContext::default(),
        );
        assert!(plan.alternatives.is_empty());
        assert!(plan.primary_message.contains("418"));
        assert_eq!(
            plan.diagnostics,
            Some(Diagnostics {
                status: Some(418),
                body: "{\"message\":\"teapot\"}".to_string()
            })
        );
    }

    #[test]
    fn test_every_known_kind_has_alternatives() {
        let context = RemediationContext::default();
        let failure = ApiFailure::http(500, "boom");
        for kind in [
            FailureKind::ThreadReplyUnsupported,
            FailureKind::CommentTypeMismatch,
            FailureKind::RateLimited,
            FailureKind::PermissionDenied,
            FailureKind::AuthenticationFailed,
            FailureKind::InvalidLocation,
            FailureKind::ServerError,
            FailureKind::NotFoundGeneric,
            FailureKind::Cancelled,
        ] {
            let plan = finalize(kind, &reply_op(9), &failure, &context);
            assert!(!plan.alternatives.is_empty(), "{kind:?}");
            assert!(plan.alternatives.iter().all(|a| !a.action.is_empty()));
        }
    }

    #[tokio::test]
    async fn test_classify_reply_to_thread_comment() {
        let mut client = MockCommentClient::new();
        client
            .expect_comment_metadata()
            .withf(|pr, id| *pr == 42 && *id == 7)
            .times(1)
            .returning(|_, id| Ok(Some(review_metadata(id, false))));

        let classifier = Classifier::new(Arc::new(client), 42);
        let plan = classifier
            .classify(&reply_op(7), &ApiFailure::http(404, "Not Found"))
            .await;

        assert_eq!(plan.failure_kind, FailureKind::ThreadReplyUnsupported);
        assert!(plan.alternatives[0]
            .description
            .to_lowercase()
            .contains("add a new comment at the same location"));
    }

    #[tokio::test]
    async fn test_classify_failed_lookup_degrades_to_not_found() {
        let mut client = MockCommentClient::new();
        client
            .expect_comment_metadata()
            .returning(|_, _| Err(ApiFailure::transport("connection reset")));

        let classifier = Classifier::new(Arc::new(client), 1);
        let plan = classifier
            .classify(&reply_op(7), &ApiFailure::http(404, "Not Found"))
            .await;
        assert_eq!(plan.failure_kind, FailureKind::NotFoundGeneric);
    }

    #[tokio::test]
    async fn test_classify_skips_lookup_when_status_decides() {
        let mut client = MockCommentClient::new();
        client.expect_comment_metadata().never();

        let classifier = Classifier::new(Arc::new(client), 1);
        let plan = classifier
            .classify(&reply_op(7), &ApiFailure::http(401, "Bad credentials"))
            .await;
        assert_eq!(plan.failure_kind, FailureKind::AuthenticationFailed);
    }
}
