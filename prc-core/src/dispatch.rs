//! Sequential, fail-open execution of a batch

use std::fmt::Write as _;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::batch::BatchSpec;
use crate::client::{ApiFailure, ApiResult, CommentClient};
use crate::comment::{CommentOperation, NewComment, OperationKind};
use crate::remediation::{finalize, Classifier, FailureKind, RemediationContext, RemediationPlan};

/// What happened to one operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationOutcome {
    /// Applied; `comment_id` is the created comment, or the target for react/resolve
    Success { comment_id: u64 },
    /// Not applied (or cancelled mid-flight), with guidance
    Failed(RemediationPlan),
}

/// One operation and its outcome
#[derive(Debug, Clone)]
pub struct OperationResult<'a> {
    /// Position in the batch
    pub index: usize,
    pub operation: &'a CommentOperation,
    pub outcome: OperationOutcome,
}

impl OperationResult<'_> {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, OperationOutcome::Success { .. })
    }

    /// The plan, for failed operations
    pub fn plan(&self) -> Option<&RemediationPlan> {
        match &self.outcome {
            OperationOutcome::Failed(plan) => Some(plan),
            OperationOutcome::Success { .. } => None,
        }
    }
}

/// Results of a batch run, in batch order
#[derive(Debug, Clone, Default)]
pub struct BatchReport<'a> {
    pub results: Vec<OperationResult<'a>>,
}

impl<'a> BatchReport<'a> {
    /// Operations that were applied
    pub fn succeeded(&self) -> impl Iterator<Item = &OperationResult<'a>> {
        self.results.iter().filter(|r| r.is_success())
    }

    /// Operations that failed or were cancelled
    pub fn failed(&self) -> impl Iterator<Item = &OperationResult<'a>> {
        self.results.iter().filter(|r| !r.is_success())
    }

    pub fn has_failures(&self) -> bool {
        self.failed().next().is_some()
    }

    /// Number of operations cut short by cancellation
    pub fn cancelled(&self) -> usize {
        self.failed()
            .filter(|r| r.plan().is_some_and(|p| p.failure_kind == FailureKind::Cancelled))
            .count()
    }
}

/// Runs batch operations one at a time against a pull request
pub struct Dispatcher {
    client: Arc<dyn CommentClient>,
    classifier: Classifier,
    repo: Option<String>,
    pr: u64,
}

impl Dispatcher {
    /// Create a dispatcher for a pull request
    pub fn new(client: Arc<dyn CommentClient>, pr: u64) -> Self {
        let classifier = Classifier::new(Arc::clone(&client), pr);
        Self {
            client,
            classifier,
            repo: None,
            pr,
        }
    }

    /// Name the repository (`owner/name`) in suggested commands
    pub fn with_repo(mut self, repo: impl Into<String>) -> Self {
        let repo = repo.into();
        self.classifier = self.classifier.with_repo(repo.clone());
        self.repo = Some(repo);
        self
    }

    /// Run every operation in order
    ///
    /// A failing operation does not stop the batch. Once `cancel` fires, the
    /// in-flight call is abandoned and it and every remaining operation are
    /// reported as cancelled; earlier results are kept.
    pub async fn dispatch<'a>(
        &self,
        spec: &'a BatchSpec,
        cancel: &CancellationToken,
    ) -> BatchReport<'a> {
        let mut results = Vec::with_capacity(spec.operations.len());

        for (index, operation) in spec.operations.iter().enumerate() {
            if cancel.is_cancelled() {
                results.push(OperationResult {
                    index,
                    operation,
                    outcome: self.cancelled(operation, "batch was cancelled before it started"),
                });
                continue;
            }

            info!(pr = self.pr, index, operation = %operation.summary(), "Dispatching operation");

            let attempt = async {
                match self.execute(operation).await {
                    Ok(comment_id) => OperationOutcome::Success { comment_id },
                    Err(failure) => {
                        warn!(index, error = %failure, "Operation failed");
                        OperationOutcome::Failed(self.classifier.classify(operation, &failure).await)
                    }
                }
            };

            let outcome = tokio::select! {
                biased;
                () = cancel.cancelled() => self.cancelled(
                    operation,
                    "batch was cancelled while the request was in flight; it may or may not have been applied",
                ),
                outcome = attempt => outcome,
            };

            results.push(OperationResult {
                index,
                operation,
                outcome,
            });
        }

        let report = BatchReport { results };
        info!(
            total = report.results.len(),
            succeeded = report.succeeded().count(),
            failed = report.failed().count(),
            "Batch finished"
        );
        report
    }

    async fn execute(&self, operation: &CommentOperation) -> ApiResult<u64> {
        let pr = self.pr;
        let comment_type = operation.metadata.comment_type;

        match operation.kind {
            OperationKind::Add => {
                let comment = NewComment {
                    body: operation.expanded_body.clone(),
                    target: operation.target.clone(),
                };
                Ok(self.client.add_comment(pr, &comment).await?.id)
            }
            OperationKind::Reply => {
                let id = target_comment(operation)?;
                let reply = self
                    .client
                    .reply_to_comment(pr, id, comment_type, &operation.expanded_body)
                    .await?;
                Ok(reply.id)
            }
            OperationKind::Resolve => {
                let id = target_comment(operation)?;
                let thread = self.client.find_thread_for_comment(pr, id).await?;
                self.client.resolve_thread(&thread).await?;
                Ok(id)
            }
            OperationKind::React => {
                let id = target_comment(operation)?;
                let reaction = operation
                    .metadata
                    .reaction
                    .ok_or_else(|| ApiFailure::transport("react operation has no reaction"))?;
                if operation.metadata.remove_reaction {
                    self.client.remove_reaction(id, comment_type, reaction).await?;
                } else {
                    self.client.react(id, comment_type, reaction).await?;
                }
                Ok(id)
            }
            OperationKind::Edit => {
                let id = target_comment(operation)?;
                let edited = self
                    .client
                    .edit_comment(id, comment_type, &operation.expanded_body)
                    .await?;
                Ok(edited.id)
            }
        }
    }

    fn cancelled(&self, operation: &CommentOperation, reason: &str) -> OperationOutcome {
        let context = RemediationContext {
            repo: self.repo.clone(),
            pr: self.pr,
            metadata: None,
        };
        OperationOutcome::Failed(finalize(
            FailureKind::Cancelled,
            operation,
            &ApiFailure::transport(reason),
            &context,
        ))
    }
}

fn target_comment(operation: &CommentOperation) -> ApiResult<u64> {
    operation.target.comment_id().ok_or_else(|| {
        ApiFailure::transport(format!("{} operation has no comment target", operation.kind))
    })
}

/// Describe what a batch would do, without calling GitHub
pub fn render_dry_run(spec: &BatchSpec, pr: u64) -> String {
    let mut out = format!(
        "Dry run: {} operation(s) against pull request #{pr}\n",
        spec.operations.len()
    );

    for (number, operation) in (1..).zip(&spec.operations) {
        let _ = writeln!(out, "{number}. {}", operation.summary());
        if operation.kind.has_body() {
            for line in operation.expanded_body.lines() {
                let _ = writeln!(out, "     | {line}");
            }
        }
    }

    out
}
