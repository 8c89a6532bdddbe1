//! The seam between the engine and the hosting service

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::comment::{Comment, CommentMetadata, CommentType, NewComment, Reaction};

/// Result of a hosting-service call
pub type ApiResult<T> = std::result::Result<T, ApiFailure>;

/// Rate-limit information reported alongside a failure
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateLimit {
    /// Requests left in the current window, if reported
    pub remaining: Option<u64>,
    /// When the window resets, if reported
    pub reset_at: Option<DateTime<Utc>>,
}

impl RateLimit {
    /// Whether the service says the quota is used up
    pub fn is_exhausted(&self) -> bool {
        self.remaining == Some(0)
    }
}

/// A failed call, with enough detail for the classifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiFailure {
    /// HTTP status, when the request got a response
    pub status: Option<u16>,
    /// Short description (GitHub's `message` field or the transport error)
    pub message: String,
    /// Raw response body, possibly empty
    pub body: String,
    /// Rate-limit signal; `Some` when headers or a secondary-limit response said so
    pub rate_limit: Option<RateLimit>,
}

impl ApiFailure {
    /// A failure with an HTTP status
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
            body: String::new(),
            rate_limit: None,
        }
    }

    /// A failure before any response arrived
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
            body: String::new(),
            rate_limit: None,
        }
    }

    /// Attach the raw response body
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Attach a rate-limit signal
    pub fn with_rate_limit(mut self, rate_limit: RateLimit) -> Self {
        self.rate_limit = Some(rate_limit);
        self
    }

    /// Whether the status matches
    pub fn is_status(&self, status: u16) -> bool {
        self.status == Some(status)
    }

    /// Whether the response says a rate limit was hit
    ///
    /// Exhausted quota headers, or GitHub's secondary-limit wording in the
    /// message or body.
    pub fn signals_rate_limit(&self) -> bool {
        if self.rate_limit.as_ref().is_some_and(RateLimit::is_exhausted) {
            return true;
        }
        let mentions = |text: &str| text.to_ascii_lowercase().contains("rate limit");
        mentions(&self.message) || mentions(&self.body)
    }
}

impl fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "HTTP {status}: {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ApiFailure {}

/// Comment operations against a pull request
///
/// Implemented by the GitHub client; mocked in engine tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentClient: Send + Sync {
    /// All issue and review comments on the pull request
    async fn list_comments(&self, pr: u64) -> ApiResult<Vec<Comment>>;

    /// Create a comment
    async fn add_comment(&self, pr: u64, comment: &NewComment) -> ApiResult<Comment>;

    /// Reply to an existing comment
    async fn reply_to_comment(
        &self,
        pr: u64,
        comment_id: u64,
        comment_type: CommentType,
        body: &str,
    ) -> ApiResult<Comment>;

    /// Node id of the review thread that contains a review comment
    async fn find_thread_for_comment(&self, pr: u64, comment_id: u64) -> ApiResult<String>;

    /// Mark a review thread as resolved
    async fn resolve_thread(&self, thread_id: &str) -> ApiResult<()>;

    /// Add a reaction to a comment
    async fn react(
        &self,
        comment_id: u64,
        comment_type: CommentType,
        reaction: Reaction,
    ) -> ApiResult<()>;

    /// Take back the authenticated user's reaction; succeeds when there is none
    async fn remove_reaction(
        &self,
        comment_id: u64,
        comment_type: CommentType,
        reaction: Reaction,
    ) -> ApiResult<()>;

    /// Replace the body of an existing comment
    async fn edit_comment(
        &self,
        comment_id: u64,
        comment_type: CommentType,
        body: &str,
    ) -> ApiResult<Comment>;

    /// What the service knows about a comment; `None` when it does not exist
    async fn comment_metadata(&self, pr: u64, comment_id: u64)
        -> ApiResult<Option<CommentMetadata>>;
}
