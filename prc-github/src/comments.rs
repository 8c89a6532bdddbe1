//! Pull request comment operations over the REST API
//!
//! GitHub keeps two comment collections per pull request: issue comments
//! (the conversation tab) and review comments (anchored to diff lines). Each
//! collection has its own endpoints for replies and reactions, so every
//! operation here branches on [`CommentType`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use prc_core::client::{ApiFailure, ApiResult, CommentClient};
use prc_core::comment::{
    Comment, CommentMetadata, CommentTarget, CommentType, NewComment, Reaction,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::client::GitHubClient;

/// Page size used for every list request
const PER_PAGE: usize = 100;

#[derive(Debug, Deserialize)]
struct ApiUser {
    login: String,
}

/// Review comment as returned by `pulls/.../comments`
#[derive(Debug, Deserialize)]
struct ApiReviewComment {
    id: u64,
    #[serde(default)]
    body: String,
    user: Option<ApiUser>,
    path: String,
    line: Option<u32>,
    original_line: Option<u32>,
    pull_request_review_id: Option<u64>,
    in_reply_to_id: Option<u64>,
    created_at: Option<DateTime<Utc>>,
}

impl From<ApiReviewComment> for Comment {
    fn from(c: ApiReviewComment) -> Self {
        Comment {
            id: c.id,
            comment_type: CommentType::Review,
            body: c.body,
            author: c.user.map(|u| u.login).unwrap_or_default(),
            path: Some(c.path),
            // Outdated comments lose `line` but keep `original_line`
            line: c.line.or(c.original_line),
            review_id: c.pull_request_review_id,
            in_reply_to: c.in_reply_to_id,
            created_at: c.created_at,
        }
    }
}

/// Issue comment as returned by `issues/.../comments`
#[derive(Debug, Deserialize)]
struct ApiIssueComment {
    id: u64,
    #[serde(default)]
    body: Option<String>,
    user: Option<ApiUser>,
    created_at: Option<DateTime<Utc>>,
}

impl From<ApiIssueComment> for Comment {
    fn from(c: ApiIssueComment) -> Self {
        Comment {
            id: c.id,
            comment_type: CommentType::Issue,
            body: c.body.unwrap_or_default(),
            author: c.user.map(|u| u.login).unwrap_or_default(),
            path: None,
            line: None,
            review_id: None,
            in_reply_to: None,
            created_at: c.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
struct PageParams {
    per_page: usize,
    page: u32,
}

#[derive(Debug, Serialize)]
struct BodyPayload<'a> {
    body: &'a str,
}

#[derive(Debug, Serialize)]
struct ReviewCommentPayload<'a> {
    body: &'a str,
    commit_id: &'a str,
    path: &'a str,
    line: u32,
    side: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_side: Option<&'static str>,
}

#[derive(Debug, Serialize)]
struct ReactionPayload {
    content: Reaction,
}

#[derive(Debug, Deserialize)]
struct ApiReaction {
    id: u64,
    content: String,
    user: Option<ApiUser>,
}

fn collection(comment_type: CommentType) -> &'static str {
    match comment_type {
        CommentType::Review => "pulls",
        CommentType::Issue => "issues",
    }
}

impl GitHubClient {
    /// Fetch every page of a list endpoint
    pub(crate) async fn get_all<T>(&self, route: &str) -> ApiResult<Vec<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        let mut items = Vec::new();
        let mut page = 1;

        loop {
            let params = PageParams {
                per_page: PER_PAGE,
                page,
            };
            let batch: Vec<T> = self.rest_get(route, Some(&params)).await?;
            let done = batch.len() < PER_PAGE;
            items.extend(batch);
            if done {
                break;
            }
            page += 1;
        }

        Ok(items)
    }

    async fn get_review_comment(&self, comment_id: u64) -> ApiResult<ApiReviewComment> {
        let route = self.repo_path(&format!("/pulls/comments/{comment_id}"));
        self.rest_get(&route, None::<&()>).await
    }

    async fn get_issue_comment(&self, comment_id: u64) -> ApiResult<ApiIssueComment> {
        let route = self.repo_path(&format!("/issues/comments/{comment_id}"));
        self.rest_get(&route, None::<&()>).await
    }

    /// Number of comments submitted with a review, capped at two
    async fn review_comment_count(&self, pr: u64, review_id: u64) -> ApiResult<usize> {
        let route = self.repo_path(&format!("/pulls/{pr}/reviews/{review_id}/comments"));
        let params = PageParams {
            per_page: 2,
            page: 1,
        };
        let comments: Vec<serde_json::Value> = self.rest_get(&route, Some(&params)).await?;
        Ok(comments.len())
    }

    async fn add_issue_comment(&self, pr: u64, body: &str) -> ApiResult<Comment> {
        let route = self.repo_path(&format!("/issues/{pr}/comments"));
        let created: ApiIssueComment = self.rest_post(&route, &BodyPayload { body }).await?;
        Ok(created.into())
    }
}

/// Quote the original so a conversation reply reads in context
fn quote_reply(original: &str, author: &str, body: &str) -> String {
    let quoted = original
        .lines()
        .map(|line| format!("> {line}"))
        .collect::<Vec<_>>()
        .join("\n");

    if author.is_empty() {
        format!("{quoted}\n\n{body}")
    } else {
        format!("@{author} wrote:\n{quoted}\n\n{body}")
    }
}

#[async_trait]
impl CommentClient for GitHubClient {
    async fn list_comments(&self, pr: u64) -> ApiResult<Vec<Comment>> {
        let issue: Vec<ApiIssueComment> = self
            .get_all(&self.repo_path(&format!("/issues/{pr}/comments")))
            .await?;
        let review: Vec<ApiReviewComment> = self
            .get_all(&self.repo_path(&format!("/pulls/{pr}/comments")))
            .await?;

        debug!(pr, issue = issue.len(), review = review.len(), "Listed comments");

        let mut comments: Vec<Comment> = issue
            .into_iter()
            .map(Comment::from)
            .chain(review.into_iter().map(Comment::from))
            .collect();
        comments.sort_by_key(|c| (c.created_at, c.id));
        Ok(comments)
    }

    async fn add_comment(&self, pr: u64, comment: &NewComment) -> ApiResult<Comment> {
        match &comment.target {
            CommentTarget::Line { path, range, side } => {
                let commit_id = self.head_sha(pr).await?;
                let payload = ReviewCommentPayload {
                    body: &comment.body,
                    commit_id: &commit_id,
                    path,
                    line: range.end,
                    side: side.as_api_str(),
                    start_line: range.is_multi_line().then_some(range.start),
                    start_side: range.is_multi_line().then(|| side.as_api_str()),
                };

                let route = self.repo_path(&format!("/pulls/{pr}/comments"));
                let created: ApiReviewComment = self.rest_post(&route, &payload).await?;
                info!(pr, id = created.id, path = %path, line = %range, "Added review comment");
                Ok(created.into())
            }
            CommentTarget::PullRequest => {
                let created = self.add_issue_comment(pr, &comment.body).await?;
                info!(pr, id = created.id, "Added pull request comment");
                Ok(created)
            }
            CommentTarget::Comment { id } => Err(ApiFailure::transport(format!(
                "cannot add a new comment on comment #{id}; reply to it instead"
            ))),
        }
    }

    async fn reply_to_comment(
        &self,
        pr: u64,
        comment_id: u64,
        comment_type: CommentType,
        body: &str,
    ) -> ApiResult<Comment> {
        match comment_type {
            CommentType::Review => {
                let route = self.repo_path(&format!("/pulls/{pr}/comments/{comment_id}/replies"));
                let created: ApiReviewComment =
                    self.rest_post(&route, &BodyPayload { body }).await?;
                info!(pr, id = created.id, parent = comment_id, "Replied to review comment");
                Ok(created.into())
            }
            CommentType::Issue => {
                // Conversation comments have no threads; post a new comment quoting the original
                let original = self.get_issue_comment(comment_id).await?;
                let author = original.user.as_ref().map(|u| u.login.as_str()).unwrap_or("");
                let quoted = quote_reply(original.body.as_deref().unwrap_or(""), author, body);
                let created = self.add_issue_comment(pr, &quoted).await?;
                info!(pr, id = created.id, parent = comment_id, "Replied to issue comment");
                Ok(created)
            }
        }
    }

    async fn find_thread_for_comment(&self, pr: u64, comment_id: u64) -> ApiResult<String> {
        self.review_thread_for_comment(pr, comment_id).await
    }

    async fn resolve_thread(&self, thread_id: &str) -> ApiResult<()> {
        self.resolve_review_thread(thread_id).await
    }

    async fn react(
        &self,
        comment_id: u64,
        comment_type: CommentType,
        reaction: Reaction,
    ) -> ApiResult<()> {
        let collection = collection(comment_type);
        let route = self.repo_path(&format!("/{collection}/comments/{comment_id}/reactions"));
        let _: serde_json::Value = self
            .rest_post(&route, &ReactionPayload { content: reaction })
            .await?;
        info!(id = comment_id, reaction = %reaction, "Added reaction");
        Ok(())
    }

    async fn remove_reaction(
        &self,
        comment_id: u64,
        comment_type: CommentType,
        reaction: Reaction,
    ) -> ApiResult<()> {
        let collection = collection(comment_type);
        let route = self.repo_path(&format!("/{collection}/comments/{comment_id}/reactions"));
        let login = self.viewer_login().await?;
        let reactions: Vec<ApiReaction> = self.get_all(&route).await?;

        let own = reactions.into_iter().find(|r| {
            r.content == reaction.as_str() && r.user.as_ref().is_some_and(|u| u.login == login)
        });
        let Some(own) = own else {
            debug!(id = comment_id, reaction = %reaction, "No reaction to remove");
            return Ok(());
        };

        self.rest_delete(&format!("{route}/{}", own.id)).await?;
        info!(id = comment_id, reaction = %reaction, "Removed reaction");
        Ok(())
    }

    async fn edit_comment(
        &self,
        comment_id: u64,
        comment_type: CommentType,
        body: &str,
    ) -> ApiResult<Comment> {
        let route = self.repo_path(&format!("/{}/comments/{comment_id}", collection(comment_type)));
        let payload = BodyPayload { body };
        let edited: Comment = match comment_type {
            CommentType::Review => self
                .rest_patch::<ApiReviewComment, _>(&route, &payload)
                .await?
                .into(),
            CommentType::Issue => self
                .rest_patch::<ApiIssueComment, _>(&route, &payload)
                .await?
                .into(),
        };
        info!(id = edited.id, comment_type = %comment_type, "Edited comment");
        Ok(edited)
    }

    async fn comment_metadata(
        &self,
        pr: u64,
        comment_id: u64,
    ) -> ApiResult<Option<CommentMetadata>> {
        match self.get_review_comment(comment_id).await {
            Ok(review) => {
                let is_standalone = match review.pull_request_review_id {
                    Some(review_id) => self.review_comment_count(pr, review_id).await? <= 1,
                    None => true,
                };
                debug!(id = comment_id, is_standalone, "Comment is a review comment");
                return Ok(Some(CommentMetadata {
                    id: review.id,
                    comment_type: CommentType::Review,
                    parent_review_id: review.pull_request_review_id,
                    is_standalone,
                    path: Some(review.path),
                    line: review.line.or(review.original_line),
                }));
            }
            Err(failure) if failure.is_status(404) => {}
            Err(failure) => return Err(failure),
        }

        match self.get_issue_comment(comment_id).await {
            Ok(issue) => {
                debug!(id = comment_id, "Comment is an issue comment");
                Ok(Some(CommentMetadata {
                    id: issue.id,
                    comment_type: CommentType::Issue,
                    parent_review_id: None,
                    is_standalone: true,
                    path: None,
                    line: None,
                }))
            }
            Err(failure) if failure.is_status(404) => Ok(None),
            Err(failure) => Err(failure),
        }
    }
}
