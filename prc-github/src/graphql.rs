//! GitHub GraphQL API support for review threads
//!
//! Threads are not exposed over REST: finding the thread that holds a
//! review comment and resolving it both go through GraphQL.

use chrono::{DateTime, Utc};
use prc_core::client::{ApiFailure, ApiResult, RateLimit};
use reqwest::header::HeaderMap;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::GitHubClient;

/// GraphQL query response wrapper
#[derive(Debug, Deserialize)]
struct GraphQLResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQLError>>,
}

/// GraphQL error
#[derive(Debug, Deserialize)]
struct GraphQLError {
    message: String,
    #[serde(rename = "type")]
    kind: Option<String>,
}

impl GraphQLError {
    /// The REST status that matches GitHub's error type
    fn status(&self) -> Option<u16> {
        match self.kind.as_deref()? {
            "NOT_FOUND" => Some(404),
            "FORBIDDEN" | "RATE_LIMITED" => Some(403),
            "UNPROCESSABLE" => Some(422),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ThreadsData {
    repository: Option<RepositoryData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RepositoryData {
    pull_request: Option<PullRequestData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PullRequestData {
    review_threads: ThreadConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThreadConnection {
    page_info: PageInfo,
    nodes: Vec<ThreadNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    has_next_page: bool,
    end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThreadNode {
    id: String,
    is_resolved: bool,
    comments: CommentConnection,
}

#[derive(Debug, Deserialize)]
struct CommentConnection {
    nodes: Vec<CommentNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentNode {
    database_id: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResolveData {
    resolve_review_thread: Option<ResolvePayload>,
}

#[derive(Debug, Deserialize)]
struct ResolvePayload {
    thread: Option<ResolvedThread>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResolvedThread {
    is_resolved: bool,
}

const REVIEW_THREADS_QUERY: &str = r#"
    query($owner: String!, $repo: String!, $number: Int!, $cursor: String) {
        repository(owner: $owner, name: $repo) {
            pullRequest(number: $number) {
                reviewThreads(first: 100, after: $cursor) {
                    pageInfo {
                        hasNextPage
                        endCursor
                    }
                    nodes {
                        id
                        isResolved
                        comments(first: 100) {
                            nodes {
                                databaseId
                            }
                        }
                    }
                }
            }
        }
    }
"#;

const RESOLVE_THREAD_MUTATION: &str = r#"
    mutation($threadId: ID!) {
        resolveReviewThread(input: { threadId: $threadId }) {
            thread {
                id
                isResolved
            }
        }
    }
"#;

impl GitHubClient {
    /// Node id of the review thread containing a review comment
    pub async fn review_thread_for_comment(&self, pr: u64, comment_id: u64) -> ApiResult<String> {
        debug!(pr, comment_id, "Looking up review thread via GraphQL");

        let mut cursor: Option<String> = None;
        loop {
            let variables = json!({
                "owner": self.owner(),
                "repo": self.repo(),
                "number": pr,
                "cursor": cursor,
            });

            let data: ThreadsData = self.graphql_query(REVIEW_THREADS_QUERY, &variables).await?;
            let threads = data
                .repository
                .and_then(|r| r.pull_request)
                .ok_or_else(|| ApiFailure::http(404, format!("pull request #{pr} not found")))?
                .review_threads;

            if let Some(thread) = threads.nodes.into_iter().find(|t| {
                t.comments
                    .nodes
                    .iter()
                    .any(|c| c.database_id == Some(comment_id))
            }) {
                debug!(thread_id = %thread.id, resolved = thread.is_resolved, "Found review thread");
                return Ok(thread.id);
            }

            match threads.page_info {
                PageInfo {
                    has_next_page: true,
                    end_cursor: Some(next),
                } => cursor = Some(next),
                _ => break,
            }
        }

        Err(ApiFailure::http(
            404,
            format!("no review thread on pull request #{pr} contains comment #{comment_id}"),
        ))
    }

    /// Mark a review thread as resolved
    pub async fn resolve_review_thread(&self, thread_id: &str) -> ApiResult<()> {
        let variables = json!({ "threadId": thread_id });
        let data: ResolveData = self
            .graphql_query(RESOLVE_THREAD_MUTATION, &variables)
            .await?;

        let resolved = data
            .resolve_review_thread
            .and_then(|p| p.thread)
            .is_some_and(|t| t.is_resolved);
        if !resolved {
            return Err(ApiFailure::transport(format!(
                "thread {thread_id} was not marked resolved"
            )));
        }

        info!(thread_id, "Resolved review thread");
        Ok(())
    }

    /// Execute a GraphQL query
    async fn graphql_query<T: for<'de> Deserialize<'de>>(
        &self,
        query: &str,
        variables: &serde_json::Value,
    ) -> ApiResult<T> {
        let request_body = json!({
            "query": query,
            "variables": variables,
        });

        let response = self
            .http()
            .post(self.graphql_url())
            .bearer_auth(self.token())
            .json(&request_body)
            .send()
            .await
            .map_err(|e| ApiFailure::transport(format!("GraphQL request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(failure_from_response(response).await);
        }

        let graphql_response: GraphQLResponse<T> = response.json().await.map_err(|e| {
            ApiFailure::transport(format!("Failed to parse GraphQL response: {}", e))
        })?;

        if let Some(errors) = graphql_response.errors.filter(|e| !e.is_empty()) {
            let messages: Vec<&str> = errors.iter().map(|e| e.message.as_str()).collect();
            let message = format!("GraphQL errors: {}", messages.join(", "));
            let failure = match errors.iter().find_map(GraphQLError::status) {
                Some(status) => ApiFailure::http(status, message),
                None => ApiFailure::transport(message),
            };
            return Err(failure);
        }

        graphql_response
            .data
            .ok_or_else(|| ApiFailure::transport("GraphQL response missing data"))
    }
}

/// Turn an unsuccessful response into an [`ApiFailure`]
///
/// Keeps GitHub's `message`, the raw body and any rate-limit headers.
pub(crate) async fn failure_from_response(response: reqwest::Response) -> ApiFailure {
    let status = response.status();
    let rate_limit = rate_limit_from_headers(response.headers());

    let text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read response".to_string());
    let message = serde_json::from_str::<serde_json::Value>(&text)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_default();

    let failure = ApiFailure::http(status.as_u16(), message).with_body(text);
    match rate_limit {
        Some(limit) => failure.with_rate_limit(limit),
        None => failure,
    }
}

/// Read GitHub's rate-limit headers
///
/// `retry-after` (secondary limits) takes precedence over the primary
/// `x-ratelimit-reset` timestamp.
fn rate_limit_from_headers(headers: &HeaderMap) -> Option<RateLimit> {
    let number = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<i64>().ok())
    };

    let remaining = number("x-ratelimit-remaining").and_then(|n| u64::try_from(n).ok());
    let retry_after = number("retry-after");
    let reset = number("x-ratelimit-reset");

    if remaining.is_none() && retry_after.is_none() {
        return None;
    }

    let reset_at = match (retry_after, reset) {
        (Some(secs), _) => Some(Utc::now() + chrono::Duration::seconds(secs)),
        (None, Some(epoch)) => DateTime::<Utc>::from_timestamp(epoch, 0),
        (None, None) => None,
    };

    Some(RateLimit {
        // A retry-after header means the request was throttled
        remaining: if retry_after.is_some() { Some(0) } else { remaining },
        reset_at,
    })
}
