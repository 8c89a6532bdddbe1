//! GitHub API client using octocrab

use octocrab::Octocrab;
use prc_core::client::{ApiFailure, RateLimit};
use prc_core::Secrets;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::{Error, Result};

/// GitHub API client for one repository
pub struct GitHubClient {
    client: Octocrab,
    http: reqwest::Client,
    token: String,
    api_base: String,
    owner: String,
    repo: String,
    /// Head commit per pull request, needed to anchor review comments
    head_sha: OnceCell<(u64, String)>,
    /// Login of the token's user, needed to find its own reactions
    viewer: OnceCell<String>,
}

impl GitHubClient {
    /// Create a new GitHub client for the specified repository
    ///
    /// Token is loaded from (in priority order):
    /// 1. GITHUB_TOKEN / GH_TOKEN environment variables
    /// 2. ~/.config/gh-comment/secrets.toml
    pub fn new(owner: impl Into<String>, repo: impl Into<String>, api_base: &str) -> Result<Self> {
        let secrets = Secrets::load().map_err(|e| Error::Auth(e.to_string()))?;

        let token = secrets.github_token().ok_or_else(|| {
            Error::Auth(
                "GitHub token not found. Set GITHUB_TOKEN or GH_TOKEN, \
                 or add token to ~/.config/gh-comment/secrets.toml"
                    .to_string(),
            )
        })?;

        Self::with_token(owner, repo, &token, api_base)
    }

    /// Create a client with an explicit token and API base URL
    pub fn with_token(
        owner: impl Into<String>,
        repo: impl Into<String>,
        token: &str,
        api_base: &str,
    ) -> Result<Self> {
        let owner = owner.into();
        let repo = repo.into();
        let api_base = api_base.trim_end_matches('/').to_string();

        let client = Octocrab::builder()
            .personal_token(token.to_string())
            .base_uri(api_base.as_str())
            .map_err(|e| Error::Parse(format!("Invalid API base URL '{}': {}", api_base, e)))?
            .build()
            .map_err(|e| Error::Auth(format!("Failed to create GitHub client: {}", e)))?;

        let http = reqwest::Client::builder()
            .user_agent(concat!("gh-comment/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Other(format!("Failed to create HTTP client: {}", e)))?;

        info!(owner = %owner, repo = %repo, api_base = %api_base, "Created GitHub client");

        Ok(Self {
            client,
            http,
            token: token.to_string(),
            api_base,
            owner,
            repo,
            head_sha: OnceCell::new(),
            viewer: OnceCell::new(),
        })
    }

    /// Create a GitHub client from a repository URL
    ///
    /// Supports formats:
    /// - owner/repo
    /// - https://github.com/owner/repo
    /// - git@github.com:owner/repo.git
    pub fn from_url(url: &str, api_base: &str) -> Result<Self> {
        let (owner, repo) = parse_github_url(url)?;
        Self::new(owner, repo, api_base)
    }

    /// Get the repository owner
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Get the repository name
    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// Get the underlying octocrab client
    pub fn client(&self) -> &Octocrab {
        &self.client
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn token(&self) -> &str {
        &self.token
    }

    /// GraphQL endpoint for the configured API base
    ///
    /// GitHub Enterprise serves REST under `/api/v3` and GraphQL under
    /// `/api/graphql`.
    pub(crate) fn graphql_url(&self) -> String {
        match self.api_base.strip_suffix("/api/v3") {
            Some(host) => format!("{host}/api/graphql"),
            None => format!("{}/graphql", self.api_base),
        }
    }

    /// `/repos/{owner}/{repo}{suffix}`
    pub(crate) fn repo_path(&self, suffix: &str) -> String {
        format!("/repos/{}/{}{}", self.owner, self.repo, suffix)
    }

    /// GET a REST route
    pub(crate) async fn rest_get<T, P>(&self, route: &str, params: Option<&P>) -> std::result::Result<T, ApiFailure>
    where
        T: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        debug!(route, "GET");
        self.client
            .get::<T, _, _>(route, params)
            .await
            .map_err(|e| api_failure(&e))
    }

    /// POST a JSON body to a REST route
    pub(crate) async fn rest_post<T, B>(&self, route: &str, body: &B) -> std::result::Result<T, ApiFailure>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        debug!(route, "POST");
        self.client
            .post::<B, T>(route, Some(body))
            .await
            .map_err(|e| api_failure(&e))
    }

    /// PATCH a REST route with a JSON body
    pub(crate) async fn rest_patch<T, B>(&self, route: &str, body: &B) -> std::result::Result<T, ApiFailure>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        debug!(route, "PATCH");
        self.client
            .patch::<T, _, B>(route, Some(body))
            .await
            .map_err(|e| api_failure(&e))
    }

    /// DELETE a REST route; GitHub answers 204 with no body
    pub(crate) async fn rest_delete(&self, route: &str) -> std::result::Result<(), ApiFailure> {
        debug!(route, "DELETE");
        let response = self
            .http
            .delete(format!("{}{}", self.api_base, route))
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| ApiFailure::transport(format!("DELETE {route} failed: {e}")))?;

        if response.status().is_success() {
            return Ok(());
        }
        Err(crate::graphql::failure_from_response(response).await)
    }

    /// Login of the authenticated user, fetched once
    pub(crate) async fn viewer_login(&self) -> std::result::Result<&str, ApiFailure> {
        #[derive(serde::Deserialize)]
        struct Viewer {
            login: String,
        }

        let login = self
            .viewer
            .get_or_try_init(|| async {
                let viewer: Viewer = self.rest_get("/user", None::<&()>).await?;
                debug!(login = %viewer.login, "Fetched authenticated user");
                Ok::<_, ApiFailure>(viewer.login)
            })
            .await?;
        Ok(login.as_str())
    }

    /// Head commit of a pull request, fetched once
    pub(crate) async fn head_sha(&self, pr: u64) -> std::result::Result<String, ApiFailure> {
        #[derive(serde::Deserialize)]
        struct Head {
            sha: String,
        }
        #[derive(serde::Deserialize)]
        struct PullHead {
            head: Head,
        }

        if let Some((cached_pr, sha)) = self.head_sha.get() {
            if *cached_pr == pr {
                return Ok(sha.clone());
            }
        }

        let route = self.repo_path(&format!("/pulls/{pr}"));
        let pull: PullHead = self.rest_get(&route, None::<&()>).await?;
        debug!(pr, sha = %pull.head.sha, "Fetched pull request head");
        // Only the first pull request is cached; a client serves one batch
        let _ = self.head_sha.set((pr, pull.head.sha.clone()));
        Ok(pull.head.sha)
    }
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

/// Map an octocrab error onto what the classifier inspects
pub(crate) fn api_failure(error: &octocrab::Error) -> ApiFailure {
    match error {
        octocrab::Error::GitHub { source, .. } => {
            let status = source.status_code.as_u16();
            let body = json!({
                "message": source.message,
                "documentation_url": source.documentation_url,
                "errors": source.errors,
            })
            .to_string();

            let failure = ApiFailure::http(status, source.message.clone()).with_body(body);
            let documented_rate_limit = source
                .documentation_url
                .as_deref()
                .is_some_and(|url| url.contains("rate-limit"));

            if matches!(status, 403 | 429) && documented_rate_limit {
                failure.with_rate_limit(RateLimit {
                    remaining: Some(0),
                    reset_at: None,
                })
            } else {
                failure
            }
        }
        other => ApiFailure::transport(other.to_string()),
    }
}

/// Parse a GitHub URL into owner and repo
pub fn parse_github_url(url: &str) -> Result<(String, String)> {
    let url = url.trim();

    if !url.contains(':') && !url.contains('/') {
        return Err(Error::Parse(format!(
            "Invalid repository format: {}. Expected owner/repo",
            url
        )));
    }

    if !url.contains("://") && !url.contains('@') {
        // Simple owner/repo format
        let parts: Vec<&str> = url.split('/').collect();
        if parts.len() == 2 && !parts[0].is_empty() && !parts[1].is_empty() {
            return Ok((
                parts[0].to_string(),
                parts[1].trim_end_matches(".git").to_string(),
            ));
        }
        return Err(Error::Parse(format!(
            "Invalid repository format: {}. Expected owner/repo",
            url
        )));
    }

    // Handle HTTPS URL: https://github.com/owner/repo
    if url.starts_with("https://") || url.starts_with("http://") || url.starts_with("ssh://") {
        let url = url::Url::parse(url).map_err(|e| Error::Parse(e.to_string()))?;
        let path = url.path().trim_start_matches('/').trim_end_matches(".git");
        let parts: Vec<&str> = path.split('/').collect();
        if parts.len() >= 2 && !parts[0].is_empty() && !parts[1].is_empty() {
            return Ok((parts[0].to_string(), parts[1].to_string()));
        }
        return Err(Error::Parse(format!("Invalid GitHub URL path: {}", path)));
    }

    // Handle SSH URL: git@github.com:owner/repo.git
    if url.starts_with("git@") {
        if let Some(path) = url.split(':').nth(1) {
            let path = path.trim_end_matches(".git");
            let parts: Vec<&str> = path.split('/').collect();
            if parts.len() >= 2 {
                return Ok((parts[0].to_string(), parts[1].to_string()));
            }
        }
        return Err(Error::Parse(format!("Invalid SSH URL: {}", url)));
    }

    Err(Error::Parse(format!("Unrecognized URL format: {}", url)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_shorthand() {
        let (owner, repo) = parse_github_url("owner/repo").unwrap();
        assert_eq!(owner, "owner");
        assert_eq!(repo, "repo");
    }

    #[test]
    fn test_parse_https_url_with_git_suffix() {
        let (owner, repo) = parse_github_url("https://github.com/owner/repo.git").unwrap();
        assert_eq!(owner, "owner");
        assert_eq!(repo, "repo");
    }

    #[test]
    fn test_parse_ssh_urls() {
        for url in [
            "git@github.com:owner/repo.git",
            "ssh://git@github.com/owner/repo.git",
        ] {
            let (owner, repo) = parse_github_url(url).unwrap();
            assert_eq!((owner.as_str(), repo.as_str()), ("owner", "repo"), "{url}");
        }
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse_github_url("invalid").is_err());
        assert!(parse_github_url("/repo").is_err());
        assert!(parse_github_url("https://github.com/owner").is_err());
    }

    #[tokio::test]
    async fn test_graphql_url() {
        let dotcom = GitHubClient::with_token("o", "r", "t", "https://api.github.com/").unwrap();
        assert_eq!(dotcom.graphql_url(), "https://api.github.com/graphql");

        let enterprise =
            GitHubClient::with_token("o", "r", "t", "https://git.example.com/api/v3").unwrap();
        assert_eq!(enterprise.graphql_url(), "https://git.example.com/api/graphql");
    }
}
