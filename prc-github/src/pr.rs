//! Pull request lookups: the PR for a branch and the files it changes

use octocrab::params::State;
use prc_core::client::ApiResult;
use prc_core::ChangedFile;
use serde::Deserialize;
use tracing::{debug, info};

use crate::{Error, GitHubClient, Result};

/// Entry of `pulls/{pr}/files`
#[derive(Debug, Deserialize)]
struct ApiFile {
    filename: String,
    status: String,
    patch: Option<String>,
}

impl From<ApiFile> for ChangedFile {
    fn from(f: ApiFile) -> Self {
        ChangedFile {
            path: f.filename,
            status: f.status,
            patch: f.patch,
        }
    }
}

impl GitHubClient {
    /// Number of the open pull request whose head is `branch`
    ///
    /// Only branches pushed to the repository itself are matched; pull
    /// requests from forks need an explicit `--pr`.
    pub async fn find_pr_for_branch(&self, branch: &str) -> Result<u64> {
        debug!(branch, "Looking up pull request for branch");

        let prs = self
            .client()
            .pulls(self.owner(), self.repo())
            .list()
            .state(State::Open)
            .head(format!("{}:{}", self.owner(), branch))
            .per_page(10)
            .send()
            .await
            .map_err(Error::Api)?;

        let number = prs
            .items
            .first()
            .map(|pr| pr.number)
            .ok_or_else(|| Error::PrNotFound(branch.to_string()))?;

        if prs.items.len() > 1 {
            debug!(count = prs.items.len(), "Several open pull requests; using the first");
        }
        info!(branch, pr = number, "Detected pull request");
        Ok(number)
    }

    /// Files changed by a pull request, with their diff hunks
    pub async fn pull_request_files(&self, pr: u64) -> ApiResult<Vec<ChangedFile>> {
        let route = self.repo_path(&format!("/pulls/{pr}/files"));
        let files: Vec<ApiFile> = self.get_all(&route).await?;
        debug!(pr, count = files.len(), "Listed changed files");
        Ok(files.into_iter().map(ChangedFile::from).collect())
    }
}
