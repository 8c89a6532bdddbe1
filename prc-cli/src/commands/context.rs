//! Repository, pull request and client resolution shared by all commands

use anyhow::Context as _;
use prc_core::{Config, GitRepo};
use prc_github::{parse_github_url, GitHubClient};
use tracing::debug;

/// What every command needs to talk to GitHub
#[derive(Debug)]
pub struct Context {
    pub config: Config,
    pub verbose: bool,
    /// `--repo` as given on the command line
    cli_repo: Option<String>,
    /// `--pr` as given on the command line
    cli_pr: Option<u64>,
}

impl Context {
    pub fn new(config: Config, verbose: bool, cli_repo: Option<String>, cli_pr: Option<u64>) -> Self {
        Self {
            config,
            verbose,
            cli_repo,
            cli_pr,
        }
    }

    /// Repository as `owner/name`
    ///
    /// Priority: `--repo` > batch `repo:` > config/env > `origin` remote.
    pub fn repo_slug(&self, batch_repo: Option<&str>) -> anyhow::Result<String> {
        if let Some(repo) = self
            .cli_repo
            .as_deref()
            .or(batch_repo)
            .or(self.config.defaults.repo.as_deref())
        {
            return Ok(repo.to_string());
        }

        let git = GitRepo::open(".")?;
        let remote = git.default_remote()?;
        let (owner, repo) = parse_github_url(&remote.url)
            .with_context(|| format!("Remote '{}' does not point at GitHub", remote.name))?;
        debug!(remote = %remote.name, owner = %owner, repo = %repo, "Detected repository from git");
        Ok(format!("{owner}/{repo}"))
    }

    /// Client for the resolved repository
    pub fn client(&self, batch_repo: Option<&str>) -> anyhow::Result<GitHubClient> {
        let slug = self.repo_slug(batch_repo)?;
        let client = GitHubClient::from_url(&slug, &self.config.github.api_base)?;
        if self.verbose {
            println!("Repository: {}/{}", client.owner(), client.repo());
        }
        Ok(client)
    }

    /// Pull request number without touching the network, if known
    pub fn known_pr(&self, batch_pr: Option<u64>) -> Option<u64> {
        self.cli_pr.or(batch_pr)
    }

    /// Pull request number
    ///
    /// Priority: `--pr` > batch `pr:` > open pull request for the current branch.
    pub async fn pr(&self, client: &GitHubClient, batch_pr: Option<u64>) -> anyhow::Result<u64> {
        if let Some(pr) = self.known_pr(batch_pr) {
            return Ok(pr);
        }

        let git = GitRepo::open(".")?;
        let branch = git.current_branch()?.ok_or_else(|| {
            anyhow::anyhow!("HEAD is detached; pass --pr to choose a pull request")
        })?;
        let pr = client
            .find_pr_for_branch(&branch)
            .await
            .with_context(|| "Pass --pr to choose a pull request".to_string())?;
        if self.verbose {
            println!("Pull request: #{pr} (branch {branch})");
        }
        Ok(pr)
    }
}
