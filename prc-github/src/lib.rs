//! gh-comment GitHub - GitHub integration for gh-comment
//!
//! This crate implements [`prc_core::CommentClient`] against GitHub: issue
//! and review comments over REST, review threads over GraphQL, and pull
//! request detection for the current branch.

mod client;
mod comments;
mod error;
mod graphql;
mod pr;

pub use client::{parse_github_url, GitHubClient};
pub use error::{Error, Result};
