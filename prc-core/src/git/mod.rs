//! Git operations for gh-comment
//!
//! Only used to work out which GitHub repository and branch a command runs
//! against.

mod repo;

pub use repo::{GitRepo, RemoteInfo};
