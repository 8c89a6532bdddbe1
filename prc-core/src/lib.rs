//! gh-comment core - batch comment orchestration and error remediation
//!
//! This crate holds everything that does not talk to the network: comment
//! body validation, suggestion expansion, batch parsing, the dispatcher that
//! drives a [`CommentClient`], and the classifier that turns failed calls into
//! remediation plans.

pub mod batch;
pub mod client;
pub mod comment;
pub mod config;
pub mod diff;
pub mod dispatch;
pub mod error;
pub mod git;
pub mod markdown;
pub mod remediation;
pub mod secrets;
pub mod suggest;
pub mod validate;

pub use batch::{parse, BatchSpec, ParseError, ParseOptions, ParsedBatch, Parser};
pub use client::{ApiFailure, ApiResult, CommentClient, RateLimit};
pub use comment::{
    Comment, CommentMetadata, CommentOperation, CommentTarget, CommentType, LineRange,
    NewComment, OperationKind, Reaction, Side,
};
pub use config::{CliOverrides, Config};
pub use diff::{ChangedFile, CommentableLines};
pub use dispatch::{BatchReport, Dispatcher, OperationOutcome, OperationResult};
pub use error::{Error, Result};
pub use git::{GitRepo, RemoteInfo};
pub use remediation::{render, Classifier, FailureKind, RemediationPlan};
pub use secrets::Secrets;
pub use validate::{validate, Severity, ValidationIssue};
