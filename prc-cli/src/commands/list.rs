//! List command - show comments with their ids and types

use clap::Args;
use prc_core::{Comment, CommentClient, CommentType};

use super::Context;

/// List issue and review comments on the pull request
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only show comments of this type
    #[arg(long = "only")]
    pub only: Option<CommentType>,
}

impl ListArgs {
    /// Execute the list command
    pub async fn execute(&self, ctx: &Context) -> anyhow::Result<()> {
        let client = ctx.client(None)?;
        let pr = ctx.pr(&client, None).await?;

        let comments: Vec<Comment> = client
            .list_comments(pr)
            .await?
            .into_iter()
            .filter(|c| self.only.map_or(true, |t| c.comment_type == t))
            .collect();

        if comments.is_empty() {
            println!("No comments on pull request #{pr}");
            return Ok(());
        }

        println!("Comments on pull request #{pr}:");
        println!();
        for comment in &comments {
            println!("{}", format_comment(comment));
        }
        println!();
        println!("{} comment(s)", comments.len());

        Ok(())
    }
}

const PREVIEW_CHARS: usize = 60;

fn format_comment(comment: &Comment) -> String {
    let location = match (&comment.path, comment.line) {
        (Some(path), Some(line)) => format!("{path}:{line}"),
        (Some(path), None) => path.clone(),
        _ => "(conversation)".to_string(),
    };

    let first_line = comment.body.lines().next().unwrap_or("");
    let mut preview: String = first_line.chars().take(PREVIEW_CHARS).collect();
    if first_line.chars().count() > PREVIEW_CHARS || comment.body.lines().nth(1).is_some() {
        preview.push_str("...");
    }

    let reply = comment
        .in_reply_to
        .map(|id| format!(" (reply to #{id})"))
        .unwrap_or_default();

    format!(
        "#{:<12} {:<6} {:<16} {}{reply}\n    {preview}",
        comment.id, comment.comment_type, comment.author, location
    )
}
