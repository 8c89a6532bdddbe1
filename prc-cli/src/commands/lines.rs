//! Lines command - which lines of a changed file accept review comments

use std::fmt::Write as _;

use clap::Args;
use prc_core::diff::group_ranges;
use prc_core::remediation::quote_arg;
use prc_core::{ChangedFile, Side};

use super::Context;

/// Show the lines of a file that review comments can be anchored to
#[derive(Args, Debug)]
pub struct LinesArgs {
    /// File path as it appears in the pull request
    pub file: String,

    /// Show removed lines (old side) instead of added ones
    #[arg(long)]
    pub left: bool,
}

impl LinesArgs {
    /// Execute the lines command
    pub async fn execute(&self, ctx: &Context) -> anyhow::Result<()> {
        let client = ctx.client(None)?;
        let pr = ctx.pr(&client, None).await?;
        let files = client.pull_request_files(pr).await?;
        let side = if self.left { Side::Left } else { Side::Right };

        let Some(file) = files.iter().find(|f| f.path == self.file) else {
            print!("{}", render_missing(&self.file, pr, &files));
            anyhow::bail!("{} is not changed by pull request #{pr}", self.file);
        };

        print!("{}", render_lines(file, side, pr));
        Ok(())
    }
}

fn side_name(side: Side) -> &'static str {
    match side {
        Side::Right => "new",
        Side::Left => "old",
    }
}

fn render_lines(file: &ChangedFile, side: Side, pr: u64) -> String {
    let lines = file.commentable_lines();
    let numbers = lines.side(side);
    let mut out = String::new();

    if numbers.is_empty() {
        let _ = writeln!(
            out,
            "No lines of {} accept comments on the {} side of pull request #{pr}",
            file.path,
            side_name(side)
        );
        if file.patch.is_none() {
            let _ = writeln!(out, "GitHub shows no diff for it ({}, binary or too large)", file.status);
        }
        return out;
    }

    let ranges = group_ranges(numbers);
    let _ = writeln!(
        out,
        "Commentable lines in {} ({} side of pull request #{pr}):",
        file.path,
        side_name(side)
    );
    out.push('\n');
    out.push_str("Ranges:\n");
    for range in &ranges {
        let _ = writeln!(out, "  {range}");
    }

    let individual: Vec<String> = numbers.iter().map(u32::to_string).collect();
    let _ = writeln!(out, "\nLines: {}", individual.join(", "));

    let path = quote_arg(&file.path);
    let left = if side == Side::Left { " --left" } else { "" };
    out.push_str("\nUsage:\n");
    let _ = writeln!(
        out,
        "  gh comment add {path} {} \"<message>\"{left} --pr {pr}",
        numbers[0]
    );
    if let Some(range) = ranges.iter().find(|r| r.is_multi_line()) {
        let _ = writeln!(out, "  gh comment add {path} {range} \"<message>\"{left} --pr {pr}");
    }
    out
}

fn render_missing(path: &str, pr: u64, files: &[ChangedFile]) -> String {
    let mut out = format!("{path} is not part of the diff of pull request #{pr}\n");
    if files.is_empty() {
        out.push_str("The pull request changes no files\n");
        return out;
    }
    out.push_str("\nChanged files:\n");
    for file in files {
        let _ = writeln!(out, "  {} ({})", file.path, file.status);
    }
    out
}
