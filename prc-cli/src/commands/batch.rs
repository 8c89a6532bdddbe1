//! Batch command - apply many comment operations from one file

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use prc_core::{ParseOptions, Parser};

use super::run::{run, RunOptions};
use super::Context;

/// Apply the operations in a YAML or JSON batch file
#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Batch file, or `-` to read from stdin
    pub file: PathBuf,

    /// Show what would be sent without calling GitHub
    #[arg(long)]
    pub dry_run: bool,

    /// Deadline for the whole batch (e.g. "90s", "5m"); overrides `batch.timeout`
    #[arg(long, value_parser = humantime_serde::re::humantime::parse_duration)]
    pub timeout: Option<Duration>,

    /// Send suggestion markers as written
    #[arg(long)]
    pub no_expand_suggestions: bool,
}

impl BatchArgs {
    /// Execute the batch command
    pub async fn execute(&self, ctx: &Context) -> anyhow::Result<()> {
        let parser = Parser::new(parse_options(ctx));

        let parsed = if self.file.as_os_str() == "-" {
            parser.parse_reader(std::io::stdin().lock())?
        } else {
            parser.parse_file(&self.file)?
        };

        if ctx.verbose {
            println!(
                "Parsed {} operation(s) from {}",
                parsed.spec.len(),
                self.file.display()
            );
        }

        let options = RunOptions {
            dry_run: self.dry_run,
            timeout: ctx.config.batch.timeout,
        };
        run(ctx, &parsed, options).await
    }
}

/// Parser options from the effective configuration
///
/// `--no-expand-suggestions` reaches this through the config overrides.
pub fn parse_options(ctx: &Context) -> ParseOptions {
    ParseOptions {
        expand_suggestions: ctx.config.defaults.expand_suggestions,
        comment_type: Some(ctx.config.defaults.comment_type),
    }
}
