//! gh-comment CLI - pull request comments from the command line
//!
//! Adds, replies to, edits, reacts to and resolves review comments, one at a
//! time or from a batch file, and explains what to do when GitHub says no.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use prc_core::{CliOverrides, CommentType, Config};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{
    AddArgs, BatchArgs, ConfigArgs, Context, EditArgs, LinesArgs, ListArgs, ReactArgs, ReplyArgs,
    ResolveArgs,
};

/// gh-comment: batch pull request comments with guided error recovery
#[derive(Parser, Debug)]
#[command(name = "gh-comment")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Repository as owner/name (detected from the git remote if not given)
    #[arg(short = 'R', long, global = true)]
    repo: Option<String>,

    /// Pull request number (detected from the current branch if not given)
    #[arg(long, global = true)]
    pr: Option<u64>,

    /// Config file to use instead of ~/.config/gh-comment/config.toml
    #[arg(long, global = true, env = "GH_COMMENT_CONFIG")]
    config: Option<PathBuf>,

    /// Comment type when an operation does not say (review or issue)
    #[arg(long = "type", global = true)]
    comment_type: Option<CommentType>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    /// Apply comment operations from a YAML or JSON file
    #[command(visible_alias = "b")]
    Batch(BatchArgs),

    /// Add a comment
    Add(AddArgs),

    /// Reply to a comment
    Reply(ReplyArgs),

    /// React to a comment, or remove your reaction
    React(ReactArgs),

    /// Replace the text of a comment
    Edit(EditArgs),

    /// Resolve a review thread
    Resolve(ResolveArgs),

    /// List comments on the pull request
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// Show which lines of a changed file accept review comments
    Lines(LinesArgs),

    /// Show current configuration
    Config(ConfigArgs),
}

impl Cli {
    /// Flags that take precedence over the config file and environment
    fn overrides(&self) -> CliOverrides {
        let (timeout, no_expand_suggestions) = match &self.command {
            Some(Commands::Batch(args)) => (args.timeout, args.no_expand_suggestions),
            Some(Commands::Add(args)) => (None, args.no_expand_suggestions),
            Some(Commands::Reply(args)) => (None, args.no_expand_suggestions),
            Some(Commands::Edit(args)) => (None, args.no_expand_suggestions),
            _ => (None, false),
        };

        CliOverrides {
            repo: self.repo.clone(),
            comment_type: self.comment_type,
            timeout,
            expand_suggestions: no_expand_suggestions.then_some(false),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins; --verbose only changes the default
    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    let config = Config::load_with_overrides(cli.config.as_deref(), cli.overrides())?;

    if cli.verbose {
        tracing::info!(
            repo = ?config.defaults.repo,
            comment_type = %config.defaults.comment_type,
            timeout = ?config.batch.timeout,
            expand_suggestions = config.defaults.expand_suggestions,
            api_base = %config.github.api_base,
            "Configuration loaded"
        );
    }

    let ctx = Context::new(config, cli.verbose, cli.repo, cli.pr);

    match cli.command {
        Some(Commands::Version) => {
            println!("gh-comment {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Batch(args)) => {
            args.execute(&ctx).await?;
        }
        Some(Commands::Add(args)) => {
            args.execute(&ctx).await?;
        }
        Some(Commands::Reply(args)) => {
            args.execute(&ctx).await?;
        }
        Some(Commands::React(args)) => {
            args.execute(&ctx).await?;
        }
        Some(Commands::Edit(args)) => {
            args.execute(&ctx).await?;
        }
        Some(Commands::Resolve(args)) => {
            args.execute(&ctx).await?;
        }
        Some(Commands::List(args)) => {
            args.execute(&ctx).await?;
        }
        Some(Commands::Lines(args)) => {
            args.execute(&ctx).await?;
        }
        Some(Commands::Config(args)) => {
            args.execute(&ctx)?;
        }
        None => {
            println!("gh-comment - pull request comments with guided error recovery");
            println!();
            println!("Use --help for usage information");
        }
    }

    Ok(())
}
