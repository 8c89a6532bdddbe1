//! Dispatch a parsed batch and report the outcome
//!
//! Used by `batch` and by the single-operation commands, which build a
//! one-entry batch so they share validation, expansion and remediation.

use std::sync::Arc;
use std::time::Duration;

use prc_core::dispatch::render_dry_run;
use prc_core::{
    render, BatchReport, CommentClient, Dispatcher, OperationOutcome, ParsedBatch,
};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use super::Context;

/// How to run a parsed batch
#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    pub dry_run: bool,
    pub timeout: Duration,
}

/// Print validation issues; fail when any of them is an error
pub fn check_issues(parsed: &ParsedBatch) -> anyhow::Result<()> {
    for issue in &parsed.issues {
        eprintln!("{issue}");
    }

    if parsed.has_errors() {
        let errors = parsed.issues.iter().filter(|i| i.is_error()).count();
        anyhow::bail!("Batch rejected: {errors} error(s), nothing was sent");
    }
    Ok(())
}

/// Run a validated batch against GitHub
pub async fn run(ctx: &Context, parsed: &ParsedBatch, options: RunOptions) -> anyhow::Result<()> {
    check_issues(parsed)?;
    let spec = &parsed.spec;

    if spec.is_empty() {
        println!("Nothing to do: the batch has no operations");
        return Ok(());
    }

    if options.dry_run {
        // Dry runs stay offline when the pull request is already known
        let pr = match ctx.known_pr(spec.pr) {
            Some(pr) => pr,
            None => {
                let client = ctx.client(spec.repo.as_deref())?;
                ctx.pr(&client, spec.pr).await?
            }
        };
        print!("{}", render_dry_run(spec, pr));
        return Ok(());
    }

    let client = ctx.client(spec.repo.as_deref())?;
    let pr = ctx.pr(&client, spec.pr).await?;
    let repo = format!("{}/{}", client.owner(), client.repo());
    let client: Arc<dyn CommentClient> = Arc::new(client);

    let cancel = CancellationToken::new();
    let watcher = tokio::spawn(cancel_on_timeout_or_interrupt(cancel.clone(), options.timeout));

    let report = Dispatcher::new(client, pr)
        .with_repo(repo)
        .dispatch(spec, &cancel)
        .await;
    watcher.abort();

    print_report(&report);

    let failed = report.failed().count();
    if failed > 0 {
        anyhow::bail!("{failed} of {} operation(s) failed", report.results.len());
    }
    Ok(())
}

/// Cancel the batch at the deadline or on Ctrl-C, whichever comes first
async fn cancel_on_timeout_or_interrupt(cancel: CancellationToken, timeout: Duration) {
    tokio::select! {
        () = tokio::time::sleep(timeout) => {
            warn!(timeout = ?timeout, "Batch deadline reached, cancelling");
        }
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                warn!(error = %e, "Could not listen for Ctrl-C");
                return;
            }
            warn!("Interrupted, cancelling");
        }
    }
    cancel.cancel();
}

fn print_report(report: &BatchReport<'_>) {
    for result in &report.results {
        let number = result.index + 1;
        match &result.outcome {
            OperationOutcome::Success { comment_id } => {
                println!("ok    {number}. {} (#{comment_id})", result.operation.summary());
            }
            OperationOutcome::Failed(plan) => {
                println!("FAIL  {number}. {}", result.operation.summary());
                for line in render(plan).lines() {
                    println!("      {line}");
                }
            }
        }
    }

    let succeeded = report.succeeded().count();
    let failed = report.failed().count();
    let cancelled = report.cancelled();

    println!();
    if cancelled > 0 {
        println!("{succeeded} succeeded, {failed} failed ({cancelled} cancelled)");
    } else {
        println!("{succeeded} succeeded, {failed} failed");
    }
}
