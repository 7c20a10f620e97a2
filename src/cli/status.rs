//! Status command - show the stack's pull requests and their merge signals

use crate::cli::context::CommandContext;
use crate::cli::style::{Stylize, pr_link};
use anstream::println;
use stackpr::error::Result;
use stackpr::types::{CheckStatus, MergeStatus, PullRequest};
use std::path::Path;

/// Run the status command
pub async fn run_status(path: &Path, remote: Option<&str>) -> Result<()> {
    let ctx = CommandContext::new(path, remote).await?;
    let info = ctx.fetch_info().await?;

    if info.pull_requests.is_empty() {
        println!(
            "{}",
            format!("No open pull requests for {}", ctx.local_branch).muted()
        );
        return Ok(());
    }

    // Top of the stack first, the PR closest to trunk last
    for pr in info.pull_requests.iter().rev() {
        println!("{}", status_line(pr));
    }
    println!();
    println!(
        "{} {}",
        "[checks approved no-conflicts stacked] →".muted(),
        ctx.target_branch.accent()
    );
    Ok(())
}

fn status_line(pr: &PullRequest) -> String {
    format!(
        "{} {} : {}",
        glyphs(&pr.merge_status),
        pr_link(pr.number, &pr.url),
        pr.title
    )
}

fn flag(ok: bool) -> String {
    if ok { "✔".success() } else { "✗".failure() }
}

fn glyphs(status: &MergeStatus) -> String {
    let checks = match status.checks {
        CheckStatus::Pass => "✔".success(),
        CheckStatus::Fail => "✗".failure(),
        CheckStatus::Pending => "⌛".warn(),
        CheckStatus::Unknown => "?".muted(),
    };
    format!(
        "[{checks}{}{}{}]",
        flag(status.review_approved),
        flag(status.no_conflicts),
        flag(status.stacked)
    )
}
