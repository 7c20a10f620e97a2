//! Update command - push the stack and reconcile its pull requests

use crate::cli::CliProgress;
use crate::cli::context::CommandContext;
use crate::cli::style::{CHECK, Stylize, arrow, check, pr_link, spinner_style};
use anstream::println;
use indicatif::ProgressBar;
use stackpr::error::Result;
use stackpr::submit::{
    ReconcileOptions, ReconcilePlan, ReconcileResult, create_reconcile_plan, execute_reconcile,
};
use stackpr::types::RepoAssignee;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::warn;

/// Options for the update command
#[derive(Debug, Clone, Default)]
pub struct UpdateOptions {
    /// Show the plan without pushing or touching PRs
    pub dry_run: bool,
    /// Open new PRs as drafts
    pub draft: bool,
    /// Logins to request review from on new PRs
    pub reviewers: Vec<String>,
}

/// Run the update command
pub async fn run_update(path: &Path, remote: Option<&str>, options: UpdateOptions) -> Result<()> {
    let ctx = CommandContext::new(path, remote).await?;

    if !options.dry_run {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(spinner_style());
        spinner.set_message(format!("Fetching from {}...", ctx.remote_name.emphasis()));
        spinner.enable_steady_tick(Duration::from_millis(80));

        ctx.repo.fetch(&ctx.remote_name).await?;

        spinner.finish_with_message(format!(
            "{} Fetched from {}",
            check(),
            ctx.remote_name.emphasis()
        ));
    }

    let commits = ctx.repo.stack_commits(&ctx.remote_name, &ctx.target_branch)?;
    let info = ctx.fetch_info().await?;

    if commits.is_empty() && info.pull_requests.is_empty() {
        println!(
            "{}",
            format!(
                "No commits between {}/{} and HEAD",
                ctx.remote_name, ctx.target_branch
            )
            .muted()
        );
        return Ok(());
    }

    let plan = create_reconcile_plan(&info, &commits, &ctx.target_branch)?;

    if options.dry_run {
        print_plan(&plan);
        println!("{}", "Dry run complete".muted());
        return Ok(());
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(spinner_style());
    spinner.set_message(format!(
        "Pushing {} branch(es)...",
        plan.steps.len().accent()
    ));
    spinner.enable_steady_tick(Duration::from_millis(80));
    ctx.repo
        .push_branches(&ctx.remote_name, &plan.branches_to_push())
        .await?;
    spinner.finish_with_message(format!(
        "{} Pushed {} branch(es) to {}",
        check(),
        plan.steps.len().accent(),
        ctx.remote_name.emphasis()
    ));

    let logins = if options.reviewers.is_empty() {
        ctx.config.user.default_reviewers.clone()
    } else {
        options.reviewers.clone()
    };
    let reviewer_ids = if plan.count_creates() > 0 && !logins.is_empty() {
        let users = ctx.service.assignable_users().await?;
        resolve_reviewers(&logins, &users)
    } else {
        Vec::new()
    };

    let cancel = Arc::new(AtomicBool::new(false));
    let interrupt = tokio::spawn({
        let cancel = Arc::clone(&cancel);
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.store(true, Ordering::SeqCst);
            }
        }
    });

    println!(
        "{} {}",
        "Updating stack:".emphasis(),
        ctx.local_branch.accent()
    );

    let reconcile_options = ReconcileOptions {
        draft: options.draft || ctx.config.user.create_draft_prs,
        reviewer_ids,
        cancel: Some(cancel),
    };
    let result = execute_reconcile(
        &plan,
        &info,
        ctx.service.as_ref(),
        &reconcile_options,
        &CliProgress,
    )
    .await;
    interrupt.abort();

    print_summary(&result?);
    Ok(())
}

/// Map logins to user node IDs, warning about unknown logins
fn resolve_reviewers(logins: &[String], users: &[RepoAssignee]) -> Vec<String> {
    logins
        .iter()
        .filter_map(|login| {
            let found = users
                .iter()
                .find(|u| u.login.eq_ignore_ascii_case(login))
                .map(|u| u.id.clone());
            if found.is_none() {
                warn!(%login, "reviewer is not assignable in this repository");
            }
            found
        })
        .collect()
}

fn print_plan(plan: &ReconcilePlan) {
    println!("{}:", "Update plan".emphasis());
    println!();

    if plan.is_empty() {
        println!("  {}", "Nothing to do".muted());
        println!();
        return;
    }

    for pr in &plan.stale {
        println!(
            "  {} close PR {}: {} {}",
            arrow(),
            pr_link(pr.number, &pr.url),
            pr.title,
            "(commit left the stack)".muted()
        );
    }
    for step in &plan.steps {
        println!("  {} {step}", arrow());
    }
    println!();
}

fn print_summary(result: &ReconcileResult) {
    println!();
    println!(
        "{} {} created, {} updated, {} closed",
        format!("{CHECK} Update complete:").success(),
        result.created.len().accent(),
        result.updated.len().accent(),
        result.closed.len().accent()
    );
    for pr in result.pull_requests.iter().rev() {
        println!("  {} {}", pr_link(pr.number, &pr.url), pr.title);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str, login: &str) -> RepoAssignee {
        RepoAssignee {
            id: id.to_string(),
            login: login.to_string(),
            name: String::new(),
        }
    }

    #[test]
    fn test_resolve_reviewers_case_insensitive() {
        let users = vec![user("U_1", "Octocat"), user("U_2", "hubot")];
        let ids = resolve_reviewers(
            &["octocat".to_string(), "ghost".to_string(), "hubot".to_string()],
            &users,
        );
        assert_eq!(ids, vec!["U_1".to_string(), "U_2".to_string()]);
    }
}
