//! Merge command - land the ready prefix of the stack

use crate::cli::CliProgress;
use crate::cli::context::CommandContext;
use crate::cli::style::{Stylize, check, pr_link};
use anstream::println;
use dialoguer::Confirm;
use stackpr::error::{Error, Result};
use stackpr::merge::{MergeExecutionResult, MergePlan, MergeStep, create_merge_plan, execute_merge};
use std::path::Path;

/// Options for the merge command
#[derive(Debug, Clone, Default)]
pub struct MergeOptions {
    /// Only consider the first N PRs from the bottom of the stack
    pub count: Option<usize>,
    /// Dry run - show what would be merged without making changes
    pub dry_run: bool,
    /// Preview plan and prompt for confirmation before executing
    pub confirm: bool,
}

/// Run the merge command
pub async fn run_merge(path: &Path, remote: Option<&str>, options: MergeOptions) -> Result<()> {
    let ctx = CommandContext::new(path, remote).await?;
    let info = ctx.fetch_info().await?;

    if info.pull_requests.is_empty() {
        println!(
            "{}",
            format!("No open pull requests for {}", ctx.local_branch).muted()
        );
        return Ok(());
    }

    let plan = create_merge_plan(
        &info,
        &ctx.target_branch,
        ctx.config.repo.merge_method,
        &ctx.config.repo.merge_policy(),
        options.count,
    );

    if options.dry_run {
        report_merge_plan(&plan);
        return Ok(());
    }

    if plan.is_empty() {
        println!("{}", "No PRs are ready to merge.".muted());
        print_blocking_summary(&plan);
        return Ok(());
    }

    if options.confirm {
        report_merge_plan(&plan);
        if !Confirm::new()
            .with_prompt("Proceed with merge?")
            .default(true)
            .interact()
            .map_err(|e| Error::Internal(format!("Failed to read confirmation: {e}")))?
        {
            println!("{}", "Aborted".muted());
            return Ok(());
        }
        println!();
    }

    println!(
        "{} {} into {}",
        "Merging".emphasis(),
        format!("{} PR(s)", plan.landed_count()).accent(),
        ctx.target_branch.accent()
    );

    let result = execute_merge(&plan, ctx.service.as_ref(), &CliProgress).await?;
    print_merge_summary(&result);
    Ok(())
}

fn print_merge_summary(result: &MergeExecutionResult) {
    println!();
    if let Some(number) = result.merged {
        println!("{} Merged #{number}", check());
    }
    if !result.closed.is_empty() {
        let closed: Vec<String> = result.closed.iter().map(|n| format!("#{n}")).collect();
        println!("   Closed: {}", closed.join(", ").accent());
    }
}

/// Report what would be merged
fn report_merge_plan(plan: &MergePlan) {
    println!("{}:", "Merge plan".emphasis());
    println!();

    if plan.steps.is_empty() {
        println!("  {}", "No PRs to process".muted());
        println!();
        return;
    }

    for step in &plan.steps {
        match step {
            MergeStep::RetargetBase { pr, to } => {
                println!(
                    "  {} PR {}: {} → {}",
                    "↪ Would retarget".accent(),
                    pr_link(pr.number, &pr.url),
                    pr.to_branch.muted(),
                    to.accent()
                );
            }
            MergeStep::Merge { pr, method } => {
                println!(
                    "  {} PR {} ({method}): {}",
                    "✓ Would merge".success(),
                    pr_link(pr.number, &pr.url),
                    pr.title
                );
            }
            MergeStep::Close { pr, merged_in } => {
                println!(
                    "  {} PR {}: {} {}",
                    "✓ Would close".success(),
                    pr_link(pr.number, &pr.url),
                    pr.title,
                    format!("(lands with #{merged_in})").muted()
                );
            }
            MergeStep::Skip {
                pr_number,
                pr_title,
                reasons,
            } => {
                println!("  {} PR #{pr_number}: {pr_title}", "✗ Would stop at".warn());
                for reason in reasons {
                    println!("    - {}", reason.muted());
                }
            }
        }
    }

    println!();
    if plan.is_empty() {
        println!("{}", "No PRs are ready to merge.".muted());
    } else {
        println!("{}", "Run without --dry-run to execute.".muted());
    }
}

/// Print summary of blocking reasons
fn print_blocking_summary(plan: &MergePlan) {
    for step in &plan.steps {
        if let MergeStep::Skip {
            pr_number,
            pr_title,
            reasons,
        } = step
        {
            println!("  PR #{pr_number} ({}):", pr_title.accent());
            for reason in reasons {
                println!("    - {}", reason.muted());
            }
        }
    }
}
