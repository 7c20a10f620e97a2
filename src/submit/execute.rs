//! Reconciliation execution - effectful operations
//!
//! Takes a [`ReconcilePlan`] and drives the remote service until every local
//! commit has exactly one open PR chained onto the PR below it.

use crate::error::{Error, Result, mutation_error};
use crate::platform::RemoteService;
use crate::stack::format_body;
use crate::submit::plan::ReconcilePlan;
use crate::submit::progress::ProgressCallback;
use crate::types::{GitHubInfo, MergeStatus, NewPullRequest, PullRequest, PullRequestUpdate};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

/// Comment left on a PR before it is closed for leaving the stack
pub const STALE_PR_COMMENT: &str = "Closing pull request: commit has gone away";

/// Knobs for a reconciliation pass
#[derive(Debug, Clone, Default)]
pub struct ReconcileOptions {
    /// Open new PRs as drafts
    pub draft: bool,
    /// Node IDs of users to request review from on newly created PRs
    pub reviewer_ids: Vec<String>,
    /// Set to stop the pass at the next step boundary
    pub cancel: Option<Arc<AtomicBool>>,
}

impl ReconcileOptions {
    fn check_cancelled(&self) -> Result<()> {
        match &self.cancel {
            Some(flag) if flag.load(Ordering::SeqCst) => Err(Error::Cancelled),
            _ => Ok(()),
        }
    }
}

/// Outcome of a reconciliation pass
#[derive(Debug, Clone, Default)]
pub struct ReconcileResult {
    /// Final stack, trunk-adjacent first
    pub pull_requests: Vec<PullRequest>,
    /// Numbers of PRs that were created
    pub created: Vec<u64>,
    /// Numbers of PRs whose base, title or body changed
    pub updated: Vec<u64>,
    /// Numbers of PRs that were closed
    pub closed: Vec<u64>,
}

impl ReconcileResult {
    /// Whether the pass changed anything on the remote
    pub fn has_changes(&self) -> bool {
        !(self.created.is_empty() && self.updated.is_empty() && self.closed.is_empty())
    }
}

/// Execute a reconciliation plan (EFFECTFUL)
///
/// Steps run one at a time. The first service error aborts the pass, and
/// the cancel flag is only honored between steps.
pub async fn execute_reconcile(
    plan: &ReconcilePlan,
    info: &GitHubInfo,
    service: &dyn RemoteService,
    options: &ReconcileOptions,
    progress: &dyn ProgressCallback,
) -> Result<ReconcileResult> {
    let mut result = ReconcileResult::default();

    for pr in &plan.stale {
        options.check_cancelled()?;
        service
            .comment_pull_request(&pr.id, STALE_PR_COMMENT)
            .await
            .map_err(|e| mutation_error("comment", pr, e))?;
        service
            .close_pull_request(&pr.id)
            .await
            .map_err(|e| mutation_error("close", pr, e))?;
        progress.on_pr_closed(pr).await;
        result.closed.push(pr.number);
    }

    let mut stack: Vec<PullRequest> = Vec::with_capacity(plan.steps.len());

    for step in &plan.steps {
        options.check_cancelled()?;

        if let Some(existing) = &step.existing {
            let mut pr = existing.clone();
            pr.commit = step.commit.clone();
            stack.push(pr);
            continue;
        }

        let mut pr = PullRequest {
            title: step.commit.subject.clone(),
            from_branch: step.head_ref.clone(),
            to_branch: step.base_ref.clone(),
            commit: step.commit.clone(),
            merge_status: MergeStatus::default(),
            ..Default::default()
        };
        pr.body = format_body(&step.commit, &stack);

        let request = NewPullRequest {
            repository_id: info.repository_id.clone(),
            base_ref_name: step.base_ref.clone(),
            head_ref_name: step.head_ref.clone(),
            title: pr.title.clone(),
            body: pr.body.clone(),
            draft: options.draft,
        };
        let created = service
            .create_pull_request(&request)
            .await
            .map_err(|e| mutation_error("create", &pr, e))?;

        pr.id = created.id;
        pr.number = created.number;
        pr.url = created.url;
        debug!(number = pr.number, head = %pr.from_branch, "created pull request");

        if !options.reviewer_ids.is_empty() {
            service
                .add_reviewers(&pr.id, &options.reviewer_ids)
                .await
                .map_err(|e| mutation_error("add reviewers", &pr, e))?;
        }

        progress.on_pr_created(&pr).await;
        result.created.push(pr.number);
        stack.push(pr);
    }

    // Bodies written at creation only knew the PRs below; settle everything
    // against the complete stack.
    for index in 0..stack.len() {
        options.check_cancelled()?;

        let update = drift(&stack[index], &plan.steps[index].base_ref, &stack);
        if update.is_empty() {
            continue;
        }

        let pr = &stack[index];
        service
            .update_pull_request(&pr.id, &update)
            .await
            .map_err(|e| mutation_error("update", pr, e))?;

        let pr = &mut stack[index];
        if let Some(base) = update.base_ref_name {
            pr.to_branch = base;
        }
        if let Some(title) = update.title {
            pr.title = title;
        }
        if let Some(body) = update.body {
            pr.body = body;
        }
        progress.on_pr_updated(pr).await;
        if !result.created.contains(&pr.number) {
            result.updated.push(pr.number);
        }
    }

    info!(
        created = result.created.len(),
        updated = result.updated.len(),
        closed = result.closed.len(),
        "reconciled stack"
    );
    result.pull_requests = stack;
    Ok(result)
}

/// Fields of `pr` that differ from what the stack requires
fn drift(pr: &PullRequest, base_ref: &str, stack: &[PullRequest]) -> PullRequestUpdate {
    let body = format_body(&pr.commit, stack);
    PullRequestUpdate {
        base_ref_name: (pr.to_branch != base_ref).then(|| base_ref.to_string()),
        title: (pr.title != pr.commit.subject).then(|| pr.commit.subject.clone()),
        body: (pr.body != body).then_some(body),
    }
}
