//! Reconciliation planning - pure functions
//!
//! Maps each local commit to the branch and base its PR must have. No I/O
//! happens here; the plan is executed by [`super::execute_reconcile`].

use crate::branch;
use crate::error::{Error, Result};
use crate::types::{Commit, GitHubInfo, PullRequest};
use std::collections::HashSet;
use std::fmt;

/// What must happen for one local commit
#[derive(Debug, Clone)]
pub struct ReconcileStep {
    /// The local commit
    pub commit: Commit,
    /// Branch the PR merges from
    pub head_ref: String,
    /// Branch the PR must merge into
    pub base_ref: String,
    /// PR already carrying this commit's fingerprint, if any
    pub existing: Option<PullRequest>,
}

impl ReconcileStep {
    /// Whether a new PR has to be created
    pub const fn needs_create(&self) -> bool {
        self.existing.is_none()
    }

    /// Whether an existing PR points at the wrong base
    pub fn needs_retarget(&self) -> bool {
        self.existing
            .as_ref()
            .is_some_and(|pr| pr.to_branch != self.base_ref)
    }
}

impl fmt::Display for ReconcileStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.existing {
            None => write!(
                f,
                "create PR \"{}\" ({} → {})",
                self.commit.subject, self.head_ref, self.base_ref
            ),
            Some(pr) if pr.to_branch != self.base_ref => write!(
                f,
                "retarget PR #{} \"{}\" ({} → {})",
                pr.number, self.commit.subject, pr.to_branch, self.base_ref
            ),
            Some(pr) => write!(f, "sync PR #{} \"{}\"", pr.number, self.commit.subject),
        }
    }
}

/// Reconciliation plan - the functional core output
#[derive(Debug, Clone)]
pub struct ReconcilePlan {
    /// One step per local commit, oldest first
    pub steps: Vec<ReconcileStep>,
    /// PRs whose commit is no longer part of the local stack
    pub stale: Vec<PullRequest>,
    /// Trunk the bottom PR merges into
    pub target_branch: String,
}

impl ReconcilePlan {
    /// Number of PRs to create
    pub fn count_creates(&self) -> usize {
        self.steps.iter().filter(|s| s.needs_create()).count()
    }

    /// Number of existing PRs carried over
    pub fn count_existing(&self) -> usize {
        self.steps.len() - self.count_creates()
    }

    /// `(commit hash, head branch)` pairs to push before executing
    pub fn branches_to_push(&self) -> Vec<(String, String)> {
        self.steps
            .iter()
            .map(|s| (s.commit.commit_hash.clone(), s.head_ref.clone()))
            .collect()
    }

    /// Whether the plan touches nothing
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty() && self.stale.is_empty()
    }
}

/// Create a reconciliation plan (PURE - no I/O)
///
/// The first commit's PR merges into `target_branch`; every later commit's
/// PR merges into the head branch of the commit before it.
pub fn create_reconcile_plan(
    info: &GitHubInfo,
    commits: &[Commit],
    target_branch: &str,
) -> Result<ReconcilePlan> {
    let mut seen = HashSet::new();
    for commit in commits {
        if !seen.insert(commit.commit_id.as_str()) {
            return Err(Error::DuplicateCommitId(commit.commit_id.clone()));
        }
    }

    let mut steps = Vec::with_capacity(commits.len());
    let mut base_ref = target_branch.to_string();

    for commit in commits {
        let head_ref = branch::encode(&info.user_name, &info.local_branch, &commit.commit_id)?;
        steps.push(ReconcileStep {
            commit: commit.clone(),
            head_ref: head_ref.clone(),
            base_ref,
            existing: info.find_by_commit_id(&commit.commit_id).cloned(),
        });
        base_ref = head_ref;
    }

    let stale = info
        .pull_requests
        .iter()
        .filter(|pr| !seen.contains(pr.commit.commit_id.as_str()))
        .cloned()
        .collect();

    Ok(ReconcilePlan {
        steps,
        stale,
        target_branch: target_branch.to_string(),
    })
}
