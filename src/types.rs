//! Core types for stackpr

use serde::{Deserialize, Serialize};

/// A local commit that maps onto one pull request
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Commit {
    /// Short stable fingerprint (8 lowercase hex chars)
    pub commit_id: String,
    /// Full git hash
    pub commit_hash: String,
    /// First line of the commit message
    pub subject: String,
    /// Remainder of the commit message
    pub body: String,
}

/// Rolled-up CI status of a pull request's head commit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckStatus {
    /// Not yet known (freshly created PR)
    #[default]
    Unknown,
    /// Checks are still running
    Pending,
    /// All checks passed
    Pass,
    /// At least one check failed, or the state was unrecognized
    Fail,
}

impl CheckStatus {
    /// Map a GraphQL `StatusCheckRollup.state` value.
    ///
    /// A missing rollup or an unrecognized state is treated as failing.
    pub fn from_rollup(state: Option<&str>) -> Self {
        match state {
            Some("SUCCESS") => Self::Pass,
            Some("PENDING" | "EXPECTED") => Self::Pending,
            _ => Self::Fail,
        }
    }
}

impl std::fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::Pending => write!(f, "pending"),
            Self::Pass => write!(f, "pass"),
            Self::Fail => write!(f, "fail"),
        }
    }
}

/// Merge signals for a pull request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeStatus {
    /// CI rollup
    pub checks: CheckStatus,
    /// Review decision is APPROVED
    pub review_approved: bool,
    /// Mergeable state is MERGEABLE
    pub no_conflicts: bool,
    /// Part of the contiguous ready-to-merge prefix of the stack.
    ///
    /// Only ever set by the ordering engine.
    pub stacked: bool,
}

/// Which merge signals are required for a pull request to count as ready
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergePolicy {
    /// Checks must pass
    pub require_checks: bool,
    /// Review must be approved
    pub require_approval: bool,
}

impl Default for MergePolicy {
    fn default() -> Self {
        Self {
            require_checks: true,
            require_approval: true,
        }
    }
}

impl MergeStatus {
    /// Whether all required signals hold
    pub fn is_ready(&self, policy: &MergePolicy) -> bool {
        (!policy.require_checks || self.checks == CheckStatus::Pass)
            && (!policy.require_approval || self.review_approved)
            && self.no_conflicts
    }

    /// Human-readable reasons the PR is not ready
    pub fn blocking_reasons(&self, policy: &MergePolicy) -> Vec<String> {
        let mut reasons = Vec::new();
        if policy.require_checks && self.checks != CheckStatus::Pass {
            reasons.push(format!("checks {}", self.checks));
        }
        if policy.require_approval && !self.review_approved {
            reasons.push("not approved".to_string());
        }
        if !self.no_conflicts {
            reasons.push("has merge conflicts".to_string());
        }
        reasons
    }
}

/// A pull request belonging to the current stack
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PullRequest {
    /// GraphQL node ID (used for mutations)
    pub id: String,
    /// PR number
    pub number: u64,
    /// PR title
    pub title: String,
    /// PR description as currently stored on GitHub
    pub body: String,
    /// Web URL for the PR
    pub url: String,
    /// Head branch (merges from)
    pub from_branch: String,
    /// Base branch (merges into)
    pub to_branch: String,
    /// Commit the PR carries
    pub commit: Commit,
    /// Merge signals
    pub merge_status: MergeStatus,
}

/// Snapshot of the remote stack for the active local branch
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GitHubInfo {
    /// Login of the authenticated user
    pub user_name: String,
    /// GraphQL node ID of the repository
    pub repository_id: String,
    /// Local branch the stack was built from
    pub local_branch: String,
    /// Pull requests, trunk-adjacent first
    pub pull_requests: Vec<PullRequest>,
}

impl GitHubInfo {
    /// Find the PR carrying the given commit fingerprint
    pub fn find_by_commit_id(&self, commit_id: &str) -> Option<&PullRequest> {
        self.pull_requests
            .iter()
            .find(|pr| pr.commit.commit_id == commit_id)
    }
}

/// Head commit of a remote pull request, as returned by the query
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoteCommit {
    /// Full hash
    pub oid: String,
    /// First line of the message
    pub message_headline: String,
    /// Rest of the message
    pub message_body: String,
    /// `StatusCheckRollup.state`, if any checks are configured
    pub rollup_state: Option<String>,
}

/// A pull request as returned by the remote query, before decoding
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemotePullRequest {
    /// GraphQL node ID
    pub id: String,
    /// PR number
    pub number: u64,
    /// PR title
    pub title: String,
    /// PR description
    pub body: String,
    /// Web URL
    pub url: String,
    /// Head branch name
    pub head_ref_name: String,
    /// Base branch name
    pub base_ref_name: String,
    /// Node ID of the repository the PR lives in
    pub repository_id: String,
    /// Latest commit on the head branch
    pub head_commit: Option<RemoteCommit>,
    /// `reviewDecision` (nullable)
    pub review_decision: Option<String>,
    /// `mergeable` (MERGEABLE / CONFLICTING / UNKNOWN)
    pub mergeable: String,
}

/// Raw result of the remote snapshot query
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteSnapshot {
    /// Login of the authenticated user
    pub viewer_login: String,
    /// Node ID of the configured repository
    pub repository_id: String,
    /// Open pull requests authored by the viewer
    pub pull_requests: Vec<RemotePullRequest>,
}

/// A user that can be requested as reviewer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoAssignee {
    /// GraphQL node ID
    pub id: String,
    /// Login
    pub login: String,
    /// Display name
    pub name: String,
}

/// Input for creating a pull request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPullRequest {
    /// Repository node ID
    pub repository_id: String,
    /// Branch to merge into
    pub base_ref_name: String,
    /// Branch to merge from
    pub head_ref_name: String,
    /// Title
    pub title: String,
    /// Description
    pub body: String,
    /// Open as draft
    pub draft: bool,
}

/// Identity of a pull request that was just created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedPullRequest {
    /// GraphQL node ID
    pub id: String,
    /// PR number
    pub number: u64,
    /// Web URL
    pub url: String,
}

/// Fields to change on an existing pull request; `None` leaves a field alone
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PullRequestUpdate {
    /// New base branch
    pub base_ref_name: Option<String>,
    /// New title
    pub title: Option<String>,
    /// New description
    pub body: Option<String>,
}

impl PullRequestUpdate {
    /// Whether the update would change nothing
    pub const fn is_empty(&self) -> bool {
        self.base_ref_name.is_none() && self.title.is_none() && self.body.is_none()
    }
}

/// Merge strategy/method
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeMethod {
    /// Squash all commits into one
    Squash,
    /// Create a merge commit
    Merge,
    /// Rebase commits onto base branch
    #[default]
    Rebase,
}

impl MergeMethod {
    /// GraphQL `PullRequestMergeMethod` enum value
    pub const fn as_graphql(self) -> &'static str {
        match self {
            Self::Squash => "SQUASH",
            Self::Merge => "MERGE",
            Self::Rebase => "REBASE",
        }
    }
}

impl std::fmt::Display for MergeMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Squash => write!(f, "squash"),
            Self::Merge => write!(f, "merge"),
            Self::Rebase => write!(f, "rebase"),
        }
    }
}

/// A git remote
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitRemote {
    /// Remote name (e.g., "origin")
    pub name: String,
    /// Remote URL
    pub url: String,
}
