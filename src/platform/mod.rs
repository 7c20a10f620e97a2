//! Remote services for GitHub
//!
//! The reconciliation and merge engines only talk to GitHub through the
//! [`RemoteService`] trait, so they can be driven by a mock in tests.

mod github;

pub use github::GitHubService;

use crate::error::Result;
use crate::types::{
    CreatedPullRequest, MergeMethod, NewPullRequest, PullRequestUpdate, RemoteSnapshot,
    RepoAssignee,
};
use async_trait::async_trait;

/// Remote operations needed to keep a stack in sync
#[async_trait]
pub trait RemoteService: Send + Sync {
    /// Fetch the viewer, the repository id, and the viewer's open PRs
    async fn fetch_snapshot(&self) -> Result<RemoteSnapshot>;

    /// List users that can be requested as reviewers
    async fn assignable_users(&self) -> Result<Vec<RepoAssignee>>;

    /// Create a new PR
    async fn create_pull_request(&self, input: &NewPullRequest) -> Result<CreatedPullRequest>;

    /// Change base, title or body of an existing PR
    async fn update_pull_request(&self, id: &str, update: &PullRequestUpdate) -> Result<()>;

    /// Request reviews from the given user node IDs
    async fn add_reviewers(&self, id: &str, user_ids: &[String]) -> Result<()>;

    /// Add a comment to a PR
    async fn comment_pull_request(&self, id: &str, body: &str) -> Result<()>;

    /// Merge a PR with the given method
    async fn merge_pull_request(&self, id: &str, method: MergeMethod) -> Result<()>;

    /// Close a PR without merging
    async fn close_pull_request(&self, id: &str) -> Result<()>;
}
