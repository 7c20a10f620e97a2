//! Shared test fixtures

#![allow(dead_code, unused_imports)]

mod mock_platform;
mod temp_repo;

pub use mock_platform::{Call, MockRemoteService, Op, REPOSITORY_ID, VIEWER};
pub use temp_repo::TempGitRepo;

use stackpr::platform::RemoteService;
use stackpr::stack::build_github_info;
use stackpr::submit::{
    NoopProgress, ReconcileOptions, ReconcilePlan, ReconcileResult, create_reconcile_plan,
    execute_reconcile,
};
use stackpr::types::{Commit, GitHubInfo, MergePolicy};

/// Local branch used by the fixtures
pub const LOCAL_BRANCH: &str = "feature";

/// Trunk used by the fixtures
pub const TRUNK: &str = "main";

/// Build a commit whose fingerprint and hash derive from `id`
pub fn make_commit(id: &str, subject: &str) -> Commit {
    Commit {
        commit_id: id.to_string(),
        commit_hash: format!("{id}{id}{id}{id}{id}"),
        subject: subject.to_string(),
        body: String::new(),
    }
}

/// Same fingerprint and subject, new hash (as after an amend or rebase)
pub fn amend(commit: &Commit) -> Commit {
    Commit {
        commit_hash: commit.commit_hash.chars().rev().collect(),
        ..commit.clone()
    }
}

/// Fetch and decode the mock's current state
pub async fn fetch_info(service: &MockRemoteService) -> GitHubInfo {
    fetch_info_with_policy(service, &MergePolicy::default()).await
}

/// Fetch and decode the mock's current state, computing readiness under `policy`
pub async fn fetch_info_with_policy(service: &MockRemoteService, policy: &MergePolicy) -> GitHubInfo {
    let snapshot = service.fetch_snapshot().await.unwrap();
    build_github_info(snapshot, LOCAL_BRANCH, TRUNK, policy)
}

/// Plan against the mock's current state and simulate the push
pub async fn plan_and_push(service: &MockRemoteService, commits: &[Commit]) -> (GitHubInfo, ReconcilePlan) {
    let info = fetch_info(service).await;
    let plan = create_reconcile_plan(&info, commits, TRUNK).unwrap();
    for step in &plan.steps {
        service.push(&step.head_ref, &step.commit);
    }
    (info, plan)
}

/// One full update pass: fetch, plan, push, reconcile
pub async fn run_pass(service: &MockRemoteService, commits: &[Commit]) -> ReconcileResult {
    let (info, plan) = plan_and_push(service, commits).await;
    execute_reconcile(
        &plan,
        &info,
        service,
        &ReconcileOptions::default(),
        &NoopProgress,
    )
    .await
    .unwrap()
}
