//! Mock remote service for testing
//!
//! These are test utilities - not all may be used by every test binary.

#![allow(dead_code)]

use async_trait::async_trait;
use stackpr::commit::COMMIT_ID_TRAILER;
use stackpr::error::{Error, Result};
use stackpr::platform::RemoteService;
use stackpr::types::{
    Commit, CreatedPullRequest, MergeMethod, NewPullRequest, PullRequestUpdate, RemoteCommit,
    RemotePullRequest, RemoteSnapshot, RepoAssignee,
};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Login the mock authenticates as
pub const VIEWER: &str = "octocat";

/// Node id of the mock repository
pub const REPOSITORY_ID: &str = "R_repo";

/// A recorded mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create {
        head: String,
        base: String,
        title: String,
        body: String,
        draft: bool,
    },
    Update {
        id: String,
        update: PullRequestUpdate,
    },
    AddReviewers {
        id: String,
        user_ids: Vec<String>,
    },
    Comment {
        id: String,
        body: String,
    },
    Merge {
        id: String,
        method: MergeMethod,
    },
    Close {
        id: String,
    },
}

/// Operations that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Snapshot,
    Create,
    Update,
    Merge,
    Close,
}

/// Stateful in-memory stand-in for GitHub
///
/// Features:
/// - Open PRs survive across passes, so a second pass sees the first's result
/// - Branch pushes are simulated through [`MockRemoteService::push`]
/// - Every mutation is recorded
/// - Error injection per operation
pub struct MockRemoteService {
    next_pr_number: AtomicU64,
    open: Mutex<Vec<RemotePullRequest>>,
    branches: Mutex<HashMap<String, RemoteCommit>>,
    assignees: Mutex<Vec<RepoAssignee>>,
    calls: Mutex<Vec<Call>>,
    snapshot_calls: AtomicU64,
    failures: Mutex<HashMap<Op, Option<String>>>,
}

impl Default for MockRemoteService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRemoteService {
    pub fn new() -> Self {
        Self {
            next_pr_number: AtomicU64::new(1),
            open: Mutex::new(Vec::new()),
            branches: Mutex::new(HashMap::new()),
            assignees: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            snapshot_calls: AtomicU64::new(0),
            failures: Mutex::new(HashMap::new()),
        }
    }

    // === Setup ===

    /// Simulate pushing `commit` to `branch`
    pub fn push(&self, branch: &str, commit: &Commit) {
        let remote = RemoteCommit {
            oid: commit.commit_hash.clone(),
            message_headline: commit.subject.clone(),
            message_body: format!(
                "{}\n\n{COMMIT_ID_TRAILER}{}",
                commit.body, commit.commit_id
            ),
            rollup_state: None,
        };
        self.branches
            .lock()
            .unwrap()
            .insert(branch.to_string(), remote.clone());
        for pr in self.open.lock().unwrap().iter_mut() {
            if pr.head_ref_name == branch {
                pr.head_commit = Some(remote.clone());
            }
        }
    }

    /// Mark a PR as passing checks, approved and free of conflicts
    pub fn make_ready(&self, number: u64) {
        self.with_pr(number, |pr| {
            pr.review_decision = Some("APPROVED".to_string());
            pr.mergeable = "MERGEABLE".to_string();
            if let Some(commit) = pr.head_commit.as_mut() {
                commit.rollup_state = Some("SUCCESS".to_string());
            }
        });
    }

    /// Report `number` as conflict-free without touching checks or review
    pub fn make_mergeable(&self, number: u64) {
        self.with_pr(number, |pr| pr.mergeable = "MERGEABLE".to_string());
    }

    /// Insert an open PR that was not created through the mock
    pub fn insert_pr(&self, pr: RemotePullRequest) {
        self.next_pr_number
            .fetch_max(pr.number + 1, Ordering::SeqCst);
        self.open.lock().unwrap().push(pr);
    }

    pub fn set_assignees(&self, users: Vec<RepoAssignee>) {
        *self.assignees.lock().unwrap() = users;
    }

    /// Make `op` fail with an API error from now on
    pub fn fail(&self, op: Op, message: &str) {
        self.failures
            .lock()
            .unwrap()
            .insert(op, Some(message.to_string()));
    }

    /// Make `op` fail as if the token were rejected
    pub fn fail_unauthorized(&self, op: Op) {
        self.failures.lock().unwrap().insert(op, None);
    }

    fn check_failure(&self, op: Op) -> Result<()> {
        match self.failures.lock().unwrap().get(&op) {
            Some(Some(message)) => Err(Error::GitHubApi(message.clone())),
            Some(None) => Err(Error::Unauthorized),
            None => Ok(()),
        }
    }

    fn with_pr(&self, number: u64, f: impl FnOnce(&mut RemotePullRequest)) {
        let mut open = self.open.lock().unwrap();
        if let Some(pr) = open.iter_mut().find(|pr| pr.number == number) {
            f(pr);
        }
    }

    fn remove(&self, id: &str) -> Result<RemotePullRequest> {
        let mut open = self.open.lock().unwrap();
        let index = open
            .iter()
            .position(|pr| pr.id == id)
            .ok_or_else(|| Error::GitHubApi(format!("no open pull request {id}")))?;
        Ok(open.remove(index))
    }

    // === Inspection ===

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn snapshot_count(&self) -> u64 {
        self.snapshot_calls.load(Ordering::SeqCst)
    }

    pub fn open_prs(&self) -> Vec<RemotePullRequest> {
        self.open.lock().unwrap().clone()
    }

    pub fn open_pr(&self, number: u64) -> Option<RemotePullRequest> {
        self.open_prs().into_iter().find(|pr| pr.number == number)
    }

    pub fn update_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Update { .. }))
            .collect()
    }

    pub fn create_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Create { .. }))
            .collect()
    }
}

#[async_trait]
impl RemoteService for MockRemoteService {
    async fn fetch_snapshot(&self) -> Result<RemoteSnapshot> {
        self.snapshot_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure(Op::Snapshot)?;
        Ok(RemoteSnapshot {
            viewer_login: VIEWER.to_string(),
            repository_id: REPOSITORY_ID.to_string(),
            pull_requests: self.open_prs(),
        })
    }

    async fn assignable_users(&self) -> Result<Vec<RepoAssignee>> {
        Ok(self.assignees.lock().unwrap().clone())
    }

    async fn create_pull_request(&self, input: &NewPullRequest) -> Result<CreatedPullRequest> {
        self.calls.lock().unwrap().push(Call::Create {
            head: input.head_ref_name.clone(),
            base: input.base_ref_name.clone(),
            title: input.title.clone(),
            body: input.body.clone(),
            draft: input.draft,
        });
        self.check_failure(Op::Create)?;

        let number = self.next_pr_number.fetch_add(1, Ordering::SeqCst);
        let created = CreatedPullRequest {
            id: format!("PR_{number}"),
            number,
            url: format!("https://github.com/acme/widgets/pull/{number}"),
        };
        let head_commit = self
            .branches
            .lock()
            .unwrap()
            .get(&input.head_ref_name)
            .cloned();
        self.open.lock().unwrap().push(RemotePullRequest {
            id: created.id.clone(),
            number,
            title: input.title.clone(),
            body: input.body.clone(),
            url: created.url.clone(),
            head_ref_name: input.head_ref_name.clone(),
            base_ref_name: input.base_ref_name.clone(),
            repository_id: input.repository_id.clone(),
            head_commit,
            review_decision: None,
            mergeable: "UNKNOWN".to_string(),
        });
        Ok(created)
    }

    async fn update_pull_request(&self, id: &str, update: &PullRequestUpdate) -> Result<()> {
        self.calls.lock().unwrap().push(Call::Update {
            id: id.to_string(),
            update: update.clone(),
        });
        self.check_failure(Op::Update)?;

        let mut open = self.open.lock().unwrap();
        let pr = open
            .iter_mut()
            .find(|pr| pr.id == id)
            .ok_or_else(|| Error::GitHubApi(format!("no open pull request {id}")))?;
        if let Some(base) = &update.base_ref_name {
            pr.base_ref_name.clone_from(base);
        }
        if let Some(title) = &update.title {
            pr.title.clone_from(title);
        }
        if let Some(body) = &update.body {
            pr.body.clone_from(body);
        }
        Ok(())
    }

    async fn add_reviewers(&self, id: &str, user_ids: &[String]) -> Result<()> {
        self.calls.lock().unwrap().push(Call::AddReviewers {
            id: id.to_string(),
            user_ids: user_ids.to_vec(),
        });
        Ok(())
    }

    async fn comment_pull_request(&self, id: &str, body: &str) -> Result<()> {
        self.calls.lock().unwrap().push(Call::Comment {
            id: id.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }

    async fn merge_pull_request(&self, id: &str, method: MergeMethod) -> Result<()> {
        self.calls.lock().unwrap().push(Call::Merge {
            id: id.to_string(),
            method,
        });
        self.check_failure(Op::Merge)?;
        self.remove(id).map(|_| ())
    }

    async fn close_pull_request(&self, id: &str) -> Result<()> {
        self.calls.lock().unwrap().push(Call::Close { id: id.to_string() });
        self.check_failure(Op::Close)?;
        self.remove(id).map(|_| ())
    }
}
