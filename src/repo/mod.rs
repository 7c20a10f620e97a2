//! Local git repository access
//!
//! Queries go through `git2`. Pushing and fetching shell out to `git` so the
//! user's credential helpers and SSH setup apply.

use crate::commit::parse_commit_message;
use crate::error::{Error, Result};
use crate::types::{Commit, GitRemote};
use git2::{Repository, Sort};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// A git working copy
pub struct GitRepository {
    repo: Repository,
    workdir: PathBuf,
}

impl GitRepository {
    /// Open the repository containing `path`
    pub fn open(path: &Path) -> Result<Self> {
        let repo = Repository::discover(path)
            .map_err(|e| Error::Git(format!("not in a git repository: {}", e.message())))?;
        let workdir = repo
            .workdir()
            .ok_or_else(|| Error::Git("bare repositories are not supported".to_string()))?
            .to_path_buf();
        Ok(Self { repo, workdir })
    }

    /// Root of the working copy
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Name of the checked-out branch
    pub fn current_branch(&self) -> Result<String> {
        if self.repo.head_detached()? {
            return Err(Error::DetachedHead);
        }
        let head = self.repo.head()?;
        head.shorthand()
            .map(ToString::to_string)
            .ok_or_else(|| Error::Git("HEAD ref name is not valid UTF-8".to_string()))
    }

    /// All configured remotes
    pub fn remotes(&self) -> Result<Vec<GitRemote>> {
        let names = self.repo.remotes()?;
        let mut remotes = Vec::new();
        for name in names.iter().flatten() {
            let remote = self.repo.find_remote(name)?;
            remotes.push(GitRemote {
                name: name.to_string(),
                url: remote.url().unwrap_or_default().to_string(),
            });
        }
        Ok(remotes)
    }

    /// URL of the remote called `name`
    pub fn remote_url(&self, name: &str) -> Result<String> {
        let remote = self
            .repo
            .find_remote(name)
            .map_err(|_| Error::RemoteNotFound(name.to_string()))?;
        remote
            .url()
            .map(ToString::to_string)
            .ok_or_else(|| Error::Git(format!("remote '{name}' has no valid UTF-8 URL")))
    }

    /// Commits in `<remote>/<target_branch>..HEAD`, oldest first.
    ///
    /// Merge commits are rejected: a stack must be a straight line.
    pub fn stack_commits(&self, remote: &str, target_branch: &str) -> Result<Vec<Commit>> {
        let base_ref = format!("refs/remotes/{remote}/{target_branch}");
        let mut walk = self.repo.revwalk()?;
        walk.set_sorting(Sort::TOPOLOGICAL | Sort::REVERSE)?;
        walk.push_head()?;
        walk.hide_ref(&base_ref).map_err(|e| {
            Error::Git(format!(
                "cannot find {remote}/{target_branch} ({}); run 'git fetch {remote}' first",
                e.message()
            ))
        })?;

        let mut commits = Vec::new();
        for oid in walk {
            let commit = self.repo.find_commit(oid?)?;
            let hash = commit.id().to_string();
            if commit.parent_count() > 1 {
                return Err(Error::MergeCommitInStack(hash));
            }
            let message = String::from_utf8_lossy(commit.message_bytes());
            commits.push(parse_commit_message(&hash, &message));
        }

        debug!(count = commits.len(), %base_ref, "collected stack commits");
        Ok(commits)
    }

    /// Force-push each `(commit hash, branch)` pair to `remote` in one atomic push
    pub async fn push_branches(&self, remote: &str, branches: &[(String, String)]) -> Result<()> {
        if branches.is_empty() {
            return Ok(());
        }
        let refspecs: Vec<String> = branches
            .iter()
            .map(|(hash, branch)| format!("{hash}:refs/heads/{branch}"))
            .collect();
        debug!(remote, ?refspecs, "pushing stack branches");

        let mut args = vec!["push", "--force", "--atomic", remote];
        args.extend(refspecs.iter().map(String::as_str));
        self.git(&args).await
    }

    /// Fetch `remote`
    pub async fn fetch(&self, remote: &str) -> Result<()> {
        self.git(&["fetch", "--prune", remote]).await
    }

    async fn git(&self, args: &[&str]) -> Result<()> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| Error::Git(format!("failed to run git: {e}")))?;

        if output.status.success() {
            Ok(())
        } else {
            Err(Error::Git(format!(
                "git {} failed: {}",
                args.first().copied().unwrap_or_default(),
                String::from_utf8_lossy(&output.stderr).trim()
            )))
        }
    }
}

/// Pick the remote to use.
///
/// An explicitly requested remote must exist. Otherwise `origin` is
/// preferred, then the first remote.
pub fn select_remote(remotes: &[GitRemote], requested: Option<&str>) -> Result<String> {
    if let Some(name) = requested {
        return remotes
            .iter()
            .find(|r| r.name == name)
            .map(|r| r.name.clone())
            .ok_or_else(|| Error::RemoteNotFound(name.to_string()));
    }

    remotes
        .iter()
        .find(|r| r.name == "origin")
        .or_else(|| remotes.first())
        .map(|r| r.name.clone())
        .ok_or_else(|| Error::Git("no git remotes configured".to_string()))
}
