//! Shared command context for CLI commands
//!
//! Extracts common setup code shared by update, status, and merge.

use stackpr::auth::get_github_auth;
use stackpr::config::Config;
use stackpr::error::Result;
use stackpr::platform::{GitHubService, RemoteService};
use stackpr::repo::{GitRepository, select_remote};
use stackpr::stack::build_github_info;
use stackpr::types::GitHubInfo;
use std::path::Path;
use tracing::debug;

/// Shared context for CLI commands that talk to GitHub
///
/// Note: the remote snapshot is not cached here. Every command fetches it
/// once via [`CommandContext::fetch_info`] and treats it as authoritative.
pub struct CommandContext {
    /// The git repository
    pub repo: GitRepository,
    /// Merged repository and user settings
    pub config: Config,
    /// Selected remote name
    pub remote_name: String,
    /// Checked-out branch
    pub local_branch: String,
    /// Branch the bottom PR merges into
    pub target_branch: String,
    /// Remote service (GitHub)
    pub service: Box<dyn RemoteService>,
}

impl CommandContext {
    /// Create a new command context
    ///
    /// Opens the repository, loads config, resolves the remote and its
    /// owner/repo, finds a token and builds the GitHub service.
    pub async fn new(path: &Path, remote: Option<&str>) -> Result<Self> {
        let repo = GitRepository::open(path)?;
        let mut config = Config::load(repo.workdir())?;

        let remotes = repo.remotes()?;
        let configured = config.repo.github_remote.as_str();
        let requested =
            remote.or_else(|| remotes.iter().any(|r| r.name == configured).then_some(configured));
        let remote_name = select_remote(&remotes, requested)?;

        let remote_url = repo.remote_url(&remote_name)?;
        config.repo.apply_remote_url(&remote_url)?;

        let local_branch = repo.current_branch()?;
        let target_branch = config.repo.target_branch(&local_branch).to_string();
        debug!(%remote_name, %local_branch, %target_branch, "resolved stack context");

        let auth = get_github_auth(&config.repo.github_host).await?;
        debug!(source = ?auth.source, "found GitHub token");

        let service = GitHubService::new(
            &auth.token,
            config.repo.github_repo_owner.clone(),
            config.repo.github_repo_name.clone(),
            &config.repo.github_host,
        )?
        .with_call_logging(config.user.log_github_calls);

        Ok(Self {
            repo,
            config,
            remote_name,
            local_branch,
            target_branch,
            service: Box::new(service),
        })
    }

    /// Fetch the remote stack for the current branch, ordered and flagged
    pub async fn fetch_info(&self) -> Result<GitHubInfo> {
        let snapshot = self.service.fetch_snapshot().await?;
        Ok(build_github_info(
            snapshot,
            &self.local_branch,
            &self.target_branch,
            &self.config.repo.merge_policy(),
        ))
    }
}
