//! Configuration loading
//!
//! Two optional TOML files are read:
//! - `.stackpr.toml` at the repository root (repository settings)
//! - `<config dir>/stackpr/config.toml` (per-user settings)
//!
//! Missing files yield defaults. Owner and repository name default to the
//! values parsed from the configured git remote.

use crate::error::{Error, Result};
use crate::types::{MergeMethod, MergePolicy};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Filename of the repository config, relative to the workspace root.
pub const REPO_CONFIG_FILE: &str = ".stackpr.toml";

/// Directory name for stackpr within the user config dir.
const USER_CONFIG_DIR: &str = "stackpr";

/// Filename of the user config.
const USER_CONFIG_FILE: &str = "config.toml";

/// Repository settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoConfig {
    /// Repository owner; parsed from the remote URL when empty
    pub github_repo_owner: String,
    /// Repository name; parsed from the remote URL when empty
    pub github_repo_name: String,
    /// GitHub host (`github.com` or an Enterprise host)
    pub github_host: String,
    /// Git remote the stack branches are pushed to
    pub github_remote: String,
    /// Default trunk branch
    pub github_branch: String,
    /// Local branches that are themselves trunk-equivalent remote branches
    pub remote_branches: Vec<String>,
    /// How `stackpr merge` merges
    pub merge_method: MergeMethod,
    /// Checks must pass before a PR counts as stacked
    pub require_checks: bool,
    /// Review must be approved before a PR counts as stacked
    pub require_approval: bool,
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            github_repo_owner: String::new(),
            github_repo_name: String::new(),
            github_host: "github.com".to_string(),
            github_remote: "origin".to_string(),
            github_branch: "main".to_string(),
            remote_branches: Vec::new(),
            merge_method: MergeMethod::default(),
            require_checks: true,
            require_approval: true,
        }
    }
}

impl RepoConfig {
    /// Branch the bottom of the stack for `local_branch` merges into.
    ///
    /// A local branch listed in `remote_branches` stacks onto the remote
    /// branch of the same name; everything else stacks onto `github_branch`.
    pub fn target_branch<'a>(&'a self, local_branch: &str) -> &'a str {
        self.remote_branches
            .iter()
            .find(|b| b.as_str() == local_branch)
            .map_or(self.github_branch.as_str(), String::as_str)
    }

    /// Merge signals required for a PR to count as stacked
    pub const fn merge_policy(&self) -> MergePolicy {
        MergePolicy {
            require_checks: self.require_checks,
            require_approval: self.require_approval,
        }
    }

    /// Fill in owner, name and host from a remote URL where not configured.
    pub fn apply_remote_url(&mut self, remote_url: &str) -> Result<()> {
        if !self.github_repo_owner.is_empty() && !self.github_repo_name.is_empty() {
            return Ok(());
        }
        let location = parse_repo_url(remote_url).ok_or_else(|| {
            Error::Config(format!(
                "cannot determine GitHub owner/repo from remote URL '{remote_url}'; \
                 set github_repo_owner and github_repo_name in {REPO_CONFIG_FILE}"
            ))
        })?;

        if self.github_repo_owner.is_empty() {
            self.github_repo_owner = location.owner;
        }
        if self.github_repo_name.is_empty() {
            self.github_repo_name = location.repo;
        }
        if self.github_host == Self::default().github_host {
            self.github_host = location.host;
        }
        Ok(())
    }
}

/// Per-user settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    /// Open new PRs as drafts
    pub create_draft_prs: bool,
    /// Print every GitHub call
    pub log_github_calls: bool,
    /// Logins requested as reviewers on newly created PRs
    pub default_reviewers: Vec<String>,
}

/// Combined configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Repository settings
    pub repo: RepoConfig,
    /// User settings
    pub user: UserConfig,
}

impl Config {
    /// Load both config files for the workspace at `workspace_root`
    pub fn load(workspace_root: &Path) -> Result<Self> {
        let repo = load_config_file(&workspace_root.join(REPO_CONFIG_FILE))?;
        let user = match user_config_path() {
            Some(path) => load_config_file(&path)?,
            None => UserConfig::default(),
        };
        Ok(Self { repo, user })
    }
}

/// Path to the user config file, if a config dir exists on this platform
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(USER_CONFIG_DIR).join(USER_CONFIG_FILE))
}

/// Load a TOML config file, returning defaults if it doesn't exist.
pub fn load_config_file<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Ok(T::default());
    }

    let content = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;

    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))
}

/// Host, owner and name of a GitHub repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoLocation {
    /// Host name
    pub host: String,
    /// Owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repo: String,
}

/// Parse a git remote URL.
///
/// Understands scp-like SSH (`git@host:owner/repo.git`), `ssh://` and
/// `https://` URLs, with or without `.git` and trailing slashes.
pub fn parse_repo_url(remote_url: &str) -> Option<RepoLocation> {
    let remote_url = remote_url.trim();
    let (host, path) = if remote_url.contains("://") {
        let parsed = url::Url::parse(remote_url).ok()?;
        (parsed.host_str()?.to_string(), parsed.path().to_string())
    } else {
        let (user_host, path) = remote_url.split_once(':')?;
        let host = user_host.rsplit_once('@').map_or(user_host, |(_, h)| h);
        (host.to_string(), path.to_string())
    };

    let path = path.trim_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);
    let mut segments = path.rsplitn(2, '/');
    let repo = segments.next()?;
    let owner = segments.next()?.rsplit('/').next()?;

    if host.is_empty() || owner.is_empty() || repo.is_empty() {
        return None;
    }

    Some(RepoLocation {
        host,
        owner: owner.to_string(),
        repo: repo.to_string(),
    })
}
