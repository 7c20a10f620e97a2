//! Authentication for GitHub
//!
//! Supports environment variables, the `gh` CLI, and the `hub` config file.

mod github;

pub use github::{GitHubAuthConfig, get_github_auth, token_from_hub_config};

/// Source of authentication token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthSource {
    /// Token from CLI tool (gh)
    Cli,
    /// Token from environment variable
    EnvVar,
    /// Token from `~/.config/hub`
    HubConfig,
}
