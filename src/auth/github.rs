//! GitHub token discovery

use super::AuthSource;
use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, warn};

/// Environment variables checked for a token, in order
const TOKEN_ENV_VARS: [&str; 2] = ["GITHUB_TOKEN", "GH_TOKEN"];

/// Resolved GitHub credentials
#[derive(Debug, Clone)]
pub struct GitHubAuthConfig {
    /// Personal access / OAuth token
    pub token: String,
    /// Where the token came from
    pub source: AuthSource,
    /// Host the token is valid for
    pub host: String,
}

#[derive(Deserialize)]
struct HubUser {
    #[serde(default)]
    user: String,
    oauth_token: String,
}

type HubConfig = HashMap<String, Vec<HubUser>>;

fn hub_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("hub"))
}

/// Read the first token for `host` from a hub CLI config file.
///
/// Returns `None` if the file is missing, unparsable, or has no entry.
pub fn token_from_hub_config(path: &Path, host: &str) -> Option<String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| debug!(path = %path.display(), error = %e, "no hub config"))
        .ok()?;
    let config: HubConfig = serde_yaml::from_str(&content)
        .map_err(|e| warn!(path = %path.display(), error = %e, "failed to parse hub config"))
        .ok()?;

    let users = config.get(host)?;
    if users.len() > 1 {
        warn!(
            user = %users[0].user,
            "multiple tokens found in hub config file, using the first one"
        );
    }
    users.first().map(|u| u.oauth_token.clone())
}

/// First non-blank token among [`TOKEN_ENV_VARS`], read through `lookup`
fn token_from_env(lookup: impl Fn(&str) -> Option<String>) -> Option<(&'static str, String)> {
    TOKEN_ENV_VARS.iter().find_map(|&var| {
        lookup(var)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .map(|t| (var, t))
    })
}

async fn token_from_gh_cli(host: &str) -> Option<String> {
    let output = Command::new("gh")
        .args(["auth", "token", "--hostname", host])
        .output()
        .await
        .map_err(|e| debug!(error = %e, "gh CLI not available"))
        .ok()?;

    if !output.status.success() {
        debug!(status = %output.status, "gh auth token failed");
        return None;
    }

    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!token.is_empty()).then_some(token)
}

/// Find a GitHub token for `host`.
///
/// Tries `GITHUB_TOKEN`/`GH_TOKEN`, then `gh auth token`, then the hub
/// config file.
pub async fn get_github_auth(host: &str) -> Result<GitHubAuthConfig> {
    let found = |token: String, source: AuthSource| GitHubAuthConfig {
        token,
        source,
        host: host.to_string(),
    };

    if let Some((var, token)) = token_from_env(|var| std::env::var(var).ok()) {
        debug!(var, "using token from environment");
        return Ok(found(token, AuthSource::EnvVar));
    }

    if let Some(token) = token_from_gh_cli(host).await {
        debug!("using token from gh CLI");
        return Ok(found(token, AuthSource::Cli));
    }

    if let Some(token) = hub_config_path().and_then(|p| token_from_hub_config(&p, host)) {
        debug!("using token from hub config");
        return Ok(found(token, AuthSource::HubConfig));
    }

    Err(Error::MissingToken {
        host: host.to_string(),
    })
}
