//! Error types for stackpr

use crate::types::PullRequest;
use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by stackpr
#[derive(Debug, Error)]
pub enum Error {
    /// No usable GitHub token was found
    #[error(
        "no GitHub token found for {host}\n\n\
         Create one at https://{host}/settings/tokens and export it as GITHUB_TOKEN,\n\
         or log in with the official gh CLI (https://cli.github.com):\n\n\
         \t$ gh auth login\n\n\
         Alternatively, configure a token manually in ~/.config/hub:\n\n\
         \tgithub.com:\n\
         \t- user: <your username>\n\
         \t  oauth_token: <your token>\n\
         \t  protocol: https"
    )]
    MissingToken {
        /// GitHub host the token was looked up for
        host: String,
    },

    /// GitHub rejected the token
    #[error(
        "401 Unauthorized\n \
         make sure GITHUB_TOKEN is set to a valid token\n \
         to create a valid token go to: https://github.com/settings/tokens"
    )]
    Unauthorized,

    /// Transport or GraphQL level failure
    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    /// A pull request mutation failed
    #[error("{action} failed for {target}: {message}")]
    Mutation {
        /// Name of the mutation (create, update, merge, ...)
        action: &'static str,
        /// Identifies the pull request: number, title and node id
        target: String,
        /// Underlying error message
        message: String,
    },

    /// Local git failure
    #[error("git error: {0}")]
    Git(String),

    /// Requested remote does not exist
    #[error("remote '{0}' not found")]
    RemoteNotFound(String),

    /// HEAD does not point at a branch
    #[error("HEAD is detached; check out a branch first")]
    DetachedHead,

    /// A merge commit sits between trunk and HEAD
    #[error("merge commit {0} found in stack; stacks must be linear")]
    MergeCommitInStack(String),

    /// Configuration could not be loaded or is incomplete
    #[error("config error: {0}")]
    Config(String),

    /// Commit fingerprint does not have the expected shape
    #[error("invalid commit id '{0}': expected 8 lowercase hex characters")]
    InvalidCommitId(String),

    /// Owner or local branch name cannot be carried in a stack branch name
    #[error("branch name '{0}' cannot be used for a stack: use letters, digits, '_', '-', '.' or '/'")]
    InvalidBranchName(String),

    /// Two local commits carry the same fingerprint
    #[error("commit id '{0}' appears more than once in the stack")]
    DuplicateCommitId(String),

    /// The pass was interrupted between two steps
    #[error("interrupted")]
    Cancelled,

    /// Anything else
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether the error stems from missing or rejected credentials
    pub const fn is_auth(&self) -> bool {
        matches!(self, Self::MissingToken { .. } | Self::Unauthorized)
    }
}

/// Wrap a failed pull request mutation with identifying context.
///
/// Authentication failures pass through untouched so their remediation
/// text reaches the user.
pub fn mutation_error(action: &'static str, pr: &PullRequest, err: Error) -> Error {
    if err.is_auth() {
        return err;
    }
    let target = if pr.number == 0 {
        format!("\"{}\" ({})", pr.title, pr.from_branch)
    } else {
        format!("PR #{} \"{}\" ({})", pr.number, pr.title, pr.id)
    };
    Error::Mutation {
        action,
        target,
        message: err.to_string(),
    }
}

impl From<octocrab::Error> for Error {
    fn from(err: octocrab::Error) -> Self {
        match &err {
            octocrab::Error::GitHub { source, .. } if source.status_code.as_u16() == 401 => {
                Self::Unauthorized
            }
            _ => Self::GitHubApi(err.to_string()),
        }
    }
}

impl From<git2::Error> for Error {
    fn from(err: git2::Error) -> Self {
        Self::Git(err.message().to_string())
    }
}
