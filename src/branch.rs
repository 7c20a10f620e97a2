//! Remote branch naming for stacked pull requests
//!
//! Every pull request in a stack merges from a branch named
//! `pr/<owner>/<local-branch>/<commit-id>`. The name is the only link
//! between a remote branch and the local commit it carries.

use crate::error::{Error, Result};
use regex::Regex;
use std::sync::LazyLock;

static BRANCH_NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"pr/[a-zA-Z0-9_\-]+/([a-zA-Z0-9_\-/\.]+)/([a-f0-9]{8})$")
        .expect("branch name pattern is valid")
});

/// Decoded components of a stack branch name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchIdentity {
    /// Local branch the stack was created from
    pub local_branch: String,
    /// Commit fingerprint
    pub commit_id: String,
}

/// Whether `s` has the shape of a commit fingerprint
pub fn is_commit_id(s: &str) -> bool {
    s.len() == 8 && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// Build the remote branch name for a commit.
///
/// The result always decodes back to `local_branch` and `commit_id`;
/// names that would not are rejected.
pub fn encode(user: &str, local_branch: &str, commit_id: &str) -> Result<String> {
    if !is_commit_id(commit_id) {
        return Err(Error::InvalidCommitId(commit_id.to_string()));
    }
    let user_ok = !user.is_empty()
        && user
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-'));
    if !user_ok {
        return Err(Error::InvalidBranchName(user.to_string()));
    }

    let name = format!("pr/{user}/{local_branch}/{commit_id}");
    match decode(&name) {
        Some(identity) if identity.local_branch == local_branch => Ok(name),
        _ => Err(Error::InvalidBranchName(local_branch.to_string())),
    }
}

/// Parse a remote branch name.
///
/// Returns `None` for branches that were not created by stackpr (trunk,
/// feature branches pushed by hand, other tools).
pub fn decode(branch: &str) -> Option<BranchIdentity> {
    let caps = BRANCH_NAME_REGEX.captures(branch)?;
    Some(BranchIdentity {
        local_branch: caps[1].to_string(),
        commit_id: caps[2].to_string(),
    })
}
