//! Commit message parsing
//!
//! The fingerprint of a commit is carried in a `commit-id:` trailer so it
//! survives rebases and amends. Commits without one fall back to the
//! abbreviated hash.

use crate::branch::is_commit_id;
use crate::types::Commit;
use tracing::warn;

/// Trailer key holding the commit fingerprint
pub const COMMIT_ID_TRAILER: &str = "commit-id:";

fn trailer_value(line: &str) -> Option<&str> {
    let value = line.trim().strip_prefix(COMMIT_ID_TRAILER)?.trim();
    is_commit_id(value).then_some(value)
}

/// Remove `commit-id:` trailer lines from a message body
pub fn strip_commit_id_trailer(body: &str) -> String {
    body.lines()
        .filter(|line| trailer_value(line).is_none())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Split a raw commit message into a [`Commit`]
pub fn parse_commit_message(hash: &str, message: &str) -> Commit {
    let mut lines = message.lines();
    let subject = lines.next().unwrap_or_default().trim().to_string();
    let rest: Vec<&str> = lines.collect();

    let commit_id = rest
        .iter()
        .find_map(|line| trailer_value(line))
        .map(ToString::to_string)
        .unwrap_or_else(|| {
            let fallback = hash.chars().take(8).collect::<String>().to_lowercase();
            warn!(
                hash,
                fallback = %fallback,
                "commit has no commit-id trailer, using abbreviated hash"
            );
            fallback
        });

    Commit {
        commit_id,
        commit_hash: hash.to_string(),
        subject,
        body: strip_commit_id_trailer(&rest.join("\n")),
    }
}
