//! Pull request description rendering

use crate::types::{Commit, PullRequest};

/// Marker appended to the stack entry of the PR being rendered
pub const CURRENT_PR_MARKER: &str = "⬅";

/// Notice appended to every stack block
pub const MANUAL_MERGE_NOTICE: &str = "⚠️ *Part of a stack created by stackpr. \
     Do not merge manually using the UI - doing so may have unexpected results.*";

/// Render the stack as a bullet list, last entry first.
fn format_stack_markdown(commit: &Commit, stack: &[PullRequest]) -> String {
    stack
        .iter()
        .rev()
        .map(|pr| {
            if pr.commit == *commit {
                format!("- #{} {CURRENT_PR_MARKER}\n", pr.number)
            } else {
                format!("- #{}\n", pr.number)
            }
        })
        .collect()
}

fn add_manual_merge_notice(block: &str) -> String {
    format!("{block}\n\n{MANUAL_MERGE_NOTICE}")
}

/// Build the description for the PR carrying `commit`.
///
/// A lone PR gets the commit body as-is. Otherwise the stack summary is
/// appended below the body (or stands alone when the body is empty).
pub fn format_body(commit: &Commit, stack: &[PullRequest]) -> String {
    let body = commit.body.trim();
    if stack.len() <= 1 {
        return body.to_string();
    }

    let block = add_manual_merge_notice(&format_stack_markdown(commit, stack));
    if body.is_empty() {
        format!("**Stack**:\n{block}")
    } else {
        format!("{body}\n\n---\n\n**Stack**:\n{block}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit(id: &str, body: &str) -> Commit {
        Commit {
            commit_id: id.to_string(),
            commit_hash: format!("{id}{id}{id}{id}{id}"),
            subject: format!("subject {id}"),
            body: body.to_string(),
        }
    }

    fn pr(number: u64, commit: Commit) -> PullRequest {
        PullRequest {
            number,
            commit,
            ..Default::default()
        }
    }

    #[test]
    fn test_single_entry_returns_trimmed_body() {
        let c = commit("00000001", "\n  body text \n");
        let body = format_body(&c, &[pr(1, c.clone())]);
        assert_eq!(body, "body text");
        assert!(!body.contains("**Stack**"));
    }

    #[test]
    fn test_empty_stack_returns_body() {
        let c = commit("00000001", "just me");
        assert_eq!(format_body(&c, &[]), "just me");
    }

    #[test]
    fn test_multi_entry_without_body() {
        let a = commit("00000001", "");
        let b = commit("00000002", "");
        let stack = vec![pr(1, a.clone()), pr(2, b)];
        let body = format_body(&a, &stack);
        assert_eq!(
            body,
            format!("**Stack**:\n- #2\n- #1 ⬅\n\n\n{MANUAL_MERGE_NOTICE}")
        );
    }

    #[test]
    fn test_multi_entry_with_body_uses_separator() {
        let a = commit("00000001", "");
        let b = commit("00000002", "Explains b.\n");
        let stack = vec![pr(1, a), pr(2, b.clone())];
        let body = format_body(&b, &stack);
        assert!(body.starts_with("Explains b.\n\n---\n\n**Stack**:\n- #2 ⬅\n- #1\n"));
        assert!(body.ends_with(MANUAL_MERGE_NOTICE));
    }

    #[test]
    fn test_marks_exactly_one_entry() {
        let a = commit("00000001", "");
        let b = commit("00000002", "");
        let c = commit("00000003", "");
        let stack = vec![pr(1, a), pr(2, b.clone()), pr(3, c)];
        let body = format_body(&b, &stack);
        assert_eq!(body.matches(CURRENT_PR_MARKER).count(), 1);
        assert!(body.contains("- #2 ⬅"));
    }

    #[test]
    fn test_marker_requires_full_commit_equality() {
        let a = commit("00000001", "");
        let mut amended = a.clone();
        amended.commit_hash = "ffffffff".to_string();
        let stack = vec![pr(1, amended), pr(2, commit("00000002", ""))];
        let body = format_body(&a, &stack);
        assert!(!body.contains(CURRENT_PR_MARKER));
    }

    #[test]
    fn test_iterates_from_last_entry() {
        let stack = vec![
            pr(1, commit("00000001", "")),
            pr(2, commit("00000002", "")),
            pr(3, commit("00000003", "")),
        ];
        let body = format_body(&commit("00000009", ""), &stack);
        let pos_1 = body.find("#1").unwrap();
        let pos_2 = body.find("#2").unwrap();
        let pos_3 = body.find("#3").unwrap();
        assert!(pos_3 < pos_2);
        assert!(pos_2 < pos_1);
    }
}
