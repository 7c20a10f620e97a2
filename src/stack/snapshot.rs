//! Build the stack snapshot from a raw remote query result

use crate::branch;
use crate::commit::strip_commit_id_trailer;
use crate::stack::order::sort_pull_requests;
use crate::types::{
    CheckStatus, Commit, GitHubInfo, MergePolicy, MergeStatus, PullRequest, RemotePullRequest,
    RemoteSnapshot,
};
use tracing::debug;

/// Turn one remote PR into a stack entry, if it belongs to `local_branch`.
fn decode_pull_request(node: RemotePullRequest, local_branch: &str) -> Option<PullRequest> {
    let identity = branch::decode(&node.head_ref_name)?;
    if identity.local_branch != local_branch {
        return None;
    }

    let Some(head) = node.head_commit else {
        debug!(number = node.number, "skipping pull request without head commit");
        return None;
    };

    let merge_status = MergeStatus {
        checks: CheckStatus::from_rollup(head.rollup_state.as_deref()),
        review_approved: node.review_decision.as_deref() == Some("APPROVED"),
        no_conflicts: node.mergeable == "MERGEABLE",
        stacked: false,
    };

    Some(PullRequest {
        id: node.id,
        number: node.number,
        title: node.title,
        body: node.body,
        url: node.url,
        from_branch: node.head_ref_name,
        to_branch: node.base_ref_name,
        commit: Commit {
            commit_id: identity.commit_id,
            commit_hash: head.oid,
            subject: head.message_headline,
            body: strip_commit_id_trailer(&head.message_body),
        },
        merge_status,
    })
}

/// Build the [`GitHubInfo`] for `local_branch`.
///
/// Pull requests from other repositories, from branches not created by
/// stackpr, or from stacks of other local branches are dropped. The rest
/// are ordered on top of `target_branch`.
pub fn build_github_info(
    snapshot: RemoteSnapshot,
    local_branch: &str,
    target_branch: &str,
    policy: &MergePolicy,
) -> GitHubInfo {
    let repository_id = snapshot.repository_id;
    let candidates: Vec<PullRequest> = snapshot
        .pull_requests
        .into_iter()
        .filter(|node| node.repository_id == repository_id)
        .filter_map(|node| decode_pull_request(node, local_branch))
        .collect();

    let pull_requests = sort_pull_requests(&candidates, target_branch, policy);

    let info = GitHubInfo {
        user_name: snapshot.viewer_login,
        repository_id,
        local_branch: local_branch.to_string(),
        pull_requests,
    };
    debug!(?info, "built stack snapshot");
    info
}
