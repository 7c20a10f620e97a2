//! Stack ordering - rebuild the chain from base/head branch names
//!
//! Pull requests arrive from GitHub in no particular order. Each PR in a
//! stack is based on the head branch of the PR below it, so the chain can
//! be rebuilt by following base → head links starting at the trunk.

use crate::types::{MergePolicy, PullRequest};
use std::collections::{HashMap, VecDeque};
use tracing::{debug, warn};

/// Order pull requests so the one on top of `target_branch` comes first,
/// followed by the ones stacked on it, and compute the `stacked` flags.
///
/// Entries that cannot be reached from `target_branch` (e.g. their base
/// belonged to a PR that was closed) are appended after the chain in their
/// original relative order. They are never marked stacked.
///
/// The input slice is left untouched.
pub fn sort_pull_requests(
    prs: &[PullRequest],
    target_branch: &str,
    policy: &MergePolicy,
) -> Vec<PullRequest> {
    let chain = link_chain(prs, target_branch);
    if let Some(gap) = &chain.gap {
        warn!(
            disconnected = gap.disconnected,
            broken_at = %gap.broken_at,
            "stack chain is broken; remaining pull requests are unordered"
        );
    }

    let mut sorted: Vec<PullRequest> = chain.order.iter().map(|&idx| prs[idx].clone()).collect();

    let mut ready = true;
    for (pos, pr) in sorted.iter_mut().enumerate() {
        ready = ready && pos < chain.linked && pr.merge_status.is_ready(policy);
        pr.merge_status.stacked = ready;
    }

    debug!(count = sorted.len(), linked = chain.linked, "sorted pull requests");
    sorted
}

/// Where the chain stopped before every PR was placed
#[derive(Debug, PartialEq, Eq)]
struct ChainGap {
    broken_at: String,
    disconnected: usize,
}

/// Indices in chain order; the first `linked` are reachable from the target
#[derive(Debug)]
struct Chain {
    order: Vec<usize>,
    linked: usize,
    gap: Option<ChainGap>,
}

fn link_chain(prs: &[PullRequest], target_branch: &str) -> Chain {
    let mut by_base: HashMap<&str, VecDeque<usize>> = HashMap::new();
    for (idx, pr) in prs.iter().enumerate() {
        by_base.entry(pr.to_branch.as_str()).or_default().push_back(idx);
    }

    let mut used = vec![false; prs.len()];
    let mut order = Vec::with_capacity(prs.len());
    let mut target = target_branch;

    while let Some(idx) = by_base.get_mut(target).and_then(VecDeque::pop_front) {
        used[idx] = true;
        order.push(idx);
        target = prs[idx].from_branch.as_str();
    }

    let linked = order.len();
    let gap = (linked < prs.len()).then(|| ChainGap {
        broken_at: target.to_string(),
        disconnected: prs.len() - linked,
    });
    order.extend((0..prs.len()).filter(|idx| !used[*idx]));

    Chain { order, linked, gap }
}
