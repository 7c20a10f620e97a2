//! Merge planning - pure functions for creating merge plans
//!
//! No I/O happens here - everything needed is already in the sorted
//! [`GitHubInfo`], so plans are easy to unit test.

use crate::types::{GitHubInfo, MergeMethod, MergePolicy, PullRequest};
use std::fmt;

/// A single step in the merge plan
#[derive(Debug, Clone)]
pub enum MergeStep {
    /// Point the PR at trunk before merging it
    RetargetBase {
        /// PR to retarget
        pr: PullRequest,
        /// Branch to retarget onto
        to: String,
    },
    /// Merge this PR; it carries every commit below it
    Merge {
        /// PR to merge
        pr: PullRequest,
        /// Merge method to use
        method: MergeMethod,
    },
    /// Close a PR whose commit landed through the merged PR
    Close {
        /// PR to close
        pr: PullRequest,
        /// Number of the PR that was merged
        merged_in: u64,
    },
    /// First PR above the merge point that is not ready (informational)
    Skip {
        /// PR number
        pr_number: u64,
        /// PR title
        pr_title: String,
        /// Reasons why this PR cannot be merged
        reasons: Vec<String>,
    },
}

impl fmt::Display for MergeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RetargetBase { pr, to } => {
                write!(f, "retarget PR #{} onto {to}", pr.number)
            }
            Self::Merge { pr, method } => {
                write!(f, "merge PR #{} ({method}): {}", pr.number, pr.title)
            }
            Self::Close { pr, merged_in } => {
                write!(f, "close PR #{} (merged in #{merged_in})", pr.number)
            }
            Self::Skip {
                pr_number,
                pr_title,
                reasons,
            } => {
                write!(f, "skip PR #{pr_number}: {pr_title}")?;
                if !reasons.is_empty() {
                    write!(f, " ({})", reasons.join(", "))?;
                }
                Ok(())
            }
        }
    }
}

/// Comment posted on PRs closed because their commit was merged elsewhere
pub fn merged_comment(merged_in: u64) -> String {
    format!("✓ commit merged in pull request #{merged_in}")
}

/// Merge plan - the functional core output
#[derive(Debug, Clone, Default)]
pub struct MergePlan {
    /// Ordered steps to perform
    pub steps: Vec<MergeStep>,
}

impl MergePlan {
    /// Check if the plan merges anything
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.merged_pr().is_none()
    }

    /// The PR this plan merges, if any
    #[must_use]
    pub fn merged_pr(&self) -> Option<&PullRequest> {
        self.steps.iter().find_map(|s| match s {
            MergeStep::Merge { pr, .. } => Some(pr),
            _ => None,
        })
    }

    /// Number of PRs that land on trunk
    #[must_use]
    pub fn landed_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s, MergeStep::Merge { .. } | MergeStep::Close { .. }))
            .count()
    }
}

/// Create a merge plan (PURE - no I/O, easily testable)
///
/// Merges the top-most `stacked` PR, considering only the first `count`
/// entries when given. The PRs below it are closed since their commits
/// ride along with the merge.
#[must_use]
pub fn create_merge_plan(
    info: &GitHubInfo,
    target_branch: &str,
    method: MergeMethod,
    policy: &MergePolicy,
    count: Option<usize>,
) -> MergePlan {
    let prs = &info.pull_requests;
    let limit = count.map_or(prs.len(), |c| c.min(prs.len()));

    let stacked = prs[..limit]
        .iter()
        .take_while(|pr| pr.merge_status.stacked)
        .count();

    let mut steps = Vec::new();

    if let Some(top) = stacked.checked_sub(1).map(|i| &prs[i]) {
        if top.to_branch != target_branch {
            steps.push(MergeStep::RetargetBase {
                pr: top.clone(),
                to: target_branch.to_string(),
            });
        }
        steps.push(MergeStep::Merge {
            pr: top.clone(),
            method,
        });
        for pr in &prs[..stacked - 1] {
            steps.push(MergeStep::Close {
                pr: pr.clone(),
                merged_in: top.number,
            });
        }
    }

    // Why the stack stops here, when something above is left behind
    if let Some(blocked) = prs.get(stacked).filter(|_| stacked < limit) {
        steps.push(MergeStep::Skip {
            pr_number: blocked.number,
            pr_title: blocked.title.clone(),
            reasons: blocked.merge_status.blocking_reasons(policy),
        });
    }

    MergePlan { steps }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CheckStatus, MergeStatus};

    fn pr(number: u64, to_branch: &str, stacked: bool) -> PullRequest {
        PullRequest {
            id: format!("PR_{number}"),
            number,
            title: format!("title {number}"),
            to_branch: to_branch.to_string(),
            merge_status: MergeStatus {
                checks: if stacked {
                    CheckStatus::Pass
                } else {
                    CheckStatus::Fail
                },
                review_approved: true,
                no_conflicts: true,
                stacked,
            },
            ..Default::default()
        }
    }

    fn info(prs: Vec<PullRequest>) -> GitHubInfo {
        GitHubInfo {
            pull_requests: prs,
            ..Default::default()
        }
    }

    #[test]
    fn test_nothing_stacked_is_empty() {
        let plan = create_merge_plan(
            &info(vec![pr(1, "main", false)]),
            "main",
            MergeMethod::Rebase,
            &MergePolicy::default(),
            None,
        );
        assert!(plan.is_empty());
        assert!(matches!(plan.steps[0], MergeStep::Skip { pr_number: 1, .. }));
    }

    #[test]
    fn test_empty_stack() {
        let plan = create_merge_plan(
            &info(vec![]),
            "main",
            MergeMethod::Rebase,
            &MergePolicy::default(),
            None,
        );
        assert!(plan.steps.is_empty());
    }

    #[test]
    fn test_merges_top_of_stacked_prefix_and_closes_below() {
        let prs = vec![
            pr(1, "main", true),
            pr(2, "pr/u/f/00000001", true),
            pr(3, "pr/u/f/00000002", false),
        ];
        let plan = create_merge_plan(
            &info(prs),
            "main",
            MergeMethod::Squash,
            &MergePolicy::default(),
            None,
        );

        assert_eq!(plan.merged_pr().map(|p| p.number), Some(2));
        assert_eq!(plan.landed_count(), 2);
        assert!(matches!(&plan.steps[0], MergeStep::RetargetBase { pr, to } if pr.number == 2 && to == "main"));
        assert!(matches!(&plan.steps[1], MergeStep::Merge { pr, method: MergeMethod::Squash } if pr.number == 2));
        assert!(matches!(&plan.steps[2], MergeStep::Close { pr, merged_in: 2 } if pr.number == 1));
        match &plan.steps[3] {
            MergeStep::Skip {
                pr_number, reasons, ..
            } => {
                assert_eq!(*pr_number, 3);
                assert_eq!(reasons, &vec!["checks fail".to_string()]);
            }
            other => panic!("expected skip, got {other:?}"),
        }
    }

    #[test]
    fn test_bottom_pr_needs_no_retarget() {
        let plan = create_merge_plan(
            &info(vec![pr(1, "main", true)]),
            "main",
            MergeMethod::Rebase,
            &MergePolicy::default(),
            None,
        );
        assert_eq!(plan.steps.len(), 1);
        assert!(matches!(&plan.steps[0], MergeStep::Merge { .. }));
    }

    #[test]
    fn test_count_limits_merge_point() {
        let prs = vec![
            pr(1, "main", true),
            pr(2, "pr/u/f/00000001", true),
            pr(3, "pr/u/f/00000002", true),
        ];
        let plan = create_merge_plan(
            &info(prs),
            "main",
            MergeMethod::Rebase,
            &MergePolicy::default(),
            Some(2),
        );
        assert_eq!(plan.merged_pr().map(|p| p.number), Some(2));
        assert!(!plan.steps.iter().any(|s| matches!(s, MergeStep::Skip { .. })));
    }

    #[test]
    fn test_merged_comment() {
        assert_eq!(merged_comment(12), "✓ commit merged in pull request #12");
    }
}
