//! Merge execution - effectful operations
//!
//! Takes a [`MergePlan`] and performs it through the remote service,
//! stopping at the first failure.

use crate::error::{Result, mutation_error};
use crate::merge::plan::{MergePlan, MergeStep, merged_comment};
use crate::platform::RemoteService;
use crate::submit::ProgressCallback;
use crate::types::PullRequestUpdate;
use tracing::info;

/// Result of merge execution
#[derive(Debug, Clone, Default)]
pub struct MergeExecutionResult {
    /// PR that was merged
    pub merged: Option<u64>,
    /// PRs closed because their commit landed with the merge
    pub closed: Vec<u64>,
}

impl MergeExecutionResult {
    /// Check if anything reached trunk
    #[must_use]
    pub const fn has_merges(&self) -> bool {
        self.merged.is_some()
    }
}

/// Execute the merge plan (EFFECTFUL)
///
/// Steps run in order; any failure aborts the remaining steps.
pub async fn execute_merge(
    plan: &MergePlan,
    service: &dyn RemoteService,
    progress: &dyn ProgressCallback,
) -> Result<MergeExecutionResult> {
    let mut result = MergeExecutionResult::default();

    for step in &plan.steps {
        match step {
            MergeStep::RetargetBase { pr, to } => {
                let update = PullRequestUpdate {
                    base_ref_name: Some(to.clone()),
                    ..Default::default()
                };
                service
                    .update_pull_request(&pr.id, &update)
                    .await
                    .map_err(|e| mutation_error("retarget", pr, e))?;
                progress
                    .on_message(&format!("Retargeted PR #{} onto {to}", pr.number))
                    .await;
            }
            MergeStep::Merge { pr, method } => {
                progress
                    .on_message(&format!("Merging PR #{}: {}", pr.number, pr.title))
                    .await;
                service
                    .merge_pull_request(&pr.id, *method)
                    .await
                    .map_err(|e| mutation_error("merge", pr, e))?;
                info!(number = pr.number, %method, "merged pull request");
                result.merged = Some(pr.number);
            }
            MergeStep::Close { pr, merged_in } => {
                service
                    .comment_pull_request(&pr.id, &merged_comment(*merged_in))
                    .await
                    .map_err(|e| mutation_error("comment", pr, e))?;
                service
                    .close_pull_request(&pr.id)
                    .await
                    .map_err(|e| mutation_error("close", pr, e))?;
                progress.on_pr_closed(pr).await;
                result.closed.push(pr.number);
            }
            MergeStep::Skip {
                pr_number,
                pr_title,
                reasons,
            } => {
                progress
                    .on_message(&format!(
                        "Stopping below PR #{pr_number} ({pr_title}): {}",
                        reasons.join(", ")
                    ))
                    .await;
            }
        }
    }

    Ok(result)
}
