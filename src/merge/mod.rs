//! Merge engine for stacked PRs
//!
//! Two-phase pattern matching submit/:
//! 1. Plan - create `MergePlan` from the sorted stack (pure, testable)
//! 2. Execute - retarget, merge and close (effectful)

mod execute;
mod plan;

pub use execute::{MergeExecutionResult, execute_merge};
pub use plan::{MergePlan, MergeStep, create_merge_plan, merged_comment};
