//! Stack submission
//!
//! Planning is pure ([`create_reconcile_plan`]); execution talks to the
//! remote ([`execute_reconcile`]). The CLI prints the plan for dry runs.

mod execute;
mod plan;
mod progress;

pub use execute::{ReconcileOptions, ReconcileResult, STALE_PR_COMMENT, execute_reconcile};
pub use plan::{ReconcilePlan, ReconcileStep, create_reconcile_plan};
pub use progress::{NoopProgress, ProgressCallback};
