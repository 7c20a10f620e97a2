//! Stack reconstruction
//!
//! Pure functions only: decoding a remote snapshot into the current
//! branch's stack, ordering it, and rendering PR descriptions.

mod body;
mod order;
mod snapshot;

pub use body::{CURRENT_PR_MARKER, MANUAL_MERGE_NOTICE, format_body};
pub use order::sort_pull_requests;
pub use snapshot::build_github_info;
