//! stackpr - stacked pull requests for git
//!
//! Every commit between trunk and `HEAD` gets its own GitHub pull request,
//! and each PR merges into the branch of the commit below it. Reviewers see
//! one commit per PR; the bottom of the stack can be merged as soon as it
//! is ready.
//!
//! Library layout:
//! - [`branch`] / [`commit`] - branch name codec and commit message parsing
//! - [`stack`] - snapshot decoding, ordering and PR body rendering
//! - [`submit`] - reconciliation of local commits with remote PRs
//! - [`merge`] - landing the ready prefix of the stack
//! - [`platform`] - the [`platform::RemoteService`] seam and its GitHub
//!   implementation
//! - [`repo`] / [`config`] / [`auth`] - local repository, settings, tokens

pub mod auth;
pub mod branch;
pub mod commit;
pub mod config;
pub mod error;
pub mod merge;
pub mod platform;
pub mod repo;
pub mod stack;
pub mod submit;
pub mod types;
