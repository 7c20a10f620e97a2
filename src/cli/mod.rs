//! Command-line interface

pub mod context;
pub mod merge;
pub mod status;
pub mod style;
pub mod update;

use anstream::println;
use async_trait::async_trait;
use stackpr::submit::ProgressCallback;
use stackpr::types::PullRequest;
use style::{Stylize, arrow, pr_link};

/// Prints progress lines to stdout
pub struct CliProgress;

#[async_trait]
impl ProgressCallback for CliProgress {
    async fn on_message(&self, message: &str) {
        println!("  {} {message}", arrow());
    }

    async fn on_pr_created(&self, pr: &PullRequest) {
        println!(
            "  {} {} {}: {}",
            arrow(),
            "created".success(),
            pr_link(pr.number, &pr.url),
            pr.title
        );
    }

    async fn on_pr_updated(&self, pr: &PullRequest) {
        println!(
            "  {} {} {}: {}",
            arrow(),
            "updated".accent(),
            pr_link(pr.number, &pr.url),
            pr.title
        );
    }

    async fn on_pr_closed(&self, pr: &PullRequest) {
        println!(
            "  {} {} {}: {}",
            arrow(),
            "closed".muted(),
            pr_link(pr.number, &pr.url),
            pr.title
        );
    }
}
