//! Progress reporting for effectful operations

use crate::types::PullRequest;
use async_trait::async_trait;

/// Receives status updates while a plan is executed
#[async_trait]
pub trait ProgressCallback: Send + Sync {
    /// Free-form status message
    async fn on_message(&self, message: &str);

    /// A PR was created
    async fn on_pr_created(&self, pr: &PullRequest) {
        self.on_message(&format!("Created PR #{}: {}", pr.number, pr.title))
            .await;
    }

    /// A PR's base, title or body was changed
    async fn on_pr_updated(&self, pr: &PullRequest) {
        self.on_message(&format!("Updated PR #{}: {}", pr.number, pr.title))
            .await;
    }

    /// A PR was closed
    async fn on_pr_closed(&self, pr: &PullRequest) {
        self.on_message(&format!("Closed PR #{}: {}", pr.number, pr.title))
            .await;
    }
}

/// Progress sink that drops everything
pub struct NoopProgress;

#[async_trait]
impl ProgressCallback for NoopProgress {
    async fn on_message(&self, _message: &str) {}
}
