use serde::Deserialize;

use crate::webhooks::github::events::PullRequest;

#[derive(Debug, Deserialize)]
pub struct PullRequestEvent {
    pub pull_request: PullRequest,
    pub action: String,
}
