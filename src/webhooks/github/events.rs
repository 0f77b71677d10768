use serde::Deserialize;

mod pull_request;
mod push;

pub use pull_request::*;
pub use push::*;

/// Top-level keys used to recognize the shape of a webhook payload.
pub const PULL_REQUEST_KEY: &str = "pull_request";
pub const HEAD_COMMIT_KEY: &str = "head_commit";

#[derive(Debug, Deserialize)]
pub struct GitHubUser {
    pub login: String,
}

#[derive(Debug, Deserialize)]
pub struct PullRequest {
    pub id: u64,
    pub user: GitHubUser,
    pub base: PrRef,
    pub head: PrRef,
    pub merged: Option<bool>,
}

impl PullRequest {
    pub fn is_merged(&self) -> bool {
        self.merged.unwrap_or(false)
    }
}

#[derive(Debug, Deserialize)]
pub struct PrRef {
    pub r#ref: String,
}
