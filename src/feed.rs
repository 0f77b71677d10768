use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

mod github;
pub use github::{normalize, NormalizeError, Normalized};

/// Format of [`CanonicalEvent::timestamp`], e.g. `05 March 2024 - 02:30 PM UTC`.
pub const TIMESTAMP_FORMAT: &str = "%d %B %Y - %I:%M %p UTC";

pub fn format_timestamp(captured_at: DateTime<Utc>) -> String {
    captured_at.format(TIMESTAMP_FORMAT).to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventAction {
    Push,
    PullRequest,
    Merge,
}

/// A repository event, stripped of everything the payload carried except what the feed displays.
///
/// Records are only built through [`CanonicalEvent::push`], [`CanonicalEvent::pull_request`] and
/// [`CanonicalEvent::merge`], so `from_branch` is `None` exactly when `action` is
/// [`EventAction::Push`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalEvent {
    pub author: String,
    pub action: EventAction,
    pub from_branch: Option<String>,
    pub to_branch: String,
    pub timestamp: String,
    pub message: String,
    pub request_id: String,
}

impl CanonicalEvent {
    pub fn push(author: String, to_branch: String, commit_id: String, timestamp: String) -> Self {
        let message = format!("{} pushed to {} on {}", author, to_branch, timestamp);

        Self {
            author,
            action: EventAction::Push,
            from_branch: None,
            to_branch,
            timestamp,
            message,
            request_id: commit_id,
        }
    }

    pub fn pull_request(
        author: String,
        from_branch: String,
        to_branch: String,
        pr_id: u64,
        timestamp: String,
    ) -> Self {
        let message = format!(
            "{} submitted a pull request from {} to {} on {}",
            author, from_branch, to_branch, timestamp
        );

        Self {
            author,
            action: EventAction::PullRequest,
            from_branch: Some(from_branch),
            to_branch,
            timestamp,
            message,
            request_id: pr_id.to_string(),
        }
    }

    pub fn merge(
        author: String,
        from_branch: String,
        to_branch: String,
        pr_id: u64,
        timestamp: String,
    ) -> Self {
        let message = format!(
            "{} merged branch {} to {} on {}",
            author, from_branch, to_branch, timestamp
        );

        Self {
            author,
            action: EventAction::Merge,
            from_branch: Some(from_branch),
            to_branch,
            timestamp,
            message,
            request_id: pr_id.to_string(),
        }
    }
}
