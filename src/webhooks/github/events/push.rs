use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct PushEvent {
    pub head_commit: Commit,
    pub r#ref: String,
}

impl PushEvent {
    /// Name of the pushed branch, i.e. the last segment of `refs/heads/<branch>`.
    pub fn branch(&self) -> &str {
        self.r#ref.rsplit('/').next().unwrap_or(&self.r#ref)
    }
}

#[derive(Debug, Deserialize)]
pub struct Commit {
    pub id: String,
    pub author: CommitAuthor,
}

#[derive(Debug, Deserialize)]
pub struct CommitAuthor {
    pub name: String,
}
