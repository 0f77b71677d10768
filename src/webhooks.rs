pub mod github;
pub use github::{webhook, PayloadError};
