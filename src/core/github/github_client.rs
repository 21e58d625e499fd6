use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use super::github_models::{Follower, Gist, Repo, User};
use crate::core::storage::StoreError;

/// Errors that can be raised while looking up a GitHub user.
#[derive(Debug, Error)]
pub enum GithubError {
    #[error("GitHub resource not found: {0}")]
    NotFound(String),
    #[error("`{0}` is not a valid GitHub login")]
    InvalidLogin(String),
    #[error("GitHub API rate limit exceeded")]
    RateLimited { retry_after: Option<Duration> },
    #[error("GitHub returned {status} for {url}")]
    Http { status: u16, url: String },
    #[error("Request to GitHub timed out: {0}")]
    Timeout(String),
    #[error("Network error talking to GitHub: {0}")]
    Network(String),
    #[error("Unexpected GitHub response body: {0}")]
    Decode(String),
    #[error("GitHub API error: {0}")]
    Api(String),
    #[error("Local storage error: {0}")]
    Store(#[from] StoreError),
}

impl GithubError {
    /// Whether repeating the same request could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            GithubError::RateLimited { .. }
            | GithubError::Timeout(_)
            | GithubError::Network(_) => true,
            GithubError::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// The GitHub calls a user search needs.
///
/// The list calls take the hypermedia URL found on the profile rather than a
/// login, so the service never builds those paths itself.
#[async_trait]
pub trait GithubClient: Send + Sync {
    async fn fetch_user(&self, login: &str) -> Result<User, GithubError>;
    async fn fetch_followers(&self, url: &str) -> Result<Vec<Follower>, GithubError>;
    async fn fetch_gists(&self, url: &str) -> Result<Vec<Gist>, GithubError>;
    async fn fetch_repos(&self, url: &str) -> Result<Vec<Repo>, GithubError>;
}
