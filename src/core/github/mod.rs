pub mod github_client;
pub mod github_models;
pub mod github_service;
pub mod retry_policy;

pub use github_client::{GithubClient, GithubError};
pub use github_models::{Follower, Gist, GitUserData, Repo, User};
pub use github_service::{SearchOutcome, UserSearchService, LOCAL_STORAGE_KEY};
pub use retry_policy::RetryPolicy;
