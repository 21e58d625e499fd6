// Runtime configuration, read from the environment (and `.env`, loaded in main).

use std::path::PathBuf;
use std::time::Duration;

use crate::core::github::RetryPolicy;
use crate::infra::github::github_client::DEFAULT_API_URL;

const STORAGE_FILE_NAME: &str = "local_storage.json";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub github_token: Option<String>,
    pub api_url: String,
    pub timeout: Duration,
    pub retry: RetryPolicy,
    pub data_dir: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let github_token = get("GITHUB_TOKEN").filter(|t| !t.trim().is_empty());
        let api_url = get("GITHUB_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let timeout_secs = get("GITHUB_TIMEOUT_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(10);
        let max_attempts = get("GITHUB_MAX_ATTEMPTS")
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(RetryPolicy::default().max_attempts);
        let data_dir = get("GIT_USER_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data"));

        let defaults = RetryPolicy::default();
        Self {
            github_token,
            api_url,
            timeout: Duration::from_secs(timeout_secs),
            retry: RetryPolicy::new(max_attempts, defaults.base_delay, defaults.max_delay),
            data_dir,
        }
    }

    /// File that backs local storage.
    pub fn storage_path(&self) -> PathBuf {
        self.data_dir.join(STORAGE_FILE_NAME)
    }
}
