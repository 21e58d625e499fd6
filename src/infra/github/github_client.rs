use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::core::github::{Follower, Gist, GithubClient, GithubError, Repo, User};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// GitHub caps list endpoints at 100 entries per page.
const PER_PAGE: &str = "100";

/// GitHub logins are at most 39 characters long.
const MAX_LOGIN_LEN: usize = 39;

/// Minimal GitHub REST API client covering the user lookups.
pub struct GithubApiClient {
    client: Client,
    base_url: Url,
}

impl GithubApiClient {
    pub fn new(
        token: Option<String>,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, GithubError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "Accept",
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "User-Agent",
            HeaderValue::from_static("git-user-explorer/0.2"),
        );
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            headers.insert(
                "Authorization",
                HeaderValue::from_str(&format!("Bearer {}", token.trim()))
                    .map_err(|e| GithubError::Api(e.to_string()))?,
            );
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| GithubError::Api(e.to_string()))?;

        let base_url = Url::parse(base_url)
            .map_err(|e| GithubError::Api(format!("invalid API URL `{}`: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(GithubError::Api(format!(
                "invalid API URL `{}`: not a base URL",
                base_url
            )));
        }

        Ok(Self { client, base_url })
    }

    /// `{base}/users/{login}`, with the login checked and added as a single
    /// encoded path segment.
    fn user_url(&self, login: &str) -> Result<Url, GithubError> {
        let login = login.trim();
        if !is_valid_login(login) {
            return Err(GithubError::InvalidLogin(login.to_string()));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| GithubError::Api(format!("invalid API URL `{}`", self.base_url)))?
            .pop_if_empty()
            .push("users")
            .push(login);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, GithubError> {
        tracing::debug!(url, "GET");
        let resp = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(map_transport_error)?;

        check_status(url, resp.status(), resp.headers(), Utc::now())?;

        let body = resp.text().await.map_err(map_transport_error)?;
        serde_json::from_str(&body).map_err(|e| GithubError::Decode(format!("{}: {}", url, e)))
    }
}

#[async_trait]
impl GithubClient for GithubApiClient {
    async fn fetch_user(&self, login: &str) -> Result<User, GithubError> {
        let url = self.user_url(login)?;
        self.get_json(url.as_str(), &[]).await
    }

    async fn fetch_followers(&self, url: &str) -> Result<Vec<Follower>, GithubError> {
        self.get_json(url, &[("per_page", PER_PAGE)]).await
    }

    async fn fetch_gists(&self, url: &str) -> Result<Vec<Gist>, GithubError> {
        self.get_json(url, &[("per_page", PER_PAGE)]).await
    }

    async fn fetch_repos(&self, url: &str) -> Result<Vec<Repo>, GithubError> {
        self.get_json(url, &[("per_page", PER_PAGE), ("sort", "updated")])
            .await
    }
}

/// GitHub's login rule: ASCII letters, digits and single hyphens, not at
/// either end.
fn is_valid_login(login: &str) -> bool {
    !login.is_empty()
        && login.len() <= MAX_LOGIN_LEN
        && login.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        && !login.starts_with('-')
        && !login.ends_with('-')
        && !login.contains("--")
}

/// Turn a non-success response into the matching error.
fn check_status(
    url: &str,
    status: StatusCode,
    headers: &HeaderMap,
    now: DateTime<Utc>,
) -> Result<(), GithubError> {
    if status.is_success() {
        return Ok(());
    }

    if status == StatusCode::NOT_FOUND {
        return Err(GithubError::NotFound(url.to_string()));
    }

    let quota_exhausted = header_u64(headers, "x-ratelimit-remaining") == Some(0);
    if status == StatusCode::TOO_MANY_REQUESTS || (status == StatusCode::FORBIDDEN && quota_exhausted)
    {
        return Err(GithubError::RateLimited {
            retry_after: rate_limit_delay(headers, now),
        });
    }

    Err(GithubError::Http {
        status: status.as_u16(),
        url: url.to_string(),
    })
}

/// How long GitHub asks us to wait, from `retry-after` or the quota reset time.
fn rate_limit_delay(headers: &HeaderMap, now: DateTime<Utc>) -> Option<Duration> {
    if let Some(seconds) = header_u64(headers, "retry-after") {
        return Some(Duration::from_secs(seconds));
    }

    let reset = header_u64(headers, "x-ratelimit-reset")?;
    let wait = (reset as i64).saturating_sub(now.timestamp()).max(0);
    Some(Duration::from_secs(wait as u64))
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

fn map_transport_error(error: reqwest::Error) -> GithubError {
    if error.is_timeout() {
        GithubError::Timeout(error.to_string())
    } else if error.is_decode() {
        GithubError::Decode(error.to_string())
    } else if error.is_connect() || error.is_request() || error.is_body() {
        GithubError::Network(error.to_string())
    } else {
        GithubError::Api(error.to_string())
    }
}
