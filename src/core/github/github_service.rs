use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::RwLock;

use super::github_client::{GithubClient, GithubError};
use super::github_models::{expand_url_template, Follower, Gist, GitUserData, Repo, User};
use super::retry_policy::RetryPolicy;
use crate::core::storage::LocalStore;

/// Storage key under which the last search result is cached.
pub const LOCAL_STORAGE_KEY: &str = "gitUserData";

/// What a search did to the shared state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The state now holds the result of this search.
    Updated,
    /// Nothing to search for.
    Skipped,
    /// A request failed; the previous state was kept.
    Failed,
    /// A newer search or a cancel started while this one was in flight.
    Superseded,
}

#[derive(Debug, Default)]
struct UserState {
    search_user: String,
    data: GitUserData,
}

/// Holds the currently displayed GitHub user and keeps it in sync with GitHub
/// and with local storage.
///
/// All four lookups of a search are composed into one [`GitUserData`] before
/// anything is published, so readers see either the previous user or the new
/// one, never a mix. The latest search always wins.
pub struct UserSearchService<C: GithubClient, S: LocalStore> {
    client: C,
    store: S,
    retry: RetryPolicy,
    state: RwLock<UserState>,
    generation: AtomicU64,
}

impl<C, S> UserSearchService<C, S>
where
    C: GithubClient,
    S: LocalStore,
{
    /// Create a new service and eagerly restore the cached snapshot.
    pub async fn new(client: C, store: S, retry: RetryPolicy) -> Self {
        let data = restore_snapshot(&store).await;

        Self {
            client,
            store,
            retry,
            state: RwLock::new(UserState {
                search_user: String::new(),
                data,
            }),
            generation: AtomicU64::new(0),
        }
    }

    /// Set the search term and run the search for it.
    pub async fn search(&self, login: impl Into<String>) -> SearchOutcome {
        self.set_search_user(login).await;
        self.search_request().await
    }

    /// Search for the current search term.
    ///
    /// Errors never escape: they are logged and the previous state is kept.
    pub async fn search_request(&self) -> SearchOutcome {
        let login = self.state.read().await.search_user.trim().to_string();
        if login.is_empty() {
            tracing::debug!("Empty search term, nothing to fetch");
            return SearchOutcome::Skipped;
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!(login = %login, generation, "Searching GitHub user");

        let result = self.fetch_user_data(&login).await;
        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::info!(login = %login, generation, "Discarding result of superseded search");
            return SearchOutcome::Superseded;
        }

        let data = match result {
            Ok(data) => data,
            Err(err) => {
                tracing::error!(login = %login, error = %err, "GitHub user search failed");
                return SearchOutcome::Failed;
            }
        };

        // Persist under the write lock so the cache matches the committed state.
        let mut state = self.state.write().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::info!(login = %login, generation, "Discarding result of superseded search");
            return SearchOutcome::Superseded;
        }
        state.data = data;
        tracing::info!(
            login = %login,
            followers = state.data.followers.as_ref().map_or(0, Vec::len),
            gists = state.data.gists.as_ref().map_or(0, Vec::len),
            repositories = state.data.repositories.as_ref().map_or(0, Vec::len),
            "GitHub user loaded"
        );

        if let Err(err) = self.save_snapshot(&state.data).await {
            tracing::warn!(login = %login, error = %err, "Failed to cache GitHub user data");
        }

        SearchOutcome::Updated
    }

    /// Fetch the profile and then its followers, gists and repositories.
    ///
    /// The three list lookups only depend on the profile, so they run
    /// concurrently, each with its own retries. Any failure fails the whole
    /// lookup.
    pub async fn fetch_user_data(&self, login: &str) -> Result<GitUserData, GithubError> {
        let user = self
            .retry
            .run("fetch_user", || self.client.fetch_user(login))
            .await?;
        tracing::debug!(login = %user.login, id = user.id, "Fetched GitHub profile");

        let gists_url = expand_url_template(&user.gists_url);
        let followers = self.retry.run("fetch_followers", || {
            self.client.fetch_followers(&user.followers_url)
        });
        let gists = self
            .retry
            .run("fetch_gists", || self.client.fetch_gists(&gists_url));
        let repositories = self
            .retry
            .run("fetch_repos", || self.client.fetch_repos(&user.repos_url));
        let (followers, gists, repositories) = tokio::try_join!(followers, gists, repositories)?;

        Ok(GitUserData {
            user: Some(user),
            followers: Some(followers),
            gists: Some(gists),
            repositories: Some(repositories),
        })
    }

    /// Forget the current user, both in memory and in local storage.
    ///
    /// Searches still in flight are cancelled so they cannot bring the user
    /// back.
    pub async fn clear(&self) -> Result<(), GithubError> {
        self.cancel_pending();
        let mut state = self.state.write().await;
        *state = UserState::default();
        self.store.remove_item(LOCAL_STORAGE_KEY).await?;
        Ok(())
    }

    async fn save_snapshot(&self, data: &GitUserData) -> Result<(), GithubError> {
        let text = serde_json::to_string(data).map_err(crate::core::storage::StoreError::from)?;
        self.store.set_item(LOCAL_STORAGE_KEY, text).await?;
        Ok(())
    }
}

// Per-slot state accessors.
#[allow(dead_code)]
impl<C, S> UserSearchService<C, S>
where
    C: GithubClient,
    S: LocalStore,
{
    pub async fn search_user(&self) -> String {
        self.state.read().await.search_user.clone()
    }

    pub async fn user(&self) -> Option<User> {
        self.state.read().await.data.user.clone()
    }

    pub async fn followers(&self) -> Option<Vec<Follower>> {
        self.state.read().await.data.followers.clone()
    }

    pub async fn gists(&self) -> Option<Vec<Gist>> {
        self.state.read().await.data.gists.clone()
    }

    pub async fn repositories(&self) -> Option<Vec<Repo>> {
        self.state.read().await.data.repositories.clone()
    }

    pub async fn snapshot(&self) -> GitUserData {
        self.state.read().await.data.clone()
    }

    pub async fn set_search_user(&self, login: impl Into<String>) {
        self.state.write().await.search_user = login.into();
    }

    pub async fn set_user(&self, user: Option<User>) {
        self.state.write().await.data.user = user;
    }

    pub async fn set_followers(&self, followers: Option<Vec<Follower>>) {
        self.state.write().await.data.followers = followers;
    }

    pub async fn set_gists(&self, gists: Option<Vec<Gist>>) {
        self.state.write().await.data.gists = gists;
    }

    pub async fn set_repositories(&self, repositories: Option<Vec<Repo>>) {
        self.state.write().await.data.repositories = repositories;
    }

    /// Invalidate every search currently in flight.
    pub fn cancel_pending(&self) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(generation, "Cancelled pending GitHub searches");
    }

    /// Write the current state to local storage.
    pub async fn persist(&self) -> Result<(), GithubError> {
        let state = self.state.read().await;
        self.save_snapshot(&state.data).await
    }
}

async fn restore_snapshot<S: LocalStore>(store: &S) -> GitUserData {
    match store.get_item(LOCAL_STORAGE_KEY).await {
        Ok(Some(text)) => match serde_json::from_str::<GitUserData>(&text) {
            Ok(data) => {
                tracing::debug!(
                    login = data.user.as_ref().map(|u| u.login.as_str()).unwrap_or("-"),
                    "Restored cached GitHub user data"
                );
                data
            }
            Err(err) => {
                tracing::warn!(error = %err, "Ignoring unreadable cached GitHub user data");
                GitUserData::default()
            }
        },
        Ok(None) => GitUserData::default(),
        Err(err) => {
            tracing::warn!(error = %err, "Failed to read cached GitHub user data");
            GitUserData::default()
        }
    }
}
