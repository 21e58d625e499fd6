// Record shapes mirrored from the GitHub REST API.
// Nothing in here knows about HTTP or storage; the service moves these around
// and the CLI layer renders them.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Public profile returned by `GET /users/{login}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub login: String,
    pub id: u64,
    #[serde(default)]
    pub node_id: Option<String>,
    pub avatar_url: String,
    pub html_url: String,
    #[serde(rename = "type", default = "default_account_type")]
    pub account_type: String,
    #[serde(default)]
    pub site_admin: bool,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub blog: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub twitter_username: Option<String>,
    #[serde(default)]
    pub public_repos: u32,
    #[serde(default)]
    pub public_gists: u32,
    #[serde(default)]
    pub followers: u32,
    #[serde(default)]
    pub following: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub followers_url: String,
    #[serde(default)]
    pub following_url: Option<String>,
    pub gists_url: String,
    #[serde(default)]
    pub starred_url: Option<String>,
    pub repos_url: String,
}

impl User {
    /// Display name, falling back to the login when the profile has none.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.login)
    }
}

/// Entry of `GET /users/{login}/followers`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Follower {
    pub login: String,
    pub id: u64,
    pub avatar_url: String,
    pub html_url: String,
    #[serde(rename = "type", default = "default_account_type")]
    pub account_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GistFile {
    pub filename: String,
    #[serde(rename = "type", default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    pub raw_url: String,
    #[serde(default)]
    pub size: u64,
}

/// Entry of `GET /users/{login}/gists`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gist {
    pub id: String,
    pub html_url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub comments: u32,
    #[serde(default)]
    pub files: BTreeMap<String, GistFile>,
}

/// Entry of `GET /users/{login}/repos`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repo {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub html_url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub fork: bool,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub stargazers_count: u32,
    #[serde(default)]
    pub watchers_count: u32,
    #[serde(default)]
    pub forks_count: u32,
    #[serde(default)]
    pub open_issues_count: u32,
    #[serde(default)]
    pub default_branch: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub pushed_at: Option<DateTime<Utc>>,
}

/// Everything known about one searched user.
///
/// This is both the aggregate result of a search and the snapshot written to
/// local storage. The serialized key names match snapshots produced by the
/// web client (`userExist`, `gistsList`, `repositoriesList`), so an existing
/// cache file keeps loading.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitUserData {
    #[serde(rename = "userExist")]
    pub user: Option<User>,
    pub followers: Option<Vec<Follower>>,
    #[serde(rename = "gistsList")]
    pub gists: Option<Vec<Gist>>,
    #[serde(rename = "repositoriesList")]
    pub repositories: Option<Vec<Repo>>,
}

impl GitUserData {
    pub fn is_empty(&self) -> bool {
        self.user.is_none()
            && self.followers.is_none()
            && self.gists.is_none()
            && self.repositories.is_none()
    }
}

fn default_account_type() -> String {
    "User".to_string()
}

/// Strip the URI-template suffix GitHub appends to some hypermedia links,
/// e.g. `.../gists{/gist_id}` becomes `.../gists`.
pub fn expand_url_template(url: &str) -> String {
    match (url.find('{'), url.rfind('}')) {
        (Some(start), Some(end)) if start < end => {
            let mut expanded = String::with_capacity(url.len());
            expanded.push_str(&url[..start]);
            expanded.push_str(&url[end + 1..]);
            expanded
        }
        _ => url.to_string(),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_deserializes_from_api_payload() {
        let user = fixtures::user("octocat");
        assert_eq!(user.login, "octocat");
        assert_eq!(user.account_type, "User");
        assert_eq!(user.public_repos, 8);
        assert_eq!(user.email, None);
        assert_eq!(user.display_name(), "The Octocat");
    }

    #[test]
    fn user_tolerates_missing_optional_fields() {
        let user: User = serde_json::from_str(
            r#"{
                "login": "ghost",
                "id": 10137,
                "avatar_url": "https://avatars.githubusercontent.com/u/10137?v=4",
                "html_url": "https://github.com/ghost",
                "created_at": "2008-05-13T06:14:25Z",
                "updated_at": "2018-04-10T17:22:33Z",
                "followers_url": "https://api.github.com/users/ghost/followers",
                "gists_url": "https://api.github.com/users/ghost/gists{/gist_id}",
                "repos_url": "https://api.github.com/users/ghost/repos"
            }"#,
        )
        .unwrap();

        assert_eq!(user.name, None);
        assert_eq!(user.followers, 0);
        assert_eq!(user.display_name(), "ghost");
    }

    #[test]
    fn gist_files_keep_their_metadata() {
        let gist = fixtures::gist("aa5a315d61ae9438b18d");
        let file = &gist.files["hello_world.rb"];
        assert_eq!(file.language.as_deref(), Some("Ruby"));
        assert_eq!(file.mime_type.as_deref(), Some("application/x-ruby"));
        assert_eq!(file.size, 167);
    }

    #[test]
    fn snapshot_uses_web_client_key_names() {
        let data = GitUserData {
            user: Some(fixtures::user("octocat")),
            followers: Some(vec![]),
            gists: None,
            repositories: Some(vec![fixtures::repo("Hello-World")]),
        };

        let value = serde_json::to_value(&data).unwrap();
        let object = value.as_object().unwrap();
        assert!(object.contains_key("userExist"));
        assert!(object.contains_key("followers"));
        assert!(object["gistsList"].is_null());
        assert_eq!(object["repositoriesList"][0]["name"], "Hello-World");
    }

    #[test]
    fn snapshot_with_null_slots_is_empty() {
        let data: GitUserData = serde_json::from_str(
            r#"{"userExist":null,"followers":null,"gistsList":null,"repositoriesList":null}"#,
        )
        .unwrap();
        assert!(data.is_empty());

        let partial: GitUserData = serde_json::from_str("{}").unwrap();
        assert_eq!(partial, GitUserData::default());
    }

    #[test]
    fn url_template_suffix_is_removed() {
        assert_eq!(
            expand_url_template("https://api.github.com/users/octocat/gists{/gist_id}"),
            "https://api.github.com/users/octocat/gists"
        );
        assert_eq!(
            expand_url_template("https://api.github.com/users/octocat/starred{/owner}{/repo}"),
            "https://api.github.com/users/octocat/starred"
        );
    }

    #[test]
    fn url_without_template_is_unchanged() {
        let url = "https://api.github.com/users/octocat/repos";
        assert_eq!(expand_url_template(url), url);
        assert_eq!(expand_url_template("https://x/}{"), "https://x/}{");
    }
}
