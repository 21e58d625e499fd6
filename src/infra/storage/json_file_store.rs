use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::RwLock;

use crate::core::storage::{LocalStore, StoreError};

/// File-backed local storage. Every key lives in one JSON object:
/// { "key": "value", ... }
pub struct JsonFileStore {
    path: PathBuf,
    cache: RwLock<BTreeMap<String, String>>,
}

impl JsonFileStore {
    /// Open the store, loading whatever the file holds. A missing file is an
    /// empty store; so is an unreadable one, which gets overwritten on the
    /// next write.
    pub async fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let cache = match fs::read_to_string(&path).await {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "Local storage file is corrupt, starting empty");
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read local storage file");
                BTreeMap::new()
            }
        };

        Self {
            path,
            cache: RwLock::new(cache),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }

    async fn persist(&self, items: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        // Replaced by rename: the file on disk is always a complete write.
        let text = serde_json::to_string_pretty(items)?;
        let tmp = self.tmp_path();
        fs::write(&tmp, text).await?;
        fs::rename(&tmp, &self.path).await?;
        tracing::debug!(path = %self.path.display(), keys = items.len(), "Local storage written");
        Ok(())
    }
}

#[async_trait]
impl LocalStore for JsonFileStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.cache.read().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: String) -> Result<(), StoreError> {
        let mut cache = self.cache.write().await;
        cache.insert(key.to_string(), value);
        self.persist(&cache).await
    }

    async fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        let mut cache = self.cache.write().await;
        if cache.remove(key).is_none() {
            return Ok(());
        }
        self.persist(&cache).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{tempdir, NamedTempFile};

    #[tokio::test]
    async fn items_survive_reopening() {
        let tmp = NamedTempFile::new().unwrap();
        let path = tmp.path().to_owned();
        drop(tmp);

        let store = JsonFileStore::open(&path).await;
        store
            .set_item("gitUserData", r#"{"userExist":null}"#.to_string())
            .await
            .unwrap();

        let reopened = JsonFileStore::open(&path).await;
        assert_eq!(
            reopened.get_item("gitUserData").await.unwrap().as_deref(),
            Some(r#"{"userExist":null}"#)
        );
        assert_eq!(reopened.get_item("other").await.unwrap(), None);
    }

    #[tokio::test]
    async fn removed_items_stay_removed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("local_storage.json");

        let store = JsonFileStore::open(&path).await;
        store.set_item("a", "1".to_string()).await.unwrap();
        store.set_item("b", "2".to_string()).await.unwrap();
        store.remove_item("a").await.unwrap();
        store.remove_item("missing").await.unwrap();

        let reopened = JsonFileStore::open(&path).await;
        assert_eq!(reopened.get_item("a").await.unwrap(), None);
        assert_eq!(reopened.get_item("b").await.unwrap().as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn parent_directories_are_created() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("data").join("local_storage.json");

        let store = JsonFileStore::open(&path).await;
        store.set_item("k", "v".to_string()).await.unwrap();

        assert!(store.path().exists());
    }

    #[tokio::test]
    async fn writes_leave_no_temp_file_behind() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("local_storage.json");

        let store = JsonFileStore::open(&path).await;
        store.set_item("a", "1".to_string()).await.unwrap();
        store.set_item("a", "2".to_string()).await.unwrap();

        assert!(!store.tmp_path().exists());
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("local_storage.json")]);
        assert_eq!(
            JsonFileStore::open(&path).await.get_item("a").await.unwrap().as_deref(),
            Some("2")
        );
    }

    #[tokio::test]
    async fn stale_temp_file_is_ignored_and_overwritten() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("local_storage.json");
        std::fs::write(&path, r#"{"k":"old"}"#).unwrap();
        std::fs::write(dir.path().join("local_storage.json.tmp"), r#"{"k":"#).unwrap();

        let store = JsonFileStore::open(&path).await;
        assert_eq!(store.get_item("k").await.unwrap().as_deref(), Some("old"));

        store.set_item("k", "new".to_string()).await.unwrap();
        assert!(!store.tmp_path().exists());
        assert_eq!(
            JsonFileStore::open(&path).await.get_item("k").await.unwrap().as_deref(),
            Some("new")
        );
    }

    #[tokio::test]
    async fn corrupt_file_starts_empty_and_is_replaced() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("local_storage.json");
        std::fs::write(&path, "not json at all").unwrap();

        let store = JsonFileStore::open(&path).await;
        assert_eq!(store.get_item("gitUserData").await.unwrap(), None);

        store.set_item("k", "v".to_string()).await.unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let parsed: BTreeMap<String, String> = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.get("k").map(String::as_str), Some("v"));
    }
}
