//! Guarded persistence of a single opaque JSON blob
//!
//! Failures never propagate: a broken or missing file reads as `None` and
//! write errors are only logged.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tokio::sync::Mutex;

/// Key the blob is stored under
pub const STORE_NAME: &str = "SERVICE";

#[derive(Debug)]
pub struct LocalStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl LocalStore {
    /// Store rooted in `dir`; the file is `<dir>/SERVICE.json`
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{}.json", STORE_NAME)),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> Option<Value> {
        let _guard = self.lock.lock().await;
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                log::warn!(target: "ledgerdesk::store", "Failed to read {}: {}", self.path.display(), e);
                return None;
            }
        };
        match serde_json::from_str(&content) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!(target: "ledgerdesk::store", "Ignoring unreadable {}: {}", self.path.display(), e);
                None
            }
        }
    }

    pub async fn save(&self, state: &Value) {
        let _guard = self.lock.lock().await;
        let serialized = match serde_json::to_string(state) {
            Ok(s) => s,
            Err(e) => {
                log::warn!(target: "ledgerdesk::store", "Failed to serialize state: {}", e);
                return;
            }
        };
        if let Some(parent) = self.path.parent() {
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                log::warn!(target: "ledgerdesk::store", "Failed to create {}: {}", parent.display(), e);
                return;
            }
        }
        if let Err(e) = tokio::fs::write(&self.path, serialized).await {
            log::warn!(target: "ledgerdesk::store", "Failed to write {}: {}", self.path.display(), e);
        }
    }

    pub async fn delete(&self) {
        let _guard = self.lock.lock().await;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                log::warn!(target: "ledgerdesk::store", "Failed to delete {}: {}", self.path.display(), e);
            }
        }
    }

    /// Read one top-level string field from the blob
    pub async fn get_str(&self, key: &str) -> Option<String> {
        self.load()
            .await?
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    /// Set one top-level field, keeping the rest of the blob
    pub async fn set(&self, key: &str, value: Value) {
        let mut state = match self.load().await {
            Some(Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        };
        state.insert(key.to_string(), value);
        self.save(&Value::Object(state)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_save_load_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        assert_eq!(store.load().await, None);

        store.save(&json!({"theme": "dark"})).await;
        assert_eq!(store.load().await, Some(json!({"theme": "dark"})));
        assert!(store.path().ends_with("SERVICE.json"));

        store.delete().await;
        assert_eq!(store.load().await, None);
        store.delete().await;
    }

    #[tokio::test]
    async fn test_corrupt_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        tokio::fs::write(store.path(), "{not json").await.unwrap();
        assert_eq!(store.load().await, None);
    }

    #[tokio::test]
    async fn test_set_merges_fields() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path().join("nested"));
        store.set("last_ledger_id", json!("ldg_1")).await;
        store.set("theme", json!("dark")).await;

        assert_eq!(store.get_str("last_ledger_id").await.as_deref(), Some("ldg_1"));
        assert_eq!(
            store.load().await,
            Some(json!({"last_ledger_id": "ldg_1", "theme": "dark"}))
        );
    }
}
