//! Persistent key-value storage backing the session
//!
//! Storage is string-keyed and string-valued. Everything in a storage
//! instance is session-scoped, so [`KeyValueStorage::clear`] wipes it all.

use super::types::{AuthError, AuthResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Key-value storage with `getItem`/`setItem`/`removeItem` semantics
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    /// Read the value stored under `key`
    async fn get_item(&self, key: &str) -> AuthResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    async fn set_item(&self, key: &str, value: &str) -> AuthResult<()>;

    /// Store several entries together. Backends that can persist them in a
    /// single atomic write override this; the default writes them in order.
    async fn set_items(&self, items: &[(&str, &str)]) -> AuthResult<()> {
        for (key, value) in items {
            self.set_item(key, value).await?;
        }
        Ok(())
    }

    /// Remove `key` if present
    async fn remove_item(&self, key: &str) -> AuthResult<()>;

    /// Remove every key
    async fn clear(&self) -> AuthResult<()>;

    /// Human readable location for diagnostics
    fn describe(&self) -> String;
}

/// In-process storage; contents are lost when dropped
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }
}

#[async_trait]
impl KeyValueStorage for MemoryStorage {
    async fn get_item(&self, key: &str) -> AuthResult<Option<String>> {
        Ok(self.items.lock().get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> AuthResult<()> {
        self.items.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn set_items(&self, items: &[(&str, &str)]) -> AuthResult<()> {
        let mut stored = self.items.lock();
        for (key, value) in items {
            stored.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> AuthResult<()> {
        self.items.lock().remove(key);
        Ok(())
    }

    async fn clear(&self) -> AuthResult<()> {
        self.items.lock().clear();
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

/// Storage persisted as a single JSON object on disk
///
/// Writes go to a sibling temporary file which is then renamed over the
/// target, so a crash never leaves a half-written document behind.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    write_lock: tokio::sync::Mutex<()>,
}

impl FileStorage {
    /// File name used inside the data directory
    pub const FILE_NAME: &'static str = "session.json";

    /// Storage at an explicit file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Storage at `<dir>/session.json`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(Self::FILE_NAME))
    }

    /// Storage in the platform data directory
    pub fn default_location() -> AuthResult<Self> {
        Ok(Self::in_dir(super::types::get_sdk_data_dir()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> AuthResult<BTreeMap<String, String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                AuthError::StorageError(format!(
                    "Corrupt session file {}: {}",
                    self.path.display(),
                    e
                ))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_all(&self, items: &BTreeMap<String, String>) -> AuthResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp_path = self.path.with_extension("json.tmp");
        let content = serde_json::to_vec_pretty(items)?;
        tokio::fs::write(&tmp_path, content).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&tmp_path, std::fs::Permissions::from_mode(0o600)).await?;
        }

        tokio::fs::rename(&tmp_path, &self.path).await?;
        debug!("Wrote session storage to {}", self.path.display());
        Ok(())
    }
}

#[async_trait]
impl KeyValueStorage for FileStorage {
    async fn get_item(&self, key: &str) -> AuthResult<Option<String>> {
        Ok(self.read_all().await?.remove(key))
    }

    async fn set_item(&self, key: &str, value: &str) -> AuthResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut items = self.read_all().await?;
        items.insert(key.to_string(), value.to_string());
        self.write_all(&items).await
    }

    async fn set_items(&self, entries: &[(&str, &str)]) -> AuthResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut items = self.read_all().await?;
        for (key, value) in entries {
            items.insert(key.to_string(), value.to_string());
        }
        self.write_all(&items).await
    }

    async fn remove_item(&self, key: &str) -> AuthResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut items = self.read_all().await?;
        if items.remove(key).is_some() {
            self.write_all(&items).await?;
        }
        Ok(())
    }

    async fn clear(&self) -> AuthResult<()> {
        let _guard = self.write_lock.lock().await;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
