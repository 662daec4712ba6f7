//! Persistence of serialized policy blobs
//!
//! Stores are only touched at explicit save/load triggers, never per tick.

use async_trait::async_trait;
use runner_rl_core::{Result, RunnerError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::debug;

/// Key/blob storage for policy parameters
#[async_trait]
pub trait PolicyStore: Send + Sync {
    /// Store `blob` under `key`, replacing any previous value
    async fn store(&self, key: &str, blob: &[u8]) -> Result<()>;

    /// Blob stored under `key`, or `None` if there is none
    async fn retrieve(&self, key: &str) -> Result<Option<Vec<u8>>>;
}

/// In-process store, mostly for tests
#[derive(Default)]
pub struct MemoryStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PolicyStore for MemoryStore {
    async fn store(&self, key: &str, blob: &[u8]) -> Result<()> {
        self.blobs.write().await.insert(key.to_string(), blob.to_vec());
        Ok(())
    }

    async fn retrieve(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.blobs.read().await.get(key).cloned())
    }
}

/// One file per key under a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
            && !key.starts_with('.');
        if !valid {
            return Err(RunnerError::Store(format!("invalid key: {:?}", key)));
        }
        Ok(self.dir.join(format!("{key}.policy")))
    }
}

#[async_trait]
impl PolicyStore for FileStore {
    async fn store(&self, key: &str, blob: &[u8]) -> Result<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| RunnerError::Store(format!("{}: {}", self.dir.display(), e)))?;

        // Write then rename so a crash never leaves a truncated blob behind
        let tmp = path.with_extension("policy.tmp");
        fs::write(&tmp, blob)
            .await
            .map_err(|e| RunnerError::Store(format!("{}: {}", tmp.display(), e)))?;
        fs::rename(&tmp, &path)
            .await
            .map_err(|e| RunnerError::Store(format!("{}: {}", path.display(), e)))?;

        debug!(path = %path.display(), bytes = blob.len(), "policy stored");
        Ok(())
    }

    async fn retrieve(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key)?;
        match fs::read(&path).await {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(RunnerError::Store(format!("{}: {}", path.display(), e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("runner-rl-store-{}-{}", name, std::process::id()))
    }

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        assert_eq!(store.retrieve("q").await.unwrap(), None);
        store.store("q", b"abc").await.unwrap();
        store.store("q", b"xyz").await.unwrap();
        assert_eq!(store.retrieve("q").await.unwrap(), Some(b"xyz".to_vec()));
    }

    #[tokio::test]
    async fn test_file_store_round_trip() {
        let dir = scratch_dir("round-trip");
        let store = FileStore::new(&dir);
        assert_eq!(store.retrieve("qtable").await.unwrap(), None);

        store.store("qtable", b"{\"epsilon\":0.1}").await.unwrap();
        let blob = store.retrieve("qtable").await.unwrap().unwrap();
        assert_eq!(blob, b"{\"epsilon\":0.1}");
        assert!(dir.join("qtable.policy").exists());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_file_store_rejects_path_keys() {
        let store = FileStore::new(scratch_dir("keys"));
        for key in ["", "../escape", "a/b", ".hidden"] {
            let err = tokio_test::block_on(store.store(key, b"x")).unwrap_err();
            assert!(matches!(err, RunnerError::Store(_)), "key {key:?}");
        }
    }
}
