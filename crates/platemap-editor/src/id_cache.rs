//! Local cache of the owner → restaurant id mapping.
//!
//! Survives between sessions so the editor can skip the owner lookup. A
//! missing, unreadable, or corrupt cache is treated as empty.

use std::collections::BTreeMap;
use std::future::Future;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

pub trait IdCache: Send + Sync {
    fn load(&self, owner_id: &str) -> impl Future<Output = Option<String>> + Send;
    fn store(&self, owner_id: &str, restaurant_id: &str) -> impl Future<Output = ()> + Send;
    fn forget(&self, owner_id: &str) -> impl Future<Output = ()> + Send;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CacheFile {
    #[serde(default)]
    owners: BTreeMap<String, String>,
}

/// JSON-file backed cache.
///
/// Read-modify-write cycles are serialized through `write_lock` so two
/// concurrent stores in one process cannot drop each other's entry.
pub struct FileIdCache {
    path: PathBuf,
    write_lock: tokio::sync::Mutex<()>,
}

impl FileIdCache {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> CacheFile {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return CacheFile::default(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "restaurant id cache unreadable, ignoring");
                return CacheFile::default();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!(path = %self.path.display(), error = %e, "restaurant id cache corrupt, ignoring");
            CacheFile::default()
        })
    }

    async fn write(&self, file: &CacheFile) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(file).map_err(std::io::Error::other)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await
    }

    async fn update(&self, edit: impl FnOnce(&mut CacheFile) -> bool + Send) {
        let _guard = self.write_lock.lock().await;
        let mut file = self.read().await;
        if !edit(&mut file) {
            return;
        }
        if let Err(e) = self.write(&file).await {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to persist restaurant id cache");
        }
    }
}

impl IdCache for FileIdCache {
    async fn load(&self, owner_id: &str) -> Option<String> {
        self.read().await.owners.get(owner_id).cloned()
    }

    async fn store(&self, owner_id: &str, restaurant_id: &str) {
        self.update(|file| {
            file.owners
                .insert(owner_id.to_owned(), restaurant_id.to_owned());
            true
        })
        .await;
    }

    async fn forget(&self, owner_id: &str) {
        self.update(|file| file.owners.remove(owner_id).is_some())
            .await;
    }
}

/// In-process cache; nothing outlives the process.
#[derive(Default)]
pub struct MemoryIdCache {
    owners: Mutex<BTreeMap<String, String>>,
}

impl IdCache for MemoryIdCache {
    async fn load(&self, owner_id: &str) -> Option<String> {
        self.owners.lock().get(owner_id).cloned()
    }

    async fn store(&self, owner_id: &str, restaurant_id: &str) {
        self.owners
            .lock()
            .insert(owner_id.to_owned(), restaurant_id.to_owned());
    }

    async fn forget(&self, owner_id: &str) {
        self.owners.lock().remove(owner_id);
    }
}
