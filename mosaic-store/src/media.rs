use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;

use mosaic_core::repository::MediaStore;

/// Media store backed by a local directory. Keys map to relative paths
/// under the configured root; keys with parent or absolute components
/// are rejected. The content type is not persisted.
pub struct FsMediaStore {
    root: PathBuf,
}

impl FsMediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

// A key must stay strictly under the root once joined. Keys reach this
// store built from request data (the data-URI MIME subtype ends up in
// the extension), so traversal components are hostile input here.
fn is_clean_relative(key: &str) -> bool {
    !key.is_empty()
        && Path::new(key)
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
}

#[async_trait]
impl MediaStore for FsMediaStore {
    async fn put(
        &self,
        key: &str,
        bytes: Bytes,
        _content_type: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if !is_clean_relative(key) {
            return Err(format!("media key {:?} escapes the media root", key).into());
        }
        let path = self.root.join(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &bytes).await?;
        Ok(())
    }
}

/// In-memory media store for tests and local development
#[derive(Clone, Default)]
pub struct MemoryMediaStore {
    objects: Arc<RwLock<HashMap<String, (String, Bytes)>>>,
}

impl MemoryMediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch a stored object as `(content_type, bytes)`
    pub async fn get(&self, key: &str) -> Option<(String, Bytes)> {
        self.objects.read().await.get(key).cloned()
    }

    pub async fn object_count(&self) -> usize {
        self.objects.read().await.len()
    }
}

#[async_trait]
impl MediaStore for MemoryMediaStore {
    async fn put(
        &self,
        key: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.objects
            .write()
            .await
            .insert(key.to_string(), (content_type.to_string(), bytes));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_put_overwrites_same_key() {
        let store = MemoryMediaStore::new();

        store
            .put("squares/5.png", Bytes::from_static(b"first"), "image/png")
            .await
            .unwrap();
        store
            .put("squares/5.png", Bytes::from_static(b"second"), "image/png")
            .await
            .unwrap();

        let (content_type, bytes) = store.get("squares/5.png").await.unwrap();
        assert_eq!(content_type, "image/png");
        assert_eq!(bytes.as_ref(), b"second");
        assert_eq!(store.object_count().await, 1);
    }

    #[tokio::test]
    async fn test_fs_store_writes_under_root() {
        let root = std::env::temp_dir().join(format!("mosaic-media-{}", std::process::id()));
        let store = FsMediaStore::new(&root);

        store
            .put("squares/9.png", Bytes::from_static(b"pixels"), "image/png")
            .await
            .unwrap();

        let written = tokio::fs::read(root.join("squares/9.png")).await.unwrap();
        assert_eq!(written, b"pixels");

        tokio::fs::remove_dir_all(&root).await.unwrap();
    }

    #[tokio::test]
    async fn test_fs_store_rejects_keys_with_parent_components() {
        let root =
            std::env::temp_dir().join(format!("mosaic-media-guard-{}", std::process::id()));
        let store = FsMediaStore::new(&root);

        // The key shape a hostile MIME subtype produces
        let result = store
            .put(
                "squares/5.../../../../escape.txt",
                Bytes::from_static(b"x"),
                "image/../../../../escape.txt",
            )
            .await;

        assert!(result.is_err());
        assert!(!root.exists(), "rejected writes must touch nothing");
    }

    #[tokio::test]
    async fn test_fs_store_rejects_absolute_keys() {
        let root = std::env::temp_dir().join(format!("mosaic-media-abs-{}", std::process::id()));
        let store = FsMediaStore::new(&root);

        let result = store
            .put("/etc/mosaic-escape", Bytes::from_static(b"x"), "text/plain")
            .await;

        assert!(result.is_err());
        assert!(!root.exists());
    }
}
