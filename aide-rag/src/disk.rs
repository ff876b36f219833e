//! Persistent vector backend storing one JSON snapshot per collection.
//!
//! [`DiskBackend`] mirrors [`InMemoryBackend`](crate::InMemoryBackend)'s
//! behavior but writes each collection to `<dir>/<name>.json` after
//! every mutation, so records survive process restarts. Snapshots are
//! written to a temp file and renamed into place to avoid partial
//! writes.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use aide_core::{AideError, Result};

use crate::backend::{VectorBackend, missing_collection, rank, validate_records};
use crate::document::{DocumentRecord, SearchHit};

const BACKEND_NAME: &str = "disk";

/// A persistent vector backend rooted at a data directory.
pub struct DiskBackend {
    dir: PathBuf,
    collections: RwLock<HashMap<String, Vec<DocumentRecord>>>,
}

impl DiskBackend {
    /// Create a backend rooted at `dir`. The directory is created on
    /// the first [`open_collection`](VectorBackend::open_collection).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into(), collections: RwLock::new(HashMap::new()) }
    }

    fn collection_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }

    fn storage_error(path: &Path, action: &str, err: impl std::fmt::Display) -> AideError {
        AideError::Storage {
            backend: BACKEND_NAME.to_string(),
            message: format!("failed to {action} '{}': {err}", path.display()),
        }
    }

    /// Load a collection snapshot from disk, or an empty collection if
    /// no snapshot exists yet.
    async fn load(&self, name: &str) -> Result<Vec<DocumentRecord>> {
        let path = self.collection_path(name);
        match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| Self::storage_error(&path, "decode", e)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(Self::storage_error(&path, "read", e)),
        }
    }

    /// Write a collection snapshot atomically: temp file, then rename.
    async fn persist(&self, name: &str, records: &[DocumentRecord]) -> Result<()> {
        let path = self.collection_path(name);
        let tmp = self.dir.join(format!("{name}.json.tmp"));

        let bytes =
            serde_json::to_vec(records).map_err(|e| Self::storage_error(&path, "encode", e))?;
        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(|e| Self::storage_error(&tmp, "write", e))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| Self::storage_error(&path, "replace", e))?;

        debug!(collection = name, records = records.len(), "persisted collection snapshot");
        Ok(())
    }
}

#[async_trait]
impl VectorBackend for DiskBackend {
    async fn open_collection(&self, name: &str) -> Result<()> {
        let mut collections = self.collections.write().await;
        if collections.contains_key(name) {
            return Ok(());
        }

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| Self::storage_error(&self.dir, "create", e))?;

        let records = self.load(name).await?;
        debug!(collection = name, records = records.len(), "opened collection");
        collections.insert(name.to_string(), records);
        Ok(())
    }

    async fn add(&self, collection: &str, records: &[DocumentRecord]) -> Result<()> {
        let mut collections = self.collections.write().await;
        let store = collections
            .get_mut(collection)
            .ok_or_else(|| missing_collection(BACKEND_NAME, collection))?;

        validate_records(BACKEND_NAME, store, records)?;

        // Persist first: a failed write must not leave the in-memory
        // view ahead of the snapshot on disk.
        let mut snapshot = store.clone();
        snapshot.extend_from_slice(records);
        self.persist(collection, &snapshot).await?;

        *store = snapshot;
        Ok(())
    }

    async fn query(
        &self,
        collection: &str,
        embedding: &[f32],
        n_results: usize,
        filter: Option<&HashMap<String, String>>,
    ) -> Result<Vec<SearchHit>> {
        let collections = self.collections.read().await;
        let store = collections
            .get(collection)
            .ok_or_else(|| missing_collection(BACKEND_NAME, collection))?;

        Ok(rank(store, embedding, n_results, filter))
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        let collections = self.collections.read().await;
        let store = collections
            .get(collection)
            .ok_or_else(|| missing_collection(BACKEND_NAME, collection))?;
        Ok(store.len())
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        let mut collections = self.collections.write().await;
        collections.remove(name);

        let path = self.collection_path(name);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::storage_error(&path, "delete", e)),
        }
    }
}
