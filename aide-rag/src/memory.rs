//! In-memory vector backend using cosine distance.
//!
//! [`InMemoryBackend`] keeps collections as vectors behind a
//! `tokio::sync::RwLock`, preserving insertion order so distance ties
//! break deterministically. Suitable for development and tests; use
//! [`DiskBackend`](crate::DiskBackend) when records must survive the
//! process.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use aide_core::Result;

use crate::backend::{VectorBackend, missing_collection, rank, validate_records};
use crate::document::{DocumentRecord, SearchHit};

const BACKEND_NAME: &str = "in-memory";

/// An in-memory vector backend.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    collections: RwLock<HashMap<String, Vec<DocumentRecord>>>,
}

impl InMemoryBackend {
    /// Create a new empty backend.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VectorBackend for InMemoryBackend {
    async fn open_collection(&self, name: &str) -> Result<()> {
        let mut collections = self.collections.write().await;
        collections.entry(name.to_string()).or_default();
        Ok(())
    }

    async fn add(&self, collection: &str, records: &[DocumentRecord]) -> Result<()> {
        let mut collections = self.collections.write().await;
        let store = collections
            .get_mut(collection)
            .ok_or_else(|| missing_collection(BACKEND_NAME, collection))?;

        validate_records(BACKEND_NAME, store, records)?;
        store.extend_from_slice(records);
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
        Ok(())
    }
}
