//! The vector index: an embedding-aware adapter over a [`VectorBackend`].

use std::collections::HashMap;
use std::sync::Arc;

use sha2::{Digest, Sha256};
use tracing::{error, info};

use aide_core::{AideError, Result};
use aide_model::ModelGateway;

use crate::backend::VectorBackend;
use crate::document::{CollectionInfo, DocumentRecord, SearchHit};

/// Default number of results returned by [`VectorIndex::search`] callers
/// that have no preference.
pub const DEFAULT_N_RESULTS: usize = 5;

/// A named collection of documents with embedding-based search.
///
/// The index owns no vectors itself: it computes embeddings through the
/// [`ModelGateway`] and delegates storage and ranking to the backend.
/// Construction opens (or creates) the collection.
///
/// # Example
///
/// ```rust,ignore
/// use aide_rag::{DiskBackend, VectorIndex};
///
/// let index = VectorIndex::new(backend, gateway, "personal_agent").await?;
/// let ids = index.add_documents(&texts, None, None).await?;
/// let hits = index.search("capital of France", 5, None).await?;
/// ```
pub struct VectorIndex {
    backend: Arc<dyn VectorBackend>,
    gateway: Arc<ModelGateway>,
    collection: String,
}

/// Derive a deterministic, collision-resistant id from a document's
/// content and position: `doc_{position}_{sha256 prefix}`.
fn derive_id(position: usize, text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    format!("doc_{position}_{}", &hex::encode(digest)[..16])
}

impl VectorIndex {
    /// Open (or create) `collection` on the given backend.
    pub async fn new(
        backend: Arc<dyn VectorBackend>,
        gateway: Arc<ModelGateway>,
        collection: impl Into<String>,
    ) -> Result<Self> {
        let collection = collection.into();
        backend.open_collection(&collection).await?;
        Ok(Self { backend, gateway, collection })
    }

    /// The collection name this index operates on.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Add documents to the index, embedding each text via the gateway.
    ///
    /// Returns the stored ids in the same order as `texts`. When `ids`
    /// is omitted they are derived from content and position; when
    /// `metadatas` is omitted each record gets an empty map. An empty
    /// `texts` returns `[]` without invoking the embedding path.
    ///
    /// Embedding happens one text at a time, sequentially; all
    /// embeddings are gathered before a single backend write, so a
    /// provider failure partway through persists nothing.
    ///
    /// # Errors
    ///
    /// Returns [`AideError::Configuration`] if `metadatas` or `ids` is
    /// present with a length different from `texts`; propagates
    /// provider and storage errors unchanged.
    pub async fn add_documents(
        &self,
        texts: &[String],
        metadatas: Option<Vec<HashMap<String, String>>>,
        ids: Option<Vec<String>>,
    ) -> Result<Vec<String>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        if let Some(metadatas) = &metadatas {
            if metadatas.len() != texts.len() {
                return Err(AideError::Configuration(format!(
                    "metadatas length ({}) does not match texts length ({})",
                    metadatas.len(),
                    texts.len()
                )));
            }
        }
        if let Some(ids) = &ids {
            if ids.len() != texts.len() {
                return Err(AideError::Configuration(format!(
                    "ids length ({}) does not match texts length ({})",
                    ids.len(),
                    texts.len()
                )));
            }
        }

        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            let embedding = self.gateway.get_embeddings(text, None).await.map_err(|e| {
                error!(collection = %self.collection, error = %e, "embedding failed during add");
                e
            })?;
            embeddings.push(embedding);
        }

        let ids = ids.unwrap_or_else(|| {
            texts.iter().enumerate().map(|(i, text)| derive_id(i, text)).collect()
        });
        let metadatas = metadatas.unwrap_or_else(|| vec![HashMap::new(); texts.len()]);

        let records: Vec<DocumentRecord> = texts
            .iter()
            .zip(embeddings)
            .zip(ids.iter().zip(metadatas))
            .map(|((text, embedding), (id, metadata))| DocumentRecord {
                id: id.clone(),
                text: text.clone(),
                embedding,
                metadata,
            })
            .collect();

        self.backend.add(&self.collection, &records).await?;
        info!(collection = %self.collection, count = records.len(), "indexed documents");

        Ok(ids)
    }

    /// Search for the `n_results` documents most similar to `query`,
    /// optionally restricted to records whose metadata exactly matches
    /// every entry of `filter`.
    pub async fn search(
        &self,
        query: &str,
        n_results: usize,
        filter: Option<&HashMap<String, String>>,
    ) -> Result<Vec<SearchHit>> {
        let embedding = self.gateway.get_embeddings(query, None).await?;
        self.backend.query(&self.collection, &embedding, n_results, filter).await
    }

    /// Irreversibly remove all records, then reinitialize an empty
    /// collection under the same name. No confirmation step.
    pub async fn delete_collection(&self) -> Result<()> {
        self.backend.delete_collection(&self.collection).await?;
        self.backend.open_collection(&self.collection).await?;
        info!(collection = %self.collection, "collection deleted and reinitialized");
        Ok(())
    }

    /// Report the collection's name and document count.
    pub async fn collection_info(&self) -> Result<CollectionInfo> {
        let document_count = self.backend.count(&self.collection).await?;
        Ok(CollectionInfo { name: self.collection.clone(), document_count })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_ids_are_deterministic_and_position_dependent() {
        let a = derive_id(0, "hello");
        let b = derive_id(0, "hello");
        let c = derive_id(1, "hello");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with("doc_0_"));
    }
}
