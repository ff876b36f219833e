//! Vector backend trait: the storage contract the index is built on.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use aide_core::{AideError, Result};

use crate::document::{DocumentRecord, SearchHit, cosine_distance};

/// A storage backend for document embeddings with similarity search.
///
/// Implementations manage named collections of [`DocumentRecord`]s.
/// The contract is intentionally small — create-or-open, add, top-K
/// query with an optional metadata filter, count, delete — so the index
/// can be re-targeted to any backend offering it.
#[async_trait]
pub trait VectorBackend: Send + Sync {
    /// Create a named collection, or open it if it already exists.
    async fn open_collection(&self, name: &str) -> Result<()>;

    /// Append records to a collection.
    ///
    /// All embeddings within one collection share a single
    /// dimensionality; the first insert fixes it. Duplicate ids are
    /// rejected rather than silently overwritten.
    async fn add(&self, collection: &str, records: &[DocumentRecord]) -> Result<()>;

    /// Return the `n_results` records nearest to `embedding` under
    /// cosine distance, ascending, optionally restricted to records
    /// whose metadata exactly matches every entry of `filter`.
    ///
    /// Returns fewer than `n_results` when fewer records match, and an
    /// empty vec on an empty collection.
    async fn query(
        &self,
        collection: &str,
        embedding: &[f32],
        n_results: usize,
        filter: Option<&HashMap<String, String>>,
    ) -> Result<Vec<SearchHit>>;

    /// Number of records stored in a collection.
    async fn count(&self, collection: &str) -> Result<usize>;

    /// Irreversibly remove a collection and all its records.
    async fn delete_collection(&self, name: &str) -> Result<()>;
}

/// Validate new records against a collection's existing contents:
/// uniform embedding dimensionality and no duplicate ids.
pub(crate) fn validate_records(
    backend: &str,
    existing: &[DocumentRecord],
    incoming: &[DocumentRecord],
) -> Result<()> {
    let mut expected_dim = existing.first().map(|r| r.embedding.len());
    let mut seen: HashSet<&str> = existing.iter().map(|r| r.id.as_str()).collect();

    for record in incoming {
        match expected_dim {
            Some(dim) if record.embedding.len() != dim => {
                return Err(AideError::Storage {
                    backend: backend.to_string(),
                    message: format!(
                        "embedding dimension mismatch for '{}': expected {dim}, got {}",
                        record.id,
                        record.embedding.len()
                    ),
                });
            }
            Some(_) => {}
            None => expected_dim = Some(record.embedding.len()),
        }

        if !seen.insert(record.id.as_str()) {
            return Err(AideError::Storage {
                backend: backend.to_string(),
                message: format!("duplicate document id '{}'", record.id),
            });
        }
    }

    Ok(())
}

/// Rank a collection's records against a query embedding.
///
/// Applies the metadata filter, computes cosine distances, sorts
/// ascending with a stable sort (ties keep insertion order), and
/// truncates to `n_results`.
pub(crate) fn rank(
    records: &[DocumentRecord],
    embedding: &[f32],
    n_results: usize,
    filter: Option<&HashMap<String, String>>,
) -> Vec<SearchHit> {
    let mut hits: Vec<SearchHit> = records
        .iter()
        .filter(|record| {
            filter.is_none_or(|f| {
                f.iter().all(|(key, value)| record.metadata.get(key) == Some(value))
            })
        })
        .map(|record| SearchHit {
            id: record.id.clone(),
            text: record.text.clone(),
            metadata: record.metadata.clone(),
            distance: cosine_distance(&record.embedding, embedding),
        })
        .collect();

    hits.sort_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap_or(std::cmp::Ordering::Equal));
    hits.truncate(n_results);
    hits
}

/// The standard "collection does not exist" storage error.
pub(crate) fn missing_collection(backend: &str, collection: &str) -> AideError {
    AideError::Storage {
        backend: backend.to_string(),
        message: format!("collection '{collection}' does not exist"),
    }
}
