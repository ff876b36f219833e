//! Data types for indexed documents and search results.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A unit of knowledge indexed for retrieval.
///
/// Records are immutable once stored: there is no update operation, and
/// removal happens only through whole-collection deletion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentRecord {
    /// Unique identifier, caller-supplied or content-derived.
    pub id: String,
    /// The raw text content (non-empty).
    pub text: String,
    /// Fixed-length embedding; dimensionality is uniform within a collection.
    pub embedding: Vec<f32>,
    /// Open string-keyed metadata (tags, source, timestamps).
    pub metadata: HashMap<String, String>,
}

/// A retrieved document paired with its distance from the query.
///
/// Results are ordered ascending by `distance` (closer = more
/// relevant); ties break by insertion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// The stored document's identifier.
    pub id: String,
    /// The stored document's full text.
    pub text: String,
    /// The stored document's metadata.
    pub metadata: HashMap<String, String>,
    /// Cosine distance from the query embedding, non-negative.
    pub distance: f32,
}

/// Summary of a collection's state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CollectionInfo {
    /// The collection name.
    pub name: String,
    /// Number of stored documents.
    pub document_count: usize,
}

/// Compute cosine distance (1 − cosine similarity) between two vectors.
///
/// Both vectors are L2-normalized before the dot product. A zero-magnitude
/// vector yields the maximum distance of 1.0. Floating-point round-off is
/// clamped so the result is never negative.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    (1.0 - dot / (norm_a * norm_b)).max(0.0)
}
