//! Backend tests: search-ordering properties and disk persistence.

use std::collections::HashMap;

use aide_rag::{DiskBackend, DocumentRecord, InMemoryBackend, VectorBackend};
use proptest::prelude::*;

fn record(id: &str, text: &str, embedding: Vec<f32>) -> DocumentRecord {
    DocumentRecord {
        id: id.to_string(),
        text: text.to_string(),
        embedding,
        metadata: HashMap::new(),
    }
}

/// Generate a non-zero L2-normalized embedding of the given dimension.
fn arb_normalized_embedding(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-1.0f32..1.0f32, dim).prop_filter_map(
        "non-zero embedding",
        |mut v| {
            let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
            if norm < 1e-8 {
                return None;
            }
            for val in &mut v {
                *val /= norm;
            }
            Some(v)
        },
    )
}

fn arb_record(dim: usize) -> impl Strategy<Value = DocumentRecord> {
    ("[a-z]{3,8}", "[a-z ]{5,30}", arb_normalized_embedding(dim)).prop_map(
        |(id, text, embedding)| DocumentRecord {
            id,
            text,
            embedding,
            metadata: HashMap::new(),
        },
    )
}

mod prop_search_ordering {
    use super::*;

    const DIM: usize = 16;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// For any stored records, querying returns at most `n_results`
        /// hits ordered by non-decreasing cosine distance.
        #[test]
        fn results_ordered_ascending_and_bounded(
            records in proptest::collection::vec(arb_record(DIM), 1..20),
            query in arb_normalized_embedding(DIM),
            n_results in 1usize..25,
        ) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let (hits, unique_count) = rt.block_on(async {
                let backend = InMemoryBackend::new();
                backend.open_collection("test").await.unwrap();

                // Deduplicate by id: the backend rejects duplicates.
                let mut deduped: HashMap<String, DocumentRecord> = HashMap::new();
                for record in &records {
                    deduped.entry(record.id.clone()).or_insert_with(|| record.clone());
                }
                let unique: Vec<DocumentRecord> = deduped.into_values().collect();
                let count = unique.len();

                backend.add("test", &unique).await.unwrap();
                let hits = backend.query("test", &query, n_results, None).await.unwrap();
                (hits, count)
            });

            prop_assert!(hits.len() <= n_results);
            prop_assert!(hits.len() <= unique_count);

            for window in hits.windows(2) {
                prop_assert!(
                    window[0].distance <= window[1].distance,
                    "hits not in ascending order: {} > {}",
                    window[0].distance,
                    window[1].distance,
                );
            }

            for hit in &hits {
                prop_assert!(hit.distance >= 0.0);
            }
        }
    }
}

#[tokio::test]
async fn ties_break_by_insertion_order() {
    let backend = InMemoryBackend::new();
    backend.open_collection("test").await.unwrap();

    // Two records at identical distance from the query.
    backend
        .add(
            "test",
            &[
                record("first", "added first", vec![1.0, 0.0]),
                record("second", "added second", vec![1.0, 0.0]),
            ],
        )
        .await
        .unwrap();

    let hits = backend.query("test", &[0.0, 1.0], 2, None).await.unwrap();
    assert_eq!(hits[0].id, "first");
    assert_eq!(hits[1].id, "second");
}

#[tokio::test]
async fn dimension_mismatch_is_rejected() {
    let backend = InMemoryBackend::new();
    backend.open_collection("test").await.unwrap();
    backend.add("test", &[record("a", "text", vec![1.0, 0.0])]).await.unwrap();

    let err = backend.add("test", &[record("b", "text", vec![1.0, 0.0, 0.0])]).await;
    assert!(err.is_err());
}

#[tokio::test]
async fn operations_on_unopened_collections_fail() {
    let backend = InMemoryBackend::new();
    assert!(backend.count("nope").await.is_err());
    assert!(backend.query("nope", &[1.0], 1, None).await.is_err());
    assert!(backend.add("nope", &[record("a", "t", vec![1.0])]).await.is_err());
}

#[tokio::test]
async fn disk_backend_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();

    {
        let backend = DiskBackend::new(dir.path());
        backend.open_collection("kb").await.unwrap();
        backend
            .add(
                "kb",
                &[
                    record("a", "the sky is blue", vec![1.0, 0.0]),
                    record("b", "grass is green", vec![0.0, 1.0]),
                ],
            )
            .await
            .unwrap();
    }

    // A fresh backend over the same directory sees the same records.
    let reopened = DiskBackend::new(dir.path());
    reopened.open_collection("kb").await.unwrap();
    assert_eq!(reopened.count("kb").await.unwrap(), 2);

    let hits = reopened.query("kb", &[1.0, 0.0], 1, None).await.unwrap();
    assert_eq!(hits[0].id, "a");
    assert_eq!(hits[0].text, "the sky is blue");
}

#[tokio::test]
async fn disk_backend_delete_removes_the_snapshot() {
    let dir = tempfile::tempdir().unwrap();

    let backend = DiskBackend::new(dir.path());
    backend.open_collection("kb").await.unwrap();
    backend.add("kb", &[record("a", "text", vec![1.0])]).await.unwrap();
    assert!(dir.path().join("kb.json").exists());

    backend.delete_collection("kb").await.unwrap();
    assert!(!dir.path().join("kb.json").exists());

    // Reopening after delete starts empty.
    backend.open_collection("kb").await.unwrap();
    assert_eq!(backend.count("kb").await.unwrap(), 0);
}

#[tokio::test]
async fn disk_backend_duplicate_ids_keep_the_snapshot_unchanged() {
    let dir = tempfile::tempdir().unwrap();

    let backend = DiskBackend::new(dir.path());
    backend.open_collection("kb").await.unwrap();
    backend.add("kb", &[record("a", "original", vec![1.0])]).await.unwrap();

    assert!(backend.add("kb", &[record("a", "imposter", vec![1.0])]).await.is_err());
    assert_eq!(backend.count("kb").await.unwrap(), 1);

    let reopened = DiskBackend::new(dir.path());
    reopened.open_collection("kb").await.unwrap();
    let hits = reopened.query("kb", &[1.0], 1, None).await.unwrap();
    assert_eq!(hits[0].text, "original");
}
