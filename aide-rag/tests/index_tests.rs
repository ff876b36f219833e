//! Integration tests for the vector index over the in-memory backend.

use std::collections::HashMap;
use std::sync::Arc;

use aide_model::{LlmProvider, MockLlm, ModelGateway};
use aide_rag::{AideError, InMemoryBackend, VectorIndex};

async fn index_with(mock: Arc<MockLlm>) -> VectorIndex {
    let gateway = Arc::new(ModelGateway::with_providers(
        Arc::clone(&mock) as Arc<dyn LlmProvider>,
        mock,
    ));
    VectorIndex::new(Arc::new(InMemoryBackend::new()), gateway, "test").await.unwrap()
}

fn texts(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn add_documents_returns_ids_matching_texts() {
    let index = index_with(Arc::new(MockLlm::new())).await;

    let ids = index
        .add_documents(&texts(&["first", "second", "third"]), None, None)
        .await
        .unwrap();

    assert_eq!(ids.len(), 3);
    assert!(ids[0].starts_with("doc_0_"));
    assert!(ids[2].starts_with("doc_2_"));
    assert_eq!(index.collection_info().await.unwrap().document_count, 3);
}

#[tokio::test]
async fn caller_supplied_ids_are_kept_in_order() {
    let index = index_with(Arc::new(MockLlm::new())).await;

    let ids = index
        .add_documents(
            &texts(&["a", "b"]),
            None,
            Some(vec!["alpha".to_string(), "beta".to_string()]),
        )
        .await
        .unwrap();

    assert_eq!(ids, vec!["alpha", "beta"]);
}

#[tokio::test]
async fn empty_texts_short_circuit_without_embedding() {
    let mock = Arc::new(MockLlm::new());
    let index = index_with(Arc::clone(&mock)).await;

    let ids = index.add_documents(&[], None, None).await.unwrap();

    assert!(ids.is_empty());
    assert!(mock.embed_inputs().is_empty());
}

#[tokio::test]
async fn mismatched_metadata_length_is_a_configuration_error() {
    let index = index_with(Arc::new(MockLlm::new())).await;

    let err = index
        .add_documents(&texts(&["a", "b"]), Some(vec![HashMap::new()]), None)
        .await
        .unwrap_err();

    assert!(matches!(err, AideError::Configuration(_)));
}

#[tokio::test]
async fn failed_embedding_persists_nothing() {
    let mock = Arc::new(MockLlm::new().with_embed_failure_after(1));
    let index = index_with(mock).await;

    let err = index.add_documents(&texts(&["a", "b", "c"]), None, None).await.unwrap_err();

    assert!(matches!(err, AideError::Provider { .. }));
    assert_eq!(index.collection_info().await.unwrap().document_count, 0);
}

#[tokio::test]
async fn duplicate_ids_are_rejected() {
    let index = index_with(Arc::new(MockLlm::new())).await;

    index
        .add_documents(&texts(&["a"]), None, Some(vec!["same".to_string()]))
        .await
        .unwrap();
    let err = index
        .add_documents(&texts(&["b"]), None, Some(vec!["same".to_string()]))
        .await
        .unwrap_err();

    assert!(matches!(err, AideError::Storage { .. }));
}

#[tokio::test]
async fn search_is_bounded_and_sorted_ascending() {
    let mock = Arc::new(
        MockLlm::new()
            .with_dimensions(4)
            .with_embedding("north", vec![1.0, 0.0, 0.0, 0.0])
            .with_embedding("near north", vec![0.9, 0.1, 0.0, 0.0])
            .with_embedding("east", vec![0.0, 1.0, 0.0, 0.0])
            .with_embedding("south", vec![0.0, 0.0, 1.0, 0.0]),
    );
    let index = index_with(mock).await;
    index
        .add_documents(&texts(&["north", "near north", "east", "south"]), None, None)
        .await
        .unwrap();

    let hits = index.search("north", 2, None).await.unwrap();

    assert_eq!(hits.len(), 2);
    assert!(hits[0].distance <= hits[1].distance);
    assert_eq!(hits[0].text, "north");
    assert_eq!(hits[1].text, "near north");
}

#[tokio::test]
async fn search_returns_fewer_when_collection_is_small() {
    let index = index_with(Arc::new(MockLlm::new())).await;
    index.add_documents(&texts(&["only one"]), None, None).await.unwrap();

    let hits = index.search("anything", 5, None).await.unwrap();
    assert_eq!(hits.len(), 1);
}

#[tokio::test]
async fn search_on_empty_collection_returns_nothing() {
    let index = index_with(Arc::new(MockLlm::new())).await;
    assert!(index.search("anything", 5, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn metadata_filter_restricts_results() {
    let index = index_with(Arc::new(MockLlm::new())).await;
    let mut geography = HashMap::new();
    geography.insert("topic".to_string(), "geography".to_string());
    let mut biology = HashMap::new();
    biology.insert("topic".to_string(), "biology".to_string());

    index
        .add_documents(
            &texts(&["Paris is in France", "Cells have mitochondria"]),
            Some(vec![geography.clone(), biology]),
            None,
        )
        .await
        .unwrap();

    let hits = index.search("anything", 5, Some(&geography)).await.unwrap();

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].text, "Paris is in France");
}

#[tokio::test]
async fn delete_collection_empties_and_reinitializes() {
    let index = index_with(Arc::new(MockLlm::new())).await;
    index.add_documents(&texts(&["a", "b"]), None, None).await.unwrap();

    index.delete_collection().await.unwrap();

    let info = index.collection_info().await.unwrap();
    assert_eq!(info.document_count, 0);
    assert_eq!(info.name, "test");

    // The collection is usable again right away.
    index.add_documents(&texts(&["fresh"]), None, None).await.unwrap();
    assert_eq!(index.collection_info().await.unwrap().document_count, 1);
}

#[tokio::test]
async fn round_trip_retrieves_semantically_near_text() {
    let mock = Arc::new(
        MockLlm::new()
            .with_dimensions(4)
            .with_embedding("The sky is blue", vec![0.9, 0.1, 0.0, 0.0])
            .with_embedding("sky color", vec![1.0, 0.0, 0.0, 0.0])
            .with_embedding("Grass is green", vec![0.0, 0.0, 1.0, 0.0]),
    );
    let index = index_with(mock).await;
    index
        .add_documents(&texts(&["The sky is blue", "Grass is green"]), None, None)
        .await
        .unwrap();

    let hits = index.search("sky color", 5, None).await.unwrap();

    assert_eq!(hits[0].text, "The sky is blue");
}
