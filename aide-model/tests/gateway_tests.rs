//! Integration tests for the model gateway's dispatch and file handling.

use std::io::Write;
use std::sync::Arc;

use aide_core::{AideError, Message};
use aide_model::{ChatRequest, MockLlm, ModelGateway};

fn gateway_with(active: Arc<MockLlm>, embedder: Arc<MockLlm>) -> ModelGateway {
    ModelGateway::with_providers(active, embedder)
}

#[tokio::test]
async fn chat_goes_to_the_active_provider() {
    let active = Arc::new(MockLlm::new().with_chat_reply("from active"));
    let embedder = Arc::new(MockLlm::new());
    let gateway = gateway_with(Arc::clone(&active), Arc::clone(&embedder));

    let answer = gateway
        .chat_completion(ChatRequest::new(vec![Message::user("hello")]).with_temperature(0.2))
        .await
        .unwrap();

    assert_eq!(answer, "from active");
    let recorded = active.chat_requests();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].temperature, 0.2);
    assert!(embedder.chat_requests().is_empty());
}

#[tokio::test]
async fn embeddings_route_to_the_designated_provider() {
    let active = Arc::new(MockLlm::new().with_dimensions(8));
    let embedder = Arc::new(MockLlm::new().with_dimensions(16));
    let gateway = gateway_with(Arc::clone(&active), Arc::clone(&embedder));

    let embedding = gateway.get_embeddings("some text", None).await.unwrap();

    assert_eq!(embedding.len(), 16);
    assert_eq!(embedder.embed_inputs(), vec!["some text".to_string()]);
    assert!(active.embed_inputs().is_empty());
}

#[tokio::test]
async fn vision_with_missing_image_fails_before_any_provider_call() {
    let active = Arc::new(MockLlm::new());
    let gateway = gateway_with(Arc::clone(&active), Arc::new(MockLlm::new()));

    let err = gateway
        .vision_completion(&[Message::user("what is this?")], "/no/such/image.jpg", None)
        .await
        .unwrap_err();

    assert!(matches!(err, AideError::NotFound(_)));
    assert_eq!(active.vision_call_count(), 0);
}

#[tokio::test]
async fn vision_reads_and_forwards_an_existing_image() {
    let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
    file.write_all(b"not a real png, but bytes all the same").unwrap();

    let active = Arc::new(MockLlm::new().with_vision_reply("a picture of bytes"));
    let gateway = gateway_with(Arc::clone(&active), Arc::new(MockLlm::new()));

    let answer = gateway
        .vision_completion(&[Message::user("describe this")], file.path(), None)
        .await
        .unwrap();

    assert_eq!(answer, "a picture of bytes");
    assert_eq!(active.vision_call_count(), 1);
}
