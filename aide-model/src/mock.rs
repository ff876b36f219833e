//! Mock provider for tests.

use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Mutex;

use async_trait::async_trait;

use aide_core::{AideError, Message, Result};

use crate::provider::{ChatRequest, ImagePayload, LlmProvider};

/// A deterministic in-process provider for testing.
///
/// Chat and vision calls return canned replies; embeddings hash each
/// word of the input into a fixed-size bucket vector and L2-normalize
/// it, so texts sharing words produce nearby embeddings. Every call is
/// recorded so tests can assert on prompts and on which paths were
/// exercised.
pub struct MockLlm {
    chat_reply: String,
    vision_reply: String,
    dimensions: usize,
    embedding_overrides: HashMap<String, Vec<f32>>,
    fail_embeds_after: Option<usize>,
    chat_requests: Mutex<Vec<ChatRequest>>,
    vision_requests: Mutex<Vec<Vec<Message>>>,
    embed_inputs: Mutex<Vec<String>>,
}

impl Default for MockLlm {
    fn default() -> Self {
        Self {
            chat_reply: "mock answer".to_string(),
            vision_reply: "mock vision answer".to_string(),
            dimensions: 32,
            embedding_overrides: HashMap::new(),
            fail_embeds_after: None,
            chat_requests: Mutex::new(Vec::new()),
            vision_requests: Mutex::new(Vec::new()),
            embed_inputs: Mutex::new(Vec::new()),
        }
    }
}

impl MockLlm {
    /// Create a mock with default replies and 32-dimensional embeddings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the canned chat reply.
    pub fn with_chat_reply(mut self, reply: impl Into<String>) -> Self {
        self.chat_reply = reply.into();
        self
    }

    /// Set the canned vision reply.
    pub fn with_vision_reply(mut self, reply: impl Into<String>) -> Self {
        self.vision_reply = reply.into();
        self
    }

    /// Set the embedding dimensionality.
    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = dimensions;
        self
    }

    /// Pin the embedding returned for an exact input text.
    ///
    /// Tests that assert on search rankings use pinned vectors rather
    /// than relying on the word-bucket heuristic.
    pub fn with_embedding(mut self, text: impl Into<String>, embedding: Vec<f32>) -> Self {
        self.embedding_overrides.insert(text.into(), embedding);
        self
    }

    /// Make the embedding path fail once `count` embeddings have been
    /// produced. Used to exercise all-or-nothing ingestion.
    pub fn with_embed_failure_after(mut self, count: usize) -> Self {
        self.fail_embeds_after = Some(count);
        self
    }

    /// All chat requests received so far.
    pub fn chat_requests(&self) -> Vec<ChatRequest> {
        self.chat_requests.lock().expect("mock lock poisoned").clone()
    }

    /// Number of vision calls received so far.
    pub fn vision_call_count(&self) -> usize {
        self.vision_requests.lock().expect("mock lock poisoned").len()
    }

    /// The message lists of all vision calls received so far.
    pub fn vision_requests(&self) -> Vec<Vec<Message>> {
        self.vision_requests.lock().expect("mock lock poisoned").clone()
    }

    /// All embedding inputs received so far.
    pub fn embed_inputs(&self) -> Vec<String> {
        self.embed_inputs.lock().expect("mock lock poisoned").clone()
    }
}

/// Hash each word into a bucket and L2-normalize the resulting vector.
fn bucket_embedding(text: &str, dimensions: usize) -> Vec<f32> {
    let mut vector = vec![0.0f32; dimensions];
    for word in text.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()) {
        let mut hasher = DefaultHasher::new();
        word.to_ascii_lowercase().hash(&mut hasher);
        let bucket = (hasher.finish() % dimensions as u64) as usize;
        vector[bucket] += 1.0;
    }

    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for value in &mut vector {
            *value /= norm;
        }
    }
    vector
}

#[async_trait]
impl LlmProvider for MockLlm {
    fn name(&self) -> &str {
        "mock"
    }

    async fn chat_completion(&self, request: ChatRequest) -> Result<String> {
        self.chat_requests.lock().expect("mock lock poisoned").push(request);
        Ok(self.chat_reply.clone())
    }

    async fn vision_completion(
        &self,
        messages: &[Message],
        _image: ImagePayload,
        _model: Option<&str>,
    ) -> Result<String> {
        self.vision_requests.lock().expect("mock lock poisoned").push(messages.to_vec());
        Ok(self.vision_reply.clone())
    }

    async fn embed(&self, text: &str, _model: Option<&str>) -> Result<Vec<f32>> {
        let mut inputs = self.embed_inputs.lock().expect("mock lock poisoned");
        if let Some(limit) = self.fail_embeds_after {
            if inputs.len() >= limit {
                return Err(AideError::Provider {
                    provider: "mock".to_string(),
                    message: "simulated embedding failure".to_string(),
                });
            }
        }
        inputs.push(text.to_string());
        if let Some(embedding) = self.embedding_overrides.get(text) {
            return Ok(embedding.clone());
        }
        Ok(bucket_embedding(text, self.dimensions))
    }
}
