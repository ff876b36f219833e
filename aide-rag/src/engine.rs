//! The retrieval-augmented query engine.
//!
//! [`RagEngine`] turns a natural-language question into a grounded
//! answer: retrieve the nearest documents, assemble their text into a
//! context block, and ask the model to answer from it. It holds no
//! state of its own — it is a pure orchestrator over the
//! [`VectorIndex`] and the [`ModelGateway`].

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use aide_core::{Message, Result};
use aide_model::{ChatRequest, ModelGateway};

use crate::index::VectorIndex;

/// System prompt used when the caller supplies none.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful personal assistant. \
    Use the provided context to answer questions. If the context doesn't contain \
    enough information, say so and provide the best answer you can.";

/// System prompt for vision queries when the caller supplies none.
pub const DEFAULT_VISION_PROMPT: &str = "You are a helpful assistant that can \
    analyze images and provide detailed, actionable advice. Provide specific \
    solutions and next steps when relevant.";

/// Source previews are truncated to this many characters.
const PREVIEW_LENGTH: usize = 200;

/// Tuning knobs for a single query.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOptions {
    /// Maximum number of retrieved documents used as context.
    pub max_context_docs: usize,
    /// Sampling temperature for the answer.
    pub temperature: f32,
    /// System prompt override; [`DEFAULT_SYSTEM_PROMPT`] when `None`.
    pub system_prompt: Option<String>,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self { max_context_docs: 5, temperature: 0.7, system_prompt: None }
    }
}

impl QueryOptions {
    /// Set the maximum number of context documents.
    pub fn with_max_context_docs(mut self, max: usize) -> Self {
        self.max_context_docs = max;
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the system prompt.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }
}

/// A retrieved document's truncated preview, attached to an answer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceExcerpt {
    /// Up to 200 characters of the source text, with `...` when truncated.
    pub content: String,
    /// The source document's metadata.
    pub metadata: HashMap<String, String>,
}

/// Bookkeeping attached to a [`QueryResult`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryMetadata {
    /// Number of retrieved sources used as context.
    pub num_sources: usize,
    /// The question as asked.
    pub question: String,
}

/// A grounded answer with its supporting sources.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryResult {
    /// The model's answer.
    pub answer: String,
    /// Previews of the retrieved documents, in ascending-distance order.
    pub sources: Vec<SourceExcerpt>,
    /// Query bookkeeping.
    pub metadata: QueryMetadata,
}

/// Truncate text to the preview length, appending `...` when truncated.
fn preview(text: &str) -> String {
    if text.chars().count() > PREVIEW_LENGTH {
        let truncated: String = text.chars().take(PREVIEW_LENGTH).collect();
        format!("{truncated}...")
    } else {
        text.to_string()
    }
}

/// The retrieval-augmented generation engine.
pub struct RagEngine {
    index: Arc<VectorIndex>,
    gateway: Arc<ModelGateway>,
}

impl RagEngine {
    /// Create an engine over an index and a gateway.
    pub fn new(index: Arc<VectorIndex>, gateway: Arc<ModelGateway>) -> Self {
        Self { index, gateway }
    }

    /// A reference to the underlying vector index.
    pub fn index(&self) -> &Arc<VectorIndex> {
        &self.index
    }

    /// Answer a question grounded in retrieved context.
    ///
    /// Retrieves up to `max_context_docs` similar documents, joins
    /// their full text with blank lines in ascending-distance order,
    /// and submits a two-message prompt to the gateway. When retrieval
    /// finds nothing the context is empty and the model is still
    /// invoked — graceful degradation, not an error.
    ///
    /// # Errors
    ///
    /// Propagates provider and storage errors unchanged; a query whose
    /// chat call fails returns no partial answer.
    pub async fn query(&self, question: &str, options: &QueryOptions) -> Result<QueryResult> {
        let hits = self.index.search(question, options.max_context_docs, None).await?;

        let context =
            hits.iter().map(|hit| hit.text.as_str()).collect::<Vec<_>>().join("\n\n");

        let system_message =
            options.system_prompt.clone().unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());
        let user_message = format!(
            "Context:\n{context}\n\nQuestion: {question}\n\n\
             Please provide a comprehensive answer based on the context above."
        );

        let request = ChatRequest::new(vec![
            Message::system(system_message),
            Message::user(user_message),
        ])
        .with_temperature(options.temperature);

        let answer = self.gateway.chat_completion(request).await?;

        info!(num_sources = hits.len(), "query answered");

        Ok(QueryResult {
            sources: hits
                .iter()
                .map(|hit| SourceExcerpt {
                    content: preview(&hit.text),
                    metadata: hit.metadata.clone(),
                })
                .collect(),
            metadata: QueryMetadata { num_sources: hits.len(), question: question.to_string() },
            answer,
        })
    }

    /// Add knowledge to the vector index. Pass-through to
    /// [`VectorIndex::add_documents`] with derived ids.
    pub async fn add_knowledge(
        &self,
        texts: &[String],
        metadatas: Option<Vec<HashMap<String, String>>>,
    ) -> Result<Vec<String>> {
        self.index.add_documents(texts, metadatas, None).await
    }

    /// Answer a question about an image, bypassing retrieval entirely.
    ///
    /// Returns the raw model text; no sources are attached since no
    /// retrieval occurred.
    ///
    /// # Errors
    ///
    /// Returns [`aide_core::AideError::NotFound`] before any network
    /// call if `image_path` does not exist.
    pub async fn vision_query(
        &self,
        question: &str,
        image_path: impl AsRef<Path>,
        system_prompt: Option<&str>,
    ) -> Result<String> {
        let messages = vec![
            Message::system(system_prompt.unwrap_or(DEFAULT_VISION_PROMPT)),
            Message::user(question),
        ];

        self.gateway.vision_completion(&messages, image_path, None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_not_truncated() {
        assert_eq!(preview("short"), "short");
    }

    #[test]
    fn long_text_gets_an_ellipsis_marker() {
        let text = "x".repeat(250);
        let result = preview(&text);
        assert_eq!(result.chars().count(), PREVIEW_LENGTH + 3);
        assert!(result.ends_with("..."));
    }

    #[test]
    fn exactly_preview_length_is_untouched() {
        let text = "y".repeat(PREVIEW_LENGTH);
        assert_eq!(preview(&text), text);
    }
}
