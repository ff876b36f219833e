//! The model gateway: one contract over whichever provider is configured.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use aide_core::{AideError, Message, Provider, Result, Settings};

use crate::anthropic::AnthropicClient;
use crate::openai::OpenAiClient;
use crate::provider::{ChatRequest, ImagePayload, LlmProvider};

/// A uniform front over the configured model providers.
///
/// The active provider handles chat and vision; embeddings always route
/// to the designated embedding provider (OpenAI in the default wiring,
/// since Anthropic has no embeddings endpoint). Both are selected once
/// at construction and never change mid-session.
///
/// # Example
///
/// ```rust,ignore
/// use aide_core::Settings;
/// use aide_model::ModelGateway;
///
/// let settings = Settings::from_env()?;
/// let gateway = ModelGateway::from_settings(&settings)?;
/// let answer = gateway.chat_completion(ChatRequest::new(messages)).await?;
/// ```
pub struct ModelGateway {
    active: Arc<dyn LlmProvider>,
    embedder: Arc<dyn LlmProvider>,
}

impl ModelGateway {
    /// Build a gateway from settings.
    ///
    /// The OpenAI client is always constructed (it is the designated
    /// embedding source); the active chat/vision client follows
    /// `settings.provider`.
    ///
    /// # Errors
    ///
    /// Returns [`AideError::Configuration`] if a required API key is
    /// missing or empty.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let openai: Arc<dyn LlmProvider> = Arc::new(
            OpenAiClient::new(&settings.openai_api_key)?
                .with_chat_model(&settings.chat_model)
                .with_embedding_model(&settings.embedding_model),
        );

        let active: Arc<dyn LlmProvider> = match settings.provider {
            Provider::OpenAi => Arc::clone(&openai),
            Provider::Anthropic => {
                let key = settings.anthropic_api_key.as_deref().ok_or_else(|| {
                    AideError::Configuration(
                        "anthropic provider selected but no API key configured".to_string(),
                    )
                })?;
                Arc::new(AnthropicClient::new(key)?)
            }
        };

        Ok(Self { active, embedder: openai })
    }

    /// Build a gateway from explicit providers. Used by tests and by
    /// callers that bring their own [`LlmProvider`] implementations.
    pub fn with_providers(active: Arc<dyn LlmProvider>, embedder: Arc<dyn LlmProvider>) -> Self {
        Self { active, embedder }
    }

    /// The name of the active chat/vision provider.
    pub fn provider_name(&self) -> &str {
        self.active.name()
    }

    /// Generate a chat completion via the active provider.
    ///
    /// Exactly one transport call is made; failures propagate untouched.
    pub async fn chat_completion(&self, request: ChatRequest) -> Result<String> {
        debug!(provider = self.active.name(), turns = request.messages.len(), "chat completion");
        self.active.chat_completion(request).await
    }

    /// Generate a completion grounded in a local image file.
    ///
    /// The file is read fully into memory and base64-encoded; its media
    /// type is inferred from the extension (unknown extensions fall
    /// back to `image/jpeg`).
    ///
    /// # Errors
    ///
    /// Returns [`AideError::NotFound`] before any network I/O if
    /// `image_path` does not exist.
    pub async fn vision_completion(
        &self,
        messages: &[Message],
        image_path: impl AsRef<Path>,
        model: Option<&str>,
    ) -> Result<String> {
        let image_path = image_path.as_ref();
        if !image_path.exists() {
            return Err(AideError::NotFound(image_path.to_path_buf()));
        }

        let bytes = tokio::fs::read(image_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AideError::NotFound(image_path.to_path_buf())
            } else {
                AideError::Storage {
                    backend: "local-fs".to_string(),
                    message: format!("failed to read '{}': {e}", image_path.display()),
                }
            }
        })?;

        let media_type = image_path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(ImagePayload::media_type_for_extension)
            .unwrap_or("image/jpeg");

        debug!(
            provider = self.active.name(),
            image = %image_path.display(),
            media_type,
            "vision completion"
        );

        let image = ImagePayload::from_bytes(&bytes, media_type);
        self.active.vision_completion(messages, image, model).await
    }

    /// Generate an embedding via the designated embedding provider,
    /// regardless of which provider is active for chat.
    pub async fn get_embeddings(&self, text: &str, model: Option<&str>) -> Result<Vec<f32>> {
        debug!(provider = self.embedder.name(), text_len = text.len(), "embedding text");
        self.embedder.embed(text, model).await
    }
}
