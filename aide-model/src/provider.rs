//! The provider capability trait and its request types.

use async_trait::async_trait;

use aide_core::{AideError, Message, Result};

/// A chat completion request, provider-agnostic.
///
/// `model` overrides the provider's configured default when set.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    /// Ordered conversation turns.
    pub messages: Vec<Message>,
    /// Model override; the provider default applies when `None`.
    pub model: Option<String>,
    /// Sampling temperature.
    pub temperature: f32,
    /// Upper bound on generated tokens, provider default when `None`.
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    /// Create a request with the default temperature (0.7) and no
    /// model or token overrides.
    pub fn new(messages: Vec<Message>) -> Self {
        Self { messages, model: None, temperature: 0.7, max_tokens: None }
    }

    /// Override the model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the maximum number of generated tokens.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// An image already read into memory and base64-encoded, ready to be
/// attached to a multi-modal turn.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePayload {
    /// Base64-encoded image bytes.
    pub base64_data: String,
    /// MIME type, e.g. `image/jpeg`.
    pub media_type: String,
}

impl ImagePayload {
    /// Encode raw image bytes with the given media type.
    pub fn from_bytes(bytes: &[u8], media_type: impl Into<String>) -> Self {
        use base64::Engine as _;
        Self {
            base64_data: base64::engine::general_purpose::STANDARD.encode(bytes),
            media_type: media_type.into(),
        }
    }

    /// Map a file extension to a supported image MIME type.
    ///
    /// Unknown extensions fall back to `image/jpeg`.
    pub fn media_type_for_extension(extension: &str) -> &'static str {
        match extension.to_ascii_lowercase().as_str() {
            "png" => "image/png",
            "gif" => "image/gif",
            "webp" => "image/webp",
            _ => "image/jpeg",
        }
    }
}

/// A hosted language-model provider.
///
/// Implementations wrap one provider's transport (OpenAI, Anthropic)
/// behind a uniform async interface. Exactly one transport call is made
/// per operation: no retries, no streaming, no fallback between
/// providers.
///
/// The default [`embed`](LlmProvider::embed) implementation reports the
/// capability as unsupported; providers with an embeddings endpoint
/// override it.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// A short provider name used in errors and log fields.
    fn name(&self) -> &str;

    /// Generate a chat completion for the given request.
    async fn chat_completion(&self, request: ChatRequest) -> Result<String>;

    /// Generate a completion grounded in an image.
    ///
    /// The image is attached to the text of the *last* message as a
    /// single multi-modal turn; earlier messages pass through unchanged
    /// as prior turns.
    async fn vision_completion(
        &self,
        messages: &[Message],
        image: ImagePayload,
        model: Option<&str>,
    ) -> Result<String>;

    /// Generate an embedding vector for a single text input.
    async fn embed(&self, text: &str, model: Option<&str>) -> Result<Vec<f32>> {
        let _ = (text, model);
        Err(AideError::Capability {
            provider: self.name().to_string(),
            operation: "embeddings".to_string(),
        })
    }
}
