//! Anthropic provider: chat and vision via the messages API.
//!
//! Anthropic has no embeddings endpoint, so [`AnthropicClient`] keeps
//! the trait's default [`embed`](LlmProvider::embed) implementation and
//! reports the capability as unsupported.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use aide_core::{AideError, Message, Result, Role};

use crate::provider::{ChatRequest, ImagePayload, LlmProvider};

/// The Anthropic messages endpoint.
const ANTHROPIC_MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";

/// API version header required by the messages endpoint.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Default model for chat and vision completions.
const DEFAULT_MODEL: &str = "claude-3-opus-20240229";

/// Token budget when the caller does not supply one; the messages API
/// makes `max_tokens` mandatory.
const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Token budget for vision completions.
const VISION_MAX_TOKENS: u32 = 1024;

/// An [`LlmProvider`] backed by the Anthropic messages API.
///
/// The messages API differs from OpenAI's in two ways this client
/// normalizes at the boundary: system instructions are a top-level
/// `system` field rather than a message, and `max_tokens` is required.
pub struct AnthropicClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl AnthropicClient {
    /// Create a new client with the given API key and the default model.
    ///
    /// # Errors
    ///
    /// Returns [`AideError::Configuration`] if the key is empty.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(AideError::Configuration(
                "Anthropic API key must not be empty".to_string(),
            ));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model: DEFAULT_MODEL.to_string(),
        })
    }

    /// Set the default model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    async fn post_messages(&self, body: &MessagesRequest<'_>) -> Result<String> {
        let response = self
            .client
            .post(ANTHROPIC_MESSAGES_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = "anthropic", error = %e, "request failed");
                AideError::Provider {
                    provider: "anthropic".to_string(),
                    message: format!("request failed: {e}"),
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);

            error!(provider = "anthropic", %status, "API error");
            return Err(AideError::Provider {
                provider: "anthropic".to_string(),
                message: format!("API returned {status}: {detail}"),
            });
        }

        let messages_response: MessagesResponse = response.json().await.map_err(|e| {
            error!(provider = "anthropic", error = %e, "failed to parse response");
            AideError::Provider {
                provider: "anthropic".to_string(),
                message: format!("failed to parse response: {e}"),
            }
        })?;

        messages_response
            .content
            .into_iter()
            .find_map(|block| block.text)
            .ok_or_else(|| AideError::Provider {
                provider: "anthropic".to_string(),
                message: "API returned no text content".to_string(),
            })
    }
}

// ── Anthropic API request/response types ───────────────────────────

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<ApiMessage<'a>>,
}

#[derive(Serialize)]
struct ApiMessage<'a> {
    role: &'a str,
    content: ApiContent<'a>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum ApiContent<'a> {
    Text(&'a str),
    Blocks(Vec<ContentBlock<'a>>),
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock<'a> {
    Image { source: ImageSource<'a> },
    Text { text: &'a str },
}

#[derive(Serialize)]
struct ImageSource<'a> {
    #[serde(rename = "type")]
    source_type: &'static str,
    media_type: &'a str,
    data: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ResponseBlock>,
}

#[derive(Deserialize)]
struct ResponseBlock {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Split a conversation into the top-level `system` field and the
/// remaining turns. When several system messages are present the last
/// one wins.
fn lift_system_messages(messages: &[Message]) -> (Option<&str>, Vec<ApiMessage<'_>>) {
    let mut system = None;
    let mut turns = Vec::with_capacity(messages.len());

    for message in messages {
        match message.role {
            Role::System => system = Some(message.content.as_str()),
            _ => turns.push(ApiMessage {
                role: message.role.as_str(),
                content: ApiContent::Text(&message.content),
            }),
        }
    }

    (system, turns)
}

// ── LlmProvider implementation ─────────────────────────────────────

#[async_trait]
impl LlmProvider for AnthropicClient {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn chat_completion(&self, request: ChatRequest) -> Result<String> {
        let model = request.model.as_deref().unwrap_or(&self.model);
        debug!(provider = "anthropic", model, turns = request.messages.len(), "chat completion");

        let (system, messages) = lift_system_messages(&request.messages);
        let body = MessagesRequest {
            model,
            max_tokens: request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            temperature: Some(request.temperature),
            system,
            messages,
        };

        self.post_messages(&body).await
    }

    async fn vision_completion(
        &self,
        messages: &[Message],
        image: ImagePayload,
        model: Option<&str>,
    ) -> Result<String> {
        let last = messages.last().ok_or_else(|| {
            AideError::Configuration("vision completion requires at least one message".to_string())
        })?;

        let model = model.unwrap_or(&self.model);
        debug!(provider = "anthropic", model, media_type = %image.media_type, "vision completion");

        let body = MessagesRequest {
            model,
            max_tokens: VISION_MAX_TOKENS,
            temperature: None,
            system: None,
            messages: vec![ApiMessage {
                role: "user",
                content: ApiContent::Blocks(vec![
                    ContentBlock::Image {
                        source: ImageSource {
                            source_type: "base64",
                            media_type: &image.media_type,
                            data: &image.base64_data,
                        },
                    },
                    ContentBlock::Text { text: &last.content },
                ]),
            }],
        };

        self.post_messages(&body).await
    }
}
