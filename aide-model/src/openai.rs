//! OpenAI provider: chat completions, vision, and embeddings.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use aide_core::{AideError, Message, Result};

use crate::provider::{ChatRequest, ImagePayload, LlmProvider};

/// The OpenAI chat completions endpoint.
const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";

/// The OpenAI embeddings endpoint.
const OPENAI_EMBEDDINGS_URL: &str = "https://api.openai.com/v1/embeddings";

/// Default model for chat completions.
const DEFAULT_CHAT_MODEL: &str = "gpt-4-turbo-preview";

/// Default model for vision completions.
const DEFAULT_VISION_MODEL: &str = "gpt-4-turbo";

/// Default model for embeddings.
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// Token budget for vision completions.
const VISION_MAX_TOKENS: u32 = 1000;

/// An [`LlmProvider`] backed by the OpenAI API.
///
/// Uses `reqwest` to call the chat-completions and embeddings endpoints
/// directly. One client covers all three capabilities; it is the only
/// provider in this workspace with an embeddings endpoint, so the
/// gateway designates it as the embedding source regardless of which
/// provider handles chat.
///
/// # Example
///
/// ```rust,ignore
/// use aide_model::OpenAiClient;
///
/// let client = OpenAiClient::new("sk-...")?;
/// let answer = client.chat_completion(request).await?;
/// ```
pub struct OpenAiClient {
    client: reqwest::Client,
    api_key: String,
    chat_model: String,
    embedding_model: String,
}

impl OpenAiClient {
    /// Create a new client with the given API key and default models.
    ///
    /// # Errors
    ///
    /// Returns [`AideError::Configuration`] if the key is empty.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(AideError::Configuration(
                "OpenAI API key must not be empty".to_string(),
            ));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
        })
    }

    /// Set the default chat model.
    pub fn with_chat_model(mut self, model: impl Into<String>) -> Self {
        self.chat_model = model.into();
        self
    }

    /// Set the default embedding model.
    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    /// POST a JSON body and decode a JSON response, mapping transport
    /// and non-2xx failures to [`AideError::Provider`].
    async fn post_json<B: Serialize, T: DeserializeOwned>(&self, url: &str, body: &B) -> Result<T> {
        let response =
            self.client.post(url).bearer_auth(&self.api_key).json(body).send().await.map_err(
                |e| {
                    error!(provider = "openai", error = %e, "request failed");
                    AideError::Provider {
                        provider: "openai".to_string(),
                        message: format!("request failed: {e}"),
                    }
                },
            )?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);

            error!(provider = "openai", %status, "API error");
            return Err(AideError::Provider {
                provider: "openai".to_string(),
                message: format!("API returned {status}: {detail}"),
            });
        }

        response.json().await.map_err(|e| {
            error!(provider = "openai", error = %e, "failed to parse response");
            AideError::Provider {
                provider: "openai".to_string(),
                message: format!("failed to parse response: {e}"),
            }
        })
    }
}

// ── OpenAI API request/response types ──────────────────────────────

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ApiMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
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
    Parts(Vec<ContentPart<'a>>),
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Build the message array for a vision request: all turns pass through
/// as text except the last, which becomes a multi-modal turn carrying
/// both its text and the image as a data URL.
fn build_vision_messages<'a>(messages: &'a [Message], image: &ImagePayload) -> Vec<ApiMessage<'a>> {
    let data_url = format!("data:{};base64,{}", image.media_type, image.base64_data);

    let (last, prior) = match messages.split_last() {
        Some(split) => split,
        None => return Vec::new(),
    };

    let mut api_messages: Vec<ApiMessage<'a>> = prior
        .iter()
        .map(|m| ApiMessage { role: m.role.as_str(), content: ApiContent::Text(&m.content) })
        .collect();

    api_messages.push(ApiMessage {
        role: "user",
        content: ApiContent::Parts(vec![
            ContentPart::Text { text: &last.content },
            ContentPart::ImageUrl { image_url: ImageUrl { url: data_url } },
        ]),
    });

    api_messages
}

fn first_choice(response: ChatCompletionResponse) -> Result<String> {
    response.choices.into_iter().next().and_then(|c| c.message.content).ok_or_else(|| {
        AideError::Provider {
            provider: "openai".to_string(),
            message: "API returned no completion choices".to_string(),
        }
    })
}

// ── LlmProvider implementation ─────────────────────────────────────

#[async_trait]
impl LlmProvider for OpenAiClient {
    fn name(&self) -> &str {
        "openai"
    }

    async fn chat_completion(&self, request: ChatRequest) -> Result<String> {
        let model = request.model.as_deref().unwrap_or(&self.chat_model);
        debug!(provider = "openai", model, turns = request.messages.len(), "chat completion");

        let body = ChatCompletionRequest {
            model,
            messages: request
                .messages
                .iter()
                .map(|m| ApiMessage {
                    role: m.role.as_str(),
                    content: ApiContent::Text(&m.content),
                })
                .collect(),
            temperature: Some(request.temperature),
            max_tokens: request.max_tokens,
        };

        let response: ChatCompletionResponse = self.post_json(OPENAI_CHAT_URL, &body).await?;
        first_choice(response)
    }

    async fn vision_completion(
        &self,
        messages: &[Message],
        image: ImagePayload,
        model: Option<&str>,
    ) -> Result<String> {
        if messages.is_empty() {
            return Err(AideError::Configuration(
                "vision completion requires at least one message".to_string(),
            ));
        }

        let model = model.unwrap_or(DEFAULT_VISION_MODEL);
        debug!(provider = "openai", model, media_type = %image.media_type, "vision completion");

        let body = ChatCompletionRequest {
            model,
            messages: build_vision_messages(messages, &image),
            temperature: None,
            max_tokens: Some(VISION_MAX_TOKENS),
        };

        let response: ChatCompletionResponse = self.post_json(OPENAI_CHAT_URL, &body).await?;
        first_choice(response)
    }

    async fn embed(&self, text: &str, model: Option<&str>) -> Result<Vec<f32>> {
        let model = model.unwrap_or(&self.embedding_model);
        debug!(provider = "openai", model, text_len = text.len(), "embedding text");

        let body = EmbeddingRequest { model, input: text };
        let response: EmbeddingResponse = self.post_json(OPENAI_EMBEDDINGS_URL, &body).await?;

        response.data.into_iter().next().map(|d| d.embedding).ok_or_else(|| {
            AideError::Provider {
                provider: "openai".to_string(),
                message: "API returned no embedding data".to_string(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_api_key_is_rejected() {
        assert!(matches!(OpenAiClient::new(""), Err(AideError::Configuration(_))));
    }

    #[test]
    fn vision_messages_attach_image_to_last_turn() {
        let messages = vec![
            Message::system("you are a mechanic"),
            Message::user("what is wrong with this engine?"),
        ];
        let image = ImagePayload { base64_data: "QUJD".to_string(), media_type: "image/png".to_string() };

        let body = build_vision_messages(&messages, &image);
        let json = serde_json::to_value(&body).unwrap();

        // Prior turn passes through as plain text.
        assert_eq!(json[0]["role"], "system");
        assert_eq!(json[0]["content"], "you are a mechanic");

        // Last turn carries text plus the image data URL.
        assert_eq!(json[1]["role"], "user");
        assert_eq!(json[1]["content"][0]["type"], "text");
        assert_eq!(json[1]["content"][0]["text"], "what is wrong with this engine?");
        assert_eq!(json[1]["content"][1]["type"], "image_url");
        assert_eq!(json[1]["content"][1]["image_url"]["url"], "data:image/png;base64,QUJD");
    }

    #[test]
    fn chat_body_omits_max_tokens_when_unset() {
        let request = ChatCompletionRequest {
            model: "gpt-4-turbo-preview",
            messages: vec![ApiMessage { role: "user", content: ApiContent::Text("hi") }],
            temperature: Some(0.7),
            max_tokens: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("max_tokens").is_none());
        assert_eq!(json["messages"][0]["content"], "hi");
    }
}
