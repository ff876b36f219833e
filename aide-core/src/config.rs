//! Process configuration, read once at startup.
//!
//! There is no global settings singleton: callers build a [`Settings`]
//! value (from the environment or explicitly) and pass it into each
//! component's constructor. It is never mutated afterwards, so multiple
//! independently configured instances can coexist in one process.

use std::fmt;
use std::str::FromStr;

use crate::error::{AideError, Result};

/// Default chat model when `DEFAULT_MODEL` is unset.
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4-turbo-preview";

/// Default embedding model when `EMBEDDING_MODEL` is unset.
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// Default directory for the persistent vector store.
pub const DEFAULT_VECTOR_DB_PATH: &str = "./data/vector_db";

/// Default collection name for indexed knowledge.
pub const DEFAULT_COLLECTION: &str = "personal_agent";

/// The hosted model provider selected for chat and vision calls.
///
/// Embeddings always route to OpenAI regardless of this selection;
/// see `aide-model`'s gateway documentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Provider {
    /// OpenAI chat, vision, and embedding endpoints.
    #[default]
    OpenAi,
    /// Anthropic messages endpoint (no embeddings).
    Anthropic,
}

impl FromStr for Provider {
    type Err = AideError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAi),
            "anthropic" => Ok(Provider::Anthropic),
            other => {
                Err(AideError::Configuration(format!("unsupported provider '{other}'")))
            }
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::OpenAi => write!(f, "openai"),
            Provider::Anthropic => write!(f, "anthropic"),
        }
    }
}

/// Immutable application settings.
///
/// Construct via [`Settings::builder()`] or [`Settings::from_env()`].
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// The active provider for chat and vision completions.
    pub provider: Provider,
    /// OpenAI API key. Always required: OpenAI is the designated
    /// embedding source even when Anthropic handles chat.
    pub openai_api_key: String,
    /// Anthropic API key, required when `provider` is [`Provider::Anthropic`].
    pub anthropic_api_key: Option<String>,
    /// Default model name for chat completions.
    pub chat_model: String,
    /// Model name for embedding requests.
    pub embedding_model: String,
    /// Directory holding the persistent vector store.
    pub vector_db_path: String,
    /// Name of the knowledge collection.
    pub collection_name: String,
}

impl Settings {
    /// Create a new builder for constructing a [`Settings`].
    pub fn builder() -> SettingsBuilder {
        SettingsBuilder::default()
    }

    /// Load settings from environment variables.
    ///
    /// Reads `OPENAI_API_KEY` (required), `ANTHROPIC_API_KEY`,
    /// `DEFAULT_LLM_PROVIDER`, `DEFAULT_MODEL`, `EMBEDDING_MODEL`,
    /// and `VECTOR_DB_PATH`.
    ///
    /// # Errors
    ///
    /// Returns [`AideError::Configuration`] if a required variable is
    /// missing or the provider name is not recognized.
    pub fn from_env() -> Result<Self> {
        let mut builder = Settings::builder();

        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            builder = builder.openai_api_key(key);
        }
        if let Ok(key) = std::env::var("ANTHROPIC_API_KEY") {
            builder = builder.anthropic_api_key(key);
        }
        if let Ok(provider) = std::env::var("DEFAULT_LLM_PROVIDER") {
            builder = builder.provider(provider.parse()?);
        }
        if let Ok(model) = std::env::var("DEFAULT_MODEL") {
            builder = builder.chat_model(model);
        }
        if let Ok(model) = std::env::var("EMBEDDING_MODEL") {
            builder = builder.embedding_model(model);
        }
        if let Ok(path) = std::env::var("VECTOR_DB_PATH") {
            builder = builder.vector_db_path(path);
        }

        builder.build()
    }
}

/// Builder for constructing a validated [`Settings`].
#[derive(Debug, Clone, Default)]
pub struct SettingsBuilder {
    provider: Provider,
    openai_api_key: Option<String>,
    anthropic_api_key: Option<String>,
    chat_model: Option<String>,
    embedding_model: Option<String>,
    vector_db_path: Option<String>,
    collection_name: Option<String>,
}

impl SettingsBuilder {
    /// Set the active chat/vision provider.
    pub fn provider(mut self, provider: Provider) -> Self {
        self.provider = provider;
        self
    }

    /// Set the OpenAI API key.
    pub fn openai_api_key(mut self, key: impl Into<String>) -> Self {
        self.openai_api_key = Some(key.into());
        self
    }

    /// Set the Anthropic API key.
    pub fn anthropic_api_key(mut self, key: impl Into<String>) -> Self {
        self.anthropic_api_key = Some(key.into());
        self
    }

    /// Set the default chat model name.
    pub fn chat_model(mut self, model: impl Into<String>) -> Self {
        self.chat_model = Some(model.into());
        self
    }

    /// Set the embedding model name.
    pub fn embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = Some(model.into());
        self
    }

    /// Set the persistent vector store directory.
    pub fn vector_db_path(mut self, path: impl Into<String>) -> Self {
        self.vector_db_path = Some(path.into());
        self
    }

    /// Set the knowledge collection name.
    pub fn collection_name(mut self, name: impl Into<String>) -> Self {
        self.collection_name = Some(name.into());
        self
    }

    /// Build the [`Settings`], validating provider credentials.
    ///
    /// # Errors
    ///
    /// Returns [`AideError::Configuration`] if:
    /// - the OpenAI API key is missing or empty (it is always required,
    ///   as the designated embedding source)
    /// - the provider is Anthropic and no Anthropic key was supplied
    pub fn build(self) -> Result<Settings> {
        let openai_api_key = self
            .openai_api_key
            .filter(|k| !k.is_empty())
            .ok_or_else(|| AideError::Configuration("OPENAI_API_KEY is required".to_string()))?;

        if self.provider == Provider::Anthropic
            && self.anthropic_api_key.as_deref().is_none_or(str::is_empty)
        {
            return Err(AideError::Configuration(
                "ANTHROPIC_API_KEY is required when the anthropic provider is selected"
                    .to_string(),
            ));
        }

        Ok(Settings {
            provider: self.provider,
            openai_api_key,
            anthropic_api_key: self.anthropic_api_key,
            chat_model: self.chat_model.unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
            embedding_model: self
                .embedding_model
                .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
            vector_db_path: self
                .vector_db_path
                .unwrap_or_else(|| DEFAULT_VECTOR_DB_PATH.to_string()),
            collection_name: self
                .collection_name
                .unwrap_or_else(|| DEFAULT_COLLECTION.to_string()),
        })
    }
}
