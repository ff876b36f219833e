//! # aide-model
//!
//! The model gateway for aide: a uniform interface over hosted
//! language-model providers.
//!
//! ## Overview
//!
//! - [`LlmProvider`] — the per-provider capability trait (chat, vision,
//!   embeddings)
//! - [`OpenAiClient`] — OpenAI chat completions, vision, and embeddings
//! - [`AnthropicClient`] — Anthropic messages API (chat and vision; no
//!   embeddings)
//! - [`ModelGateway`] — dispatches chat/vision to the active provider
//!   and embeddings to the designated embedding provider
//! - [`MockLlm`] — deterministic provider for tests
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use aide_core::{Message, Settings};
//! use aide_model::{ChatRequest, ModelGateway};
//!
//! let gateway = ModelGateway::from_settings(&Settings::from_env()?)?;
//! let answer = gateway
//!     .chat_completion(ChatRequest::new(vec![Message::user("hello")]))
//!     .await?;
//! ```
//!
//! Providers differ in request shape — Anthropic lifts the system
//! instruction into a top-level field and requires `max_tokens` — and
//! each client normalizes this at the boundary so callers stay
//! provider-agnostic. The gateway makes exactly one transport call per
//! operation: no retries, no streaming, no fallback between providers.

pub mod anthropic;
pub mod gateway;
pub mod mock;
pub mod openai;
pub mod provider;

pub use anthropic::AnthropicClient;
pub use gateway::ModelGateway;
pub use mock::MockLlm;
pub use openai::OpenAiClient;
pub use provider::{ChatRequest, ImagePayload, LlmProvider};
