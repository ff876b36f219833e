//! # aide-core
//!
//! Shared vocabulary for the aide personal-assistant workspace:
//!
//! - [`Message`] and [`Role`] — chat message types used by every provider
//! - [`AideError`] — the error taxonomy shared across crates
//! - [`Settings`] — immutable process configuration, read once at startup
//!
//! Higher-level crates (`aide-model`, `aide-rag`) build on these types;
//! this crate has no I/O of its own.

pub mod config;
pub mod error;
pub mod message;

pub use config::{Provider, Settings, SettingsBuilder};
pub use error::{AideError, Result};
pub use message::{Message, Role};
