//! # aide-rag
//!
//! Retrieval-augmented generation for aide: a vector index over
//! pluggable storage backends and a query engine that grounds model
//! answers in retrieved documents.
//!
//! ## Overview
//!
//! - [`VectorBackend`] — the storage contract (create-or-open, add,
//!   top-K query with metadata filter, count, delete)
//! - [`InMemoryBackend`] / [`DiskBackend`] — cosine-distance backends,
//!   volatile and persistent
//! - [`VectorIndex`] — embeds texts through the model gateway and
//!   stores them as [`DocumentRecord`]s
//! - [`RagEngine`] — retrieve → assemble context → generate, plus a
//!   retrieval-free vision path
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use aide_core::Settings;
//! use aide_model::ModelGateway;
//! use aide_rag::{DiskBackend, QueryOptions, RagEngine, VectorIndex};
//!
//! let settings = Settings::from_env()?;
//! let gateway = Arc::new(ModelGateway::from_settings(&settings)?);
//! let backend = Arc::new(DiskBackend::new(&settings.vector_db_path));
//! let index = Arc::new(
//!     VectorIndex::new(backend, Arc::clone(&gateway), &settings.collection_name).await?,
//! );
//! let engine = RagEngine::new(index, gateway);
//!
//! engine.add_knowledge(&texts, None).await?;
//! let result = engine.query("What is X?", &QueryOptions::default()).await?;
//! println!("{} ({} sources)", result.answer, result.metadata.num_sources);
//! ```

pub mod backend;
pub mod disk;
pub mod document;
pub mod engine;
pub mod index;
pub mod memory;

pub use aide_core::{AideError, Result};
pub use backend::VectorBackend;
pub use disk::DiskBackend;
pub use document::{CollectionInfo, DocumentRecord, SearchHit, cosine_distance};
pub use engine::{
    DEFAULT_SYSTEM_PROMPT, DEFAULT_VISION_PROMPT, QueryMetadata, QueryOptions, QueryResult,
    RagEngine, SourceExcerpt,
};
pub use index::{DEFAULT_N_RESULTS, VectorIndex};
pub use memory::InMemoryBackend;
