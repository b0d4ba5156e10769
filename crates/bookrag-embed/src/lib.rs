//! Embedding providers for query text.
//!
//! `CohereEmbedder` calls the hosted embed endpoint; `HashingEmbedder` is a
//! deterministic offline stand-in used in development and tests.

use bookrag_core::config::{EmbeddingBackend, EmbeddingSettings};
use bookrag_core::error::Result;
use bookrag_core::traits::EmbeddingProvider;

pub mod cohere;
pub mod hashing;

pub use cohere::CohereEmbedder;
pub use hashing::HashingEmbedder;

/// Build the provider selected by `settings.provider`.
pub fn get_default_embedder(settings: &EmbeddingSettings) -> Result<Box<dyn EmbeddingProvider>> {
    match settings.provider {
        EmbeddingBackend::Cohere => Ok(Box::new(CohereEmbedder::new(settings)?)),
        EmbeddingBackend::Hashing => {
            tracing::info!(dim = settings.dim, "using hashing embedder");
            Ok(Box::new(HashingEmbedder::new(settings.dim)))
        }
    }
}
