//! Query → ranked chunks, with vector search when the backend is up and the
//! keyword fallback when it is not.

use std::time::Instant;

use bookrag_core::config::{RetrievalSettings, Settings};
use bookrag_core::error::{Error, Result};
use bookrag_core::traits::{EmbeddingProvider, VectorStore};
use bookrag_core::types::{unix_timestamp, Chunk, RetrievalMetadata, RetrievalResult};
use tracing::{error, info, warn};

use crate::corpus::LocalCorpus;
use crate::fallback::FallbackScorer;

pub const EMBEDDING_FAILED: &str = "Failed to generate query embedding";

/// Where a query's chunks came from.
#[derive(Debug, Clone, PartialEq)]
enum Route {
    Vector(Vec<Chunk>),
    /// The backend failed mid-query; chunks come from the local corpus.
    Degraded(Vec<Chunk>),
    Fallback(Vec<Chunk>),
    /// The backend is up but the query could not be embedded.
    EmbeddingFailed(String),
}

pub struct Retriever {
    embedder: Box<dyn EmbeddingProvider>,
    store: Box<dyn VectorStore>,
    fallback: FallbackScorer,
    backend_available: bool,
    settings: RetrievalSettings,
}

impl Retriever {
    /// Probe the store once; the outcome holds for the retriever's lifetime.
    pub fn new(settings: RetrievalSettings, embedder: Box<dyn EmbeddingProvider>, store: Box<dyn VectorStore>) -> Self {
        let backend_available = match store.probe() {
            Ok(()) => {
                info!(collection = store.collection_name(), "connected to vector store");
                true
            }
            Err(e) => {
                warn!(error = %e, "could not reach vector store, using local fallback corpus");
                false
            }
        };
        Self { embedder, store, fallback: FallbackScorer::new(LocalCorpus::builtin()), backend_available, settings }
    }

    /// Build the configured embedder and store, then probe.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let embedder = bookrag_embed::get_default_embedder(&settings.embedding)?;
        let store = bookrag_vector::open_store(settings)?;
        Ok(Self::new(settings.retrieval.clone(), embedder, store))
    }

    pub fn backend_available(&self) -> bool {
        self.backend_available
    }

    pub fn settings(&self) -> &RetrievalSettings {
        &self.settings
    }

    pub fn collection_name(&self) -> &str {
        &self.settings.collection_name
    }

    /// Retrieve with the configured default `top_k` and threshold.
    pub fn retrieve_default(&self, query: &str) -> RetrievalResult {
        self.retrieve(query, self.settings.default_top_k, self.settings.default_threshold)
    }

    pub fn retrieve(&self, query: &str, top_k: usize, threshold: f32) -> RetrievalResult {
        let started = Instant::now();
        let threshold = if threshold.is_nan() { 0.0 } else { threshold.max(0.0) };
        info!(query = %preview(query, 50), top_k, threshold, "processing retrieval request");

        let mut chunks = match self.route(query, top_k, threshold) {
            Route::EmbeddingFailed(reason) => {
                error!(%reason, "error generating embedding for query");
                return RetrievalResult {
                    query: query.to_string(),
                    results: Vec::new(),
                    error: Some(EMBEDDING_FAILED.to_string()),
                    metadata: self.metadata(started, 0),
                };
            }
            Route::Vector(chunks) | Route::Degraded(chunks) | Route::Fallback(chunks) => chunks,
        };

        chunks.sort_by(|a, b| b.similarity_score.partial_cmp(&a.similarity_score).unwrap_or(std::cmp::Ordering::Equal));
        chunks.truncate(top_k);
        if chunks.is_empty() {
            warn!("no results returned for query");
        }
        if self.settings.verify_content && !verify_content_accuracy(&chunks) {
            warn!("content accuracy verification failed for some results");
        }

        let metadata = self.metadata(started, chunks.len());
        info!(elapsed_ms = metadata.query_time_ms, results = chunks.len(), "retrieval completed");
        RetrievalResult { query: query.to_string(), results: chunks, error: None, metadata }
    }

    fn route(&self, query: &str, top_k: usize, threshold: f32) -> Route {
        if !self.backend_available {
            info!("using fallback search");
            return Route::Fallback(self.fallback.score(query, top_k));
        }
        let vector = match self.embedder.embed(query) {
            Ok(v) if !v.is_empty() => v,
            Ok(_) => return Route::EmbeddingFailed("embedding provider returned an empty vector".into()),
            Err(e) => return Route::EmbeddingFailed(e.to_string()),
        };
        match self.store.search(&vector, top_k, threshold) {
            Ok(points) => Route::Vector(points.into_iter().map(|p| p.into_chunk()).collect()),
            Err(e) => {
                if e.is_backend() {
                    error!(error = %e, "vector search failed, falling back to keyword search");
                } else {
                    error!(error = %e, "unexpected vector search error, falling back to keyword search");
                }
                Route::Degraded(self.fallback.score(query, top_k))
            }
        }
    }

    fn metadata(&self, started: Instant, total_results: usize) -> RetrievalMetadata {
        RetrievalMetadata {
            query_time_ms: started.elapsed().as_secs_f64() * 1000.0,
            total_results,
            timestamp: unix_timestamp(),
            collection_name: self.settings.collection_name.clone(),
        }
    }

    /// Every chunk stored in the backend collection, in store order.
    pub fn stored_chunks(&self) -> Result<Vec<Chunk>> {
        if !self.backend_available {
            return Err(Error::Backend(format!("collection '{}' is not reachable", self.store.collection_name())));
        }
        let points = self.store.scroll(1000)?;
        Ok(points
            .into_iter()
            .map(|p| Chunk {
                content: p.payload.content,
                url: p.payload.url,
                position: p.payload.position,
                similarity_score: 0.0,
                chunk_id: p.id,
                created_at: p.payload.created_at,
            })
            .collect())
    }
}

/// Best-effort check that every chunk has content and a url. Only logs.
pub fn verify_content_accuracy(chunks: &[Chunk]) -> bool {
    for chunk in chunks {
        if !chunk.is_valid() {
            warn!(chunk_id = %chunk.chunk_id, "missing content or url in chunk");
            return false;
        }
    }
    true
}

/// First `max_chars` characters of `text`.
pub(crate) fn preview(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(content: &str, url: &str) -> Chunk {
        Chunk {
            content: content.into(),
            url: url.into(),
            position: 0,
            similarity_score: 0.5,
            chunk_id: "7".into(),
            created_at: String::new(),
        }
    }

    #[test]
    fn verification_flags_missing_fields() {
        assert!(verify_content_accuracy(&[]));
        assert!(verify_content_accuracy(&[chunk("text", "/docs/a")]));
        assert!(!verify_content_accuracy(&[chunk("text", "/docs/a"), chunk("", "/docs/b")]));
        assert!(!verify_content_accuracy(&[chunk("text", "")]));
    }

    #[test]
    fn preview_counts_characters() {
        assert_eq!(preview("héllo wörld", 4), "héll");
        assert_eq!(preview("ab", 10), "ab");
    }
}
