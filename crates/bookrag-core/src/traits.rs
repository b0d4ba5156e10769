use crate::error::Result;
use crate::types::{ScoredPoint, StoredPoint};

/// Turns text into a fixed-length vector.
pub trait EmbeddingProvider: Send + Sync {
    /// Stable identifier for the provider/model (e.g., `cohere:embed-multilingual-v3.0`).
    fn embedder_id(&self) -> &str;
    /// Embedding dimensionality, when known up front.
    fn dim(&self) -> Option<usize>;
    /// Embed a single query. An empty vector is reported as an error by callers.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Nearest-neighbour search over stored chunk vectors.
pub trait VectorStore: Send + Sync {
    /// Name of the collection or table searched.
    fn collection_name(&self) -> &str;
    /// Lightweight connectivity check; `Err` means the backend should be
    /// treated as unavailable.
    fn probe(&self) -> Result<()>;
    /// Up to `limit` hits with `score >= score_threshold`, best first.
    fn search(&self, vector: &[f32], limit: usize, score_threshold: f32) -> Result<Vec<ScoredPoint>>;
    /// Every stored point, fetched `page_size` at a time.
    fn scroll(&self, page_size: usize) -> Result<Vec<StoredPoint>>;
}
