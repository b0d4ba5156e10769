//! Records exchanged between the retriever, the answer composer and callers.
//!
//! Field names are part of the external JSON schema and must not change.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub type ChunkId = String;

/// A retrievable unit of textbook content with its source and relevance.
///
/// - `content`/`url`: the text payload and the document it came from
/// - `position`: ordinal of the chunk within its source document
/// - `similarity_score`: relevance in `[0, 1]`, higher is better
/// - `chunk_id`: opaque identifier assigned by the producing backend
/// - `created_at`: ingestion date as stored by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub content: String,
    pub url: String,
    pub position: u32,
    pub similarity_score: f32,
    pub chunk_id: ChunkId,
    pub created_at: String,
}

impl Chunk {
    /// A chunk is usable only when it carries both text and attribution.
    pub fn is_valid(&self) -> bool {
        !self.content.is_empty() && !self.url.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalMetadata {
    pub query_time_ms: f64,
    pub total_results: usize,
    /// Seconds since the Unix epoch, fractional.
    pub timestamp: f64,
    pub collection_name: String,
}

/// Outcome of one `retrieve` call. `results` is ordered by descending
/// `similarity_score`. `error` is only present when the query could not be
/// embedded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub query: String,
    pub results: Vec<Chunk>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub metadata: RetrievalMetadata,
}

impl RetrievalResult {
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Coarse label summarizing how relevant the matched chunks are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    /// Average-score policy: `>= 0.7` high, `>= 0.4` medium, else low.
    /// An empty slice is always low.
    pub fn from_chunks(chunks: &[Chunk]) -> Self {
        if chunks.is_empty() {
            return Confidence::Low;
        }
        let total: f32 = chunks.iter().map(|c| c.similarity_score).sum();
        let avg = total / chunks.len() as f32;
        if avg >= 0.7 {
            Confidence::High
        } else if avg >= 0.4 {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerResponse {
    pub answer: String,
    pub sources: BTreeSet<String>,
    pub matched_chunks: Vec<Chunk>,
    pub query_time_ms: f64,
    pub confidence: Confidence,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Payload stored next to each vector. Missing fields decode to empty values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkPayload {
    pub content: String,
    pub url: String,
    pub position: u32,
    pub created_at: String,
}

/// A nearest-neighbour hit as returned by a vector store.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPoint {
    pub id: String,
    pub score: f32,
    pub payload: ChunkPayload,
}

impl ScoredPoint {
    pub fn into_chunk(self) -> Chunk {
        Chunk {
            content: self.payload.content,
            url: self.payload.url,
            position: self.payload.position,
            similarity_score: self.score,
            chunk_id: self.id,
            created_at: self.payload.created_at,
        }
    }
}

/// A point listed from a store without scoring (collection dumps).
#[derive(Debug, Clone, PartialEq)]
pub struct StoredPoint {
    pub id: String,
    pub payload: ChunkPayload,
}

/// Seconds since the Unix epoch with sub-second precision.
pub fn unix_timestamp() -> f64 {
    chrono::Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(score: f32) -> Chunk {
        Chunk {
            content: "text".into(),
            url: "/docs/a".into(),
            position: 0,
            similarity_score: score,
            chunk_id: "1".into(),
            created_at: String::new(),
        }
    }

    #[test]
    fn confidence_thresholds() {
        assert_eq!(Confidence::from_chunks(&[]), Confidence::Low);
        assert_eq!(Confidence::from_chunks(&[chunk(0.7)]), Confidence::High);
        assert_eq!(Confidence::from_chunks(&[chunk(0.9), chunk(0.1)]), Confidence::Medium);
        assert_eq!(Confidence::from_chunks(&[chunk(0.39)]), Confidence::Low);
    }

    #[test]
    fn confidence_serializes_lowercase() {
        let json = serde_json::to_string(&Confidence::Medium).expect("serialize");
        assert_eq!(json, "\"medium\"");
    }

    #[test]
    fn chunk_validity_requires_content_and_url() {
        let mut c = chunk(0.5);
        assert!(c.is_valid());
        c.url = "  ".into();
        assert!(c.is_valid(), "whitespace counts as present");
        c.url = String::new();
        assert!(!c.is_valid());
    }

    #[test]
    fn retrieval_result_omits_absent_error() {
        let result = RetrievalResult {
            query: "q".into(),
            results: vec![chunk(0.5)],
            error: None,
            metadata: RetrievalMetadata {
                query_time_ms: 1.5,
                total_results: 1,
                timestamp: 0.0,
                collection_name: "rag_embedding".into(),
            },
        };
        let value = serde_json::to_value(&result).expect("serialize");
        assert!(value.get("error").is_none());
        let first = &value["results"][0];
        for key in ["content", "url", "position", "similarity_score", "chunk_id", "created_at"] {
            assert!(first.get(key).is_some(), "missing {key}");
        }
        for key in ["query_time_ms", "total_results", "timestamp", "collection_name"] {
            assert!(value["metadata"].get(key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn payload_defaults_missing_fields() {
        let payload: ChunkPayload = serde_json::from_str(r#"{"content":"abc"}"#).expect("decode");
        assert_eq!(payload.content, "abc");
        assert_eq!(payload.url, "");
        assert_eq!(payload.position, 0);
    }
}
