#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bookrag_core::config::RetrievalSettings;
use bookrag_core::error::{Error, Result};
use bookrag_core::traits::{EmbeddingProvider, VectorStore};
use bookrag_core::types::{ChunkPayload, ScoredPoint, StoredPoint};
use bookrag_retrieval::Retriever;

#[derive(Clone, Default)]
pub struct Calls {
    pub embed: Arc<AtomicUsize>,
    pub search: Arc<AtomicUsize>,
}

impl Calls {
    pub fn embeds(&self) -> usize { self.embed.load(Ordering::SeqCst) }
    pub fn searches(&self) -> usize { self.search.load(Ordering::SeqCst) }
}

pub enum EmbedBehavior {
    Vector(Vec<f32>),
    Empty,
    Fail,
    Panic,
}

pub struct ScriptedEmbedder {
    pub behavior: EmbedBehavior,
    pub calls: Calls,
}

impl EmbeddingProvider for ScriptedEmbedder {
    fn embedder_id(&self) -> &str { "scripted" }
    fn dim(&self) -> Option<usize> { None }
    fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        self.calls.embed.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            EmbedBehavior::Vector(v) => Ok(v.clone()),
            EmbedBehavior::Empty => Ok(Vec::new()),
            EmbedBehavior::Fail => Err(Error::Embedding("provider rejected the request".into())),
            EmbedBehavior::Panic => panic!("embedding provider crashed"),
        }
    }
}

pub struct ScriptedStore {
    pub reachable: bool,
    pub fail_search: bool,
    pub points: Vec<ScoredPoint>,
    pub calls: Calls,
}

impl VectorStore for ScriptedStore {
    fn collection_name(&self) -> &str { "rag_embedding" }
    fn probe(&self) -> Result<()> {
        if self.reachable { Ok(()) } else { Err(Error::Backend("connection refused".into())) }
    }
    fn search(&self, _vector: &[f32], _limit: usize, score_threshold: f32) -> Result<Vec<ScoredPoint>> {
        self.calls.search.fetch_add(1, Ordering::SeqCst);
        if self.fail_search {
            return Err(Error::Backend("timed out".into()));
        }
        Ok(self.points.iter().filter(|p| p.score >= score_threshold).cloned().collect())
    }
    fn scroll(&self, _page_size: usize) -> Result<Vec<StoredPoint>> {
        Ok(self.points.iter().map(|p| StoredPoint { id: p.id.clone(), payload: p.payload.clone() }).collect())
    }
}

pub fn point(id: &str, score: f32, url: &str) -> ScoredPoint {
    ScoredPoint {
        id: id.to_string(),
        score,
        payload: ChunkPayload {
            content: format!("Passage {id} about robots."),
            url: url.to_string(),
            position: 0,
            created_at: "2025-12-01".to_string(),
        },
    }
}

pub fn retriever(embed: EmbedBehavior, reachable: bool, fail_search: bool, points: Vec<ScoredPoint>) -> (Retriever, Calls) {
    let calls = Calls::default();
    let embedder = ScriptedEmbedder { behavior: embed, calls: calls.clone() };
    let store = ScriptedStore { reachable, fail_search, points, calls: calls.clone() };
    (Retriever::new(RetrievalSettings::default(), Box::new(embedder), Box::new(store)), calls)
}

/// Backend down from the start: every query goes to the local corpus.
pub fn offline_retriever() -> (Retriever, Calls) {
    retriever(EmbedBehavior::Vector(vec![1.0]), false, false, Vec::new())
}
