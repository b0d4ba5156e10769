//! Keyword/substring relevance heuristic over the local corpus.
//!
//! Per entry: `+0.3` for every keyword found in the lowercased query, `+0.1`
//! for every query token longer than three characters found in the lowercased
//! content. Entries scoring `<= 0` are dropped, the rest are capped at `0.95`
//! and returned best first, ties in corpus order.

use std::hash::Hasher;

use bookrag_core::types::Chunk;
use twox_hash::XxHash64;

use crate::corpus::{CorpusEntry, LocalCorpus, CORPUS_SEEDED_AT};

pub const KEYWORD_WEIGHT: f64 = 0.3;
pub const TOKEN_WEIGHT: f64 = 0.1;
pub const MIN_TOKEN_CHARS: usize = 4;
/// Fallback scores stay below what an exact vector match would get.
pub const SCORE_CAP: f64 = 0.95;

#[derive(Debug, Clone, Default)]
pub struct FallbackScorer {
    corpus: LocalCorpus,
}

impl FallbackScorer {
    pub fn new(corpus: LocalCorpus) -> Self {
        Self { corpus }
    }

    pub fn corpus(&self) -> &LocalCorpus {
        &self.corpus
    }

    pub fn score(&self, query: &str, top_k: usize) -> Vec<Chunk> {
        let query_lower = query.to_lowercase();
        let tokens: Vec<&str> = query_lower
            .split_whitespace()
            .filter(|t| t.chars().count() >= MIN_TOKEN_CHARS)
            .collect();

        // Scores are summed, capped and ranked in f64; sums such as
        // 0.1 + 0.1 + 0.1 and 0.3 only separate at that width.
        let mut scored: Vec<(f64, &CorpusEntry)> = self
            .corpus
            .entries()
            .iter()
            .filter_map(|entry| {
                let score = entry_score(entry, &query_lower, &tokens);
                (score > 0.0).then(|| (score.min(SCORE_CAP), entry))
            })
            .collect();

        // `sort_by` is stable, so equal scores keep corpus order.
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        scored.into_iter().map(|(score, entry)| to_chunk(entry, score)).collect()
    }
}

fn entry_score(entry: &CorpusEntry, query_lower: &str, tokens: &[&str]) -> f64 {
    let content = entry.content.to_lowercase();
    let mut score = 0.0f64;
    for keyword in entry.keywords {
        if query_lower.contains(&keyword.to_lowercase()) {
            score += KEYWORD_WEIGHT;
        }
    }
    for token in tokens {
        if content.contains(token) {
            score += TOKEN_WEIGHT;
        }
    }
    score
}

fn to_chunk(entry: &CorpusEntry, score: f64) -> Chunk {
    Chunk {
        content: entry.content.to_string(),
        url: entry.url.to_string(),
        position: entry.position,
        similarity_score: score as f32,
        chunk_id: fallback_chunk_id(entry.content),
        created_at: CORPUS_SEEDED_AT.to_string(),
    }
}

/// Stable four-digit id derived from the content hash.
pub fn fallback_chunk_id(content: &str) -> String {
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(content.as_bytes());
    (hasher.finish() % 10_000).to_string()
}
