//! Turns retrieved chunks into an extractive answer with attribution.
//!
//! The answer is the top-ranked chunk verbatim plus its source; text from
//! several chunks is never merged. Failures below this layer, panics included,
//! become a fixed apologetic response.

use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use bookrag_core::error::{Error, Result};
use bookrag_core::types::{AnswerResponse, Chunk, Confidence};
use tracing::{debug, error, info, warn};

use crate::retriever::{preview, Retriever};

pub const ERROR_ANSWER: &str = "Sorry, I encountered an error processing your request.";
pub const CONTEXT_PREVIEW_CHARS: usize = 300;

pub struct AnswerComposer {
    retriever: Retriever,
}

impl AnswerComposer {
    pub fn new(retriever: Retriever) -> Self {
        Self { retriever }
    }

    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    /// Never fails: errors and panics yield `ERROR_ANSWER` with empty sources.
    pub fn compose(&self, query: &str) -> AnswerResponse {
        let started = Instant::now();
        info!(query = %preview(query, 50), "processing query through answer composer");

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.try_compose(query, started)));
        match outcome {
            Ok(Ok(response)) => {
                info!(elapsed_ms = response.query_time_ms, confidence = %response.confidence, "query processed");
                response
            }
            Ok(Err(e)) => {
                error!(error = %e, "error processing query");
                error_response(e.to_string(), started)
            }
            Err(payload) => {
                let reason = panic_message(payload.as_ref());
                error!(%reason, "query processing panicked");
                error_response(reason, started)
            }
        }
    }

    fn try_compose(&self, query: &str, started: Instant) -> Result<AnswerResponse> {
        let retrieval = self.retriever.retrieve_default(query);
        if let Some(reason) = &retrieval.error {
            warn!(%reason, "retrieval returned no usable chunks");
        }
        let matched_chunks = retrieval.results;

        let sources = collect_sources(&matched_chunks);
        let context = format_context(&matched_chunks, query)?;
        debug!(%context, "composed context");
        let answer = generate_answer(query, &matched_chunks);
        let confidence = Confidence::from_chunks(&matched_chunks);

        Ok(AnswerResponse {
            answer,
            sources,
            matched_chunks,
            query_time_ms: elapsed_ms(started),
            confidence,
            error: None,
        })
    }
}

/// Unique non-empty urls across `chunks`.
pub fn collect_sources(chunks: &[Chunk]) -> BTreeSet<String> {
    chunks.iter().filter(|c| !c.url.is_empty()).map(|c| c.url.clone()).collect()
}

/// Human-readable context block: a header naming the query, then one section
/// per chunk with its 1-based index, relevance, source and a content preview.
pub fn format_context(chunks: &[Chunk], query: &str) -> Result<String> {
    if chunks.is_empty() {
        return Ok(format!("No relevant information found for: {}", query));
    }
    let mut out = format!("Based on the following information relevant to '{}':", query);
    for (i, chunk) in chunks.iter().enumerate() {
        write!(
            out,
            "\n\n[Source {}] (Relevance: {:.2}%)\nFrom: {}\nContent: {}...",
            i + 1,
            chunk.similarity_score * 100.0,
            chunk.url,
            preview(&chunk.content, CONTEXT_PREVIEW_CHARS)
        )
        .map_err(|e| Error::Operation(format!("failed to format context: {}", e)))?;
    }
    Ok(out)
}

pub fn generate_answer(query: &str, chunks: &[Chunk]) -> String {
    match chunks.first() {
        Some(top) => format!("{}\n\n📚 Source: {}", top.content, top.url),
        None => not_found_answer(query),
    }
}

pub fn not_found_answer(query: &str) -> String {
    format!(
        "I couldn't find specific information about '{}' in the textbook. Please try rephrasing your question or search for related topics.",
        query
    )
}

fn error_response(reason: String, started: Instant) -> AnswerResponse {
    AnswerResponse {
        answer: ERROR_ANSWER.to_string(),
        sources: BTreeSet::new(),
        matched_chunks: Vec::new(),
        query_time_ms: elapsed_ms(started),
        confidence: Confidence::Low,
        error: Some(reason),
    }
}

pub(crate) fn failure_response(reason: String) -> AnswerResponse {
    error_response(reason, Instant::now())
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
