//! Runs compositions off an async caller's event loop.
//!
//! The retriever performs blocking I/O, so async hosts hand each query to
//! tokio's blocking pool instead of calling `compose` on a runtime worker.

use std::sync::Arc;

use bookrag_core::types::AnswerResponse;
use tracing::error;

use crate::composer::{failure_response, AnswerComposer};

pub async fn compose_on_worker(composer: Arc<AnswerComposer>, query: String) -> AnswerResponse {
    match tokio::task::spawn_blocking(move || composer.compose(&query)).await {
        Ok(response) => response,
        Err(e) => {
            error!(error = %e, "composition worker did not complete");
            failure_response(e.to_string())
        }
    }
}
