//! Retrieval and answer composition over the textbook corpus.
//!
//! `Retriever` embeds the query and searches the vector store, degrading to a
//! keyword scorer over `LocalCorpus` whenever the store is unreachable.
//! `AnswerComposer` turns the ranked chunks into an attributed answer.

pub mod composer;
pub mod corpus;
pub mod fallback;
pub mod retriever;
pub mod worker;

pub use composer::AnswerComposer;
pub use corpus::LocalCorpus;
pub use fallback::FallbackScorer;
pub use retriever::{verify_content_accuracy, Retriever};
pub use worker::compose_on_worker;
