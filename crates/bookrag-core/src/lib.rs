//! Shared records, collaborator traits, errors and configuration for the
//! textbook retrieval workspace.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;
