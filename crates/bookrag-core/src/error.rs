use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Embedding failed: {0}")]
    Embedding(String),

    #[error("Vector backend unavailable: {0}")]
    Backend(String),

    #[error("Malformed backend response: {0}")]
    Decode(String),

    #[error("Operation failed: {0}")]
    Operation(String),
}

impl Error {
    /// True for failures that mean the vector backend could not be reached or
    /// answered badly, as opposed to the caller supplying bad input.
    pub fn is_backend(&self) -> bool {
        matches!(self, Error::Backend(_) | Error::Decode(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
