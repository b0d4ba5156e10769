//! Vector store backends: a Qdrant REST client and an embedded LanceDB table.

use bookrag_core::config::{Settings, StoreBackend};
use bookrag_core::error::Result;
use bookrag_core::traits::VectorStore;

pub mod lance;
pub mod qdrant;
pub mod schema;
pub mod table;

pub use lance::LanceStore;
pub use qdrant::QdrantStore;

/// Build the store selected by `settings.vector_store.backend`. Construction
/// does not touch the network; reachability is decided by `VectorStore::probe`.
pub fn open_store(settings: &Settings) -> Result<Box<dyn VectorStore>> {
    let collection = &settings.retrieval.collection_name;
    match settings.vector_store.backend {
        StoreBackend::Qdrant => Ok(Box::new(QdrantStore::new(&settings.vector_store, collection)?)),
        StoreBackend::Lancedb => Ok(Box::new(LanceStore::new(&settings.vector_store.lancedb_dir(), collection)?)),
    }
}
