//! LanceDB connection helpers.
//!
//! Opens a database directory, checks for tables and appends record batches.

use lancedb::{connect, Connection};
use arrow_array::{RecordBatch, RecordBatchIterator};

use bookrag_core::error::{Error, Result};

pub(crate) fn backend_err(e: impl std::fmt::Display) -> Error { Error::Backend(e.to_string()) }

pub async fn open_db(uri: &str) -> Result<Connection> {
    connect(uri).execute().await.map_err(backend_err)
}

pub async fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    let names = conn.table_names().execute().await.map_err(backend_err)?;
    Ok(names.iter().any(|n| n == name))
}

/// Create `name` from `batch`, or append to it when it already exists.
/// Used to seed tables in tests; the store itself never writes.
pub async fn write_batch(conn: &Connection, name: &str, batch: RecordBatch) -> Result<()> {
    let schema = batch.schema();
    let reader = Box::new(RecordBatchIterator::new(vec![Ok(batch)].into_iter(), schema));
    if table_exists(conn, name).await? {
        conn.open_table(name).execute().await.map_err(backend_err)?.add(reader).execute().await.map_err(backend_err)?;
    } else {
        conn.create_table(name, reader).execute().await.map_err(backend_err)?;
    }
    Ok(())
}
