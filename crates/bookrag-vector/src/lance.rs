//! Embedded vector store over a LanceDB chunk table.
//!
//! The table follows `schema::build_chunk_schema`. Calls are synchronous: the
//! store owns a current-thread runtime and blocks on each LanceDB future, so it
//! must not be called from inside another async runtime's worker thread.

use std::path::{Path, PathBuf};

use arrow_array::{Float32Array, Int32Array, RecordBatch, StringArray};
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use tokio::runtime::Runtime;

use bookrag_core::error::{Error, Result};
use bookrag_core::traits::VectorStore;
use bookrag_core::types::{ChunkPayload, ScoredPoint, StoredPoint};

use crate::table::{backend_err, open_db, table_exists};

pub struct LanceStore {
	uri: String,
	table_name: String,
	rt: Runtime,
}

impl LanceStore {
	pub fn new(db_path: &Path, table_name: &str) -> Result<Self> {
		let rt = tokio::runtime::Builder::new_current_thread()
			.enable_all()
			.build()
			.map_err(|e| Error::Operation(format!("failed to start LanceDB runtime: {}", e)))?;
		Ok(Self { uri: db_path.to_string_lossy().to_string(), table_name: table_name.to_string(), rt })
	}

	pub fn path(&self) -> PathBuf {
		PathBuf::from(&self.uri)
	}

	fn search_batches(&self, vector: &[f32], limit: usize) -> Result<Vec<RecordBatch>> {
		self.rt.block_on(async {
			let db = open_db(&self.uri).await?;
			let table = db.open_table(&self.table_name).execute().await.map_err(backend_err)?;
			let stream = table.vector_search(vector.to_vec()).map_err(backend_err)?.limit(limit).execute().await.map_err(backend_err)?;
			stream.map_err(backend_err).try_collect::<Vec<_>>().await
		})
	}

	fn scan_batches(&self) -> Result<Vec<RecordBatch>> {
		self.rt.block_on(async {
			let db = open_db(&self.uri).await?;
			let table = db.open_table(&self.table_name).execute().await.map_err(backend_err)?;
			let stream = table.query().execute().await.map_err(backend_err)?;
			stream.map_err(backend_err).try_collect::<Vec<_>>().await
		})
	}
}

impl VectorStore for LanceStore {
	fn collection_name(&self) -> &str { &self.table_name }

	fn probe(&self) -> Result<()> {
		let exists = self.rt.block_on(async {
			let db = open_db(&self.uri).await?;
			table_exists(&db, &self.table_name).await
		})?;
		if exists { Ok(()) } else { Err(Error::Backend(format!("table '{}' not found in {}", self.table_name, self.uri))) }
	}

	fn search(&self, vector: &[f32], limit: usize, score_threshold: f32) -> Result<Vec<ScoredPoint>> {
		if limit == 0 { return Ok(Vec::new()); }
		let mut hits = Vec::new();
		for batch in self.search_batches(vector, limit)? {
			let distances = batch.column_by_name("_distance").and_then(|c| c.as_any().downcast_ref::<Float32Array>());
			for (i, point) in rows(&batch)?.into_iter().enumerate() {
				// `_distance` is squared L2; on unit vectors that is 2 - 2cos.
				let score = match distances { Some(d) => (1.0 - d.value(i) / 2.0).clamp(0.0, 1.0), None => 0.0 };
				if score >= score_threshold { hits.push(ScoredPoint { id: point.id, score, payload: point.payload }); }
			}
		}
		hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
		hits.truncate(limit);
		Ok(hits)
	}

	fn scroll(&self, _page_size: usize) -> Result<Vec<StoredPoint>> {
		// LanceDB streams the whole table; batching is handled by the scan.
		let mut points = Vec::new();
		for batch in self.scan_batches()? { points.extend(rows(&batch)?); }
		Ok(points)
	}
}

fn string_col<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
	batch.column_by_name(name).and_then(|c| c.as_any().downcast_ref::<StringArray>()).ok_or_else(|| Error::Decode(format!("missing {} column", name)))
}

fn rows(batch: &RecordBatch) -> Result<Vec<StoredPoint>> {
	let ids = string_col(batch, "id")?;
	let contents = string_col(batch, "content")?;
	let urls = string_col(batch, "url")?;
	let created = string_col(batch, "created_at")?;
	let positions = batch.column_by_name("position").and_then(|c| c.as_any().downcast_ref::<Int32Array>()).ok_or_else(|| Error::Decode("missing position column".into()))?;
	Ok((0..batch.num_rows()).map(|i| StoredPoint {
		id: ids.value(i).to_string(),
		payload: ChunkPayload {
			content: contents.value(i).to_string(),
			url: urls.value(i).to_string(),
			position: u32::try_from(positions.value(i)).unwrap_or(0),
			created_at: created.value(i).to_string(),
		},
	}).collect())
}
