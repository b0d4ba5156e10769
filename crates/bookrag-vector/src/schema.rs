//! Arrow layout of the LanceDB chunk table.
//!
//! Only the read path is part of the store; `points_to_record_batch` exists to
//! seed test tables and is not an ingestion pipeline.

use arrow_array::{FixedSizeListArray, Int32Array, RecordBatch, StringArray};
use arrow_schema::{DataType, Field, Schema};
use std::sync::Arc;

use bookrag_core::error::{Error, Result};
use bookrag_core::types::StoredPoint;

/// Column layout of a chunk table: payload fields plus the vector.
pub fn build_chunk_schema(dim: i32) -> Arc<Schema> {
	Arc::new(Schema::new(vec![
		Field::new("id", DataType::Utf8, false),
		Field::new("content", DataType::Utf8, false),
		Field::new("url", DataType::Utf8, false),
		Field::new("position", DataType::Int32, false),
		Field::new("created_at", DataType::Utf8, false),
		Field::new("vector", DataType::FixedSizeList(Arc::new(Field::new("item", DataType::Float32, true)), dim), true),
	]))
}

/// Pack points and their vectors into one batch matching `build_chunk_schema(dim)`.
pub fn points_to_record_batch(points: &[StoredPoint], vectors: &[Vec<f32>], dim: i32) -> Result<RecordBatch> {
	if points.len() != vectors.len() {
		return Err(Error::Operation(format!("{} points but {} vectors", points.len(), vectors.len())));
	}
	if let Some(bad) = vectors.iter().find(|v| v.len() != dim as usize) {
		return Err(Error::Operation(format!("vector has {} dims, table expects {}", bad.len(), dim)));
	}
	let mut ids = Vec::new(); let mut contents = Vec::new(); let mut urls = Vec::new(); let mut positions = Vec::new(); let mut created = Vec::new();
	for p in points { ids.push(p.id.clone()); contents.push(p.payload.content.clone()); urls.push(p.payload.url.clone()); positions.push(p.payload.position as i32); created.push(p.payload.created_at.clone()); }
	let vecs: Vec<Option<Vec<Option<f32>>>> = vectors.iter().map(|v| Some(v.iter().map(|&x| Some(x)).collect())).collect();
	let batch = RecordBatch::try_new(build_chunk_schema(dim), vec![
		Arc::new(StringArray::from(ids)),
		Arc::new(StringArray::from(contents)),
		Arc::new(StringArray::from(urls)),
		Arc::new(Int32Array::from(positions)),
		Arc::new(StringArray::from(created)),
		Arc::new(FixedSizeListArray::from_iter_primitive::<arrow_array::types::Float32Type, _, _>(vecs.into_iter(), dim)),
	]).map_err(|e| Error::Operation(format!("failed to build record batch: {}", e)))?;
	Ok(batch)
}
