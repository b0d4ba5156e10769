//! Blocking client for the Qdrant REST API.

use std::time::Duration;

use reqwest::blocking::{Client as HttpClient, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use bookrag_core::config::VectorStoreSettings;
use bookrag_core::error::{Error, Result};
use bookrag_core::traits::VectorStore;
use bookrag_core::types::{ChunkPayload, ScoredPoint, StoredPoint};

pub struct QdrantStore {
    base_url: String,
    api_key: Option<String>,
    collection: String,
    http: HttpClient,
}

/// Every Qdrant response wraps its body in `result`.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    result: T,
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    vector: &'a [f32],
    limit: usize,
    score_threshold: f32,
    with_payload: bool,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    id: Value,
    score: f32,
    #[serde(default)]
    payload: Option<ChunkPayload>,
}

#[derive(Debug, Serialize)]
struct ScrollRequest {
    limit: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<Value>,
    with_payload: bool,
    with_vector: bool,
}

#[derive(Debug, Deserialize)]
struct ScrollPage {
    points: Vec<ScrollPoint>,
    #[serde(default)]
    next_page_offset: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ScrollPoint {
    id: Value,
    #[serde(default)]
    payload: Option<ChunkPayload>,
}

impl QdrantStore {
    pub fn new(settings: &VectorStoreSettings, collection: &str) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(settings.timeout_secs.map(Duration::from_secs))
            .build()
            .map_err(|e| Error::InvalidConfig(format!("failed to build HTTP client: {}", e)))?;
        let base_url = if settings.url.starts_with("http://") || settings.url.starts_with("https://") {
            settings.url.trim_end_matches('/').to_string()
        } else {
            format!("http://{}", settings.url.trim_end_matches('/'))
        };
        Ok(Self {
            base_url,
            api_key: settings.api_key.clone().filter(|k| !k.trim().is_empty()),
            collection: collection.to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn with_auth(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.header("api-key", key),
            None => request,
        }
    }

    fn points_url(&self, action: &str) -> String {
        format!("{}/collections/{}/points/{}", self.base_url, self.collection, action)
    }

    fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self
            .with_auth(request)
            .send()
            .map_err(|e| Error::Backend(format!("request to {} failed: {}", self.base_url, e)))?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(Error::Backend(format!("Qdrant returned {}: {}", status, body)));
        }
        let envelope: Envelope<T> = response
            .json()
            .map_err(|e| Error::Decode(format!("failed to parse Qdrant response: {}", e)))?;
        Ok(envelope.result)
    }
}

impl VectorStore for QdrantStore {
    fn collection_name(&self) -> &str {
        &self.collection
    }

    fn probe(&self) -> Result<()> {
        let url = format!("{}/collections", self.base_url);
        self.send::<Value>(self.http.get(url)).map(|_| ())
    }

    fn search(&self, vector: &[f32], limit: usize, score_threshold: f32) -> Result<Vec<ScoredPoint>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let body = SearchRequest { vector, limit, score_threshold, with_payload: true };
        let hits: Vec<SearchHit> = self.send(self.http.post(self.points_url("search")).json(&body))?;
        Ok(hits.into_iter().map(SearchHit::into_point).collect())
    }

    fn scroll(&self, page_size: usize) -> Result<Vec<StoredPoint>> {
        let mut points = Vec::new();
        let mut offset = None;
        loop {
            let body = ScrollRequest { limit: page_size.max(1), offset: offset.take(), with_payload: true, with_vector: false };
            let page: ScrollPage = self.send(self.http.post(self.points_url("scroll")).json(&body))?;
            points.extend(page.points.into_iter().map(|p| StoredPoint {
                id: point_id(&p.id),
                payload: p.payload.unwrap_or_default(),
            }));
            match page.next_page_offset {
                Some(next) if !next.is_null() => offset = Some(next),
                _ => break,
            }
        }
        Ok(points)
    }
}

impl SearchHit {
    fn into_point(self) -> ScoredPoint {
        ScoredPoint { id: point_id(&self.id), score: self.score, payload: self.payload.unwrap_or_default() }
    }
}

/// Qdrant ids are unsigned integers or UUID strings; both become opaque strings.
fn point_id(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}
