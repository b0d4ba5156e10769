//! Blocking client for Cohere's `/v1/embed` endpoint.

use std::time::Duration;

use bookrag_core::config::EmbeddingSettings;
use bookrag_core::error::{Error, Result};
use bookrag_core::traits::EmbeddingProvider;
use reqwest::blocking::Client as HttpClient;
use serde::{Deserialize, Serialize};

pub struct CohereEmbedder {
    base_url: String,
    api_key: Option<String>,
    model: String,
    input_type: String,
    dim: usize,
    id: String,
    http: HttpClient,
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    texts: [&'a str; 1],
    model: &'a str,
    input_type: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    #[serde(default)]
    embeddings: Vec<Vec<f32>>,
}

impl CohereEmbedder {
    pub fn new(settings: &EmbeddingSettings) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(settings.timeout_secs.map(Duration::from_secs))
            .build()
            .map_err(|e| Error::InvalidConfig(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone().filter(|k| !k.trim().is_empty()),
            model: settings.model.clone(),
            input_type: settings.input_type.clone(),
            dim: settings.dim,
            id: format!("cohere:{}", settings.model),
            http,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/embed", self.base_url)
    }
}

impl EmbeddingProvider for CohereEmbedder {
    fn embedder_id(&self) -> &str {
        &self.id
    }

    fn dim(&self) -> Option<usize> {
        Some(self.dim)
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| Error::Embedding("no Cohere API key configured".into()))?;
        let request = EmbedRequest { texts: [text], model: &self.model, input_type: &self.input_type };

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .map_err(|e| Error::Embedding(format!("request to {} failed: {}", self.base_url, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(Error::Embedding(format!("Cohere returned {}: {}", status, body)));
        }

        let parsed: EmbedResponse = response
            .json()
            .map_err(|e| Error::Embedding(format!("failed to parse embed response: {}", e)))?;
        parsed
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| Error::Embedding("embed response contained no embeddings".into()))
    }
}
