//! Configuration loader and path helpers.
//!
//! Uses Figment to merge built-in defaults + `config.toml` + `config.<env>.toml`
//! + `APP_*` env vars (nested keys split on `__`) + the conventional
//! `COHERE_API_KEY` / `QDRANT_URL` / `QDRANT_API_KEY` variables.
//! Only binaries call the loaders; library code receives a `Settings` value.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub retrieval: RetrievalSettings,
    pub embedding: EmbeddingSettings,
    pub vector_store: VectorStoreSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalSettings {
    pub collection_name: String,
    pub default_top_k: usize,
    pub default_threshold: f32,
    /// Run the content check on every response.
    pub verify_content: bool,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            collection_name: "rag_embedding".to_string(),
            default_top_k: 5,
            default_threshold: 0.0,
            verify_content: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    Cohere,
    /// Deterministic token hashing; no network, no model files.
    Hashing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    pub provider: EmbeddingBackend,
    pub model: String,
    pub input_type: String,
    pub api_key: Option<String>,
    pub base_url: String,
    pub dim: usize,
    pub timeout_secs: Option<u64>,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: EmbeddingBackend::Cohere,
            model: "embed-multilingual-v3.0".to_string(),
            input_type: "search_query".to_string(),
            api_key: None,
            base_url: "https://api.cohere.com".to_string(),
            dim: 1024,
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Qdrant,
    Lancedb,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorStoreSettings {
    pub backend: StoreBackend,
    pub url: String,
    pub api_key: Option<String>,
    pub lancedb_path: String,
    /// Per-request client timeout. Absent means requests may block indefinitely.
    pub timeout_secs: Option<u64>,
}

impl Default for VectorStoreSettings {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Qdrant,
            url: "http://localhost:6333".to_string(),
            api_key: None,
            lancedb_path: "~/.bookrag/lancedb".to_string(),
            timeout_secs: None,
        }
    }
}

impl VectorStoreSettings {
    pub fn lancedb_dir(&self) -> PathBuf {
        expand_path(&self.lancedb_path)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self { filter: "info".to_string() }
    }
}

impl Settings {
    /// Load from the working directory for the environment named by `RUST_ENV`.
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        Self::load_from(Path::new("."), &env_name)
    }

    /// Load `config.toml` and the env-specific overlay found under `base`.
    pub fn load_from(base: &Path, env_name: &str) -> anyhow::Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(resolve_with_base(base, "config.toml")));
        if let Some(overlay) = env_overlay(env_name) {
            figment = figment.merge(Toml::file(resolve_with_base(base, overlay)));
        }
        figment = figment
            .merge(Env::prefixed("APP_").split("__"))
            .merge(Env::raw().only(&["COHERE_API_KEY"]).map(|_| "embedding.api_key".into()))
            .merge(Env::raw().only(&["QDRANT_URL"]).map(|_| "vector_store.url".into()))
            .merge(Env::raw().only(&["QDRANT_API_KEY"]).map(|_| "vector_store.api_key".into()));

        let settings = Self::from_figment(figment)
            .map_err(|e| anyhow::anyhow!("Failed to load config for env '{}': {}", env_name, e))?;
        Ok(settings)
    }

    /// Extract and validate settings from an already assembled figment.
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let settings: Settings = figment
            .extract()
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.retrieval.collection_name.trim().is_empty() {
            return Err(Error::InvalidConfig("retrieval.collection_name is empty".into()));
        }
        if self.retrieval.default_top_k == 0 {
            return Err(Error::InvalidConfig("retrieval.default_top_k must be positive".into()));
        }
        let threshold = self.retrieval.default_threshold;
        if threshold.is_nan() || threshold < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "retrieval.default_threshold must be >= 0, got {}",
                threshold
            )));
        }
        if self.embedding.dim == 0 {
            return Err(Error::InvalidConfig("embedding.dim must be positive".into()));
        }
        Ok(())
    }
}

fn env_overlay(env_name: &str) -> Option<&'static str> {
    match env_name {
        "dev" | "development" => Some("config.dev.toml"),
        "prod" | "production" => Some("config.prod.toml"),
        "test" | "testing" => Some("config.test.toml"),
        _ => None,
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
