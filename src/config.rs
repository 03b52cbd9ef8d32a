//! Configuration layer: reads runtime settings from environment variables
//! and exposes strongly typed configs for Qdrant, embeddings, and scans.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::Error;

/// Qdrant connectivity parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QdrantConfig {
    /// gRPC URL for Qdrant (e.g., "http://localhost:6334").
    pub url: String,
    /// Optional API key for Qdrant Cloud.
    pub api_key: Option<String>,
}

impl Default for QdrantConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:6334".to_string(),
            api_key: None,
        }
    }
}

/// Embedding backend configuration (Ollama).
///
/// The model and dimension must match what was used at index time. This
/// layer cannot validate that match; a mismatch is a silent correctness bug
/// inherited from misconfiguration upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Base URL of the Ollama server.
    pub ollama_url: String,
    /// Embedding model identifier (e.g., "nomic-embed-text").
    pub model: String,
    /// Embedding vector dimensionality (768 for nomic-embed-text).
    pub dim: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            ollama_url: "http://localhost:11434".to_string(),
            model: "nomic-embed-text".to_string(),
            dim: 768,
        }
    }
}

/// Bounds for full-collection scans.
///
/// The page size caps a single scroll request; the optional point cap and
/// deadline bound the whole loop and are checked cooperatively between
/// pages (the store offers no cancellation signal of its own).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanLimits {
    /// Points requested per scroll page.
    pub page_size: u32,
    /// Abort the scan once this many points have been read.
    pub max_points: Option<u64>,
    /// Abort the scan once this much wall time has elapsed.
    pub timeout: Option<Duration>,
}

impl Default for ScanLimits {
    fn default() -> Self {
        Self {
            page_size: 256,
            max_points: None,
            timeout: None,
        }
    }
}

/// Top-level runtime configuration for the topic store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Qdrant connectivity settings.
    pub qdrant: QdrantConfig,
    /// Embedding backend settings.
    pub embedding: EmbeddingConfig,
    /// Scan bounds for aggregates and bulk mutations.
    pub scan: ScanLimits,
}

impl Config {
    /// Build configuration from environment variables.
    ///
    /// Environment variables used:
    /// - `QDRANT_URL` (default: "http://localhost:6334")
    /// - `QDRANT_API_KEY` (optional)
    /// - `OLLAMA_URL` (default: "http://localhost:11434")
    /// - `EMBEDDING_MODEL` (default: "nomic-embed-text")
    /// - `EMBEDDING_DIM` (default: 768)
    /// - `SCAN_PAGE_SIZE` (default: 256)
    /// - `SCAN_MAX_POINTS` (optional)
    /// - `SCAN_TIMEOUT_SECS` (optional)
    ///
    /// # Errors
    /// Returns `Error::EnvParse` for unparsable numeric variables and
    /// `Error::Config` for invalid combinations.
    pub fn from_env() -> Result<Self, Error> {
        let qdrant = QdrantConfig {
            url: std::env::var("QDRANT_URL").unwrap_or_else(|_| "http://localhost:6334".into()),
            api_key: std::env::var("QDRANT_API_KEY").ok(),
        };

        let embedding = EmbeddingConfig {
            ollama_url: std::env::var("OLLAMA_URL")
                .unwrap_or_else(|_| "http://localhost:11434".into()),
            model: std::env::var("EMBEDDING_MODEL").unwrap_or_else(|_| "nomic-embed-text".into()),
            dim: read_u64_env("EMBEDDING_DIM")?.map(|v| v as usize).unwrap_or(768),
        };

        let scan = ScanLimits {
            page_size: read_u64_env("SCAN_PAGE_SIZE")?.map(|v| v as u32).unwrap_or(256),
            max_points: read_u64_env("SCAN_MAX_POINTS")?,
            timeout: read_u64_env("SCAN_TIMEOUT_SECS")?.map(Duration::from_secs),
        };

        let cfg = Self {
            qdrant,
            embedding,
            scan,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validates config values.
    pub fn validate(&self) -> Result<(), Error> {
        if self.qdrant.url.trim().is_empty() {
            return Err(Error::Config("QDRANT_URL is empty".into()));
        }
        if self.embedding.ollama_url.trim().is_empty() {
            return Err(Error::Config("OLLAMA_URL is empty".into()));
        }
        if self.embedding.dim == 0 {
            return Err(Error::Config("EMBEDDING_DIM must be > 0".into()));
        }
        if self.scan.page_size == 0 {
            return Err(Error::Config("SCAN_PAGE_SIZE must be > 0".into()));
        }
        Ok(())
    }
}

/// Reads an optional `u64` env var, erroring only when the value is present
/// but unparsable.
fn read_u64_env(key: &str) -> Result<Option<u64>, Error> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| Error::EnvParse {
                key: key.to_string(),
                value: raw,
            }),
        Err(_) => Ok(None),
    }
}
