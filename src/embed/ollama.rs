//! Ollama embedding provider.
//!
//! Calls the Ollama `/api/embeddings` endpoint via `reqwest` and enforces
//! the configured dimensionality on every response.

use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::config::EmbeddingConfig;
use crate::embed::EmbeddingsProvider;
use crate::errors::Error;

#[derive(Serialize)]
struct OllamaEmbedRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct OllamaEmbedResponse {
    embedding: Vec<f32>,
}

/// Ollama embedding provider (async).
#[derive(Clone)]
pub struct OllamaEmbedder {
    http: reqwest::Client,
    url: String,
    model: String,
    dim: usize,
}

impl OllamaEmbedder {
    /// Constructs a new embedder from configuration.
    ///
    /// # Errors
    /// Returns `Error::Embedding` if the HTTP client cannot be built.
    pub fn new(cfg: &EmbeddingConfig) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| Error::Embedding(format!("http client build: {e}")))?;

        Ok(Self {
            http,
            url: format!("{}/api/embeddings", cfg.ollama_url.trim_end_matches('/')),
            model: cfg.model.clone(),
            dim: cfg.dim,
        })
    }
}

impl EmbeddingsProvider for OllamaEmbedder {
    fn embed<'a>(
        &'a self,
        text: &'a str,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Vec<f32>, Error>> + Send + 'a>>
    {
        Box::pin(async move {
            let req = OllamaEmbedRequest {
                model: &self.model,
                prompt: text,
            };

            let resp = self
                .http
                .post(&self.url)
                .json(&req)
                .send()
                .await
                .map_err(|e| Error::Embedding(format!("POST {}: {e}", self.url)))?;

            if resp.status() != StatusCode::OK {
                let code = resp.status();
                let body = resp
                    .text()
                    .await
                    .unwrap_or_else(|_| "<failed to read body>".into());
                return Err(Error::Embedding(format!(
                    "ollama embeddings non-200: {code}; body: {body}"
                )));
            }

            let parsed: OllamaEmbedResponse = resp
                .json()
                .await
                .map_err(|e| Error::Embedding(format!("parse embeddings json: {e}")))?;

            if parsed.embedding.len() != self.dim {
                return Err(Error::Embedding(format!(
                    "embedding dim {} != expected {} (model: {})",
                    parsed.embedding.len(),
                    self.dim,
                    self.model
                )));
            }

            Ok(parsed.embedding)
        })
    }
}
