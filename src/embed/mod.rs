//! Embedding provider seam.
//!
//! Async is required because real providers (Ollama, OpenAI, etc.) perform
//! HTTP requests.

use std::{future::Future, pin::Pin};

use crate::errors::Error;

/// Provider interface for query embedding.
///
/// The same model and dimensionality used at index time must be used at
/// query time. This layer cannot validate that match; a mismatch is a
/// silent correctness bug inherited from upstream misconfiguration.
pub trait EmbeddingsProvider: Send + Sync {
    /// Maps query text to a fixed-length vector.
    fn embed<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, Error>> + Send + 'a>>;
}

pub mod ollama;
