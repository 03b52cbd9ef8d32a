//! Topic-aware retrieval and metadata management over a Qdrant collection.
//!
//! A collection here is a flat bag of points, each an embedding plus a
//! free-form payload; this crate treats the payload's topic tag as a
//! lightweight relational dimension:
//! - topic-scoped similarity search;
//! - per-topic aggregates (document/chunk counts, file listings) computed by
//!   exhaustive client-side scans, since the store has no native grouping;
//! - bulk mutations (rename a topic across its points, delete a topic or a
//!   single file's points) with explicit partial-failure reporting.
//!
//! Mutations are not atomic across points: the store offers no multi-row
//! transaction, so a rename is a sequence of independent per-point patches
//! and a concurrent reader may observe a mix of old and new topic tags.
//!
//! The design is flat (no deep nesting) and splits responsibilities into
//! focused modules behind the [`TopicStore`] facade.

mod config;
mod embed;
mod errors;
mod filters;
mod mutate;
mod payload;
mod qdrant_facade;
mod scan;
mod search;
mod store;
mod topics;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{Config, EmbeddingConfig, QdrantConfig, ScanLimits};
pub use embed::EmbeddingsProvider;
pub use embed::ollama::OllamaEmbedder;
pub use errors::Error;
pub use mutate::{DeleteReport, RenameReport};
pub use payload::ChunkMetadata;
pub use qdrant_facade::QdrantFacade;
pub use search::{ChunkRef, ScoredChunk};
pub use store::{ScannedPoint, ScrollPage, SearchHit, VectorStore};
pub use topics::{TopicFile, TopicSummary};

use std::sync::Arc;

use tracing::trace;

/// High-level facade that wires configuration, the store client, and the
/// embedding provider.
///
/// This is the single entry point recommended for application code. The
/// handles are constructed once and shared by reference; the facade is
/// `Send + Sync` and safe to use from many concurrent operations.
pub struct TopicStore {
    cfg: Config,
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn EmbeddingsProvider>,
}

impl TopicStore {
    /// Connects to Qdrant and Ollama as described by `cfg`.
    ///
    /// # Errors
    /// Returns `Error::Config` on invalid configuration, `Error::Store` /
    /// `Error::Embedding` if a client cannot be constructed.
    pub fn connect(cfg: Config) -> Result<Self, Error> {
        cfg.validate()?;
        trace!("TopicStore::connect url={}", cfg.qdrant.url);
        let store = Arc::new(QdrantFacade::new(&cfg.qdrant)?);
        let embedder = Arc::new(OllamaEmbedder::new(&cfg.embedding)?);
        Ok(Self {
            cfg,
            store,
            embedder,
        })
    }

    /// Builds a facade from pre-constructed collaborators. This is the
    /// dependency-injection seam: tests pass fakes here.
    pub fn with_parts(
        cfg: Config,
        store: Arc<dyn VectorStore>,
        embedder: Arc<dyn EmbeddingsProvider>,
    ) -> Self {
        Self {
            cfg,
            store,
            embedder,
        }
    }

    /// All topics in `collection` with document and chunk counts, sorted by
    /// name. A nonexistent collection yields an empty list, not an error.
    ///
    /// # Errors
    /// `Error::Store` on connectivity failure; `Error::ScanBudgetExceeded`
    /// when the configured scan bounds are hit.
    pub async fn list_topics(&self, collection: &str) -> Result<Vec<TopicSummary>, Error> {
        topics::list_topics(self.store.as_ref(), collection, &self.cfg.scan).await
    }

    /// All files under `topic`, deduplicated by filename and sorted.
    ///
    /// # Errors
    /// Same contract as [`Self::list_topics`].
    pub async fn topic_files(
        &self,
        topic: &str,
        collection: &str,
    ) -> Result<Vec<TopicFile>, Error> {
        topics::topic_files(self.store.as_ref(), topic, collection, &self.cfg.scan).await
    }

    /// Top-`limit` chunks for `query`, optionally scoped to `topics`.
    /// An empty `topics` slice is identical to no filter.
    ///
    /// # Errors
    /// `Error::InvalidLimit` for a zero limit; `Error::Embedding` or
    /// `Error::Store` on collaborator failures. A missing collection is a
    /// store failure here, unlike the read-aggregates.
    pub async fn search(
        &self,
        query: &str,
        collection: &str,
        topics: &[String],
        limit: u64,
    ) -> Result<Vec<ScoredChunk>, Error> {
        search::search_chunks(
            self.store.as_ref(),
            self.embedder.as_ref(),
            query,
            collection,
            topics,
            limit,
        )
        .await
    }

    /// Deletes all chunks of `filename` under `topic`. Idempotent.
    ///
    /// # Errors
    /// `Error::Store` on connectivity failure.
    pub async fn delete_file(
        &self,
        topic: &str,
        filename: &str,
        collection: &str,
    ) -> Result<DeleteReport, Error> {
        mutate::delete_file(self.store.as_ref(), topic, filename, collection, &self.cfg.scan)
            .await
    }

    /// Deletes all chunks of `topic`. Idempotent.
    ///
    /// # Errors
    /// `Error::Store` on connectivity failure.
    pub async fn delete_topic(
        &self,
        topic: &str,
        collection: &str,
    ) -> Result<DeleteReport, Error> {
        mutate::delete_topic(self.store.as_ref(), topic, collection, &self.cfg.scan).await
    }

    /// Renames `old` to `new` across every point carrying the topic.
    ///
    /// # Errors
    /// `Error::TopicNotFound` when no point carries `old`;
    /// `Error::PartialRename` when a strict subset of the matched points was
    /// patched (applied patches are kept, retrying is safe);
    /// `Error::Store` on scan failure.
    pub async fn rename_topic(
        &self,
        old: &str,
        new: &str,
        collection: &str,
    ) -> Result<RenameReport, Error> {
        mutate::rename_topic(self.store.as_ref(), old, new, collection, &self.cfg.scan).await
    }

    /// Names of all collections in the store.
    ///
    /// # Errors
    /// `Error::Store` on connectivity failure.
    pub async fn list_collections(&self) -> Result<Vec<String>, Error> {
        self.store.list_collections().await
    }

    /// Drops a collection. Returns `true` if it existed.
    ///
    /// # Errors
    /// `Error::Store` on connectivity failure.
    pub async fn delete_collection(&self, name: &str) -> Result<bool, Error> {
        self.store.delete_collection(name).await
    }
}
