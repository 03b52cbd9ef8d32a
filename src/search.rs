//! Topic-filtered similarity search.
//!
//! Embeds the query, optionally scopes it to a set of topics, and maps the
//! store's ranked hits into [`ScoredChunk`]s. Unlike the aggregates in
//! [`crate::topics`], a nonexistent collection here surfaces as a store
//! failure: searching a missing collection is a caller error, not an
//! expected "no topics yet" state.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::embed::EmbeddingsProvider;
use crate::errors::Error;
use crate::filters;
use crate::payload::ChunkMetadata;
use crate::store::VectorStore;

/// Metadata subset attached to a search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkRef {
    pub topic: Option<String>,
    pub source_file: Option<String>,
    pub page: Option<i64>,
}

/// One ranked search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredChunk {
    /// The chunk text (`page_content` in the stored payload).
    pub content: String,
    /// The store's native similarity, passed through unmodified. Collections
    /// indexed by this system use cosine distance, so this is a cosine
    /// similarity; callers must not re-normalize it.
    pub score: f32,
    pub metadata: ChunkRef,
}

/// Top-`limit` chunks for `query`, highest relevance first.
///
/// An empty `topics` slice means no topic filter; the result set is
/// identical to an unfiltered search. A non-empty slice restricts hits to
/// points whose topic is in the set.
///
/// # Errors
/// - `Error::InvalidLimit` when `limit` is zero.
/// - `Error::Embedding` when the query cannot be embedded.
/// - `Error::Store` on search failure, including a missing collection.
pub async fn search_chunks(
    store: &dyn VectorStore,
    embedder: &dyn EmbeddingsProvider,
    query: &str,
    collection: &str,
    topics: &[String],
    limit: u64,
) -> Result<Vec<ScoredChunk>, Error> {
    if limit == 0 {
        return Err(Error::InvalidLimit);
    }

    info!(
        target: "topic_store::search",
        collection,
        limit,
        topics = topics.len(),
        "search: start"
    );

    let query_vector = embedder.embed(query).await?;

    let filter = if topics.is_empty() {
        None
    } else {
        Some(filters::topic_any(topics))
    };

    let hits = store.search(collection, query_vector, filter, limit).await?;

    let chunks: Vec<ScoredChunk> = hits
        .into_iter()
        .map(|hit| {
            let meta = ChunkMetadata::decode(&hit.payload);
            let content = hit
                .payload
                .get("page_content")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            ScoredChunk {
                content,
                score: hit.score,
                metadata: ChunkRef {
                    topic: meta.topic,
                    source_file: meta.source_file,
                    page: meta.page,
                },
            }
        })
        .collect();

    debug!(
        target: "topic_store::search",
        collection,
        hits = chunks.len(),
        "search: done"
    );
    Ok(chunks)
}
