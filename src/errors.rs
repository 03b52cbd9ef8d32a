//! Unified error type for the topic-store crate.

use thiserror::Error;

/// Errors produced by topic-store operations.
///
/// "No data" is never represented here: an empty collection or a missing
/// collection on a read-aggregate resolves to an empty result at the call
/// site. Variants in this enum always mean the caller asked for something
/// that failed or does not exist.
#[derive(Debug, Error)]
pub enum Error {
    // ── Configuration / environment ──────────────────────────────────────────
    /// Configuration value is missing or invalid.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Failed to parse an environment variable into the expected type.
    #[error("failed to parse env variable: {key} = '{value}'")]
    EnvParse { key: String, value: String },

    // ── Qdrant client / transport ───────────────────────────────────────────
    /// Transport or server error from the vector store. Callers must treat
    /// this as "could not reach the store", never as an empty result.
    #[error("store error: {0}")]
    Store(String),

    // ── Embeddings backend ──────────────────────────────────────────────────
    /// Embedding backend failed to initialize or to embed the query.
    #[error("embedding error: {0}")]
    Embedding(String),

    // ── JSON / serialization ────────────────────────────────────────────────
    /// JSON (de)serialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    // ── Operation outcomes ──────────────────────────────────────────────────
    /// A targeted mutation named a topic that has no points.
    #[error("topic not found: '{topic}'")]
    TopicNotFound { topic: String },

    /// Search was asked for zero results.
    #[error("search limit must be >= 1")]
    InvalidLimit,

    /// A bulk rename completed on a strict subset of the matched points.
    /// Already-applied patches are not rolled back; retrying the rename is
    /// safe because each per-point patch is idempotent.
    #[error("topic rename applied to {updated} of {matched} points")]
    PartialRename { updated: u64, matched: u64 },

    /// A scan hit its configured point cap or deadline between pages.
    #[error("scan budget exceeded after {scanned} points")]
    ScanBudgetExceeded { scanned: u64 },
}
