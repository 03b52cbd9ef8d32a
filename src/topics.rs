//! Topic aggregation: per-topic counts and per-topic file listings.
//!
//! The store has no grouping or secondary index, so both aggregates are
//! computed client-side from an exhaustive scan. Points with no decodable
//! topic are skipped, never an error. A missing collection yields empty
//! aggregates because "no topics yet" is an expected state; store
//! connectivity failures propagate instead.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::config::ScanLimits;
use crate::errors::Error;
use crate::filters;
use crate::payload::ChunkMetadata;
use crate::scan::scan_collection;
use crate::store::VectorStore;

/// Aggregate view of one topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicSummary {
    pub name: String,
    /// Distinct `source_file` values among points carrying this topic.
    pub document_count: u64,
    /// Points carrying this topic. Always >= `document_count`.
    pub chunk_count: u64,
}

/// Aggregate view of one file within a topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicFile {
    pub filename: String,
    pub chunk_count: u64,
    /// Most recent upload timestamp among this file's points, when present.
    pub uploaded_at: Option<String>,
}

/// All topics in `collection`, sorted by name ascending.
///
/// # Errors
/// `Error::Store` on connectivity failure, `Error::ScanBudgetExceeded` when
/// the scan bounds are hit. A nonexistent collection is not an error.
pub async fn list_topics(
    store: &dyn VectorStore,
    collection: &str,
    limits: &ScanLimits,
) -> Result<Vec<TopicSummary>, Error> {
    info!(target: "topic_store::topics", collection, "list_topics: start");

    if !collection_exists(store, collection).await? {
        debug!(
            target: "topic_store::topics",
            collection, "list_topics: collection absent, returning empty"
        );
        return Ok(Vec::new());
    }

    let points = scan_collection(store, collection, None, limits).await?;
    let topics = fold_topics(points.iter().map(|p| &p.payload));

    info!(
        target: "topic_store::topics",
        collection,
        topics = topics.len(),
        "list_topics: done"
    );
    Ok(topics)
}

/// All files under `topic` in `collection`, deduplicated by filename and
/// sorted by filename.
///
/// # Errors
/// Same contract as [`list_topics`].
pub async fn topic_files(
    store: &dyn VectorStore,
    topic: &str,
    collection: &str,
    limits: &ScanLimits,
) -> Result<Vec<TopicFile>, Error> {
    info!(target: "topic_store::topics", collection, topic, "topic_files: start");

    if !collection_exists(store, collection).await? {
        return Ok(Vec::new());
    }

    let points =
        scan_collection(store, collection, Some(filters::topic_is(topic)), limits).await?;
    Ok(fold_topic_files(topic, points.iter().map(|p| &p.payload)))
}

async fn collection_exists(store: &dyn VectorStore, collection: &str) -> Result<bool, Error> {
    let names = store.list_collections().await?;
    Ok(names.iter().any(|n| n == collection))
}

/// Folds scanned payloads into sorted topic summaries. Pure function.
pub(crate) fn fold_topics<'a>(payloads: impl Iterator<Item = &'a Value>) -> Vec<TopicSummary> {
    // BTreeMap keeps the name-ascending output order for free.
    let mut acc: BTreeMap<String, (BTreeSet<String>, u64)> = BTreeMap::new();

    for payload in payloads {
        let meta = ChunkMetadata::decode(payload);
        let Some(topic) = meta.topic else {
            continue;
        };
        let entry = acc.entry(topic).or_default();
        entry.1 += 1;
        if let Some(file) = meta.source_file {
            entry.0.insert(file);
        }
    }

    acc.into_iter()
        .map(|(name, (files, chunks))| TopicSummary {
            name,
            document_count: files.len() as u64,
            chunk_count: chunks,
        })
        .collect()
}

/// Folds scanned payloads into a sorted, deduplicated file listing for
/// `topic`. Pure function.
///
/// When several points share a filename with different `uploaded_at` values,
/// the lexicographically greatest timestamp wins: uploads stamp RFC 3339
/// strings, which sort chronologically, so the result is the most recent
/// value regardless of scan order.
pub(crate) fn fold_topic_files<'a>(
    topic: &str,
    payloads: impl Iterator<Item = &'a Value>,
) -> Vec<TopicFile> {
    let mut acc: BTreeMap<String, (u64, Option<String>)> = BTreeMap::new();

    for payload in payloads {
        let meta = ChunkMetadata::decode(payload);
        if meta.topic.as_deref() != Some(topic) {
            continue;
        }
        let Some(filename) = meta.filename() else {
            continue;
        };
        let entry = acc.entry(filename.to_string()).or_default();
        entry.0 += 1;
        if meta.uploaded_at > entry.1 {
            entry.1 = meta.uploaded_at;
        }
    }

    acc.into_iter()
        .map(|(filename, (chunks, uploaded_at))| TopicFile {
            filename,
            chunk_count: chunks,
            uploaded_at,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeStore;
    use serde_json::json;

    fn payload(topic: &str, file: &str) -> Value {
        json!({"metadata": {"topic": topic, "source_file": file}})
    }

    #[test]
    fn fold_counts_documents_and_chunks() {
        let payloads = vec![
            payload("ml", "a.pdf"),
            payload("ml", "a.pdf"),
            payload("ml", "b.pdf"),
            payload("bio", "c.pdf"),
        ];
        let topics = fold_topics(payloads.iter());
        assert_eq!(
            topics,
            vec![
                TopicSummary {
                    name: "bio".into(),
                    document_count: 1,
                    chunk_count: 1
                },
                TopicSummary {
                    name: "ml".into(),
                    document_count: 2,
                    chunk_count: 3
                },
            ]
        );
    }

    #[test]
    fn fold_skips_points_without_topic() {
        let payloads = vec![
            payload("ml", "a.pdf"),
            json!({"page_content": "untagged"}),
            json!({"metadata": {"source_file": "orphan.pdf"}}),
        ];
        let topics = fold_topics(payloads.iter());
        assert_eq!(topics.len(), 1);
        assert_eq!(topics[0].chunk_count, 1);
    }

    #[test]
    fn fold_counts_legacy_flat_points() {
        let payloads = vec![
            payload("ml", "a.pdf"),
            json!({"topic": "ml", "source_file": "legacy.pdf"}),
        ];
        let topics = fold_topics(payloads.iter());
        assert_eq!(topics[0].chunk_count, 2);
        assert_eq!(topics[0].document_count, 2);
    }

    #[test]
    fn fold_files_keeps_most_recent_upload_regardless_of_order() {
        let older = json!({"metadata": {
            "topic": "ml", "source_file": "a.pdf", "uploaded_at": "2024-01-01T00:00:00Z"
        }});
        let newer = json!({"metadata": {
            "topic": "ml", "source_file": "a.pdf", "uploaded_at": "2024-06-01T00:00:00Z"
        }});

        for payloads in [vec![&older, &newer], vec![&newer, &older]] {
            let files = fold_topic_files("ml", payloads.into_iter());
            assert_eq!(files.len(), 1);
            assert_eq!(files[0].chunk_count, 2);
            assert_eq!(
                files[0].uploaded_at.as_deref(),
                Some("2024-06-01T00:00:00Z")
            );
        }
    }

    #[test]
    fn fold_files_filename_fallback_and_sorting() {
        let payloads = vec![
            json!({"metadata": {"topic": "ml", "original_filename": "z.pdf"}}),
            payload("ml", "a.pdf"),
            payload("bio", "other.pdf"),
        ];
        let files = fold_topic_files("ml", payloads.iter());
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].filename, "a.pdf");
        assert_eq!(files[1].filename, "z.pdf");
    }

    #[tokio::test]
    async fn pagination_does_not_under_count() {
        let store = FakeStore::new();
        for i in 0..5u64 {
            store.insert("docs", i, vec![1.0, 0.0], payload("ml", "a.pdf"));
        }
        let limits = ScanLimits {
            page_size: 2,
            ..Default::default()
        };
        let topics = list_topics(&store, "docs", &limits).await.unwrap();
        assert_eq!(topics.len(), 1);
        assert_eq!(topics[0].chunk_count, 5);
    }

    #[tokio::test]
    async fn missing_collection_is_empty_not_error() {
        let store = FakeStore::new();
        let topics = list_topics(&store, "nope", &ScanLimits::default())
            .await
            .unwrap();
        assert!(topics.is_empty());

        let files = topic_files(&store, "ml", "nope", &ScanLimits::default())
            .await
            .unwrap();
        assert!(files.is_empty());
    }

    #[tokio::test]
    async fn store_failure_is_an_error_not_empty() {
        let store = FakeStore::new();
        store.insert("docs", 1, vec![1.0, 0.0], payload("ml", "a.pdf"));
        store.fail_transport();
        let err = list_topics(&store, "docs", &ScanLimits::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Store(_)));
    }

    #[tokio::test]
    async fn topic_files_ignores_other_topics() {
        let store = FakeStore::new();
        store.insert("docs", 1, vec![1.0, 0.0], payload("ml", "a.pdf"));
        store.insert("docs", 2, vec![1.0, 0.0], payload("bio", "c.pdf"));
        let files = topic_files(&store, "ml", "docs", &ScanLimits::default())
            .await
            .unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].filename, "a.pdf");
    }
}
