//! Bulk structural mutations: delete a file's points, delete a topic,
//! rename a topic across all its points.
//!
//! The store offers no multi-point transaction primitive, so none of these
//! operations is atomic. A rename is a sequence of independent per-point
//! patches; a reader racing it may observe a mix of old and new topic tags.
//! That eventual-consistency window is accepted and documented rather than
//! hidden behind a false appearance of atomicity.

use qdrant_client::qdrant::Filter;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::config::ScanLimits;
use crate::errors::Error;
use crate::filters;
use crate::scan::scan_collection;
use crate::store::VectorStore;

/// Outcome of a predicate delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteReport {
    pub deleted: u64,
}

/// Outcome of a fully successful topic rename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameReport {
    /// Points whose decoded topic matched the old name.
    pub matched: u64,
    /// Points successfully patched. Equal to `matched` on success; a strict
    /// subset surfaces as [`Error::PartialRename`] instead.
    pub updated: u64,
}

/// Deletes all points of `topic` that came from `filename`.
///
/// Idempotent: a second call with nothing left to delete returns
/// `deleted = 0` with success.
pub async fn delete_file(
    store: &dyn VectorStore,
    topic: &str,
    filename: &str,
    collection: &str,
    limits: &ScanLimits,
) -> Result<DeleteReport, Error> {
    info!(
        target: "topic_store::mutate",
        collection, topic, filename, "delete_file: start"
    );
    delete_matching(store, collection, filters::file_in_topic(topic, filename), limits).await
}

/// Deletes all points carrying `topic`. Idempotent, same contract as
/// [`delete_file`].
pub async fn delete_topic(
    store: &dyn VectorStore,
    topic: &str,
    collection: &str,
    limits: &ScanLimits,
) -> Result<DeleteReport, Error> {
    info!(target: "topic_store::mutate", collection, topic, "delete_topic: start");
    delete_matching(store, collection, filters::topic_is(topic), limits).await
}

/// The store's predicate delete reports no affected count, so matching
/// points are counted by a filtered scan first. The count can race a
/// concurrent writer; accepted under the documented consistency model.
async fn delete_matching(
    store: &dyn VectorStore,
    collection: &str,
    filter: Filter,
    limits: &ScanLimits,
) -> Result<DeleteReport, Error> {
    let matched = scan_collection(store, collection, Some(filter.clone()), limits)
        .await?
        .len() as u64;

    if matched == 0 {
        return Ok(DeleteReport { deleted: 0 });
    }

    store.delete_by_filter(collection, filter).await?;

    info!(
        target: "topic_store::mutate",
        collection,
        deleted = matched,
        "delete: done"
    );
    Ok(DeleteReport { deleted: matched })
}

/// Renames `old` to `new` across every point carrying the topic.
///
/// Two-phase saga:
/// 1. **Scan**: page the collection exhaustively collecting every point whose
///    decoded topic equals `old`. Zero points is `Error::TopicNotFound`.
/// 2. **Mutate**: patch each point's payload in place, topic only, other
///    fields untouched. Patches are independent remote calls; one failure
///    does not abort the rest.
///
/// Full success returns the report with `updated == matched`. A strict
/// subset returns [`Error::PartialRename`] carrying both counts; applied
/// patches are not rolled back, and retrying is safe because each patch is
/// idempotent.
pub async fn rename_topic(
    store: &dyn VectorStore,
    old: &str,
    new: &str,
    collection: &str,
    limits: &ScanLimits,
) -> Result<RenameReport, Error> {
    info!(
        target: "topic_store::mutate",
        collection, old, new, "rename_topic: scan phase"
    );

    let points =
        scan_collection(store, collection, Some(filters::topic_is(old)), limits).await?;
    let matched = points.len() as u64;

    if matched == 0 {
        return Err(Error::TopicNotFound {
            topic: old.to_string(),
        });
    }

    info!(
        target: "topic_store::mutate",
        collection, matched, "rename_topic: mutate phase"
    );

    let mut updated = 0u64;
    for point in points {
        let patched = retag_payload(point.payload, new);
        match store.set_payload(collection, point.id.clone(), patched).await {
            Ok(()) => updated += 1,
            Err(e) => {
                warn!(
                    target: "topic_store::mutate",
                    collection,
                    point_id = ?point.id,
                    error = %e,
                    "rename_topic: patch failed, continuing"
                );
            }
        }
    }

    if updated < matched {
        return Err(Error::PartialRename { updated, matched });
    }

    info!(
        target: "topic_store::mutate",
        collection, updated, "rename_topic: done"
    );
    Ok(RenameReport { matched, updated })
}

/// Rewrites the topic tag in a payload, respecting whichever schema the
/// point uses. Every other field is carried over untouched. Pure function.
fn retag_payload(mut payload: Value, new_topic: &str) -> Value {
    match payload
        .get_mut("metadata")
        .and_then(Value::as_object_mut)
    {
        Some(nested) => {
            nested.insert("topic".to_string(), Value::String(new_topic.to_string()));
        }
        None => {
            if let Some(flat) = payload.as_object_mut() {
                flat.insert("topic".to_string(), Value::String(new_topic.to_string()));
            }
        }
    }
    payload
}
