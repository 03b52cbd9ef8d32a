//! The vector-store seam: an object-safe trait over the handful of Qdrant
//! operations this crate consumes.
//!
//! The production implementation is [`crate::qdrant_facade::QdrantFacade`];
//! tests substitute an in-memory fake. Handles are constructed once and
//! passed explicitly rather than held as ambient singletons.

use futures::future::BoxFuture;

use qdrant_client::qdrant::{Filter, PointId};
use serde_json::Value;

use crate::errors::Error;

/// One point as seen by a scan: its store id plus the payload as JSON.
#[derive(Debug, Clone)]
pub struct ScannedPoint {
    pub id: PointId,
    pub payload: Value,
}

/// One page of a cursor-following scan.
#[derive(Debug, Clone)]
pub struct ScrollPage {
    pub points: Vec<ScannedPoint>,
    /// Cursor for the next page; `None` means the scan is exhausted.
    pub next_offset: Option<PointId>,
}

/// One similarity-search hit: native score plus the payload as JSON.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub score: f32,
    pub payload: Value,
}

/// Minimal vector-store surface consumed by this crate.
///
/// All methods are independent blocking-style network calls; implementations
/// must be safe to share across concurrently running operations.
pub trait VectorStore: Send + Sync {
    /// Names of all collections in the store.
    fn list_collections<'a>(&'a self) -> BoxFuture<'a, Result<Vec<String>, Error>>;

    /// One bounded page of points, payloads included, vectors omitted.
    /// Callers follow `next_offset` until the store reports exhaustion.
    fn scroll<'a>(
        &'a self,
        collection: &'a str,
        filter: Option<Filter>,
        page_size: u32,
        offset: Option<PointId>,
    ) -> BoxFuture<'a, Result<ScrollPage, Error>>;

    /// Top-`limit` similarity search, ranked by the store's native metric.
    fn search<'a>(
        &'a self,
        collection: &'a str,
        vector: Vec<f32>,
        filter: Option<Filter>,
        limit: u64,
    ) -> BoxFuture<'a, Result<Vec<SearchHit>, Error>>;

    /// Predicate-based bulk delete.
    fn delete_by_filter<'a>(
        &'a self,
        collection: &'a str,
        filter: Filter,
    ) -> BoxFuture<'a, Result<(), Error>>;

    /// Replaces the given keys of one point's payload.
    fn set_payload<'a>(
        &'a self,
        collection: &'a str,
        point: PointId,
        payload: Value,
    ) -> BoxFuture<'a, Result<(), Error>>;

    /// Drops a collection. Returns `true` if it existed.
    fn delete_collection<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<bool, Error>>;
}
