//! Thin adapter around `qdrant-client` to isolate API usage.
//!
//! This facade concentrates all Qdrant interactions behind the
//! [`VectorStore`] trait, hiding the verbose builder pattern and keeping the
//! rest of the crate decoupled from `qdrant-client`.

use futures::future::BoxFuture;

use qdrant_client::Payload;
use qdrant_client::Qdrant;
use qdrant_client::qdrant::points_selector::PointsSelectorOneOf;
use qdrant_client::qdrant::{
    DeletePointsBuilder, Filter, PointId, PointsIdsList, ScrollPointsBuilder,
    SearchPointsBuilder, SetPayloadPointsBuilder,
};
use serde_json::Value;
use tracing::{debug, trace};

use crate::config::QdrantConfig;
use crate::errors::Error;
use crate::payload::payload_to_json;
use crate::store::{ScannedPoint, ScrollPage, SearchHit, VectorStore};

/// Production [`VectorStore`] backed by a shared gRPC Qdrant client.
pub struct QdrantFacade {
    client: Qdrant,
}

impl QdrantFacade {
    /// Creates a new facade from the given configuration.
    ///
    /// # Errors
    /// Returns `Error::Store` if the client cannot be constructed.
    pub fn new(cfg: &QdrantConfig) -> Result<Self, Error> {
        let mut builder = Qdrant::from_url(&cfg.url);
        if let Some(key) = &cfg.api_key {
            builder = builder.api_key(key.clone());
        }
        let client = builder.build().map_err(|e| Error::Store(e.to_string()))?;
        Ok(Self { client })
    }
}

impl VectorStore for QdrantFacade {
    fn list_collections<'a>(&'a self) -> BoxFuture<'a, Result<Vec<String>, Error>> {
        Box::pin(async move {
            let res = self
                .client
                .list_collections()
                .await
                .map_err(|e| Error::Store(format!("list_collections: {e}")))?;
            Ok(res.collections.into_iter().map(|c| c.name).collect())
        })
    }

    fn scroll<'a>(
        &'a self,
        collection: &'a str,
        filter: Option<Filter>,
        page_size: u32,
        offset: Option<PointId>,
    ) -> BoxFuture<'a, Result<ScrollPage, Error>> {
        Box::pin(async move {
            trace!(
                target: "topic_store::store",
                collection,
                page_size,
                "scroll page"
            );

            let mut builder = ScrollPointsBuilder::new(collection)
                .limit(page_size)
                .with_payload(true)
                .with_vectors(false);
            if let Some(f) = filter {
                builder = builder.filter(f);
            }
            if let Some(o) = offset {
                builder = builder.offset(o);
            }

            let res = self
                .client
                .scroll(builder)
                .await
                .map_err(|e| Error::Store(format!("scroll: {e}")))?;

            let points = res
                .result
                .into_iter()
                .filter_map(|p| {
                    // A point without an id cannot be addressed later; skip it.
                    let id = p.id?;
                    Some(ScannedPoint {
                        id,
                        payload: payload_to_json(p.payload),
                    })
                })
                .collect();

            Ok(ScrollPage {
                points,
                next_offset: res.next_page_offset,
            })
        })
    }

    fn search<'a>(
        &'a self,
        collection: &'a str,
        vector: Vec<f32>,
        filter: Option<Filter>,
        limit: u64,
    ) -> BoxFuture<'a, Result<Vec<SearchHit>, Error>> {
        Box::pin(async move {
            debug!(
                target: "topic_store::store",
                collection,
                limit,
                filtered = filter.is_some(),
                "similarity search"
            );

            let mut builder = SearchPointsBuilder::new(collection, vector, limit)
                .with_payload(true)
                .with_vectors(false);
            if let Some(f) = filter {
                builder = builder.filter(f);
            }

            let res = self
                .client
                .search_points(builder)
                .await
                .map_err(|e| Error::Store(format!("search_points: {e}")))?;

            Ok(res
                .result
                .into_iter()
                .map(|hit| SearchHit {
                    score: hit.score,
                    payload: payload_to_json(hit.payload),
                })
                .collect())
        })
    }

    fn delete_by_filter<'a>(
        &'a self,
        collection: &'a str,
        filter: Filter,
    ) -> BoxFuture<'a, Result<(), Error>> {
        Box::pin(async move {
            debug!(target: "topic_store::store", collection, "delete by filter");

            self.client
                .delete_points(
                    DeletePointsBuilder::new(collection)
                        .points(filter)
                        .wait(true),
                )
                .await
                .map_err(|e| Error::Store(format!("delete_points: {e}")))?;
            Ok(())
        })
    }

    fn set_payload<'a>(
        &'a self,
        collection: &'a str,
        point: PointId,
        payload: Value,
    ) -> BoxFuture<'a, Result<(), Error>> {
        Box::pin(async move {
            let qdrant_payload = Payload::try_from(payload)
                .map_err(|e| Error::Store(format!("payload convert: {e}")))?;

            let selector = PointsSelectorOneOf::Points(PointsIdsList { ids: vec![point] });

            self.client
                .set_payload(
                    SetPayloadPointsBuilder::new(collection, qdrant_payload)
                        .points_selector(selector)
                        .wait(true),
                )
                .await
                .map_err(|e| Error::Store(format!("set_payload: {e}")))?;
            Ok(())
        })
    }

    fn delete_collection<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<bool, Error>> {
        Box::pin(async move {
            let exists = self
                .client
                .collection_exists(name)
                .await
                .map_err(|e| Error::Store(format!("collection_exists: {e}")))?;
            if !exists {
                return Ok(false);
            }
            self.client
                .delete_collection(name)
                .await
                .map_err(|e| Error::Store(format!("delete_collection: {e}")))?;
            Ok(true)
        })
    }
}
