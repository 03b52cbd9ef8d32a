//! In-memory test doubles: a [`VectorStore`] fake that evaluates real
//! Qdrant `Filter` trees over JSON payloads, and a fixed-vector embedder.
//!
//! The fake reproduces the store behaviors this crate depends on: id-ordered
//! scroll pagination with a continuation cursor, filtered similarity search
//! (dot-product scored), predicate deletes, and per-point payload patches.
//! Transport failures and per-point patch failures can be injected.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::future::BoxFuture;
use qdrant_client::qdrant::condition::ConditionOneOf;
use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::qdrant::r#match::MatchValue;
use qdrant_client::qdrant::{Condition, Filter, PointId};
use serde_json::Value;

use crate::embed::EmbeddingsProvider;
use crate::errors::Error;
use crate::store::{ScannedPoint, ScrollPage, SearchHit, VectorStore};

#[derive(Clone)]
struct FakePoint {
    vector: Vec<f32>,
    payload: Value,
}

/// In-memory vector store keyed by numeric point id.
pub struct FakeStore {
    collections: Mutex<BTreeMap<String, BTreeMap<u64, FakePoint>>>,
    fail_transport: AtomicBool,
    failing_patches: Mutex<BTreeSet<u64>>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self {
            collections: Mutex::new(BTreeMap::new()),
            fail_transport: AtomicBool::new(false),
            failing_patches: Mutex::new(BTreeSet::new()),
        }
    }

    pub fn insert(&self, collection: &str, id: u64, vector: Vec<f32>, payload: Value) {
        self.collections
            .lock()
            .unwrap()
            .entry(collection.to_string())
            .or_default()
            .insert(id, FakePoint { vector, payload });
    }

    /// Every subsequent call fails with `Error::Store`.
    pub fn fail_transport(&self) {
        self.fail_transport.store(true, Ordering::SeqCst);
    }

    /// `set_payload` calls for this point id fail with `Error::Store`.
    pub fn fail_set_payload_for(&self, id: u64) {
        self.failing_patches.lock().unwrap().insert(id);
    }

    fn check_transport(&self) -> Result<(), Error> {
        if self.fail_transport.load(Ordering::SeqCst) {
            Err(Error::Store("transport failure (injected)".into()))
        } else {
            Ok(())
        }
    }
}

fn pid(id: u64) -> PointId {
    PointId {
        point_id_options: Some(PointIdOptions::Num(id)),
    }
}

fn pid_num(id: &PointId) -> Option<u64> {
    match id.point_id_options {
        Some(PointIdOptions::Num(n)) => Some(n),
        _ => None,
    }
}

impl VectorStore for FakeStore {
    fn list_collections<'a>(&'a self) -> BoxFuture<'a, Result<Vec<String>, Error>> {
        Box::pin(async move {
            self.check_transport()?;
            Ok(self.collections.lock().unwrap().keys().cloned().collect())
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
            self.check_transport()?;
            let collections = self.collections.lock().unwrap();
            let points = collections
                .get(collection)
                .ok_or_else(|| Error::Store(format!("collection '{collection}' not found")))?;

            let start = offset.as_ref().and_then(pid_num).unwrap_or(0);
            let mut matching = points
                .range(start..)
                .filter(|(_, p)| {
                    filter
                        .as_ref()
                        .map(|f| eval_filter(f, &p.payload))
                        .unwrap_or(true)
                })
                .map(|(id, p)| ScannedPoint {
                    id: pid(*id),
                    payload: p.payload.clone(),
                });

            let page: Vec<ScannedPoint> = matching.by_ref().take(page_size as usize).collect();
            let next_offset = matching.next().map(|p| p.id);

            Ok(ScrollPage {
                points: page,
                next_offset,
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
            self.check_transport()?;
            let collections = self.collections.lock().unwrap();
            let points = collections
                .get(collection)
                .ok_or_else(|| Error::Store(format!("collection '{collection}' not found")))?;

            let mut hits: Vec<SearchHit> = points
                .values()
                .filter(|p| {
                    filter
                        .as_ref()
                        .map(|f| eval_filter(f, &p.payload))
                        .unwrap_or(true)
                })
                .map(|p| SearchHit {
                    score: dot(&vector, &p.vector),
                    payload: p.payload.clone(),
                })
                .collect();

            hits.sort_by(|a, b| b.score.total_cmp(&a.score));
            hits.truncate(limit as usize);
            Ok(hits)
        })
    }

    fn delete_by_filter<'a>(
        &'a self,
        collection: &'a str,
        filter: Filter,
    ) -> BoxFuture<'a, Result<(), Error>> {
        Box::pin(async move {
            self.check_transport()?;
            let mut collections = self.collections.lock().unwrap();
            let points = collections
                .get_mut(collection)
                .ok_or_else(|| Error::Store(format!("collection '{collection}' not found")))?;
            points.retain(|_, p| !eval_filter(&filter, &p.payload));
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
            self.check_transport()?;
            let id = pid_num(&point)
                .ok_or_else(|| Error::Store("unsupported point id kind".into()))?;
            if self.failing_patches.lock().unwrap().contains(&id) {
                return Err(Error::Store(format!("patch failure for point {id} (injected)")));
            }

            let mut collections = self.collections.lock().unwrap();
            let target = collections
                .get_mut(collection)
                .and_then(|points| points.get_mut(&id))
                .ok_or_else(|| Error::Store(format!("point {id} not found")))?;

            // Qdrant merges top-level keys into the existing payload.
            if let (Some(existing), Some(new)) =
                (target.payload.as_object_mut(), payload.as_object())
            {
                for (k, v) in new {
                    existing.insert(k.clone(), v.clone());
                }
            } else {
                target.payload = payload;
            }
            Ok(())
        })
    }

    fn delete_collection<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<bool, Error>> {
        Box::pin(async move {
            self.check_transport()?;
            Ok(self.collections.lock().unwrap().remove(name).is_some())
        })
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Evaluates a Qdrant `Filter` tree against a JSON payload: all `must`
/// conditions hold, no `must_not` holds, and at least one `should` holds
/// when any are present.
pub fn eval_filter(filter: &Filter, payload: &Value) -> bool {
    let must_ok = filter.must.iter().all(|c| eval_condition(c, payload));
    let must_not_ok = !filter.must_not.iter().any(|c| eval_condition(c, payload));
    let should_ok =
        filter.should.is_empty() || filter.should.iter().any(|c| eval_condition(c, payload));
    must_ok && must_not_ok && should_ok
}

fn eval_condition(condition: &Condition, payload: &Value) -> bool {
    match &condition.condition_one_of {
        Some(ConditionOneOf::Field(fc)) => {
            let Some(found) = lookup_path(payload, &fc.key) else {
                return false;
            };
            match fc.r#match.as_ref().and_then(|m| m.match_value.as_ref()) {
                Some(MatchValue::Keyword(expected)) => found.as_str() == Some(expected.as_str()),
                Some(MatchValue::Keywords(set)) => found
                    .as_str()
                    .map(|s| set.strings.iter().any(|v| v == s))
                    .unwrap_or(false),
                _ => false,
            }
        }
        Some(ConditionOneOf::Filter(nested)) => eval_filter(nested, payload),
        _ => false,
    }
}

/// Resolves a dotted payload path like `metadata.topic`.
fn lookup_path<'a>(payload: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = payload;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    Some(current)
}

/// Embedder returning the same vector for every query.
pub struct FixedEmbedder(pub Vec<f32>);

impl EmbeddingsProvider for FixedEmbedder {
    fn embed<'a>(
        &'a self,
        _text: &'a str,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Vec<f32>, Error>> + Send + 'a>>
    {
        Box::pin(async move { Ok(self.0.clone()) })
    }
}
