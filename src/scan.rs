//! Exhaustive, cursor-following collection scans.
//!
//! The store enforces a maximum page size per scroll request; a single
//! bounded request silently under-counts large collections. Every aggregate
//! and bulk mutation in this crate therefore pages through
//! [`scan_collection`], which follows the continuation cursor until the
//! store reports exhaustion. The configured point cap and deadline are
//! checked cooperatively between pages.

use std::time::Instant;

use qdrant_client::qdrant::Filter;
use tracing::{debug, trace};

use crate::config::ScanLimits;
use crate::errors::Error;
use crate::store::{ScannedPoint, VectorStore};

/// Reads every point matching `filter` (or the whole collection), payloads
/// included.
///
/// # Errors
/// - `Error::Store` on any transport failure; partial results are discarded.
/// - `Error::ScanBudgetExceeded` when the cap or deadline in `limits` is hit
///   before the scan completes.
pub async fn scan_collection(
    store: &dyn VectorStore,
    collection: &str,
    filter: Option<Filter>,
    limits: &ScanLimits,
) -> Result<Vec<ScannedPoint>, Error> {
    let started = Instant::now();
    let mut points: Vec<ScannedPoint> = Vec::new();
    let mut offset = None;

    loop {
        if let Some(cap) = limits.max_points
            && points.len() as u64 >= cap
        {
            return Err(Error::ScanBudgetExceeded {
                scanned: points.len() as u64,
            });
        }
        if let Some(timeout) = limits.timeout
            && started.elapsed() >= timeout
        {
            return Err(Error::ScanBudgetExceeded {
                scanned: points.len() as u64,
            });
        }

        let page = store
            .scroll(collection, filter.clone(), limits.page_size, offset)
            .await?;

        trace!(
            target: "topic_store::scan",
            collection,
            page_len = page.points.len(),
            total = points.len(),
            "scan page complete"
        );

        points.extend(page.points);

        match page.next_offset {
            Some(next) => offset = Some(next),
            None => break,
        }
    }

    debug!(
        target: "topic_store::scan",
        collection,
        total = points.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "scan complete"
    );

    Ok(points)
}
