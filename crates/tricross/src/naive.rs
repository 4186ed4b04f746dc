//! Baseline Oracle: every unordered pair through the predicate, O(n²).
//!
//! No boxes, no tree, no threads. Exists to validate the engine, so it stays
//! as plain as possible and shares only the predicate and the aggregator.

use tracing::debug;

use crate::error::EngineError;
use crate::result::{Intersections, Members};
use crate::store::TriangleStore;
use crate::types::TriId;

/// All intersecting pairs, visited as `i < j` in input order.
pub fn intersections(store: &TriangleStore) -> Result<Intersections, EngineError> {
    let _span = tracing::info_span!("naive_pairs", triangles = store.len()).entered();
    let n = store.len() as u32;
    let mut pairs = Vec::new();
    for i in 0..n {
        for j in (i + 1)..n {
            if store.intersects(TriId(i), TriId(j)) {
                pairs.push((TriId(i), TriId(j)));
            }
        }
    }
    debug!(confirmed = pairs.len(), "oracle pass done");
    Intersections::from_pairs(pairs, store.len())
}

/// Triangles intersecting at least one other triangle.
///
/// Skips the predicate when both triangles of a pair are already known members.
pub fn members(store: &TriangleStore) -> Members {
    let _span = tracing::info_span!("naive_members", triangles = store.len()).entered();
    let n = store.len();
    let mut hit = vec![false; n];
    let mut calls = 0usize;
    for i in 0..n {
        for j in (i + 1)..n {
            if hit[i] && hit[j] {
                continue;
            }
            calls += 1;
            if store.intersects(TriId(i as u32), TriId(j as u32)) {
                hit[i] = true;
                hit[j] = true;
            }
        }
    }
    let ids: Vec<TriId> = hit
        .iter()
        .enumerate()
        .filter(|(_, &h)| h)
        .map(|(k, _)| TriId(k as u32))
        .collect();
    debug!(predicate_calls = calls, members = ids.len(), "oracle pass done");
    Members::from_ids(ids)
}
