//! Broad-Phase Traversal: the hierarchy walked against itself.
//!
//! Walk
//! - Work items are node pairs `(a, b)` on an explicit stack, starting at
//!   `(root, root)`.
//! - `(a, a)`: a leaf tests its own triangles pairwise with `i < j`; an internal
//!   node expands to `(l, l)`, `(r, r)` and, if their boxes overlap, `(l, r)`.
//! - `(a, b)`, `a != b`: both leaves → cross product of their triangles;
//!   otherwise the internal node holding more triangles is split and only
//!   child pairs with overlapping boxes are pushed.
//! - Every unordered triangle pair is reachable through exactly one node pair,
//!   so no pair is examined twice and no mirror pair is ever visited.
//! - A triangle pair goes to the predicate only if the two padded triangle
//!   boxes overlap.
//!
//! Parallelism
//! - The top of the walk is expanded breadth-first until there are about
//!   `QueryCfg::task_target()` independent node pairs. Each task then runs the
//!   sequential walk on a rayon worker with its own output buffer; buffers are
//!   concatenated and canonicalized once at the end.
//! - The membership query shares one `AtomicBool` per triangle across tasks.
//!   Marks only go from false to true, so task order never changes the answer.

use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;
use tracing::debug;

use crate::bvh::{Bvh, NodeId, NodeKind};
use crate::cfg::QueryCfg;
use crate::error::EngineError;
use crate::result::{Intersections, Members, Pair};
use crate::store::TriangleStore;
use crate::types::TriId;

type NodePair = (NodeId, NodeId);

/// Receives each triangle pair whose padded boxes overlap.
pub(crate) trait PairVisitor {
    fn visit(&mut self, i: TriId, j: TriId);
}

/// Work counters, summed over tasks for the debug log.
#[derive(Clone, Copy, Debug, Default)]
pub struct Stats {
    pub node_pairs: usize,
    pub candidates: usize,
}

impl Stats {
    fn merge(self, o: Stats) -> Stats {
        Stats {
            node_pairs: self.node_pairs + o.node_pairs,
            candidates: self.candidates + o.candidates,
        }
    }
}

#[inline]
fn overlap(bvh: &Bvh, a: NodeId, b: NodeId) -> bool {
    bvh.node(a).aabb.overlaps(&bvh.node(b).aabb)
}

enum Step {
    /// Children pushed (possibly none, if every child pair was pruned).
    Expanded,
    /// Both sides are leaves; the triangle pairs must be enumerated.
    Leaves,
}

fn expand(bvh: &Bvh, (a, b): NodePair, out: &mut Vec<NodePair>) -> Step {
    let (na, nb) = (bvh.node(a), bvh.node(b));
    if a == b {
        return match na.kind {
            NodeKind::Leaf { .. } => Step::Leaves,
            NodeKind::Internal { left, right } => {
                out.push((left, left));
                out.push((right, right));
                if overlap(bvh, left, right) {
                    out.push((left, right));
                }
                Step::Expanded
            }
        };
    }
    let split_a = match (na.kind, nb.kind) {
        (NodeKind::Leaf { .. }, NodeKind::Leaf { .. }) => return Step::Leaves,
        (NodeKind::Internal { .. }, NodeKind::Leaf { .. }) => true,
        (NodeKind::Leaf { .. }, NodeKind::Internal { .. }) => false,
        (NodeKind::Internal { .. }, NodeKind::Internal { .. }) => na.count >= nb.count,
    };
    let (split, other) = if split_a { (na, b) } else { (nb, a) };
    if let NodeKind::Internal { left, right } = split.kind {
        for child in [left, right] {
            if overlap(bvh, child, other) {
                out.push((child, other));
            }
        }
    }
    Step::Expanded
}

fn leaf_pairs<V: PairVisitor>(
    bvh: &Bvh,
    store: &TriangleStore,
    (a, b): NodePair,
    visitor: &mut V,
    stats: &mut Stats,
) {
    let la = bvh.leaf_ids(a);
    if a == b {
        for (k, &i) in la.iter().enumerate() {
            for &j in &la[k + 1..] {
                if store.aabb(i).overlaps(store.aabb(j)) {
                    stats.candidates += 1;
                    visitor.visit(i, j);
                }
            }
        }
        return;
    }
    let lb = bvh.leaf_ids(b);
    for &i in la {
        let bi = store.aabb(i);
        for &j in lb {
            if bi.overlaps(store.aabb(j)) {
                stats.candidates += 1;
                visitor.visit(i, j);
            }
        }
    }
}

/// Sequential walk of everything below `seed`.
fn walk<V: PairVisitor>(
    bvh: &Bvh,
    store: &TriangleStore,
    seed: NodePair,
    visitor: &mut V,
) -> Stats {
    let mut stats = Stats::default();
    let mut stack = vec![seed];
    while let Some(pair) = stack.pop() {
        stats.node_pairs += 1;
        if let Step::Leaves = expand(bvh, pair, &mut stack) {
            leaf_pairs(bvh, store, pair, visitor, &mut stats);
        }
    }
    stats
}

/// Breadth-first expansion of the top of the walk into independent tasks.
///
/// Leaf-level pairs are carried over unchanged; expansion stops once the
/// target is met or nothing is left to split.
fn seed_tasks(bvh: &Bvh, root: NodeId, target: usize) -> Vec<NodePair> {
    let mut tasks = vec![(root, root)];
    while tasks.len() < target {
        let mut next = Vec::with_capacity(tasks.len() * 3);
        let mut split_any = false;
        for &pair in &tasks {
            match expand(bvh, pair, &mut next) {
                Step::Expanded => split_any = true,
                Step::Leaves => next.push(pair),
            }
        }
        tasks = next;
        if !split_any {
            break;
        }
    }
    tasks
}

/// Runs one visitor per task and returns the visitors with the summed stats.
fn run<V, F>(bvh: &Bvh, store: &TriangleStore, cfg: QueryCfg, make: F) -> (Vec<V>, Stats)
where
    V: PairVisitor + Send,
    F: Fn() -> V + Sync,
{
    let Some(root) = bvh.root() else {
        return (Vec::new(), Stats::default());
    };
    let target = cfg.task_target();
    if target <= 1 {
        let mut v = make();
        let stats = walk(bvh, store, (root, root), &mut v);
        return (vec![v], stats);
    }
    let tasks = seed_tasks(bvh, root, target);
    debug!(tasks = tasks.len(), target, "seeded broad-phase tasks");
    let results: Vec<(V, Stats)> = tasks
        .par_iter()
        .map(|&seed| {
            let mut v = make();
            let stats = walk(bvh, store, seed, &mut v);
            (v, stats)
        })
        .collect();
    let stats = results
        .iter()
        .fold(Stats::default(), |acc, (_, s)| acc.merge(*s));
    (results.into_iter().map(|(v, _)| v).collect(), stats)
}

/// Collects confirmed pairs.
struct PairCollector<'a> {
    store: &'a TriangleStore,
    pairs: Vec<Pair>,
}

impl PairVisitor for PairCollector<'_> {
    #[inline]
    fn visit(&mut self, i: TriId, j: TriId) {
        if self.store.intersects(i, j) {
            self.pairs.push((i, j));
        }
    }
}

/// Marks both triangles of every confirmed pair; skips pairs already fully marked.
struct MemberMarker<'a> {
    store: &'a TriangleStore,
    marks: &'a [AtomicBool],
    calls: usize,
}

impl PairVisitor for MemberMarker<'_> {
    #[inline]
    fn visit(&mut self, i: TriId, j: TriId) {
        let (mi, mj) = (&self.marks[i.index()], &self.marks[j.index()]);
        if mi.load(Ordering::Relaxed) && mj.load(Ordering::Relaxed) {
            return;
        }
        self.calls += 1;
        if self.store.intersects(i, j) {
            mi.store(true, Ordering::Relaxed);
            mj.store(true, Ordering::Relaxed);
        }
    }
}

/// Records every candidate without running the predicate.
struct CandidateCollector {
    pairs: Vec<Pair>,
}

impl PairVisitor for CandidateCollector {
    #[inline]
    fn visit(&mut self, i: TriId, j: TriId) {
        self.pairs.push((i, j));
    }
}

pub(crate) fn intersections(
    bvh: &Bvh,
    store: &TriangleStore,
    cfg: QueryCfg,
) -> Result<Intersections, EngineError> {
    let _span = tracing::info_span!("broad_pairs", triangles = store.len()).entered();
    let (collectors, stats) = run(bvh, store, cfg, || PairCollector {
        store,
        pairs: Vec::new(),
    });
    let total: usize = collectors.iter().map(|c| c.pairs.len()).sum();
    let mut pairs = Vec::with_capacity(total);
    for c in collectors {
        pairs.extend(c.pairs);
    }
    debug!(
        node_pairs = stats.node_pairs,
        candidates = stats.candidates,
        confirmed = pairs.len(),
        "broad phase done"
    );
    Intersections::from_pairs(pairs, store.len())
}

pub(crate) fn members(bvh: &Bvh, store: &TriangleStore, cfg: QueryCfg) -> Members {
    let _span = tracing::info_span!("broad_members", triangles = store.len()).entered();
    let marks: Vec<AtomicBool> = (0..store.len()).map(|_| AtomicBool::new(false)).collect();
    let (markers, stats) = run(bvh, store, cfg, || MemberMarker {
        store,
        marks: &marks,
        calls: 0,
    });
    let calls: usize = markers.iter().map(|m| m.calls).sum();
    let ids: Vec<TriId> = marks
        .iter()
        .enumerate()
        .filter(|(_, m)| m.load(Ordering::Relaxed))
        .map(|(k, _)| TriId(k as u32))
        .collect();
    debug!(
        node_pairs = stats.node_pairs,
        candidates = stats.candidates,
        predicate_calls = calls,
        members = ids.len(),
        "broad phase done"
    );
    Members::from_ids(ids)
}

/// Every triangle pair whose padded boxes overlap, as the walk reaches them
/// (no predicate, canonical order). Exposed for tests and benchmarks.
pub fn candidates(
    bvh: &Bvh,
    store: &TriangleStore,
    cfg: QueryCfg,
) -> Result<Intersections, EngineError> {
    let (collectors, _) = run(bvh, store, cfg, || CandidateCollector { pairs: Vec::new() });
    let pairs = collectors.into_iter().flat_map(|c| c.pairs).collect();
    Intersections::from_pairs(pairs, store.len())
}

struct Discard;

impl PairVisitor for Discard {
    #[inline]
    fn visit(&mut self, _i: TriId, _j: TriId) {}
}

/// Work counters of one full sequential walk, without running the predicate.
pub fn stats(bvh: &Bvh, store: &TriangleStore) -> Stats {
    match bvh.root() {
        Some(root) => walk(bvh, store, (root, root), &mut Discard),
        None => Stats::default(),
    }
}

#[cfg(test)]
mod tests;
