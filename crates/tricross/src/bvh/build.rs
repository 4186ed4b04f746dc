//! Top-down median-split construction into a preallocated preorder arena.
//!
//! Split rule
//! - Axis: longest extent of the node's centroid bounds (ties to the lower axis).
//! - Position: exact median. The left half gets `n / 2` triangles, ordered by
//!   `(centroid[axis], id)`; when all centroids coincide the id decides, so
//!   progress never depends on the geometry.
//!
//! Because every split is an exact halving, the node count of a subtree is a
//! function of its triangle count alone. That lets each subtree own a fixed
//! slice of the arena, and large subtrees are built on both sides of a
//! `rayon::join` without any merging afterwards.

use tracing::debug;

use super::types::{Node, NodeId, NodeKind};
use super::Bvh;
use crate::cfg::BuildCfg;
use crate::error::EngineError;
use crate::store::TriangleStore;
use crate::types::{Aabb, Point, TriId};

#[derive(Clone, Copy, Debug)]
struct Item {
    id: TriId,
    centroid: Point,
    aabb: Aabb,
}

#[derive(Clone, Copy, Debug)]
struct Limits {
    leaf_size: usize,
    max_depth: usize,
    parallel_threshold: usize,
}

/// Where a subtree lands: offset of its first triangle in `order`, arena id of
/// its root, and its depth.
#[derive(Clone, Copy, Debug)]
struct Slot {
    offset: usize,
    base: usize,
    depth: usize,
}

/// Arena size for `n` triangles under exact median splits.
pub(super) fn node_count(n: usize, leaf_size: usize) -> usize {
    if n <= leaf_size {
        1
    } else {
        let half = n / 2;
        1 + node_count(half, leaf_size) + node_count(n - half, leaf_size)
    }
}

pub(super) fn build(store: &TriangleStore, cfg: BuildCfg) -> Result<Bvh, EngineError> {
    let _span = tracing::info_span!("bvh_build", triangles = store.len()).entered();
    let n = store.len();
    if n == 0 {
        debug!("empty input, empty tree");
        return Ok(Bvh::empty());
    }
    let limits = Limits {
        leaf_size: cfg.leaf_size.max(1),
        max_depth: cfg.max_depth,
        parallel_threshold: cfg.parallel_threshold.max(2),
    };
    let mut items: Vec<Item> = store
        .ids()
        .map(|id| Item {
            id,
            centroid: store.triangle(id).centroid(),
            aabb: *store.aabb(id),
        })
        .collect();
    let total = node_count(n, limits.leaf_size);
    if total > u32::MAX as usize {
        return Err(EngineError::internal(format!(
            "{total} nodes exceed the node id range"
        )));
    }
    let mut nodes = vec![Node::placeholder(); total];
    let root = Slot {
        offset: 0,
        base: 0,
        depth: 0,
    };
    let depth = build_node(&limits, &mut items, &mut nodes, root)?;

    let order: Vec<TriId> = items.into_iter().map(|it| it.id).collect();
    let leaves = nodes.iter().filter(|nd| nd.is_leaf()).count();
    debug!(nodes = nodes.len(), leaves, depth, "bvh built");
    Ok(Bvh {
        nodes,
        order,
        depth,
        leaves,
    })
}

/// Fill `nodes[0]` with the node for `items` and the rest of the slice with its
/// subtree. Returns the deepest leaf depth.
fn build_node(
    lim: &Limits,
    items: &mut [Item],
    nodes: &mut [Node],
    at: Slot,
) -> Result<usize, EngineError> {
    let n = items.len();
    let aabb = items
        .iter()
        .fold(Aabb::empty(), |acc, it| acc.union(&it.aabb));

    if n <= lim.leaf_size {
        nodes[0] = Node {
            aabb,
            count: n as u32,
            kind: NodeKind::Leaf {
                start: at.offset as u32,
                len: n as u32,
            },
        };
        return Ok(at.depth);
    }
    if at.depth >= lim.max_depth {
        return Err(EngineError::internal(format!(
            "depth bound {} reached with {n} triangles left",
            lim.max_depth
        )));
    }

    let axis = centroid_bounds(items).longest_axis();
    let mid = n / 2;
    items.select_nth_unstable_by(mid, |a, b| {
        a.centroid[axis]
            .total_cmp(&b.centroid[axis])
            .then(a.id.cmp(&b.id))
    });

    let left_nodes = node_count(mid, lim.leaf_size);
    let left = Slot {
        offset: at.offset,
        base: at.base + 1,
        depth: at.depth + 1,
    };
    let right = Slot {
        offset: at.offset + mid,
        base: at.base + 1 + left_nodes,
        depth: at.depth + 1,
    };

    let (head, rest) = nodes.split_at_mut(1);
    let (left_arena, right_arena) = rest.split_at_mut(left_nodes);
    let (left_items, right_items) = items.split_at_mut(mid);

    let (dl, dr) = if n >= lim.parallel_threshold {
        rayon::join(
            || build_node(lim, left_items, left_arena, left),
            || build_node(lim, right_items, right_arena, right),
        )
    } else {
        (
            build_node(lim, left_items, left_arena, left),
            build_node(lim, right_items, right_arena, right),
        )
    };

    head[0] = Node {
        aabb,
        count: n as u32,
        kind: NodeKind::Internal {
            left: NodeId(left.base as u32),
            right: NodeId(right.base as u32),
        },
    };
    Ok(dl?.max(dr?))
}

fn centroid_bounds(items: &[Item]) -> Aabb {
    items.iter().fold(Aabb::empty(), |acc, it| {
        acc.union(&Aabb::new(it.centroid, it.centroid))
    })
}
