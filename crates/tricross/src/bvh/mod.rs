//! BVH Builder: a binary tree of padded boxes over a `TriangleStore`.
//!
//! Purpose
//! - Partition the triangles by spatial locality so the broad phase can drop
//!   whole subtree pairs with one box test.
//!
//! Why this design
//! - Nodes live in one `Vec` in preorder and refer to children by `NodeId`;
//!   leaves refer to a range of the `order` permutation. No pointers, no
//!   per-node allocation, and the arena can be split into disjoint slices for
//!   a fork-join build.
//! - The tree is immutable after `build`; every query borrows it.
//!
//! Layout
//! - `types.rs`: `NodeId`, `Node`, `NodeKind`.
//! - `build.rs`: construction (median split with id tie-break).
//! - Queries live in `crate::broad` and are exposed here as methods.

mod build;
mod types;

pub use types::{Node, NodeId, NodeKind};

use crate::broad;
use crate::cfg::{BuildCfg, QueryCfg};
use crate::error::EngineError;
use crate::result::{Intersections, Members};
use crate::store::TriangleStore;
use crate::types::TriId;

#[derive(Clone, Debug, Default)]
pub struct Bvh {
    nodes: Vec<Node>,
    order: Vec<TriId>,
    depth: usize,
    leaves: usize,
}

impl Bvh {
    /// Build over every triangle of `store`.
    ///
    /// Debug builds re-check the whole tree with [`Bvh::validate`] before returning.
    pub fn build(store: &TriangleStore, cfg: BuildCfg) -> Result<Self, EngineError> {
        let bvh = build::build(store, cfg)?;
        if cfg!(debug_assertions) {
            bvh.validate(store)?;
        }
        Ok(bvh)
    }

    pub(crate) fn empty() -> Self {
        Self::default()
    }

    #[inline]
    pub fn root(&self) -> Option<NodeId> {
        if self.nodes.is_empty() {
            None
        } else {
            Some(NodeId(0))
        }
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Number of nodes in the arena.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Depth of the deepest leaf (root at 0).
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    #[inline]
    pub fn leaf_count(&self) -> usize {
        self.leaves
    }

    /// Triangle ids held by a leaf; empty for internal nodes.
    #[inline]
    pub fn leaf_ids(&self, id: NodeId) -> &[TriId] {
        match self.node(id).kind {
            NodeKind::Leaf { start, len } => {
                &self.order[start as usize..(start + len) as usize]
            }
            NodeKind::Internal { .. } => &[],
        }
    }

    /// All intersecting pairs, canonical.
    pub fn intersections(
        &self,
        store: &TriangleStore,
        cfg: QueryCfg,
    ) -> Result<Intersections, EngineError> {
        broad::intersections(self, store, cfg)
    }

    /// Triangles that intersect at least one other triangle.
    pub fn members(&self, store: &TriangleStore, cfg: QueryCfg) -> Members {
        broad::members(self, store, cfg)
    }

    /// Re-walk the arena and check every structural invariant against `store`.
    ///
    /// - each internal box contains both child boxes, children come after the parent;
    /// - each leaf box contains the boxes of its triangles;
    /// - `count` matches the triangles below the node;
    /// - every id of `store` appears in exactly one leaf.
    pub fn validate(&self, store: &TriangleStore) -> Result<(), EngineError> {
        if self.order.len() != store.len() {
            return Err(EngineError::internal(format!(
                "tree holds {} ids for {} triangles",
                self.order.len(),
                store.len()
            )));
        }
        let Some(root) = self.root() else {
            if store.is_empty() {
                return Ok(());
            }
            return Err(EngineError::internal("empty tree over a non-empty store"));
        };

        let mut seen = vec![false; store.len()];
        let mut visited = 0usize;
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if id.index() >= self.nodes.len() {
                return Err(EngineError::internal(format!("node {} out of range", id.0)));
            }
            visited += 1;
            let node = self.node(id);
            match node.kind {
                NodeKind::Internal { left, right } => {
                    let mut below = 0u32;
                    for child in [left, right] {
                        if child <= id || child.index() >= self.nodes.len() {
                            return Err(EngineError::internal(format!(
                                "node {} has child {} outside preorder",
                                id.0, child.0
                            )));
                        }
                        let c = self.node(child);
                        if !node.aabb.contains(&c.aabb) {
                            return Err(EngineError::internal(format!(
                                "box of node {} does not contain child {}",
                                id.0, child.0
                            )));
                        }
                        below += c.count;
                        stack.push(child);
                    }
                    if below != node.count {
                        return Err(EngineError::internal(format!(
                            "node {} counts {} triangles, children hold {below}",
                            id.0, node.count
                        )));
                    }
                }
                NodeKind::Leaf { start, len } => {
                    let end = start as usize + len as usize;
                    if end > self.order.len() || len != node.count {
                        return Err(EngineError::internal(format!(
                            "leaf {} has a bad range {start}+{len}",
                            id.0
                        )));
                    }
                    for &tri in &self.order[start as usize..end] {
                        if tri.index() >= seen.len() || seen[tri.index()] {
                            return Err(EngineError::internal(format!(
                                "triangle {tri} is missing from the store or listed twice"
                            )));
                        }
                        seen[tri.index()] = true;
                        if !node.aabb.contains(store.aabb(tri)) {
                            return Err(EngineError::internal(format!(
                                "leaf {} box does not contain triangle {tri}",
                                id.0
                            )));
                        }
                    }
                }
            }
        }
        if visited != self.nodes.len() {
            return Err(EngineError::internal(format!(
                "{} of {} nodes reachable from the root",
                visited,
                self.nodes.len()
            )));
        }
        if let Some(k) = seen.iter().position(|&s| !s) {
            return Err(EngineError::internal(format!("triangle {k} is in no leaf")));
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }
}
