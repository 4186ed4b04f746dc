//! Arena node types for the hierarchy.

use crate::types::Aabb;

/// Index into the node arena. Nodes are laid out in preorder, so a child
/// always has a larger id than its parent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// `len` triangle ids starting at `start` in `Bvh::order`.
    Leaf { start: u32, len: u32 },
    Internal { left: NodeId, right: NodeId },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Node {
    /// Union of the padded boxes of every triangle below this node.
    pub aabb: Aabb,
    /// Number of triangles below this node.
    pub count: u32,
    pub kind: NodeKind,
}

impl Node {
    pub(super) fn placeholder() -> Self {
        Self {
            aabb: Aabb::empty(),
            count: 0,
            kind: NodeKind::Leaf { start: 0, len: 0 },
        }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }
}
