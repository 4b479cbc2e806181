//! Arena node model for the R*-tree.
//!
//! The tree is a flat arena of tagged nodes addressed by 32-bit ids.
//! Internal nodes own child id lists; leaves carry a `u32` payload.
//! Dropping the arena drops the whole tree, and ids stay valid for the
//! tree's lifetime because nodes are never removed from the arena.

use crate::geometry::BoundingBox;

/// Index of a node in the tree arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub(crate) fn new(index: usize) -> Self {
        debug_assert!(index <= u32::MAX as usize);
        Self(index as u32)
    }

    /// The arena slot this id addresses.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A tree node: either an internal node owning children, or a leaf entry.
///
/// # Invariants (after every completed insert)
///
/// - An internal node's bound is the tight union of its children's bounds.
/// - Non-root internal nodes hold between `MIN_NODE` and `MAX_NODE`
///   children; the root holds between 1 and `MAX_NODE`.
/// - All leaves sit at the same depth.
/// - `has_leaves` is true iff the children are leaves.
#[derive(Clone, Debug)]
pub enum Node {
    Internal {
        bound: BoundingBox,
        children: Vec<NodeId>,
        /// True when the children are leaf entries rather than deeper
        /// internal nodes.
        has_leaves: bool,
    },
    Leaf {
        bound: BoundingBox,
        /// User payload; the query layer stores a triangle index here.
        data: u32,
    },
}

impl Node {
    /// The bounding box of this node.
    #[inline]
    pub fn bound(&self) -> &BoundingBox {
        match self {
            Node::Internal { bound, .. } | Node::Leaf { bound, .. } => bound,
        }
    }

    #[inline]
    pub(crate) fn bound_mut(&mut self) -> &mut BoundingBox {
        match self {
            Node::Internal { bound, .. } | Node::Leaf { bound, .. } => bound,
        }
    }

    /// True for leaf entries.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    /// True for internal nodes whose children are leaves.
    #[inline]
    pub fn has_leaves(&self) -> bool {
        matches!(
            self,
            Node::Internal {
                has_leaves: true,
                ..
            }
        )
    }
}
