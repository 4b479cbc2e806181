//! R*-tree construction and radius search.
//!
//! The tree is built by repeated top-down insertion, one leaf at a time.
//! Each insert enlarges bounds along the descent path, chooses subtrees
//! by the R* cost metrics, and resolves overflow by forced reinsertion
//! on the first overflow of a top-level insert, by splitting otherwise.

use super::{Node, NodeId};
use crate::geometry::BoundingBox;
use crate::{Coord, Point3};
use std::cmp::Ordering;

/// A 3D R*-tree over axis-aligned bounding boxes with `u32` payloads.
///
/// `MAX_NODE` is the child-count ceiling per node; the remaining R*
/// parameters derive from it. The tree is append-only: build it once,
/// then query it from any number of threads.
pub struct RStarTree<const MAX_NODE: usize = 64> {
    arena: Vec<Node>,
    root: Option<NodeId>,
    size: usize,
}

impl<const MAX_NODE: usize> RStarTree<MAX_NODE> {
    /// Nodes below this child count (except the root) are considered
    /// underfull.
    pub const MIN_NODE: usize = MAX_NODE * 2 / 5;

    /// Candidate cap for the overlap-enlargement subtree choice.
    const CHOOSE_SUBTREE_P: usize = MAX_NODE / 2;

    /// Number of children detached by a forced reinsertion.
    const REINSERT_P: usize = {
        let p = MAX_NODE * 3 / 10;
        if p < 1 {
            1
        } else if p > MAX_NODE {
            MAX_NODE
        } else {
            p
        }
    };

    /// Number of candidate distributions examined by a split.
    const DISTRIBUTION_COUNT: usize = MAX_NODE - 2 * Self::MIN_NODE + 2;

    const VALID_CONFIG: () = assert!(MAX_NODE >= 3, "MAX_NODE must be at least 3");

    /// Create an empty tree.
    pub fn new() -> Self {
        let () = Self::VALID_CONFIG;
        Self {
            arena: Vec::new(),
            root: None,
            size: 0,
        }
    }

    /// Create an empty tree with arena capacity for `leaf_count` entries.
    pub fn with_capacity(leaf_count: usize) -> Self {
        let () = Self::VALID_CONFIG;
        // Leaves dominate; internal nodes add a small constant factor.
        let node_estimate = leaf_count + leaf_count / Self::MIN_NODE.max(1) + 1;
        Self {
            arena: Vec::with_capacity(node_estimate),
            root: None,
            size: 0,
        }
    }

    /// Number of entries inserted into the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.size
    }

    /// True when nothing has been inserted.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// The bounding box of the whole tree; empty sentinel when the tree
    /// is empty.
    pub fn bound(&self) -> BoundingBox {
        match self.root {
            Some(root) => self.bound_of(root),
            None => BoundingBox::empty(),
        }
    }

    /// The root node id, if any entry has been inserted.
    #[inline]
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Look up a node by id.
    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.arena[id.index()]
    }

    /// Number of levels of internal nodes above the leaf entries.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self.root;
        while let Some(id) = current {
            match self.node(id) {
                Node::Internal { children, .. } => {
                    depth += 1;
                    current = children.first().copied();
                }
                Node::Leaf { .. } => break,
            }
        }
        depth
    }

    /// Insert an entry with the given bounding box.
    pub fn insert(&mut self, bound: BoundingBox, data: u32) {
        let leaf = self.alloc(Node::Leaf { bound, data });
        match self.root {
            None => {
                let root = self.alloc(Node::Internal {
                    bound,
                    children: vec![leaf],
                    has_leaves: true,
                });
                self.root = Some(root);
            }
            Some(root) => {
                self.insert_internal(leaf, root, true);
            }
        }
        self.size += 1;
    }

    /// Depth-first search over all entries whose bounding box lies within
    /// `max_dist` of `query` (clamped-point distance, so face contact
    /// counts). The callback returns `false` to stop the traversal early;
    /// the return value reports whether the traversal ran to completion.
    pub fn search_radius<F>(&self, query: &Point3, max_dist: Coord, mut callback: F) -> bool
    where
        F: FnMut(u32) -> bool,
    {
        match self.root {
            Some(root) => self.search_radius_internal(query, max_dist, &mut callback, root),
            None => true,
        }
    }

    /// Breadth-first visitation of every node below the root, with its
    /// layer index. Layer 0 holds the root's children.
    pub fn traverse_bfs<F: FnMut(usize, &Node)>(&self, mut callback: F) {
        if let Some(root) = self.root {
            self.traverse_bfs_internal(&mut callback, root, 0);
        }
    }

    fn traverse_bfs_internal<F: FnMut(usize, &Node)>(
        &self,
        callback: &mut F,
        node: NodeId,
        layer: usize,
    ) {
        for &child in self.children_of(node) {
            callback(layer, self.node(child));
        }
        for &child in self.children_of(node) {
            if !self.node(child).is_leaf() {
                self.traverse_bfs_internal(callback, child, layer + 1);
            }
        }
    }

    fn search_radius_internal<F>(
        &self,
        query: &Point3,
        max_dist: Coord,
        callback: &mut F,
        node: NodeId,
    ) -> bool
    where
        F: FnMut(u32) -> bool,
    {
        for &child in self.children_of(node) {
            let distance = self.node(child).bound().exterior_distance(query);
            if distance > max_dist {
                continue;
            }
            match self.node(child) {
                Node::Leaf { data, .. } => {
                    if !callback(*data) {
                        return false;
                    }
                }
                Node::Internal { .. } => {
                    if !self.search_radius_internal(query, max_dist, callback, child) {
                        return false;
                    }
                }
            }
        }
        true
    }

    /// Recursive insertion of a leaf under `node`.
    ///
    /// Returns the split sibling when `node` had to split, so the caller
    /// adopts it; `first_insert` is true only on the descent of the
    /// top-level insert and gates forced reinsertion, bounding the
    /// reinsertion cascade to one per insert.
    fn insert_internal(&mut self, leaf: NodeId, node: NodeId, first_insert: bool) -> Option<NodeId> {
        let leaf_bound = self.bound_of(leaf);
        self.node_mut(node).bound_mut().enlarge(&leaf_bound);

        if self.node(node).has_leaves() {
            self.push_child(node, leaf);
        } else {
            let best_subtree = self.choose_subtree(node, &leaf_bound);
            if let Some(overflow) = self.insert_internal(leaf, best_subtree, first_insert) {
                self.push_child(node, overflow);
            }
        }

        if self.children_len(node) > MAX_NODE {
            debug_assert_eq!(self.children_len(node), MAX_NODE + 1);
            // Opportunistic reinsertion in the hope of a better
            // performing tree; only once per top-level insert.
            if Some(node) != self.root && first_insert {
                self.reinsert(node);
                return None;
            }
            let split_node = self.split(node);
            if Some(node) == self.root {
                let bound = self.bound_of(node).enlarged(&self.bound_of(split_node));
                let new_root = self.alloc(Node::Internal {
                    bound,
                    children: vec![node, split_node],
                    has_leaves: false,
                });
                self.root = Some(new_root);
                return None;
            }
            // Propagate the split node upwards.
            return Some(split_node);
        }
        // A reinsertion below this node may have rerouted entries into
        // another subtree; recompute so the bound stays tight.
        let tight = self.bound_over(self.children_of(node));
        *self.node_mut(node).bound_mut() = tight;
        None
    }

    /// Choose the child of `node` to descend into for a new entry with
    /// bounding box `bound`.
    ///
    /// At the level just above the leaves the choice minimizes overlap
    /// enlargement (restricted to the `CHOOSE_SUBTREE_P` children with
    /// the least area enlargement when the fan-out is large); deeper
    /// levels minimize area enlargement.
    fn choose_subtree(&mut self, node: NodeId, bound: &BoundingBox) -> NodeId {
        debug_assert!(!self.node(node).has_leaves());
        let children_are_leaf_level = {
            let first = self.children_of(node)[0];
            self.node(first).has_leaves()
        };

        if children_are_leaf_level {
            if MAX_NODE > (Self::CHOOSE_SUBTREE_P * 2) / 3
                && self.children_len(node) > Self::CHOOSE_SUBTREE_P
            {
                let mut children = self.take_children(node);
                children.sort_by(|a, b| {
                    let cost_a = self.area_enlargement(*a, bound);
                    let cost_b = self.area_enlargement(*b, bound);
                    cost_a.partial_cmp(&cost_b).unwrap_or(Ordering::Equal)
                });
                let best = self.min_overlap_enlargement(&children[..Self::CHOOSE_SUBTREE_P], bound);
                self.restore_children(node, children);
                return best;
            }
            return self.min_overlap_enlargement(self.children_of(node), bound);
        }
        self.min_area_enlargement(self.children_of(node), bound)
    }

    /// Split an overflowing node, returning the new sibling holding the
    /// upper part of the best distribution. Both bounds are recomputed
    /// from scratch.
    fn split(&mut self, node: NodeId) -> NodeId {
        let mut children = self.take_children(node);
        debug_assert_eq!(children.len(), MAX_NODE + 1);

        // Choose the split axis by the least margin sum over all
        // candidate distributions.
        let mut best_axis = 0;
        let mut least_margin = Coord::MAX;
        for axis in 0..3 {
            self.sort_children_along(&mut children, axis);
            let mut margin = 0.0;
            for k in 0..Self::DISTRIBUTION_COUNT {
                let split_at = Self::MIN_NODE + k;
                let left = self.bound_over(&children[..split_at]);
                let right = self.bound_over(&children[split_at..]);
                margin += left.margin() + right.margin();
            }
            if margin < least_margin {
                least_margin = margin;
                best_axis = axis;
            }
        }

        // Along that axis, choose the distribution with the least
        // overlap; ties fall to the least area sum, then the smaller
        // split index.
        self.sort_children_along(&mut children, best_axis);
        let mut best_k = 0;
        let mut least_overlap = Coord::MAX;
        let mut least_area = Coord::MAX;
        for k in 0..Self::DISTRIBUTION_COUNT {
            let split_at = Self::MIN_NODE + k;
            let left = self.bound_over(&children[..split_at]);
            let right = self.bound_over(&children[split_at..]);
            let overlap = left.overlap(&right);
            let area = left.area() + right.area();
            if overlap < least_overlap || (overlap == least_overlap && area < least_area) {
                least_overlap = overlap;
                least_area = area;
                best_k = k;
            }
        }

        let upper = children.split_off(Self::MIN_NODE + best_k);
        let lower_bound = self.bound_over(&children);
        let upper_bound = self.bound_over(&upper);
        let has_leaves = self.node(node).has_leaves();

        match self.node_mut(node) {
            Node::Internal {
                bound, children: c, ..
            } => {
                *bound = lower_bound;
                *c = children;
            }
            Node::Leaf { .. } => unreachable!("split target is internal"),
        }
        self.alloc(Node::Internal {
            bound: upper_bound,
            children: upper,
            has_leaves,
        })
    }

    /// Forced reinsertion: detach the `REINSERT_P` children furthest from
    /// the node's center and insert them again from the root, with
    /// further reinsertions disabled along those chains.
    fn reinsert(&mut self, node: NodeId) {
        debug_assert!(Some(node) != self.root);
        debug_assert!(self.node(node).has_leaves());
        debug_assert_eq!(self.children_len(node), MAX_NODE + 1);

        let node_bound = self.bound_of(node);
        let mut children = self.take_children(node);
        children.sort_by(|a, b| {
            let da = self.bound_of(*a).center_distance2(&node_bound);
            let db = self.bound_of(*b).center_distance2(&node_bound);
            da.partial_cmp(&db).unwrap_or(Ordering::Equal)
        });
        let pruned = children.split_off(children.len() - Self::REINSERT_P);

        let retained_bound = self.bound_over(&children);
        match self.node_mut(node) {
            Node::Internal {
                bound, children: c, ..
            } => {
                *bound = retained_bound;
                *c = children;
            }
            Node::Leaf { .. } => unreachable!("reinsert target is internal"),
        }

        for leaf in pruned {
            // The root can change mid-loop when a reinsertion splits it.
            let root = self.root.expect("reinsert requires a rooted tree");
            self.insert_internal(leaf, root, false);
        }
    }

    /// The candidate with the least area enlargement for `bound`; ties
    /// fall to the earlier candidate.
    fn min_area_enlargement(&self, candidates: &[NodeId], bound: &BoundingBox) -> NodeId {
        debug_assert!(!candidates.is_empty());
        let mut best = candidates[0];
        let mut least_area = Coord::MAX;
        for &candidate in candidates {
            let enlargement = self.area_enlargement(candidate, bound);
            if enlargement < least_area {
                least_area = enlargement;
                best = candidate;
            }
        }
        best
    }

    /// The candidate whose enlargement by `bound` adds the least overlap
    /// with its siblings; ties fall to the earlier candidate. O(n^2).
    fn min_overlap_enlargement(&self, candidates: &[NodeId], bound: &BoundingBox) -> NodeId {
        debug_assert!(!candidates.is_empty());
        let mut best = candidates[0];
        let mut least_overlap = Coord::MAX;
        for (i, &candidate) in candidates.iter().enumerate() {
            let current = self.bound_of(candidate);
            let enlarged = current.enlarged(bound);
            let mut overlap = 0.0;
            for (j, &other) in candidates.iter().enumerate() {
                if i == j {
                    continue;
                }
                let other_bound = self.bound_of(other);
                overlap += enlarged.overlap(&other_bound) - current.overlap(&other_bound);
            }
            if overlap < least_overlap {
                least_overlap = overlap;
                best = candidate;
            }
        }
        best
    }

    #[inline]
    fn area_enlargement(&self, candidate: NodeId, bound: &BoundingBox) -> Coord {
        let current = self.bound_of(candidate);
        current.enlarged(bound).area() - current.area()
    }

    /// Stable sort by the lower bound value along `axis`, then the upper.
    fn sort_children_along(&self, children: &mut [NodeId], axis: usize) {
        children.sort_by(|a, b| {
            let ba = self.node(*a).bound();
            let bb = self.node(*b).bound();
            ba.min
                .component(axis)
                .partial_cmp(&bb.min.component(axis))
                .unwrap_or(Ordering::Equal)
                .then_with(|| {
                    ba.max
                        .component(axis)
                        .partial_cmp(&bb.max.component(axis))
                        .unwrap_or(Ordering::Equal)
                })
        });
    }

    /// The union of the bounds of a child list.
    fn bound_over(&self, children: &[NodeId]) -> BoundingBox {
        let mut bound = BoundingBox::empty();
        for &child in children {
            bound.enlarge(self.node(child).bound());
        }
        bound
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId::new(self.arena.len());
        self.arena.push(node);
        id
    }

    #[inline]
    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.arena[id.index()]
    }

    #[inline]
    fn bound_of(&self, id: NodeId) -> BoundingBox {
        *self.node(id).bound()
    }

    fn children_of(&self, id: NodeId) -> &[NodeId] {
        match self.node(id) {
            Node::Internal { children, .. } => children,
            Node::Leaf { .. } => &[],
        }
    }

    fn children_len(&self, id: NodeId) -> usize {
        self.children_of(id).len()
    }

    fn push_child(&mut self, id: NodeId, child: NodeId) {
        match self.node_mut(id) {
            Node::Internal { children, .. } => children.push(child),
            Node::Leaf { .. } => unreachable!("leaf nodes have no children"),
        }
    }

    fn take_children(&mut self, id: NodeId) -> Vec<NodeId> {
        match self.node_mut(id) {
            Node::Internal { children, .. } => std::mem::take(children),
            Node::Leaf { .. } => unreachable!("leaf nodes have no children"),
        }
    }

    fn restore_children(&mut self, id: NodeId, restored: Vec<NodeId>) {
        match self.node_mut(id) {
            Node::Internal { children, .. } => *children = restored,
            Node::Leaf { .. } => unreachable!("leaf nodes have no children"),
        }
    }
}

impl<const MAX_NODE: usize> Default for RStarTree<MAX_NODE> {
    fn default() -> Self {
        Self::new()
    }
}
