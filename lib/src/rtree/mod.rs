//! 3D R*-tree spatial index.
//!
//! A balanced, depth-uniform tree over axis-aligned bounding boxes,
//! following the R*-tree of Beckmann et al.
//! (<https://epub.ub.uni-muenchen.de/4256/1/31.pdf>): subtree choice by
//! overlap enlargement at the leaf level, splits by minimum-margin axis
//! then minimum-overlap distribution, and opportunistic forced
//! reinsertion on first overflow.
//!
//! Nodes live in an arena addressed by 32-bit [`NodeId`]s; leaf entries
//! carry a `u32` payload (the query layer stores triangle indices).

mod node;
mod tree;

pub use node::{Node, NodeId};
pub use tree::RStarTree;
