//! Lazy, bounded, depth-first iteration over the homogeneous regions of an `Octree`.

use crate::{log_odds_to_probability, NodeId, Octree};

use occupancy_core::prelude::*;

/// A cube of space with a single occupancy estimate. Either an existing leaf node, or an absent octant of an inner node that
/// implicitly shares its parent's estimate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OccupancyLeaf {
    /// Where the region is. The depth of the key gives the size of the region.
    pub key: VoxelKey,
    pub log_odds: f32,
}

impl OccupancyLeaf {
    #[inline]
    pub fn probability(&self) -> f32 {
        log_odds_to_probability(self.log_odds)
    }
}

enum Frame {
    Node(NodeId, VoxelKey),
    Implicit(OccupancyLeaf),
}

/// Yields every `OccupancyLeaf` that intersects a closed bounding box. Created by `Octree::iter_leaves`.
///
/// Holds no state shared with other iterators, so each call starts a fresh traversal.
pub struct LeafIter<'a> {
    octree: &'a Octree,
    bounds: Extent3f,
    stack: Vec<Frame>,
}

impl<'a> LeafIter<'a> {
    pub(crate) fn new(octree: &'a Octree, bounds: Extent3f) -> Self {
        let mut iter = Self {
            octree,
            bounds,
            stack: Vec::new(),
        };
        if let Some(root) = octree.root() {
            if iter.intersects(VoxelKey::ROOT) {
                iter.stack.push(Frame::Node(root, VoxelKey::ROOT));
            }
        }

        iter
    }

    #[inline]
    fn intersects(&self, key: VoxelKey) -> bool {
        self.octree
            .index()
            .extent_of(key)
            .intersects_closed(&self.bounds)
    }
}

impl<'a> Iterator for LeafIter<'a> {
    type Item = OccupancyLeaf;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(frame) = self.stack.pop() {
            let (id, key) = match frame {
                Frame::Implicit(leaf) => return Some(leaf),
                Frame::Node(id, key) => (id, key),
            };

            let node = self.octree.node(id);
            if node.is_leaf() {
                return Some(OccupancyLeaf {
                    key,
                    log_odds: node.log_odds(),
                });
            }

            // Reversed so that octant 0 is popped first.
            for child_index in (0..8).rev() {
                let child_key = key.child(child_index);
                if !self.intersects(child_key) {
                    continue;
                }
                let frame = match node.child(child_index) {
                    Some(child) => Frame::Node(child, child_key),
                    None => Frame::Implicit(OccupancyLeaf {
                        key: child_key,
                        log_odds: node.log_odds(),
                    }),
                };
                self.stack.push(frame);
            }
        }

        None
    }
}

/// Yields `(key, probability)` for the regions of a `LeafIter` whose probability exceeds a threshold. Created by
/// `Octree::iter_occupied`.
pub struct OccupiedIter<'a> {
    leaves: LeafIter<'a>,
    threshold: f32,
}

impl<'a> OccupiedIter<'a> {
    pub(crate) fn new(leaves: LeafIter<'a>, threshold: f32) -> Self {
        Self { leaves, threshold }
    }
}

impl<'a> Iterator for OccupiedIter<'a> {
    type Item = (VoxelKey, f32);

    fn next(&mut self) -> Option<Self::Item> {
        let threshold = self.threshold;

        self.leaves.find_map(|leaf| {
            let p = leaf.probability();

            if p > threshold {
                Some((leaf.key, p))
            } else {
                None
            }
        })
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OctreeConfig;

    use pretty_assertions::assert_eq;

    fn octree() -> Octree {
        Octree::new(OctreeConfig {
            resolution: 1.0,
            max_depth: 3,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn empty_tree_yields_nothing() {
        let octree = octree();

        assert_eq!(octree.iter_leaves(octree.index().extent()).count(), 0);
    }

    #[test]
    fn implicit_octants_are_yielded_at_their_own_depth() {
        let mut octree = octree();
        octree.update_node(PointN([0.5, 0.5, 0.5]), true).unwrap();

        let leaves: Vec<_> = octree.iter_leaves(octree.index().extent()).collect();

        // 7 implicit octants at each of depths 1, 2 and 3, plus the one explicit leaf.
        assert_eq!(leaves.len(), 22);
        assert_eq!(leaves.iter().filter(|l| l.key.depth() == 1).count(), 7);
        assert_eq!(leaves.iter().filter(|l| l.key.depth() == 3).count(), 8);

        let explicit = leaves
            .iter()
            .find(|l| l.key == VoxelKey::new(PointN([0, 0, 0]), 3))
            .unwrap();
        assert_eq!(explicit.log_odds, octree.model().hit());
    }

    #[test]
    fn bounds_prune_traversal() {
        let mut octree = octree();
        octree.update_node(PointN([0.5, 0.5, 0.5]), true).unwrap();

        // Touches the upper faces of voxel (0, 0, 0), so its 7 neighbors in the positive directions are included.
        let bounds = Extent3f::from_corners(PointN([0.5, 0.5, 0.5]), PointN([1.0, 1.0, 1.0]));
        let keys: Vec<_> = octree.iter_leaves(bounds).map(|l| l.key).collect();

        assert_eq!(keys.len(), 8);
        for key in keys.iter() {
            assert_eq!(key.depth(), 3);
            assert_eq!(key.ancestor(2), Some(VoxelKey::new(PointN([0, 0, 0]), 2)));
        }

        // A point on a corner only selects the voxel whose minimum it is.
        let corner = Extent3f::from_corners(PointN([1.0, 1.0, 1.0]), PointN([1.0, 1.0, 1.0]));
        let keys: Vec<_> = octree.iter_leaves(corner).map(|l| l.key).collect();

        assert_eq!(keys, vec![VoxelKey::new(PointN([1, 1, 1]), 3)]);
    }
}
