//! The `Octree` is a sparse probabilistic occupancy map. Every node holds a log-odds estimate of the probability that its
//! cube of space is occupied.
//!
//! Space is never materialized up front. Before the first observation the tree is empty and every point is "unknown." The
//! first update creates the root, seeded with the prior, and each update after that lazily creates the nodes on the path down
//! to the finest voxel. A newly created child inherits its parent's current estimate, because an absent child always means
//! "this octant has the same estimate as the parent." The same rule lets `Octree::prune` fold homogeneous subtrees back into
//! their parent without changing the result of any query.
//!
//! Nodes live in a `Slab` arena and refer to their children by `NodeId`, so subdividing and collapsing recycles slots instead
//! of going through the allocator. No geometry is stored in nodes; keys and extents are recomputed by the `SpatialIndex`.
//!
//! # Example
//!
//! ```
//! use occupancy_core::prelude::*;
//! use occupancy_storage::prelude::*;
//!
//! let mut octree = Octree::new(OctreeConfig::default()).unwrap();
//! let p = PointN([1.0, 2.0, 3.0]);
//!
//! assert_eq!(octree.query_probability(p).unwrap(), None);
//!
//! octree.update_node(p, true).unwrap();
//! assert!(octree.query_probability(p).unwrap().unwrap() > 0.5);
//! assert_eq!(octree.classify(p).unwrap(), Occupancy::Occupied);
//! ```

use crate::{
    log_odds_to_probability, probability_to_log_odds, LeafIter, Measurement, NodeId,
    OccupancyNode, OccupiedIter, OctreeConfig, SensorModel,
};

use occupancy_core::prelude::*;

use slab::Slab;
use tracing::{debug, debug_span};

/// A sparse probabilistic occupancy map.
#[derive(Clone, Debug)]
pub struct Octree {
    config: OctreeConfig,
    index: SpatialIndex,
    model: SensorModel,
    prior_log_odds: f32,
    root: Option<NodeId>,
    nodes: Slab<OccupancyNode>,
}

/// The occupancy state of a point, as decided by the configured threshold.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Occupancy {
    /// Nothing has been observed yet.
    Unknown,
    Free,
    Occupied,
}

/// A snapshot of one node that exists in the tree, along with the key it was reached by.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeView {
    pub id: NodeId,
    pub key: VoxelKey,
    pub log_odds: f32,
    pub is_leaf: bool,
}

impl NodeView {
    #[inline]
    pub fn probability(&self) -> f32 {
        log_odds_to_probability(self.log_odds)
    }
}

impl Octree {
    /// Make an empty map. Fails if `config` is invalid.
    pub fn new(config: OctreeConfig) -> Result<Self, InvalidConfigurationError> {
        config.validate()?;
        let index = config.spatial_index()?;

        debug!(
            resolution = config.resolution,
            max_depth = config.max_depth,
            width = index.width(),
            "created occupancy octree"
        );

        Ok(Self {
            model: SensorModel::from_config(&config),
            prior_log_odds: probability_to_log_odds(config.prior_probability),
            index,
            config,
            root: None,
            nodes: Slab::new(),
        })
    }

    #[inline]
    pub fn config(&self) -> &OctreeConfig {
        &self.config
    }

    #[inline]
    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }

    #[inline]
    pub fn model(&self) -> &SensorModel {
        &self.model
    }

    #[inline]
    pub fn occupancy_threshold(&self) -> f32 {
        self.config.occupancy_threshold
    }

    /// Returns `true` iff nothing has been observed since construction or the last `clear`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    #[inline]
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    #[inline]
    pub fn get_node(&self, id: NodeId) -> Option<&OccupancyNode> {
        self.nodes.get(id.slab_key())
    }

    #[inline]
    pub(crate) fn node(&self, id: NodeId) -> &OccupancyNode {
        &self.nodes[id.slab_key()]
    }

    #[inline]
    fn node_mut(&mut self, id: NodeId) -> &mut OccupancyNode {
        &mut self.nodes[id.slab_key()]
    }

    fn insert_node(&mut self, node: OccupancyNode) -> NodeId {
        NodeId::from_slab_key(self.nodes.insert(node))
    }

    /// Fuse a hit (or a miss) into the finest voxel containing `point`. Returns the voxel's new log-odds.
    pub fn update_node(&mut self, point: Point3f, hit: bool) -> Result<f32, OutOfRangeError> {
        let key = self.index.voxel_key(point)?;

        Ok(self.fuse_key(key, Measurement::from(hit)))
    }

    /// Fuse `measurement` into the finest voxel containing `point`. Returns the voxel's new log-odds.
    ///
    /// Fails without writing anything if `point` is outside of the map or `measurement` is not valid.
    pub fn update_node_with(
        &mut self,
        point: Point3f,
        measurement: Measurement,
    ) -> Result<f32, UpdateError> {
        let key = self.index.voxel_key(point)?;

        self.update_key(key, measurement)
    }

    /// Fuse `measurement` into the voxel at `key`, creating the path to it as needed. Returns the voxel's new log-odds.
    ///
    /// Fails without writing anything if `key` is not a finest-depth key of this map or `measurement` is not valid.
    pub fn update_key(
        &mut self,
        key: VoxelKey,
        measurement: Measurement,
    ) -> Result<f32, UpdateError> {
        if key.depth() != self.index.max_depth() || !self.index.is_valid_key(key) {
            return Err(UpdateError::InvalidKey(key));
        }
        if let Measurement::Probability(p) = measurement {
            if !measurement.is_valid() {
                return Err(UpdateError::InvalidProbability(p));
            }
        }

        Ok(self.fuse_key(key, measurement))
    }

    fn fuse_key(&mut self, key: VoxelKey, measurement: Measurement) -> f32 {
        let id = self.find_or_create_path(key);
        let model = self.model;
        let node = self.node_mut(id);
        node.fuse(&model, measurement);

        node.log_odds()
    }

    fn find_or_create_path(&mut self, key: VoxelKey) -> NodeId {
        let mut id = match self.root {
            Some(root) => root,
            None => {
                let root = self.insert_node(OccupancyNode::new(self.prior_log_odds));
                self.root = Some(root);
                root
            }
        };

        for depth in 0..key.depth() {
            let child_index = self.index.child_index(key, depth);
            let node = self.node(id);
            id = match node.child(child_index) {
                Some(child) => child,
                None => {
                    let inherited = node.log_odds();
                    let child = self.insert_node(OccupancyNode::new(inherited));
                    self.node_mut(id).set_child(child_index, Some(child));
                    child
                }
            };
        }

        id
    }

    /// The probability that the finest voxel containing `point` is occupied, or `None` if nothing is known about it.
    ///
    /// If the path to the voxel ends early, the estimate of the deepest existing ancestor applies to the whole region.
    pub fn query_probability(&self, point: Point3f) -> Result<Option<f32>, OutOfRangeError> {
        Ok(self.search(point)?.map(|view| view.probability()))
    }

    /// The deepest existing node on the path to the finest voxel containing `point`.
    pub fn search(&self, point: Point3f) -> Result<Option<NodeView>, OutOfRangeError> {
        let key = self.index.voxel_key(point)?;

        Ok(self.search_key(key))
    }

    /// The deepest existing node on the path to `key`.
    pub fn search_key(&self, key: VoxelKey) -> Option<NodeView> {
        let mut id = self.root?;
        let mut node_key = VoxelKey::ROOT;

        while node_key.depth() < key.depth() {
            let child_index = self.index.child_index(key, node_key.depth());
            match self.node(id).child(child_index) {
                Some(child) => {
                    id = child;
                    node_key = node_key.child(child_index);
                }
                None => break,
            }
        }

        let node = self.node(id);

        Some(NodeView {
            id,
            key: node_key,
            log_odds: node.log_odds(),
            is_leaf: node.is_leaf(),
        })
    }

    /// Classify the finest voxel containing `point`. It is occupied iff its probability exceeds the occupancy threshold, the
    /// same rule `iter_occupied` uses, so space still at a 0.5 prior is never an obstacle.
    pub fn classify(&self, point: Point3f) -> Result<Occupancy, OutOfRangeError> {
        let class = match self.query_probability(point)? {
            None => Occupancy::Unknown,
            Some(p) if p > self.occupancy_threshold() => Occupancy::Occupied,
            Some(_) => Occupancy::Free,
        };

        Ok(class)
    }

    /// Returns `true` iff the voxel containing `point` is known and more likely than the threshold to be occupied.
    pub fn is_occupied(&self, point: Point3f) -> Result<bool, OutOfRangeError> {
        Ok(self.classify(point)? == Occupancy::Occupied)
    }

    /// Collapse every subtree whose finest regions all agree within `prune_epsilon` into a single node. Returns the number of
    /// nodes removed.
    ///
    /// Absent children count as regions holding their parent's estimate. A collapsed node takes the midpoint of the range of
    /// the estimates it replaces, so no query result moves by more than half the epsilon in one pass.
    pub fn prune(&mut self) -> usize {
        let root = match self.root {
            Some(root) => root,
            None => return 0,
        };

        let span = debug_span!("prune", nodes_before = self.nodes.len());
        let _guard = span.enter();

        let mut removed = 0;
        self.prune_node(root, &mut removed);

        debug!(removed, nodes_after = self.nodes.len(), "pruned octree");

        removed
    }

    /// Post-order. Returns the range of log-odds that the subtree at `id` held before this pass if it is a leaf once pruned,
    /// or `None` if it still has children.
    fn prune_node(&mut self, id: NodeId, removed: &mut usize) -> Option<LogOddsRange> {
        let node = self.node(id);
        let own = LogOddsRange::new(node.log_odds());
        let children = *node.children();
        if children.iter().all(Option::is_none) {
            return Some(own);
        }

        // Absent octants hold this node's own estimate.
        let mut range = if children.iter().any(Option::is_none) {
            Some(own)
        } else {
            None
        };
        let mut all_leaves = true;
        for &child in children.iter().flatten() {
            match self.prune_node(child, removed) {
                Some(child_range) => {
                    range = Some(range.map_or(child_range, |r| r.union(child_range)));
                }
                None => all_leaves = false,
            }
        }
        let range = match range {
            Some(range) if all_leaves && range.width() <= self.config.prune_epsilon => range,
            _ => return None,
        };

        let node = self.node_mut(id);
        node.set_log_odds(range.midpoint());
        for child in node.take_children().iter().flatten() {
            self.nodes.remove(child.slab_key());
            *removed += 1;
        }

        Some(range)
    }

    /// Every homogeneous region intersecting the closed box `bounds`, explicit leaves and implicit octants alike, in depth-first
    /// order. Implicit regions are yielded once at their own depth rather than being expanded into finest voxels.
    pub fn iter_leaves(&self, bounds: Extent3f) -> LeafIter<'_> {
        LeafIter::new(self, bounds)
    }

    /// Like `iter_leaves`, but only yields `(key, probability)` for regions whose probability exceeds the occupancy threshold.
    pub fn iter_occupied(&self, bounds: Extent3f) -> OccupiedIter<'_> {
        OccupiedIter::new(self.iter_leaves(bounds), self.occupancy_threshold())
    }

    /// Visit every node that exists in the tree, parents before children.
    pub fn visit_nodes_in_preorder(&self, visitor: &mut impl OctreeVisitor) -> VisitStatus {
        match self.root {
            Some(root) => self.visit_node_in_preorder(root, VoxelKey::ROOT, visitor),
            None => VisitStatus::Continue,
        }
    }

    fn visit_node_in_preorder(
        &self,
        id: NodeId,
        key: VoxelKey,
        visitor: &mut impl OctreeVisitor,
    ) -> VisitStatus {
        let node = self.node(id);
        let view = NodeView {
            id,
            key,
            log_odds: node.log_odds(),
            is_leaf: node.is_leaf(),
        };

        let status = visitor.visit_node(&view);
        if status != VisitStatus::Continue {
            // Stop only prunes this branch.
            return if status == VisitStatus::ExitEarly {
                VisitStatus::ExitEarly
            } else {
                VisitStatus::Continue
            };
        }

        for child_index in 0..8 {
            if let Some(child) = node.child(child_index) {
                if self.visit_node_in_preorder(child, key.child(child_index), visitor)
                    == VisitStatus::ExitEarly
                {
                    return VisitStatus::ExitEarly;
                }
            }
        }

        VisitStatus::Continue
    }

    /// The number of nodes that exist in the tree.
    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// The number of existing nodes without children.
    pub fn num_leaf_nodes(&self) -> usize {
        self.nodes.iter().filter(|(_, node)| node.is_leaf()).count()
    }

    /// Approximate heap and inline memory in bytes, including free arena slots.
    pub fn memory_usage(&self) -> usize {
        std::mem::size_of::<Self>() + self.nodes.capacity() * std::mem::size_of::<OccupancyNode>()
    }

    /// Forget every observation. The arena keeps its capacity.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }
}

/// The span of estimates a region held before pruning.
#[derive(Clone, Copy, Debug)]
struct LogOddsRange {
    min: f32,
    max: f32,
}

impl LogOddsRange {
    fn new(log_odds: f32) -> Self {
        Self {
            min: log_odds,
            max: log_odds,
        }
    }

    fn union(self, other: Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    fn width(&self) -> f32 {
        self.max - self.min
    }

    fn midpoint(&self) -> f32 {
        self.min + self.width() / 2.0
    }
}

pub trait OctreeVisitor {
    fn visit_node(&mut self, node: &NodeView) -> VisitStatus;
}

impl<F> OctreeVisitor for F
where
    F: FnMut(&NodeView) -> VisitStatus,
{
    #[inline]
    fn visit_node(&mut self, node: &NodeView) -> VisitStatus {
        (self)(node)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum VisitStatus {
    /// Continue traversing this branch.
    Continue,
    /// Stop traversing this branch.
    Stop,
    /// Stop traversing the entire tree. No further nodes will be visited.
    ExitEarly,
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
