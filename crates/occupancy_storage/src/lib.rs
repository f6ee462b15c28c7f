//! Probabilistic occupancy storage.
//!
//! The main type is the `Octree`, a sparse map from cubes of space to a log-odds estimate of their occupancy. Observations are
//! fused with the `SensorModel` configured by an `OctreeConfig`, homogeneous subtrees are collapsed by `Octree::prune`, and
//! regions can be scanned lazily with `Octree::iter_leaves` and `Octree::iter_occupied`.
//!
//! For readers that need to run alongside a writer, `SharedOctree` hands out copy-on-write snapshots.

pub mod config;
pub mod iter;
pub mod node;
pub mod octree;
pub mod sensor_model;
pub mod shared;

pub use config::*;
pub use iter::*;
pub use node::*;
pub use octree::*;
pub use sensor_model::*;
pub use shared::*;

pub mod prelude {
    pub use super::{
        log_odds_to_probability, probability_to_log_odds, LeafIter, Measurement, NodeId,
        NodeView, Occupancy, OccupancyLeaf, OccupancyNode, OccupiedIter, Octree, OctreeConfig,
        OctreeVisitor, PrunePolicy, SensorModel, SharedOctree, VisitStatus,
    };
}
