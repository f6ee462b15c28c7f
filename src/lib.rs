//! Probabilistic 3D occupancy mapping on a sparse octree.
//!
//! Repeated noisy range measurements are fused into a map of free, occupied and unknown space. Most of space is unknown and
//! never materialized, and homogeneous regions are collapsed so that memory stays bounded under continuous sensing.
//!
//! This library is organized into several crates:
//! - **core**: points, extents, `VoxelKey` and the `SpatialIndex` that maps continuous coordinates to keys
//! - **storage**: the `Octree` with its log-odds `SensorModel`, pruning and region iteration
//! - **raycast**: beam traversal and the `OccupancyUpdater` that integrates sensor observations
//!
//! ```
//! use occupancy_octree::prelude::*;
//!
//! let config = OctreeConfig::default();
//! let mut octree = Octree::new(config).unwrap();
//! let mut updater = OccupancyUpdater::from_config(&config);
//!
//! let origin = PointN([0.0, 0.0, 0.0]);
//! let tip = PointN([1.0, 0.0, 0.0]);
//! updater.integrate(&mut octree, &Observation::hit(origin, tip)).unwrap();
//!
//! assert_eq!(octree.classify(tip).unwrap(), Occupancy::Occupied);
//! assert_eq!(octree.classify(PointN([0.5, 0.0, 0.0])).unwrap(), Occupancy::Free);
//!
//! // Space off of the beam keeps the prior.
//! assert_eq!(octree.query_probability(PointN([0.0, 5.0, 0.0])).unwrap(), Some(0.5));
//! ```

pub use occupancy_core as core;
pub use occupancy_storage as storage;

#[cfg(feature = "raycast")]
pub use occupancy_raycast as raycast;

pub mod prelude {
    pub use super::core::prelude::*;
    pub use super::storage::prelude::*;

    #[cfg(feature = "raycast")]
    pub use super::raycast::prelude::*;
}
