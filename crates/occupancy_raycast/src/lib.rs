//! Turning range-sensor beams into occupancy updates.
//!
//! - `GridRayTraversal3`: unbounded voxel stepping along a ray
//! - `BeamCaster`: the finest voxel keys along a segment of one map
//! - `OccupancyUpdater`: fuses `Observation`s (single beams or whole scans) into an `Octree`

pub mod beam;
pub mod grid_ray_traversal;
pub mod updater;

pub use beam::{traverse, BeamCaster, BeamTraversal};
pub use grid_ray_traversal::GridRayTraversal3;
pub use updater::{BeamReturn, IntegrationStats, Observation, OccupancyUpdater};

pub mod prelude {
    pub use super::{
        BeamCaster, BeamReturn, BeamTraversal, GridRayTraversal3, IntegrationStats, Observation,
        OccupancyUpdater,
    };
}
