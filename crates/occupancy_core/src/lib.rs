//! The core data types for occupancy octrees:
//! - `PointN`: a 3D point, most importantly `Point3i` and `Point3f`
//! - `ExtentN`: a 3D axis-aligned box, most importantly `Extent3f`
//! - `VoxelKey`: the discrete address of an octree node
//! - `SpatialIndex`: the mapping between continuous coordinates and `VoxelKey`s

pub mod error;
pub mod extent;
pub mod key;
pub mod point;
pub mod point3;
pub mod spatial_index;

pub use error::{InvalidConfigurationError, OutOfRangeError, UpdateError};
pub use extent::{Extent3, Extent3f, ExtentN};
pub use key::{VoxelKey, MAX_SUPPORTED_DEPTH};
pub use point::{Distance, DotProduct, FloatPoint, Norm, NormSquared, Point, PointN, SmallZero};
pub use point3::{Point3, Point3f, Point3i};
pub use spatial_index::SpatialIndex;

pub use num;

pub mod prelude {
    pub use super::{
        Distance, DotProduct, Extent3, Extent3f, ExtentN, FloatPoint, InvalidConfigurationError,
        Norm, NormSquared, OutOfRangeError, Point, Point3, Point3f, Point3i, PointN, SmallZero,
        SpatialIndex, UpdateError, VoxelKey,
    };
}
