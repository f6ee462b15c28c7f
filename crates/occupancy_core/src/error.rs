use crate::{Extent3f, Point3f, VoxelKey};

use thiserror::Error;

/// A point (or a beam touching it) falls outside of the cube that a map can address with its `max_depth` and `resolution`.
///
/// This is never retried internally. Callers need to clip their input or build a map with a larger extent.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
#[error("point {point:?} is outside of the map extent {extent:?}")]
pub struct OutOfRangeError {
    /// The offending point.
    pub point: Point3f,
    /// The extent addressable by the map.
    pub extent: Extent3f,
}

/// A map configuration that can't be used to construct an octree.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum InvalidConfigurationError {
    #[error("resolution must be positive and finite, got {0}")]
    Resolution(f32),
    #[error("max depth must be in [1, {max}], got {depth}")]
    MaxDepth { depth: u8, max: u8 },
    #[error("map center must be finite, got {0:?}")]
    Center(Point3f),
    #[error("hit probability must be in (0.5, 1), got {0}")]
    ProbHit(f32),
    #[error("miss probability must be in (0, 0.5), got {0}")]
    ProbMiss(f32),
    #[error("hit probability {prob_hit} must be greater than miss probability {prob_miss}")]
    HitNotAboveMiss { prob_hit: f32, prob_miss: f32 },
    #[error("log-odds clamp bounds must be finite and satisfy min < max, got [{min}, {max}]")]
    ClampBounds { min: f32, max: f32 },
    #[error("occupancy threshold must be in (0, 1), got {0}")]
    OccupancyThreshold(f32),
    #[error("prior probability must be in (0, 1), got {0}")]
    PriorProbability(f32),
    #[error("prune epsilon must be non-negative and finite, got {0}")]
    PruneEpsilon(f32),
}

/// An observation that can't be fused into a map. Nothing is written when this is returned.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum UpdateError {
    #[error(transparent)]
    OutOfRange(#[from] OutOfRangeError),
    #[error("{0:?} is not a finest-depth key of this map")]
    InvalidKey(VoxelKey),
    #[error("measurement probability must be in (0, 1), got {0}")]
    InvalidProbability(f32),
}
