//! Conversion between continuous map coordinates and discrete `VoxelKey`s.
//!
//! The map is a cube of edge length `resolution * 2^max_depth` centered on `center`. Keys at `max_depth` address the finest
//! voxels, each `resolution` wide. A point is assigned to a voxel by floor division, so every voxel is a half-open cube and
//! the map itself is the half-open cube `[center - radius, center + radius)`.
//!
//! No geometry is stored in the tree. Everything here is recomputed from keys on demand.

use crate::{
    key::half_span, Extent3f, FloatPoint, InvalidConfigurationError, OutOfRangeError, Point,
    Point3f, PointN, VoxelKey, MAX_SUPPORTED_DEPTH,
};

use serde::{Deserialize, Serialize};

/// Maps points to keys (and back) for a fixed `resolution`, `max_depth` and map `center`.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct SpatialIndex {
    resolution: f32,
    max_depth: u8,
    center: Point3f,
}

impl SpatialIndex {
    pub fn new(
        resolution: f32,
        max_depth: u8,
        center: Point3f,
    ) -> Result<Self, InvalidConfigurationError> {
        if !(resolution > 0.0 && resolution.is_finite()) {
            return Err(InvalidConfigurationError::Resolution(resolution));
        }
        if max_depth == 0 || max_depth > MAX_SUPPORTED_DEPTH {
            return Err(InvalidConfigurationError::MaxDepth {
                depth: max_depth,
                max: MAX_SUPPORTED_DEPTH,
            });
        }
        if !center.is_finite() {
            return Err(InvalidConfigurationError::Center(center));
        }

        Ok(Self {
            resolution,
            max_depth,
            center,
        })
    }

    /// Edge length of the finest voxels.
    #[inline]
    pub fn resolution(&self) -> f32 {
        self.resolution
    }

    #[inline]
    pub fn max_depth(&self) -> u8 {
        self.max_depth
    }

    #[inline]
    pub fn center(&self) -> Point3f {
        self.center
    }

    /// Edge length of a voxel at `depth`.
    #[inline]
    pub fn edge_length(&self, depth: u8) -> f32 {
        debug_assert!(depth <= self.max_depth);

        self.resolution * (1u64 << (self.max_depth - depth)) as f32
    }

    /// Edge length of the whole map.
    #[inline]
    pub fn width(&self) -> f32 {
        self.edge_length(0)
    }

    /// Half the width of the map.
    #[inline]
    pub fn radius(&self) -> f32 {
        self.width() / 2.0
    }

    /// The minimum corner of the map.
    #[inline]
    pub fn origin(&self) -> Point3f {
        self.center - Point3f::fill(self.radius())
    }

    /// The cube covered by the map.
    #[inline]
    pub fn extent(&self) -> Extent3f {
        Extent3f::from_min_and_shape(self.origin(), Point3f::fill(self.width()))
    }

    /// Returns `true` iff `point` lies inside of the map, i.e. `voxel_key(point)` would succeed.
    #[inline]
    pub fn contains(&self, point: Point3f) -> bool {
        self.voxel_key(point).is_ok()
    }

    /// The key of the finest voxel containing `point`.
    #[inline]
    pub fn voxel_key(&self, point: Point3f) -> Result<VoxelKey, OutOfRangeError> {
        let half = half_span(self.max_depth) as f32;
        let scaled = ((point - self.center) / self.resolution).floor();

        // NaN fails both comparisons.
        let in_range = (0..3).all(|axis| {
            let c = scaled.at(axis);
            c >= -half && c < half
        });
        if !in_range {
            return Err(self.out_of_range(point));
        }

        Ok(VoxelKey::new(scaled.as_3i(), self.max_depth))
    }

    /// The key of the voxel at `depth` containing `point`.
    pub fn key_of(&self, point: Point3f, depth: u8) -> Result<VoxelKey, OutOfRangeError> {
        let key = self.voxel_key(point)?;
        let depth = depth.min(self.max_depth);

        Ok(key.ancestor(depth).unwrap_or(key))
    }

    /// The octant (`0bZYX`) that `key` falls into relative to its ancestor at `parent_depth`. This is a pure function of the
    /// key, so the same point always resolves to the same octant at every level.
    ///
    /// # Panics
    ///
    /// If `key` is not strictly deeper than `parent_depth`.
    #[inline]
    pub fn child_index(&self, key: VoxelKey, parent_depth: u8) -> u8 {
        assert!(
            parent_depth < key.depth(),
            "{:?} has no ancestor below depth {}",
            key,
            parent_depth
        );

        key.ancestor(parent_depth + 1)
            .and_then(|k| k.index_in_parent())
            .unwrap_or(0)
    }

    /// The key one level coarser than `key`, or `None` for the root.
    #[inline]
    pub fn parent(&self, key: VoxelKey) -> Option<VoxelKey> {
        key.parent()
    }

    /// The key of octant `child_index` of `key`, or `None` if `key` is already at `max_depth`.
    #[inline]
    pub fn child(&self, key: VoxelKey, child_index: u8) -> Option<VoxelKey> {
        if key.depth() >= self.max_depth {
            return None;
        }

        Some(key.child(child_index))
    }

    /// The ancestor of `key` at `depth`, or `None` if `depth` is deeper than `key`.
    #[inline]
    pub fn ancestor(&self, key: VoxelKey, depth: u8) -> Option<VoxelKey> {
        key.ancestor(depth)
    }

    /// The center of the cube addressed by `key`.
    #[inline]
    pub fn center_of(&self, key: VoxelKey) -> Point3f {
        if key.is_root() {
            return self.center;
        }

        let edge = self.edge_length(key.depth());
        let offset = Point3f::from(key.coords()) + PointN([0.5; 3]);

        self.center + offset * edge
    }

    /// The cube addressed by `key`.
    #[inline]
    pub fn extent_of(&self, key: VoxelKey) -> Extent3f {
        if key.is_root() {
            return self.extent();
        }

        let edge = self.edge_length(key.depth());

        Extent3f::from_min_and_shape(
            self.center + Point3f::from(key.coords()) * edge,
            Point3f::fill(edge),
        )
    }

    /// Returns `true` iff `key` addresses a cube of this map.
    #[inline]
    pub fn is_valid_key(&self, key: VoxelKey) -> bool {
        key.depth() <= self.max_depth && key.is_valid()
    }

    fn out_of_range(&self, point: Point3f) -> OutOfRangeError {
        OutOfRangeError {
            point,
            extent: self.extent(),
        }
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
