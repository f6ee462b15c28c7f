//! The discrete address of an octree node.
//!
//! A `VoxelKey` is a triple of signed integer coordinates at some `depth`. Depth 0 is the root cube, and every level deeper
//! halves the edge length. At depth `d >= 1` each coordinate lies in `[-2^(d-1), 2^(d-1))`, so the root's eight children have
//! coordinates in `{-1, 0}` and are split by the sign of each axis. The root is always `(0, 0, 0)` at depth 0.
//!
//! Keys are pure values: they never carry a resolution or a map center. Converting to and from continuous space is the job of
//! the `SpatialIndex`.
//!
//! ```text
//! depth 1:  [-1][ 0]            (one axis shown)
//! depth 2:  [-2][-1][ 0][ 1]
//! depth 3:  [-4][-3][-2][-1][ 0][ 1][ 2][ 3]
//! ```

use crate::{Point, Point3i, PointN};

use serde::{Deserialize, Serialize};
use std::fmt;

/// The deepest level supported by keys. Coordinates must fit in an `i32` at this depth.
pub const MAX_SUPPORTED_DEPTH: u8 = 30;

/// Identifies one cube of space: a node (or an implicit region) of the octree.
#[derive(Clone, Copy, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct VoxelKey {
    coords: Point3i,
    depth: u8,
}

impl fmt::Debug for VoxelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "VoxelKey({}, {}, {} @ {})",
            self.coords.x(),
            self.coords.y(),
            self.coords.z(),
            self.depth
        )
    }
}

impl VoxelKey {
    /// The key of the root cube.
    pub const ROOT: Self = Self {
        coords: PointN([0, 0, 0]),
        depth: 0,
    };

    #[inline]
    pub fn new(coords: Point3i, depth: u8) -> Self {
        Self { coords, depth }
    }

    #[inline]
    pub fn coords(&self) -> Point3i {
        self.coords
    }

    #[inline]
    pub fn depth(&self) -> u8 {
        self.depth
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.depth == 0
    }

    /// Returns `true` iff the coordinates are addressable at this key's depth.
    pub fn is_valid(&self) -> bool {
        if self.depth > MAX_SUPPORTED_DEPTH {
            return false;
        }
        let half = half_span(self.depth);

        (0..3).all(|axis| {
            let c = i64::from(self.coords.at(axis));
            -half <= c && c < half.max(1) && (self.depth > 0 || c == 0)
        })
    }

    /// The parent key one level up, or `None` for the root.
    #[inline]
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }

        Some(self.ancestor_unchecked(self.depth - 1))
    }

    /// The key of this key's ancestor at `depth`, which may be the key itself. Returns `None` if `depth` is deeper than the key.
    #[inline]
    pub fn ancestor(&self, depth: u8) -> Option<Self> {
        if depth > self.depth {
            return None;
        }

        Some(self.ancestor_unchecked(depth))
    }

    fn ancestor_unchecked(&self, depth: u8) -> Self {
        let shift = u32::from(self.depth - depth);
        let u = self.unsigned();

        Self::from_unsigned([u[0] >> shift, u[1] >> shift, u[2] >> shift], depth)
    }

    /// The child key in the octant `child_index`, a number in `[0, 8)` with the binary format `0bZYX`. A set bit selects the
    /// positive half of that axis.
    #[inline]
    pub fn child(&self, child_index: u8) -> Self {
        debug_assert!(child_index < 8);

        let u = self.unsigned();
        let mut child = [0; 3];
        for (axis, c) in child.iter_mut().enumerate() {
            *c = (u[axis] << 1) | ((u32::from(child_index) >> axis) & 1);
        }

        Self::from_unsigned(child, self.depth + 1)
    }

    /// The octant of the parent that contains this key, or `None` for the root. Inverse of `child`.
    #[inline]
    pub fn index_in_parent(&self) -> Option<u8> {
        if self.is_root() {
            return None;
        }

        let u = self.unsigned();

        Some(((u[0] & 1) | ((u[1] & 1) << 1) | ((u[2] & 1) << 2)) as u8)
    }

    /// Coordinates translated so that the minimum key at this depth is `(0, 0, 0)`.
    #[inline]
    fn unsigned(&self) -> [u32; 3] {
        let half = half_span(self.depth);

        [
            (i64::from(self.coords.x()) + half) as u32,
            (i64::from(self.coords.y()) + half) as u32,
            (i64::from(self.coords.z()) + half) as u32,
        ]
    }

    #[inline]
    fn from_unsigned(u: [u32; 3], depth: u8) -> Self {
        let half = half_span(depth);

        Self {
            coords: PointN([
                (i64::from(u[0]) - half) as i32,
                (i64::from(u[1]) - half) as i32,
                (i64::from(u[2]) - half) as i32,
            ]),
            depth,
        }
    }
}

/// Half the number of keys along one axis at `depth`. Zero at the root.
#[inline]
pub(crate) fn half_span(depth: u8) -> i64 {
    (1i64 << depth) >> 1
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
