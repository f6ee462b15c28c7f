//! Enumerating the finest voxels touched by a straight beam.
//!
//! A beam is traversed in voxel units relative to the map center, which is exactly how the `SpatialIndex` assigns keys, so
//! the first key is always `voxel_key(origin)` and the last is always `voxel_key(endpoint)`. In between, each step moves one
//! voxel along one axis toward the endpoint, so a beam never yields more keys than the L1 distance between its end keys plus
//! one, and never yields the same key twice in a row.
//!
//! ```
//! use occupancy_core::prelude::*;
//! use occupancy_raycast::BeamCaster;
//!
//! let index = SpatialIndex::new(0.1, 16, Point3f::ZERO).unwrap();
//! let caster = BeamCaster::new(&index);
//!
//! let keys: Vec<_> = caster
//!     .traverse(PointN([0.05, 0.05, 0.05]), PointN([0.35, 0.05, 0.05]))
//!     .unwrap()
//!     .map(|key| key.coords())
//!     .collect();
//!
//! assert_eq!(keys, vec![PointN([0, 0, 0]), PointN([1, 0, 0]), PointN([2, 0, 0]), PointN([3, 0, 0])]);
//! ```

use crate::GridRayTraversal3;

use occupancy_core::prelude::*;

use tracing::trace;

/// Casts beams through the finest voxels of one map.
#[derive(Clone, Copy, Debug)]
pub struct BeamCaster {
    index: SpatialIndex,
}

impl BeamCaster {
    pub fn new(index: &SpatialIndex) -> Self {
        Self { index: *index }
    }

    #[inline]
    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }

    /// The keys of all finest voxels on the segment from `origin` to `endpoint`, in order. Fails if either end is outside of
    /// the map.
    pub fn traverse(
        &self,
        origin: Point3f,
        endpoint: Point3f,
    ) -> Result<BeamTraversal, OutOfRangeError> {
        let start_key = self.index.voxel_key(origin)?;
        let end_key = self.index.voxel_key(endpoint)?;

        let start = self.to_voxel_units(origin);
        let end = self.to_voxel_units(endpoint);

        Ok(BeamTraversal::new(start, end - start, start_key, end_key))
    }

    /// Like `traverse`, for the segment of length `range` starting at `origin` and pointing along `direction`. A zero
    /// `direction` or a non-positive `range` yields just the origin voxel.
    pub fn traverse_direction(
        &self,
        origin: Point3f,
        direction: Point3f,
        range: f32,
    ) -> Result<BeamTraversal, OutOfRangeError> {
        let endpoint = match direction.normalized() {
            Some(unit) if range > 0.0 => origin + unit * range,
            _ => origin,
        };

        self.traverse(origin, endpoint)
    }

    #[inline]
    fn to_voxel_units(&self, p: Point3f) -> Point3f {
        (p - self.index.center()) / self.index.resolution()
    }
}

/// Shorthand for `BeamCaster::new(index).traverse(origin, endpoint)`.
pub fn traverse(
    index: &SpatialIndex,
    origin: Point3f,
    endpoint: Point3f,
) -> Result<BeamTraversal, OutOfRangeError> {
    BeamCaster::new(index).traverse(origin, endpoint)
}

/// An iterator over the finest voxel keys along one beam, from the origin's voxel to the endpoint's voxel inclusive.
///
/// Cloning the iterator restarts nothing and shares nothing: the clone continues independently from the same position.
#[derive(Clone, Debug)]
pub struct BeamTraversal {
    ray: GridRayTraversal3,
    depth: u8,
    start: Point3i,
    end: Point3i,
    next: Option<Point3i>,
}

impl BeamTraversal {
    fn new(start: Point3f, velocity: Point3f, start_key: VoxelKey, end_key: VoxelKey) -> Self {
        let ray = GridRayTraversal3::new(start, velocity);
        debug_assert_eq!(ray.current_voxel(), start_key.coords());

        Self {
            ray,
            depth: start_key.depth(),
            start: start_key.coords(),
            end: end_key.coords(),
            next: Some(start_key.coords()),
        }
    }

    /// The key of the origin's voxel.
    #[inline]
    pub fn start_key(&self) -> VoxelKey {
        VoxelKey::new(self.start, self.depth)
    }

    /// The key of the endpoint's voxel. Always the last key yielded.
    #[inline]
    pub fn end_key(&self) -> VoxelKey {
        VoxelKey::new(self.end, self.depth)
    }

    /// Returns `true` iff the beam starts and ends in the same voxel, so it yields exactly one key.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.start == self.end
    }

    /// Returns `true` iff stepping moved past the endpoint on some axis.
    #[inline]
    fn overshot(&self, voxel: Point3i) -> bool {
        let direction = self.ray.step_direction();

        (0..3).any(|axis| (voxel.at(axis) - self.end.at(axis)) * direction.at(axis) > 0)
    }
}

impl Iterator for BeamTraversal {
    type Item = VoxelKey;

    fn next(&mut self) -> Option<Self::Item> {
        let voxel = self.next.take()?;

        if voxel != self.end {
            self.ray.step();
            let stepped = self.ray.current_voxel();

            self.next = if self.overshot(stepped) {
                // Rounding let the ray drift off of the segment near a corner. Finish at the endpoint anyway.
                trace!(?stepped, end = ?self.end, "beam drifted past its endpoint");
                Some(self.end)
            } else {
                Some(stepped)
            };
        }

        Some(VoxelKey::new(voxel, self.depth))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.next {
            Some(next) => {
                let remaining = next.l1_distance(&self.end) as usize + 1;

                (1, Some(remaining))
            }
            None => (0, Some(0)),
        }
    }
}

impl std::iter::FusedIterator for BeamTraversal {}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
