//! Fusing range-sensor observations into an `Octree`.
//!
//! Every voxel a beam passes through is evidence of free space, and the voxel it ends in is evidence of an obstacle. A beam
//! that reached the sensor's maximum range without a return carries no evidence of an obstacle, so its last voxel is marked
//! free like the rest. The sensor driver has to say which kind of beam it is; this is never inferred from the length.

use crate::BeamCaster;

use occupancy_core::prelude::*;
use occupancy_storage::prelude::*;

use ahash::AHashSet;
use std::ops::AddAssign;
use tracing::{debug, debug_span, trace};

/// How a beam ended.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum BeamReturn {
    /// The beam was reflected by a surface at the endpoint.
    Hit,
    /// Nothing was detected up to the endpoint, which is at the sensor's maximum range.
    MaxRange,
}

/// One range measurement in map coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Observation {
    pub origin: Point3f,
    pub endpoint: Point3f,
    pub beam_return: BeamReturn,
}

impl Observation {
    /// A beam that hit a surface at `endpoint`.
    pub fn hit(origin: Point3f, endpoint: Point3f) -> Self {
        Self {
            origin,
            endpoint,
            beam_return: BeamReturn::Hit,
        }
    }

    /// A beam that returned nothing up to `endpoint`.
    pub fn max_range(origin: Point3f, endpoint: Point3f) -> Self {
        Self {
            origin,
            endpoint,
            beam_return: BeamReturn::MaxRange,
        }
    }

    #[inline]
    pub fn is_hit(&self) -> bool {
        self.beam_return == BeamReturn::Hit
    }
}

/// What an integration did to the tree.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct IntegrationStats {
    /// Number of beams cast.
    pub beams: usize,
    /// Number of voxel updates applied. Equal to `misses + hits`.
    pub voxels_updated: usize,
    /// Updates that marked a voxel as free.
    pub misses: usize,
    /// Updates that marked a voxel as occupied.
    pub hits: usize,
    /// Beams that started and ended in the same voxel.
    pub degenerate_beams: usize,
    /// Nodes removed by a scheduled prune.
    pub nodes_pruned: usize,
}

impl AddAssign for IntegrationStats {
    fn add_assign(&mut self, rhs: Self) {
        self.beams += rhs.beams;
        self.voxels_updated += rhs.voxels_updated;
        self.misses += rhs.misses;
        self.hits += rhs.hits;
        self.degenerate_beams += rhs.degenerate_beams;
        self.nodes_pruned += rhs.nodes_pruned;
    }
}

/// Applies observations to an `Octree` and prunes it on schedule.
///
/// Keeps scratch buffers between calls, so reuse one updater per map.
#[derive(Clone, Debug)]
pub struct OccupancyUpdater {
    prune_policy: PrunePolicy,
    observations_since_prune: u32,
    keys: Vec<VoxelKey>,
    free: AHashSet<VoxelKey>,
    occupied: AHashSet<VoxelKey>,
}

impl OccupancyUpdater {
    pub fn new(prune_policy: PrunePolicy) -> Self {
        Self {
            prune_policy,
            observations_since_prune: 0,
            keys: Vec::new(),
            free: AHashSet::default(),
            occupied: AHashSet::default(),
        }
    }

    /// Uses the pruning schedule of `config`.
    pub fn from_config(config: &OctreeConfig) -> Self {
        Self::new(config.prune_policy())
    }

    #[inline]
    pub fn prune_policy(&self) -> PrunePolicy {
        self.prune_policy
    }

    /// Observations integrated since the last scheduled prune.
    #[inline]
    pub fn observations_since_prune(&self) -> u32 {
        self.observations_since_prune
    }

    /// Cast one beam and fuse it into `tree`: a miss for every voxel before the endpoint's voxel, and a hit (or a miss, for a
    /// max-range beam) for the endpoint's voxel.
    ///
    /// Both ends are checked before anything is written, so on error the tree is unchanged.
    pub fn integrate(
        &mut self,
        tree: &mut Octree,
        observation: &Observation,
    ) -> Result<IntegrationStats, UpdateError> {
        let traversal =
            BeamCaster::new(tree.index()).traverse(observation.origin, observation.endpoint)?;

        let mut stats = IntegrationStats {
            beams: 1,
            ..Default::default()
        };
        if traversal.is_degenerate() {
            debug!(origin = ?observation.origin, "beam is shorter than one voxel");
            stats.degenerate_beams = 1;
        }

        self.keys.clear();
        self.keys.extend(traversal);
        trace!(
            voxels = self.keys.len(),
            hit = observation.is_hit(),
            "integrating beam"
        );

        if let Some((&last, path)) = self.keys.split_last() {
            for &key in path {
                tree.update_key(key, Measurement::Miss)?;
            }
            stats.misses += path.len();

            if observation.is_hit() {
                tree.update_key(last, Measurement::Hit)?;
                stats.hits += 1;
            } else {
                tree.update_key(last, Measurement::Miss)?;
                stats.misses += 1;
            }
        }
        stats.voxels_updated = stats.misses + stats.hits;
        stats.nodes_pruned = self.count_observation(tree);

        Ok(stats)
    }

    /// Integrate a batch of beams cast from one `origin`, like a single sweep of a lidar. Each beam is an endpoint paired with
    /// how it ended, as reported by the sensor.
    ///
    /// Every voxel is updated at most once for the whole scan, and a voxel that any `Hit` beam ended in is marked occupied even
    /// if other beams passed through it. `max_range` only limits length: endpoints farther than `max_range` from the origin
    /// are pulled in to `max_range`, and since the beam no longer reaches its return, it becomes `MaxRange`. A negative or
    /// infinite `max_range` means the range is unlimited.
    ///
    /// Every beam is checked before anything is written, so on error the tree is unchanged. The whole scan counts as one
    /// observation for the pruning schedule.
    pub fn integrate_scan<I>(
        &mut self,
        tree: &mut Octree,
        origin: Point3f,
        beams: I,
        max_range: f32,
    ) -> Result<IntegrationStats, UpdateError>
    where
        I: IntoIterator<Item = (Point3f, BeamReturn)>,
    {
        let span = debug_span!("integrate_scan", ?origin, max_range);
        let _guard = span.enter();

        let caster = BeamCaster::new(tree.index());
        let limit_range = max_range >= 0.0 && max_range.is_finite();

        self.free.clear();
        self.occupied.clear();

        let mut stats = IntegrationStats::default();
        for (endpoint, beam_return) in beams {
            let offset = endpoint - origin;
            let range = offset.norm();
            let (endpoint, beam_return) = if limit_range && range > max_range {
                (origin + offset * (max_range / range), BeamReturn::MaxRange)
            } else {
                (endpoint, beam_return)
            };

            let traversal = caster.traverse(origin, endpoint)?;
            stats.beams += 1;
            if traversal.is_degenerate() {
                stats.degenerate_beams += 1;
            }

            self.keys.clear();
            self.keys.extend(traversal);
            if let Some((&last, path)) = self.keys.split_last() {
                self.free.extend(path.iter().cloned());
                if beam_return == BeamReturn::Hit {
                    self.occupied.insert(last);
                } else {
                    self.free.insert(last);
                }
            }
        }

        for &key in self.occupied.iter() {
            tree.update_key(key, Measurement::Hit)?;
        }
        stats.hits = self.occupied.len();
        for &key in self.free.difference(&self.occupied) {
            tree.update_key(key, Measurement::Miss)?;
            stats.misses += 1;
        }
        stats.voxels_updated = stats.misses + stats.hits;

        if stats.degenerate_beams > 0 {
            debug!(
                degenerate_beams = stats.degenerate_beams,
                "scan contains beams shorter than one voxel"
            );
        }

        stats.nodes_pruned = self.count_observation(tree);
        debug!(
            beams = stats.beams,
            hits = stats.hits,
            misses = stats.misses,
            "integrated scan"
        );

        Ok(stats)
    }

    /// Prunes if the schedule says so. Returns the number of nodes removed.
    fn count_observation(&mut self, tree: &mut Octree) -> usize {
        self.observations_since_prune += 1;
        if !self.prune_policy.is_due(self.observations_since_prune) {
            return 0;
        }
        self.observations_since_prune = 0;

        tree.prune()
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
