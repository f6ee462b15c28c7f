//! Configuration for an `Octree`.

use occupancy_core::prelude::*;

use serde::{Deserialize, Serialize};

/// Every recognized option of an occupancy map. Missing fields deserialize to their defaults.
///
/// ```
/// use occupancy_storage::OctreeConfig;
///
/// let config = OctreeConfig {
///     resolution: 0.05,
///     prune_every: 10,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct OctreeConfig {
    /// Edge length of the finest voxels, in map units.
    pub resolution: f32,
    /// Number of levels below the root. The map is a cube of edge length `resolution * 2^max_depth`.
    pub max_depth: u8,
    /// The map cube is centered on this point.
    pub center: Point3f,
    /// Probability that a voxel is occupied given a beam ended in it. In `(0.5, 1)`.
    pub prob_hit: f32,
    /// Probability that a voxel is occupied given a beam passed through it. In `(0, 0.5)`.
    pub prob_miss: f32,
    /// Lower log-odds bound.
    pub clamp_min: f32,
    /// Upper log-odds bound.
    pub clamp_max: f32,
    /// Voxels with at least this probability are occupied.
    pub occupancy_threshold: f32,
    /// Probability assigned to the root (and so to all space) on the first observation.
    pub prior_probability: f32,
    /// Prune after this many integrated observations. 0 means pruning is manual.
    pub prune_every: u32,
    /// Sibling leaves whose log-odds differ by at most this much are collapsed into their parent.
    pub prune_epsilon: f32,
}

impl Default for OctreeConfig {
    fn default() -> Self {
        Self {
            resolution: 0.1,
            max_depth: 16,
            center: Point3f::ZERO,
            prob_hit: 0.7,
            prob_miss: 0.4,
            clamp_min: -2.0,
            clamp_max: 3.5,
            occupancy_threshold: 0.5,
            prior_probability: 0.5,
            prune_every: 0,
            prune_epsilon: 1e-4,
        }
    }
}

impl OctreeConfig {
    /// Returns the first rule this configuration violates, if any.
    pub fn validate(&self) -> Result<(), InvalidConfigurationError> {
        // Resolution, depth and center.
        self.spatial_index()?;

        if !(self.prob_hit > 0.5 && self.prob_hit < 1.0) {
            return Err(InvalidConfigurationError::ProbHit(self.prob_hit));
        }
        if !(self.prob_miss > 0.0 && self.prob_miss < 0.5) {
            return Err(InvalidConfigurationError::ProbMiss(self.prob_miss));
        }
        // Implied by the two ranges above. Kept so the error names the actual conflict if those ever widen.
        if self.prob_hit <= self.prob_miss {
            return Err(InvalidConfigurationError::HitNotAboveMiss {
                prob_hit: self.prob_hit,
                prob_miss: self.prob_miss,
            });
        }
        if !(self.clamp_min.is_finite()
            && self.clamp_max.is_finite()
            && self.clamp_min < self.clamp_max)
        {
            return Err(InvalidConfigurationError::ClampBounds {
                min: self.clamp_min,
                max: self.clamp_max,
            });
        }
        if !(self.occupancy_threshold > 0.0 && self.occupancy_threshold < 1.0) {
            return Err(InvalidConfigurationError::OccupancyThreshold(
                self.occupancy_threshold,
            ));
        }
        if !(self.prior_probability > 0.0 && self.prior_probability < 1.0) {
            return Err(InvalidConfigurationError::PriorProbability(
                self.prior_probability,
            ));
        }
        if !(self.prune_epsilon >= 0.0 && self.prune_epsilon.is_finite()) {
            return Err(InvalidConfigurationError::PruneEpsilon(self.prune_epsilon));
        }

        Ok(())
    }

    /// The `SpatialIndex` described by `resolution`, `max_depth` and `center`.
    pub fn spatial_index(&self) -> Result<SpatialIndex, InvalidConfigurationError> {
        SpatialIndex::new(self.resolution, self.max_depth, self.center)
    }

    /// The pruning schedule described by `prune_every`.
    pub fn prune_policy(&self) -> PrunePolicy {
        PrunePolicy::from_interval(self.prune_every)
    }
}

/// When an updater should prune the tree.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PrunePolicy {
    /// Only when `Octree::prune` is called explicitly.
    Manual,
    /// After every integrated observation.
    EveryObservation,
    /// After every `n` integrated observations.
    EveryN(u32),
}

impl PrunePolicy {
    pub fn from_interval(every: u32) -> Self {
        match every {
            0 => Self::Manual,
            1 => Self::EveryObservation,
            n => Self::EveryN(n),
        }
    }

    /// Returns `true` iff a prune is due after `observations` observations since the last one.
    #[inline]
    pub fn is_due(&self, observations: u32) -> bool {
        match *self {
            Self::Manual => false,
            Self::EveryObservation => observations >= 1,
            Self::EveryN(n) => observations >= n,
        }
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(OctreeConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_each_invalid_field() {
        let base = OctreeConfig::default();

        let cases = vec![
            (
                OctreeConfig {
                    resolution: -1.0,
                    ..base
                },
                InvalidConfigurationError::Resolution(-1.0),
            ),
            (
                OctreeConfig {
                    prob_hit: 0.5,
                    ..base
                },
                InvalidConfigurationError::ProbHit(0.5),
            ),
            (
                OctreeConfig {
                    prob_miss: 0.6,
                    ..base
                },
                InvalidConfigurationError::ProbMiss(0.6),
            ),
            (
                OctreeConfig {
                    clamp_min: 1.0,
                    clamp_max: 1.0,
                    ..base
                },
                InvalidConfigurationError::ClampBounds { min: 1.0, max: 1.0 },
            ),
            (
                OctreeConfig {
                    occupancy_threshold: 1.0,
                    ..base
                },
                InvalidConfigurationError::OccupancyThreshold(1.0),
            ),
            (
                OctreeConfig {
                    prior_probability: 0.0,
                    ..base
                },
                InvalidConfigurationError::PriorProbability(0.0),
            ),
            (
                OctreeConfig {
                    prune_epsilon: -0.1,
                    ..base
                },
                InvalidConfigurationError::PruneEpsilon(-0.1),
            ),
        ];

        for (config, expected) in cases {
            assert_eq!(config.validate(), Err(expected));
        }
    }

    #[test]
    fn missing_fields_take_defaults() {
        let config: OctreeConfig =
            serde_json::from_str(r#"{ "resolution": 0.05, "prune_every": 4 }"#).unwrap();

        assert_eq!(
            config,
            OctreeConfig {
                resolution: 0.05,
                prune_every: 4,
                ..Default::default()
            }
        );
        assert_eq!(config.prune_policy(), PrunePolicy::EveryN(4));
    }

    #[test]
    fn prune_policy_schedule() {
        assert!(!PrunePolicy::from_interval(0).is_due(1_000));
        assert!(PrunePolicy::from_interval(1).is_due(1));
        assert!(!PrunePolicy::from_interval(3).is_due(2));
        assert!(PrunePolicy::from_interval(3).is_due(3));
    }
}
