//! Log-odds arithmetic for Bayesian occupancy fusion.
//!
//! Occupancy is stored as `l = ln(p / (1 - p))`. Fusing an independent observation with probability `q` is then just
//! `l += ln(q / (1 - q))`, followed by clamping to `[clamp_min, clamp_max]` so that a voxel can still change its mind after a
//! long run of identical observations.

use crate::OctreeConfig;

use serde::{Deserialize, Serialize};

/// `ln(p / (1 - p))`
#[inline]
pub fn probability_to_log_odds(probability: f32) -> f32 {
    (probability / (1.0 - probability)).ln()
}

/// `1 / (1 + exp(-l))`
#[inline]
pub fn log_odds_to_probability(log_odds: f32) -> f32 {
    1.0 / (1.0 + (-log_odds).exp())
}

/// One observation of a single voxel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Measurement {
    /// A beam ended in the voxel.
    Hit,
    /// A beam passed through the voxel.
    Miss,
    /// An observation with an arbitrary occupancy probability in `(0, 1)`.
    Probability(f32),
}

impl Measurement {
    /// Returns `true` iff the measurement has a finite log-odds increment, i.e. any `Probability` is strictly inside `(0, 1)`.
    #[inline]
    pub fn is_valid(&self) -> bool {
        match *self {
            Self::Probability(p) => p > 0.0 && p < 1.0,
            Self::Hit | Self::Miss => true,
        }
    }
}

impl From<bool> for Measurement {
    #[inline]
    fn from(hit: bool) -> Self {
        if hit {
            Self::Hit
        } else {
            Self::Miss
        }
    }
}

/// The log-odds increments of a range sensor and the bounds that every stored value is clamped to.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct SensorModel {
    hit: f32,
    miss: f32,
    clamp_min: f32,
    clamp_max: f32,
}

impl SensorModel {
    /// Assumes `config` is valid.
    pub fn from_config(config: &OctreeConfig) -> Self {
        Self {
            hit: probability_to_log_odds(config.prob_hit),
            miss: probability_to_log_odds(config.prob_miss),
            clamp_min: config.clamp_min,
            clamp_max: config.clamp_max,
        }
    }

    /// The increment applied by a `Measurement::Hit`. Always positive.
    #[inline]
    pub fn hit(&self) -> f32 {
        self.hit
    }

    /// The increment applied by a `Measurement::Miss`. Always negative.
    #[inline]
    pub fn miss(&self) -> f32 {
        self.miss
    }

    #[inline]
    pub fn clamp_min(&self) -> f32 {
        self.clamp_min
    }

    #[inline]
    pub fn clamp_max(&self) -> f32 {
        self.clamp_max
    }

    /// The log-odds increment for `measurement`. Not finite unless `measurement.is_valid()`.
    #[inline]
    pub fn increment(&self, measurement: Measurement) -> f32 {
        match measurement {
            Measurement::Hit => self.hit,
            Measurement::Miss => self.miss,
            Measurement::Probability(p) => probability_to_log_odds(p),
        }
    }

    #[inline]
    pub fn clamp(&self, log_odds: f32) -> f32 {
        log_odds.max(self.clamp_min).min(self.clamp_max)
    }

    /// `log_odds` after fusing `measurement`.
    #[inline]
    pub fn fuse(&self, log_odds: f32, measurement: Measurement) -> f32 {
        self.clamp(log_odds + self.increment(measurement))
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

    #[test]
    fn log_odds_and_probability_are_inverses() {
        for &p in &[0.01, 0.12, 0.4, 0.5, 0.7, 0.97] {
            let l = probability_to_log_odds(p);
            assert!((log_odds_to_probability(l) - p).abs() < 1e-6);
        }
        assert_eq!(probability_to_log_odds(0.5), 0.0);
        assert_eq!(log_odds_to_probability(0.0), 0.5);
    }

    #[test]
    fn default_increments() {
        let model = SensorModel::from_config(&OctreeConfig::default());

        assert!((model.hit() - 0.847_298).abs() < 1e-5);
        assert!((model.miss() + 0.405_465).abs() < 1e-5);
        assert_eq!(model.increment(Measurement::from(true)), model.hit());
        assert_eq!(model.increment(Measurement::from(false)), model.miss());
    }

    #[test]
    fn fusion_saturates_at_clamp_bounds() {
        let model = SensorModel::from_config(&OctreeConfig::default());

        let mut l = 0.0;
        for _ in 0..100 {
            l = model.fuse(l, Measurement::Hit);
        }
        assert_eq!(l, 3.5);

        for _ in 0..100 {
            l = model.fuse(l, Measurement::Miss);
        }
        assert_eq!(l, -2.0);

        assert_eq!(model.fuse(0.0, Measurement::Probability(0.999_999)), 3.5);
    }

    #[test]
    fn probabilities_outside_the_open_unit_interval_are_invalid() {
        assert!(Measurement::Hit.is_valid());
        assert!(Measurement::Probability(0.3).is_valid());

        for &p in &[0.0, 1.0, 1.5, -0.2, f32::NAN, f32::INFINITY] {
            assert!(!Measurement::Probability(p).is_valid(), "{}", p);
        }
    }
}
