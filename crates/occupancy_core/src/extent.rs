use crate::{FloatPoint, Point, Point3, PointN};

use num::Zero;
use serde::{Deserialize, Serialize};

/// A 3-dimensional extent with scalar type `T`.
pub type Extent3<T> = ExtentN<[T; 3]>;
/// A 3-dimensional extent with scalar type `f32`.
pub type Extent3f = ExtentN<[f32; 3]>;

/// An axis-aligned box with some shape and a minimum point: the Cartesian product of a half-open interval `[a, b)` in each
/// dimension. Query regions are treated as closed instead; see `Extent3f::intersects_closed`.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct ExtentN<N> {
    /// The least point contained in the extent.
    pub minimum: PointN<N>,
    /// The length of each dimension.
    pub shape: PointN<N>,
}

impl<N> ExtentN<N> {
    /// The default representation of an extent as the minimum point and shape.
    #[inline]
    pub fn from_min_and_shape(minimum: PointN<N>, shape: PointN<N>) -> Self {
        Self { minimum, shape }
    }
}

impl<N> ExtentN<N>
where
    PointN<N>: Point,
{
    /// The least point `p` for which all points `q` in the extent satisfy `q < p`.
    #[inline]
    pub fn least_upper_bound(&self) -> PointN<N> {
        self.minimum + self.shape
    }

    /// Returns `true` iff the point `p` is contained in this extent.
    #[inline]
    pub fn contains(&self, p: PointN<N>) -> bool {
        let lub = self.least_upper_bound();

        self.minimum <= p && p < lub
    }
}

impl<T> Extent3<T>
where
    T: Copy + core::ops::Mul<Output = T>,
{
    #[inline]
    pub fn volume(&self) -> T {
        self.shape.x() * self.shape.y() * self.shape.z()
    }
}

impl Extent3f {
    /// The box spanning from `minimum` to `least_upper_bound`. Negative shape components are clamped to zero.
    #[inline]
    pub fn from_min_and_lub(minimum: Point3<f32>, least_upper_bound: Point3<f32>) -> Self {
        let shape = (least_upper_bound - minimum).max_components(&PointN::zero());

        Self { minimum, shape }
    }

    /// The smallest box having both `p1` and `p2` as corners.
    #[inline]
    pub fn from_corners(p1: Point3<f32>, p2: Point3<f32>) -> Self {
        Self::from_min_and_lub(p1.min_components(&p2), p1.max_components(&p2))
    }

    /// Returns `true` iff the half-open box `self` overlaps the closed box `region`, i.e. `region` includes its upper faces.
    ///
    /// Treating query regions as closed lets a flat region (zero thickness along some axis) select the voxels its plane
    /// touches, which is how bounding-box queries are usually written by hand.
    #[inline]
    pub fn intersects_closed(&self, region: &Self) -> bool {
        let self_lub = self.least_upper_bound();
        let region_max = region.least_upper_bound();

        self.minimum <= region_max && region.minimum < self_lub
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
