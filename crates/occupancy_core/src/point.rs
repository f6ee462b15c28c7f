use core::ops::{Add, Mul, Sub};
use num::Zero;
use serde::{Deserialize, Serialize};

/// A 3-dimensional point, which is just a primitive array of type `N`. Construct one as:
///
/// ```
/// use occupancy_core::PointN;
///
/// let p = PointN([1, 2, 3]);
/// ```
///
/// Points support basic linear algebraic operations such as addition, subtraction, scalar
/// multiplication, and scalar division.
///
/// ```
/// use occupancy_core::PointN;
///
/// let p1 = PointN([1.0, 2.0, 3.0]);
/// let p2 = PointN([3.0, 4.0, 5.0]);
///
/// assert_eq!(p1 + p2, PointN([4.0, 6.0, 8.0]));
/// assert_eq!(p1 - p2, PointN([-2.0, -2.0, -2.0]));
/// assert_eq!(p1 * 2.0, PointN([2.0, 4.0, 6.0]));
/// ```
///
/// There is also a partial order defined on points which says that a point A is greater than a
/// point B if and only if all of the components of point A are greater than point B. This is useful
/// for checking if a point is inside of the box between two other points:
///
/// ```
/// use occupancy_core::PointN;
///
/// let min = PointN([0, 0, 0]);
/// let least_upper_bound = PointN([3, 3, 3]);
///
/// let p = PointN([0, 1, 2]);
/// assert!(min <= p && p < least_upper_bound);
/// ```
#[derive(Copy, Clone, Debug, Deserialize, Default, Eq, Hash, PartialEq, Serialize)]
pub struct PointN<N>(pub N);

/// A trait that bundles op traits that all `PointN<N>` (and its components) should have.
pub trait Point:
    Add<Output = Self>
    + Copy
    + Mul<<Self as Point>::Scalar, Output = Self>
    + PartialOrd
    + Sized
    + Sub<Output = Self>
    + Zero
{
    type Scalar: Copy;

    /// Returns a point with every component set to `value`.
    fn fill(value: Self::Scalar) -> Self;

    /// Returns the component specified by index. I.e. X = 0, Y = 1, Z = 2.
    fn at(&self, component_index: usize) -> Self::Scalar;

    /// Returns the point after applying `f` component-wise.
    fn map_components(&self, f: impl Fn(Self::Scalar) -> Self::Scalar) -> Self;
}

pub trait Distance: Point {
    /// The L1 distance between points. For voxel coordinates this is the number of face-adjacent steps between them.
    fn l1_distance(&self, other: &Self) -> Self::Scalar;
}

pub trait NormSquared {
    fn norm_squared(&self) -> f32;
}

pub trait Norm {
    fn norm(&self) -> f32;
}

impl<T> Norm for T
where
    T: NormSquared,
{
    fn norm(&self) -> f32 {
        self.norm_squared().sqrt()
    }
}

impl<N> Zero for PointN<N>
where
    Self: Point + SmallZero,
{
    fn zero() -> Self {
        Self::ZERO
    }

    fn is_zero(&self) -> bool {
        *self == Self::zero()
    }
}

pub trait DotProduct {
    type Scalar: Copy;

    /// The vector dot product.
    fn dot(&self, other: &Self) -> Self::Scalar;
}

pub trait FloatPoint: Point {
    /// Component-wise maximum.
    fn max_components(&self, other: &Self) -> Self;

    /// Component-wise minimum.
    fn min_components(&self, other: &Self) -> Self;

    /// Returns `true` iff every component is neither infinite nor NaN.
    fn is_finite(&self) -> bool;
}

// `Zero` trait doesn't allow associated constants for zero because of bignums.
pub trait SmallZero: Copy {
    const ZERO: Self;
}

impl SmallZero for i32 {
    const ZERO: i32 = 0;
}

impl SmallZero for f32 {
    const ZERO: f32 = 0.0;
}
